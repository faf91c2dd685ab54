//! # Core Type Definitions
//!
//! This module contains all core types for the editplan deterministic planner:
//! - Graph identifiers (`NodeKey`, `ComponentId`)
//! - Node and component state (`Node`, `Component`, `Availability`)
//! - Error types (`PlanError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Carry no interior mutability and no ambient state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::directive::Directive;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Unique identifier for a node in the dependency graph.
///
/// Keys are opaque byte strings taken verbatim from the input stream.
/// All node iteration is lexicographic over keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(pub String);

impl NodeKey {
    /// Create a new node key from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Dense index of a connected component.
///
/// Components are numbered from 0 in discovery order, which is itself
/// lexicographic because partitioning iterates nodes in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

impl ComponentId {
    /// Create a new component id.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

// =============================================================================
// AVAILABILITY
// =============================================================================

/// Tri-state result of the size-availability analysis.
///
/// Nodes start `Unknown`; sinks are resolved `Available` before any
/// traversal. Nodes the analysis never concludes on (nodes unreachable
/// from every source, including isolated cycles) stay `Unknown` and are
/// treated as available wherever availability is consulted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The analysis has not concluded on this node.
    #[default]
    Unknown,
    /// Size information is available along every outgoing path.
    Available,
    /// At least one outgoing path dead-ends without size information.
    Unavailable,
}

impl Availability {
    /// Whether the analysis has concluded on this node.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Whether downstream passes may treat this node as sized.
    ///
    /// `Unknown` maps to available here; only a concluded `Unavailable`
    /// disqualifies a node.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

// =============================================================================
// NODE
// =============================================================================

/// A node in the dependency graph.
///
/// Carries the directed adjacency (`outgoing`), the undirected view used
/// only by component partitioning (`neighbors`), the replacement
/// directives attached via `r` lines, and the per-node analysis state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The key this node was materialized under.
    pub key: NodeKey,
    /// Replacement directives attached to this node.
    pub replacements: BTreeSet<Directive>,
    /// Directed successors.
    pub outgoing: BTreeSet<NodeKey>,
    /// Undirected adjacency; both endpoints of every edge appear here.
    pub neighbors: BTreeSet<NodeKey>,
    /// Set by the reachability traversal on first visit.
    pub visited: bool,
    /// Result of the size-availability analysis.
    pub availability: Availability,
    /// Assigned by component partitioning; exactly one per node afterwards.
    pub component: Option<ComponentId>,
}

impl Node {
    /// Create a fresh, unanalyzed node.
    #[must_use]
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            replacements: BTreeSet::new(),
            outgoing: BTreeSet::new(),
            neighbors: BTreeSet::new(),
            visited: false,
            availability: Availability::Unknown,
            component: None,
        }
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// A connected component of the undirected view of the graph.
///
/// Accumulates the change set contributed by visited members and the
/// frontier classification verdicts. A component whose accepted and
/// rejected sets intersect is dropped: its changes are cleared and
/// nothing is emitted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Dense discovery-order id.
    pub id: ComponentId,
    /// Directives contributed by visited member nodes, later extended by
    /// accepted frontier directives.
    pub changes: BTreeSet<Directive>,
    /// Frontier directives whose rule applied.
    pub frontier_accepted: BTreeSet<Directive>,
    /// Frontier directives whose rule did not apply.
    pub frontier_rejected: BTreeSet<Directive>,
}

impl Component {
    /// Create a new empty component.
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            changes: BTreeSet::new(),
            frontier_accepted: BTreeSet::new(),
            frontier_rejected: BTreeSet::new(),
        }
    }

    /// Whether the same directive was both accepted and rejected here.
    #[must_use]
    pub fn has_conflict(&self) -> bool {
        !self.frontier_accepted.is_disjoint(&self.frontier_rejected)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the editplan pipeline.
///
/// - No silent failures: every fatal condition surfaces here
/// - Parse errors carry the verbatim offending line and its 1-based ordinal
/// - The CORE never panics; all errors are recoverable values
#[derive(Debug, Error)]
pub enum PlanError {
    /// A line violates the line grammar (wrong field count, empty line).
    #[error("malformed input line {ordinal}: {line}")]
    MalformedLine {
        /// 1-based line number within the input stream.
        ordinal: u64,
        /// The offending line, verbatim.
        line: String,
    },

    /// The first field of a line is not one of the known prefixes.
    #[error("unknown line prefix at line {ordinal}: {line}")]
    UnknownPrefix {
        /// 1-based line number within the input stream.
        ordinal: u64,
        /// The offending line, verbatim.
        line: String,
    },

    /// A directive record deviates from the directive grammar.
    #[error("invalid directive at line {ordinal}: {line}")]
    InvalidDirective {
        /// 1-based line number within the input stream.
        ordinal: u64,
        /// The offending line, verbatim.
        line: String,
    },

    /// Two co-located insertions carry the same precedence.
    #[error("duplicate precedence on insertion at {file}:{offset}: {directives:?}")]
    DuplicatePrecedence {
        /// File the conflicting insertions target.
        file: String,
        /// Byte offset the conflicting insertions share.
        offset: u64,
        /// All conflicting directives, rendered in input form.
        directives: Vec<String>,
    },

    /// A pipeline step was invoked out of order.
    ///
    /// Unreachable through the CLI; guards direct library misuse.
    #[error("pipeline phase violation: expected {expected}, got {actual}")]
    PhaseViolation {
        /// The phase the step requires.
        expected: &'static str,
        /// The phase the planner was actually in.
        actual: &'static str,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
