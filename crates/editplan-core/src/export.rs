//! # Canonical Export Module
//!
//! Deterministic snapshot of an analyzed graph.
//!
//! The planner's working containers are already ordered, but a snapshot is
//! a serialization surface: this module flattens the graph into sorted
//! vectors with a format version and an integrity checksum so that two
//! runs over the same input serialize to identical bytes. `editplan graph`
//! renders it as JSON; determinism tests compare it structurally.
//!
//! The checksum is a fold over the snapshot's bytes. It detects accidental
//! corruption and quick-compares two snapshots; it is not a cryptographic
//! hash. For a collision-resistant digest of the emitted plan, see
//! [`plan_digest`] behind the `crypto-hash` feature.

use serde::{Deserialize, Serialize};

#[cfg(feature = "crypto-hash")]
use crate::emit::EmittedPlan;
use crate::graph::DepGraph;
use crate::primitives::FORMAT_VERSION;
use crate::types::Availability;

// =============================================================================
// SNAPSHOT ROWS (Sorted, Deterministic)
// =============================================================================

/// A node in snapshot form.
///
/// Sorted by key; the adjacency lives in [`SnapshotEdge`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotNode {
    /// The node key (sort key).
    pub key: String,

    /// Result of the size-availability analysis.
    pub availability: Availability,

    /// Whether the reachability traversal visited this node.
    pub visited: bool,

    /// Component index, if partitioning ran.
    pub component: Option<usize>,

    /// Number of replacement directives attached to this node.
    pub replacement_count: usize,

    /// Whether this node was declared a source.
    pub source: bool,

    /// Whether this node was declared a sink.
    pub sink: bool,
}

/// A directed edge in snapshot form, sorted by `(from, to)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotEdge {
    /// Source node key.
    pub from: String,

    /// Target node key.
    pub to: String,
}

/// A component in snapshot form, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotComponent {
    /// Dense discovery-order index.
    pub id: usize,

    /// Size of the component's change set after settlement.
    pub change_count: usize,

    /// Accepted frontier directives.
    pub accepted_count: usize,

    /// Rejected frontier directives.
    pub rejected_count: usize,

    /// Whether the accepted and rejected sets intersect (component dropped).
    pub conflicted: bool,
}

// =============================================================================
// GRAPH SNAPSHOT
// =============================================================================

/// A graph in canonical, serialization-ready form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphSnapshot {
    /// Snapshot layout version.
    pub format_version: u8,

    /// Nodes sorted by key.
    pub nodes: Vec<SnapshotNode>,

    /// Edges sorted by `(from, to)`.
    pub edges: Vec<SnapshotEdge>,

    /// Components in discovery order.
    pub components: Vec<SnapshotComponent>,

    /// Fold checksum over the rows above.
    pub checksum: u64,
}

impl GraphSnapshot {
    /// Flatten a graph into canonical snapshot form.
    #[must_use]
    pub fn from_graph(graph: &DepGraph) -> Self {
        let nodes: Vec<SnapshotNode> = graph
            .nodes()
            .map(|node| SnapshotNode {
                key: node.key.as_str().to_string(),
                availability: node.availability,
                visited: node.visited,
                component: node.component.map(|id| id.index()),
                replacement_count: node.replacements.len(),
                source: graph.sources().contains(&node.key),
                sink: graph.sinks().contains(&node.key),
            })
            .collect();

        let edges: Vec<SnapshotEdge> = graph
            .nodes()
            .flat_map(|node| {
                node.outgoing.iter().map(|to| SnapshotEdge {
                    from: node.key.as_str().to_string(),
                    to: to.as_str().to_string(),
                })
            })
            .collect();

        let components: Vec<SnapshotComponent> = graph
            .components()
            .iter()
            .map(|component| SnapshotComponent {
                id: component.id.index(),
                change_count: component.changes.len(),
                accepted_count: component.frontier_accepted.len(),
                rejected_count: component.frontier_rejected.len(),
                conflicted: component.has_conflict(),
            })
            .collect();

        // node and edge iteration is already lexicographic; the sorts
        // below keep the invariant independent of the graph's internals
        let mut snapshot = Self {
            format_version: FORMAT_VERSION,
            nodes,
            edges,
            components,
            checksum: 0,
        };
        snapshot.nodes.sort();
        snapshot.edges.sort();
        snapshot.checksum = snapshot.compute_checksum();
        snapshot
    }

    /// Whether the stored checksum matches the rows.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Fold checksum over the snapshot rows.
    ///
    /// XOR-rotate folding, integer-only. Detects accidental corruption,
    /// nothing more.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        let mut hash: u64 = u64::from(self.format_version);

        for node in &self.nodes {
            hash = fold_bytes(hash, node.key.as_bytes(), 13);
            hash ^= (node.availability as u64).rotate_left(7);
            hash ^= u64::from(node.visited).rotate_left(11);
            hash ^= node.component.map_or(0, |id| (id as u64).rotate_left(17));
            hash ^= (node.replacement_count as u64).rotate_left(19);
            hash ^= u64::from(node.source).rotate_left(23);
            hash ^= u64::from(node.sink).rotate_left(29);
        }

        for edge in &self.edges {
            hash = fold_bytes(hash, edge.from.as_bytes(), 31);
            hash = fold_bytes(hash, edge.to.as_bytes(), 37);
        }

        for component in &self.components {
            hash ^= (component.id as u64).rotate_left(41);
            hash ^= (component.change_count as u64).rotate_left(43);
            hash ^= (component.accepted_count as u64).rotate_left(47);
            hash ^= (component.rejected_count as u64).rotate_left(53);
            hash ^= u64::from(component.conflicted).rotate_left(59);
        }

        hash
    }
}

fn fold_bytes(mut hash: u64, bytes: &[u8], shift: u32) -> u64 {
    for (index, byte) in bytes.iter().enumerate() {
        hash ^= u64::from(*byte)
            .rotate_left(shift)
            .wrapping_mul(index as u64 + 1);
    }
    hash
}

// =============================================================================
// CRYPTOGRAPHIC PLAN DIGEST
// =============================================================================

/// Compute a BLAKE3 hash of a plan's canonical rendering.
///
/// Hashes the stdout stream, the patch summary and every patch body in
/// order, so two plans hash equal iff all three outputs are byte-identical.
///
/// Returns the hash as a 64-character hex string.
///
/// # Requires
///
/// Only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn plan_digest(plan: &EmittedPlan) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(plan.stdout_stream().as_bytes());
    hasher.update(plan.summary().as_bytes());
    for patch in &plan.patches {
        hasher.update(patch.body().as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================
