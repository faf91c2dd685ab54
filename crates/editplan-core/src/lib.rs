//! # editplan-core
//!
//! The deterministic planning engine for editplan - THE LOGIC.
//!
//! This crate turns a line-oriented dependency/edit stream into a merged
//! edit plan: it builds a directed graph whose nodes carry candidate source
//! edits, decides which edits are safe to apply, and assembles a
//! byte-stable edit stream plus per-component patches.
//!
//! ## Pipeline
//!
//! ```text
//! lines ─▶ Ingestor ─▶ DepGraph ─▶ partition ─▶ availability
//!                                      │              │
//!                                      ▼              ▼
//!                                 components ◀── reachability
//!                                      │
//!                            frontier resolution
//!                                      │
//!                              insertion merge
//!                                      │
//!                                 EmittedPlan
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies, no logging
//! - Deterministic: BTreeMap only, no HashMap, no floats, no randomness
//! - I/O-free: consumes `BufRead`, produces strings; writing is the app's job
//! - Closed: no external logic injection

// =============================================================================
// MODULES
// =============================================================================

pub mod availability;
pub mod directive;
pub mod emit;
pub mod export;
pub mod frontier;
pub mod graph;
pub mod ingestor;
pub mod merge;
pub mod plan;
pub mod primitives;
pub mod reachability;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Availability, Component, ComponentId, Node, NodeKey, PlanError};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use directive::{Directive, Edit, HeaderInclude, HeaderKind, Replacement};
pub use emit::{EmittedPlan, Patch, patch_file_name};
pub use frontier::FrontierRule;
pub use graph::{DepGraph, GraphStats};
pub use ingestor::Ingestor;
pub use plan::{Phase, PlanOutcome, Planner};

// =============================================================================
// RE-EXPORTS: Canonical Export
// =============================================================================

pub use export::{GraphSnapshot, SnapshotComponent, SnapshotEdge, SnapshotNode};

#[cfg(feature = "crypto-hash")]
pub use export::plan_digest;
