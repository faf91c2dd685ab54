//! # Planning Pipeline
//!
//! The staged orchestrator over the planning passes.
//!
//! A run moves through one-way phases:
//!
//! | Phase | Entered by | Work done |
//! |-------|-----------|-----------|
//! | Init | `Planner::new` | empty graph |
//! | Reading | `ingest` (transient) | line stream consumed |
//! | Built | `ingest` | graph complete |
//! | Partitioned | `partition` | components assigned |
//! | SizeAnalyzed | `analyze` | availability propagated |
//! | Reached | `traverse` | visited marks + change sets |
//! | FrontierResolved | `resolve_frontier` | components settled or dropped |
//! | Merged | `merge` | patches collected |
//! | Emitted | `emit` | plan assembled |
//! | Done | `emit` | graph consumed, run over |
//!
//! Partitioning runs directly after the build so the reachability pass can
//! accumulate change sets into components. Each method requires its entry
//! phase; out-of-order calls surface `PlanError::PhaseViolation` instead of
//! corrupting state. The CLI always drives the pipeline in order via
//! [`Planner::run`].

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::emit::{self, EmittedPlan, Patch};
use crate::graph::DepGraph;
use crate::ingestor::Ingestor;
use crate::types::PlanError;
use crate::{availability, frontier, reachability};

// =============================================================================
// PHASE
// =============================================================================

/// One-way phases of a planning run, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Phase {
    /// Fresh planner, empty graph.
    #[default]
    Init,
    /// Consuming the line stream.
    Reading,
    /// Graph complete, no analysis yet.
    Built,
    /// Components assigned.
    Partitioned,
    /// Availability propagated.
    SizeAnalyzed,
    /// Visited marks set, change sets accumulated.
    Reached,
    /// Frontier rules classified, components settled.
    FrontierResolved,
    /// Patches collected.
    Merged,
    /// Plan assembled.
    Emitted,
    /// Run complete.
    Done,
}

impl Phase {
    /// The phase name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Reading => "reading",
            Phase::Built => "built",
            Phase::Partitioned => "partitioned",
            Phase::SizeAnalyzed => "size-analyzed",
            Phase::Reached => "reached",
            Phase::FrontierResolved => "frontier-resolved",
            Phase::Merged => "merged",
            Phase::Emitted => "emitted",
            Phase::Done => "done",
        }
    }

    /// The phase entered after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Init => Some(Phase::Reading),
            Phase::Reading => Some(Phase::Built),
            Phase::Built => Some(Phase::Partitioned),
            Phase::Partitioned => Some(Phase::SizeAnalyzed),
            Phase::SizeAnalyzed => Some(Phase::Reached),
            Phase::Reached => Some(Phase::FrontierResolved),
            Phase::FrontierResolved => Some(Phase::Merged),
            Phase::Merged => Some(Phase::Emitted),
            Phase::Emitted => Some(Phase::Done),
            Phase::Done => None,
        }
    }

    /// Whether the run is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Done)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// PLANNER
// =============================================================================

/// Owns the graph and the current phase, one method per pipeline step.
#[derive(Debug, Default)]
pub struct Planner {
    graph: DepGraph,
    phase: Phase,
    patches: Vec<Patch>,
}

/// Everything a completed run leaves behind.
#[derive(Debug)]
pub struct PlanOutcome {
    /// The fully analyzed graph, for snapshots and reports.
    pub graph: DepGraph,
    /// The assembled plan, ready to write.
    pub plan: EmittedPlan,
}

impl Planner {
    /// Create a planner in the `Init` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The graph in its current state.
    #[must_use]
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    /// Consume the line stream. `Init` → `Built`.
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<(), PlanError> {
        self.require(Phase::Init)?;
        self.phase = Phase::Reading;
        Ingestor::ingest_stream(reader, &mut self.graph)?;
        self.phase = Phase::Built;
        Ok(())
    }

    /// Assign connected components. `Built` → `Partitioned`.
    ///
    /// Returns the component count.
    pub fn partition(&mut self) -> Result<usize, PlanError> {
        self.require(Phase::Built)?;
        let count = self.graph.partition_components();
        self.phase = Phase::Partitioned;
        Ok(count)
    }

    /// Propagate size availability. `Partitioned` → `SizeAnalyzed`.
    pub fn analyze(&mut self) -> Result<(), PlanError> {
        self.require(Phase::Partitioned)?;
        availability::propagate(&mut self.graph);
        self.phase = Phase::SizeAnalyzed;
        Ok(())
    }

    /// Walk from every usable source. `SizeAnalyzed` → `Reached`.
    pub fn traverse(&mut self) -> Result<(), PlanError> {
        self.require(Phase::SizeAnalyzed)?;
        reachability::traverse(&mut self.graph);
        self.phase = Phase::Reached;
        Ok(())
    }

    /// Classify frontier rules and settle components.
    /// `Reached` → `FrontierResolved`.
    pub fn resolve_frontier(&mut self) -> Result<(), PlanError> {
        self.require(Phase::Reached)?;
        frontier::resolve(&mut self.graph);
        self.phase = Phase::FrontierResolved;
        Ok(())
    }

    /// Merge change sets into patches. `FrontierResolved` → `Merged`.
    pub fn merge(&mut self) -> Result<(), PlanError> {
        self.require(Phase::FrontierResolved)?;
        self.patches = emit::collect_patches(&self.graph)?;
        self.phase = Phase::Merged;
        Ok(())
    }

    /// Assemble the final plan. `Merged` → `Done`, consuming the planner.
    pub fn emit(mut self) -> Result<PlanOutcome, PlanError> {
        self.require(Phase::Merged)?;
        let plan = emit::assemble(&self.patches);
        self.phase = Phase::Done;
        Ok(PlanOutcome {
            graph: self.graph,
            plan,
        })
    }

    /// Drive a reader through the whole pipeline.
    pub fn run<R: BufRead>(reader: R) -> Result<PlanOutcome, PlanError> {
        let mut planner = Planner::new();
        planner.ingest(reader)?;
        planner.partition()?;
        planner.analyze()?;
        planner.traverse()?;
        planner.resolve_frontier()?;
        planner.merge()?;
        planner.emit()
    }

    fn require(&self, expected: Phase) -> Result<(), PlanError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(PlanError::PhaseViolation {
                expected: expected.name(),
                actual: self.phase.name(),
            })
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
