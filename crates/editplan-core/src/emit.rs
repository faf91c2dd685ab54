//! # Plan Emission
//!
//! Assembles the deterministic outputs of a planning run:
//!
//! 1. The edit stream: the union of every surviving component's merged
//!    edits, one per line, lexicographic byte order, deduplicated.
//! 2. The patch summary: one `patch_<index>: <count>` line per surviving
//!    component, indices dense from 0 in component discovery order.
//! 3. One patch body per surviving component: its merged edits,
//!    newline-separated, lexicographic byte order.
//!
//! Components whose change set is empty (never populated, or dropped by
//! a frontier conflict) are skipped and do not consume an index.
//!
//! This module renders strings only. Writing stdout and patch files is
//! the application's job, so the planning core stays free of I/O.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::DepGraph;
use crate::merge;
use crate::types::PlanError;

// =============================================================================
// PATCH
// =============================================================================

/// One surviving component's merged edits, ready to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Dense output index; also names the patch file.
    pub index: usize,
    /// Rendered edit lines, sorted, deduplicated.
    pub lines: Vec<String>,
}

impl Patch {
    /// The file name this patch is written under.
    #[must_use]
    pub fn file_name(&self) -> String {
        patch_file_name(self.index)
    }

    /// The newline-terminated body of the patch file.
    #[must_use]
    pub fn body(&self) -> String {
        render_lines(&self.lines)
    }

    /// This patch's line in the patch summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("patch_{}: {}", self.index, self.lines.len())
    }
}

/// The patch file name for `index`.
#[must_use]
pub fn patch_file_name(index: usize) -> String {
    format!("patch_{index}.txt")
}

// =============================================================================
// EMITTED PLAN
// =============================================================================

/// The assembled outputs of a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedPlan {
    /// The global edit stream, sorted and deduplicated.
    pub edits: Vec<String>,
    /// Per-component patches in discovery order.
    pub patches: Vec<Patch>,
}

impl EmittedPlan {
    /// The newline-terminated edit stream written to stdout.
    ///
    /// Empty plans render as the empty string, not a lone newline.
    #[must_use]
    pub fn stdout_stream(&self) -> String {
        render_lines(&self.edits)
    }

    /// The body of the patch summary file.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for patch in &self.patches {
            out.push_str(&patch.summary_line());
            out.push('\n');
        }
        out
    }

    /// Whether the run produced no edits at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Merge every surviving component's change set into an indexed patch.
///
/// Fails on the first duplicate-precedence conflict, in component
/// discovery order.
pub fn collect_patches(graph: &DepGraph) -> Result<Vec<Patch>, PlanError> {
    let mut patches: Vec<Patch> = Vec::new();
    for component in graph.components() {
        if component.changes.is_empty() {
            continue;
        }
        let edits = merge::merge_changes(&component.changes)?;
        let lines: BTreeSet<String> = edits.iter().map(ToString::to_string).collect();
        patches.push(Patch {
            index: patches.len(),
            lines: lines.into_iter().collect(),
        });
    }
    Ok(patches)
}

/// Build the final plan from collected patches.
#[must_use]
pub fn assemble(patches: &[Patch]) -> EmittedPlan {
    let mut union: BTreeSet<String> = BTreeSet::new();
    for patch in patches {
        union.extend(patch.lines.iter().cloned());
    }
    EmittedPlan {
        edits: union.into_iter().collect(),
        patches: patches.to_vec(),
    }
}

fn render_lines(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
