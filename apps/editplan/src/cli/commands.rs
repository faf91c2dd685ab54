//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Logging goes to stderr; stdout is reserved for the command's payload
//! (the edit stream, a report, or a JSON document), so piping the planner
//! into downstream tooling stays clean.

use editplan_core::{
    EmittedPlan, GraphSnapshot, PlanError, PlanOutcome, Planner, export::plan_digest,
    primitives::PATCH_SUMMARY_FILE,
};
use std::io::BufReader;
use std::path::{Path, PathBuf};

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate an input file path.
///
/// Canonicalizes the path to resolve symlinks and "..", which also
/// verifies existence, then rejects anything that is not a regular file.
fn validate_input_path(path: &Path) -> Result<PathBuf, PlanError> {
    let canonical = path.canonicalize().map_err(|e| {
        PlanError::IoError(format!("invalid input path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PlanError::IoError(format!(
            "path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate the patch output directory.
///
/// The directory must already exist; it is never created on the caller's
/// behalf, so a typo in `--out-dir` fails instead of littering the
/// filesystem.
fn validate_out_dir(dir: &Path) -> Result<PathBuf, PlanError> {
    let canonical = dir.canonicalize().map_err(|e| {
        PlanError::IoError(format!(
            "invalid output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    if !canonical.is_dir() {
        return Err(PlanError::IoError(format!(
            "output path '{}' is not a directory",
            dir.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// INPUT LOADING
// =============================================================================

/// Run the full pipeline over the given file, or stdin when absent.
fn run_pipeline(input: Option<&Path>) -> Result<PlanOutcome, PlanError> {
    match input {
        Some(path) => {
            let path = validate_input_path(path)?;
            let file = std::fs::File::open(&path).map_err(|e| {
                PlanError::IoError(format!("cannot open '{}': {}", path.display(), e))
            })?;
            Planner::run(BufReader::new(file))
        }
        None => {
            let stdin = std::io::stdin();
            Planner::run(stdin.lock())
        }
    }
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Run the full pipeline and emit the plan.
///
/// The edit stream goes to stdout; `patches.txt` and the per-component
/// patch files are rewritten under `out_dir`.
pub fn cmd_plan(input: Option<&Path>, out_dir: &Path) -> Result<(), PlanError> {
    let out_dir = validate_out_dir(out_dir)?;
    let outcome = run_pipeline(input)?;

    write_patches(&outcome.plan, &out_dir)?;

    tracing::info!(
        edits = outcome.plan.edits.len(),
        patches = outcome.plan.patches.len(),
        out_dir = %out_dir.display(),
        "plan emitted"
    );

    print!("{}", outcome.plan.stdout_stream());
    Ok(())
}

/// Write the patch summary and the patch files under `out_dir`.
///
/// Every file is rewritten from scratch; the summary is written even for
/// an empty plan so a previous run's summary never survives.
pub fn write_patches(plan: &EmittedPlan, out_dir: &Path) -> Result<(), PlanError> {
    let summary_path = out_dir.join(PATCH_SUMMARY_FILE);
    std::fs::write(&summary_path, plan.summary()).map_err(|e| {
        PlanError::IoError(format!("cannot write '{}': {}", summary_path.display(), e))
    })?;

    for patch in &plan.patches {
        let patch_path = out_dir.join(patch.file_name());
        std::fs::write(&patch_path, patch.body()).map_err(|e| {
            PlanError::IoError(format!("cannot write '{}': {}", patch_path.display(), e))
        })?;
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Parse and partition the input, then report graph statistics.
///
/// Stops after partitioning: `check` validates the input and describes its
/// shape without deciding anything about the edits.
pub fn cmd_check(input: Option<&Path>, json_mode: bool) -> Result<(), PlanError> {
    let mut planner = Planner::new();
    match input {
        Some(path) => {
            let path = validate_input_path(path)?;
            let file = std::fs::File::open(&path).map_err(|e| {
                PlanError::IoError(format!("cannot open '{}': {}", path.display(), e))
            })?;
            planner.ingest(BufReader::new(file))?;
        }
        None => {
            let stdin = std::io::stdin();
            planner.ingest(stdin.lock())?;
        }
    }
    planner.partition()?;

    let stats = planner.graph().stats();

    if json_mode {
        let output = serde_json::json!({
            "nodes": stats.node_count,
            "edges": stats.edge_count,
            "sources": stats.source_count,
            "sinks": stats.sink_count,
            "replacements": stats.replacement_count,
            "frontier_rules": stats.frontier_rule_count,
            "components": stats.component_count
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Editplan Input Check");
        println!();
        println!("  Nodes:          {}", stats.node_count);
        println!("  Edges:          {}", stats.edge_count);
        println!("  Sources:        {}", stats.source_count);
        println!("  Sinks:          {}", stats.sink_count);
        println!("  Replacements:   {}", stats.replacement_count);
        println!("  Frontier rules: {}", stats.frontier_rule_count);
        println!("  Components:     {}", stats.component_count);
    }

    Ok(())
}

// =============================================================================
// GRAPH COMMAND
// =============================================================================

/// Run the analysis and dump the graph as a JSON snapshot.
pub fn cmd_graph(input: Option<&Path>) -> Result<(), PlanError> {
    let outcome = run_pipeline(input)?;
    let snapshot = GraphSnapshot::from_graph(&outcome.graph);

    let rendered = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| PlanError::IoError(format!("cannot serialize snapshot: {}", e)))?;
    println!("{}", rendered);

    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Compute the BLAKE3 digest of the emitted plan.
///
/// Two inputs hash identically iff their plans are byte-identical, so the
/// digest is a cheap equality witness across machines.
pub fn cmd_hash(input: Option<&Path>, json_mode: bool) -> Result<(), PlanError> {
    let outcome = run_pipeline(input)?;
    let digest = plan_digest(&outcome.plan);

    if json_mode {
        let output = serde_json::json!({
            "algorithm": "BLAKE3",
            "digest": digest,
            "edits": outcome.plan.edits.len(),
            "patches": outcome.plan.patches.len()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("{}", digest);
    }

    Ok(())
}
