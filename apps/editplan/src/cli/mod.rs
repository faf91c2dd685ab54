//! # Editplan CLI Module
//!
//! This module implements the CLI interface for editplan.
//!
//! ## Available Commands
//!
//! - `plan` - Run the full pipeline and emit the edit stream (default)
//! - `check` - Parse the input and report graph statistics
//! - `graph` - Dump the analyzed graph as a JSON snapshot
//! - `hash` - Compute the BLAKE3 digest of the emitted plan

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use editplan_core::PlanError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Editplan - Deterministic dependency-graph edit planner
///
/// Reads a line-oriented graph description, decides which rewrite
/// directives are safe to apply, and emits a reproducible edit stream
/// plus per-component patch files.
#[derive(Parser, Debug)]
#[command(name = "editplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Input file (defaults to stdin)
    #[arg(short = 'f', long, global = true)]
    pub input: Option<PathBuf>,

    /// Directory receiving patches.txt and the patch files
    #[arg(short = 'o', long, global = true)]
    pub out_dir: Option<PathBuf>,

    /// Config file (defaults to ./editplan.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output reports in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: edit stream on stdout, patch files on disk
    Plan,

    /// Parse and partition the input, report graph statistics
    Check,

    /// Run the analysis and dump the graph as a JSON snapshot
    Graph,

    /// Compute the BLAKE3 digest of the emitted plan
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), PlanError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Check) => cmd_check(cli.input.as_deref(), json_mode),
        Some(Commands::Graph) => cmd_graph(cli.input.as_deref()),
        Some(Commands::Hash) => cmd_hash(cli.input.as_deref(), json_mode),
        Some(Commands::Plan) | None => {
            // No subcommand - plan by default
            let out_dir = config.resolve_out_dir(cli.out_dir)?;
            cmd_plan(cli.input.as_deref(), &out_dir)
        }
    }
}
