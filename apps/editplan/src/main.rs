//! # Editplan - Deterministic Edit Planner
//!
//! The main binary for the editplan dependency-graph edit planner.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/editplan (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌───────────────┐    │
//! │   │    CLI      │        │    Config     │    │
//! │   │   (clap)    │        │    (toml)     │    │
//! │   └──────┬──────┘        └───────┬───────┘    │
//! │          │                       │            │
//! │          └───────────┬───────────┘            │
//! │                      ▼                        │
//! │             ┌─────────────────┐               │
//! │             │  editplan-core  │               │
//! │             │   (THE LOGIC)   │               │
//! │             └─────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Plan from stdin, patches into ~/scratch
//! editplan < graph.txt
//!
//! # Plan from a file into an explicit directory
//! editplan plan -f graph.txt -o patches/
//!
//! # Inspect the input without planning
//! editplan check -f graph.txt --json
//! ```
//!
//! Logs go to stderr only; stdout carries the edit stream and must stay
//! clean for downstream tooling.

use clap::Parser;
use editplan::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing — EDITPLAN_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("EDITPLAN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.quiet {
        "editplan=error"
    } else if cli.verbose {
        "editplan=debug"
    } else {
        "editplan=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
