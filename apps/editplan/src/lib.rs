//! # editplan (application library)
//!
//! Process-facing surface of the editplan binary: CLI definitions, command
//! implementations and configuration loading. The planning logic itself
//! lives in `editplan-core`; this crate owns everything that touches the
//! process boundary (stdin/stdout, files, logging, exit codes).
//!
//! The binary in `main.rs` is a thin shell over [`cli::execute`]; keeping
//! the command implementations in a library makes them testable without
//! spawning the binary.

pub mod cli;
pub mod config;
