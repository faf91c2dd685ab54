//! # Ingestor Module
//!
//! Line validation and graph ingestion for the editplan CORE.
//!
//! - Validate every line before graph mutation
//! - Reject malformed input with the verbatim line and its 1-based ordinal
//! - Deduplicate identical lines via set semantics
//! - No semantic inference or enrichment
//!
//! The line grammar:
//!
//! ```text
//! s <key>                   declare a source node
//! i <key>                   declare a sink node
//! e <lhs> <rhs>             directed edge lhs -> rhs
//! r <key> <directive>       attach a replacement directive to <key>
//! f <lhs> <rhs> <directive> frontier rule over the edge (lhs, rhs)
//! ```
//!
//! Fields are separated by runs of whitespace; a `<directive>` field takes
//! the remainder of the line. Trailing whitespace is insignificant. Empty
//! lines are rejected. Every key mentioned anywhere materializes a node on
//! first mention.

use std::io::BufRead;

use crate::directive::Directive;
use crate::frontier::FrontierRule;
use crate::graph::DepGraph;
use crate::primitives::{MAX_KEY_LENGTH, MAX_LINE_LENGTH};
use crate::types::{NodeKey, PlanError};

/// The Ingestor handles line validation and graph ingestion.
///
/// The Ingestor:
/// - Accepts the raw line stream
/// - Validates structure and directive grammar eagerly
/// - Reduces input to graph mutations, nothing else
pub struct Ingestor;

impl Ingestor {
    /// Ingest a whole line stream into `graph`.
    ///
    /// Ordinals are 1-based and count physical lines. Stops at the first
    /// invalid line; the graph may hold a prefix of the input at that
    /// point, which the caller discards.
    pub fn ingest_stream<R: BufRead>(reader: R, graph: &mut DepGraph) -> Result<(), PlanError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| PlanError::IoError(e.to_string()))?;
            Self::ingest_line(graph, index as u64 + 1, &line)?;
        }
        Ok(())
    }

    /// Validate and apply a single input line.
    ///
    /// A line is valid if:
    /// - It is non-empty after trailing-whitespace removal
    /// - It is within the line length limit
    /// - Its prefix is one of `s`, `i`, `e`, `r`, `f`
    /// - It carries exactly the fields its prefix requires
    /// - Any directive field parses under the directive grammar
    pub fn ingest_line(graph: &mut DepGraph, ordinal: u64, raw: &str) -> Result<(), PlanError> {
        let malformed = || PlanError::MalformedLine {
            ordinal,
            line: raw.to_string(),
        };

        if raw.len() > MAX_LINE_LENGTH {
            return Err(malformed());
        }
        let line = raw.trim_end();
        if line.is_empty() {
            return Err(malformed());
        }

        let (prefix, rest) = split_field(line);
        match prefix {
            "s" => {
                let key = Self::sole_key(rest, ordinal, raw)?;
                graph.mark_source(key);
            }
            "i" => {
                let key = Self::sole_key(rest, ordinal, raw)?;
                graph.mark_sink(key);
            }
            "e" => {
                let (lhs, rest) = split_field(rest);
                let lhs = Self::validate_key(lhs, ordinal, raw)?;
                let rhs = Self::sole_key(rest, ordinal, raw)?;
                graph.add_edge(lhs, rhs);
            }
            "r" => {
                let (key, remainder) = split_field(rest);
                let key = Self::validate_key(key, ordinal, raw)?;
                let directive = Self::validate_directive(remainder, ordinal, raw)?;
                graph.add_replacement(key, directive);
            }
            "f" => {
                let (lhs, rest) = split_field(rest);
                let lhs = Self::validate_key(lhs, ordinal, raw)?;
                let (rhs, remainder) = split_field(rest);
                let rhs = Self::validate_key(rhs, ordinal, raw)?;
                let directive = Self::validate_directive(remainder, ordinal, raw)?;
                graph.add_frontier_rule(FrontierRule::new(lhs, rhs, directive));
            }
            _ => {
                return Err(PlanError::UnknownPrefix {
                    ordinal,
                    line: raw.to_string(),
                });
            }
        }
        Ok(())
    }

    /// A key field that must be the last field of the line.
    fn sole_key(rest: &str, ordinal: u64, raw: &str) -> Result<NodeKey, PlanError> {
        let (key, trailing) = split_field(rest);
        if !trailing.is_empty() {
            return Err(PlanError::MalformedLine {
                ordinal,
                line: raw.to_string(),
            });
        }
        Self::validate_key(key, ordinal, raw)
    }

    /// Keys are opaque, non-empty, whitespace-free and length-limited.
    fn validate_key(field: &str, ordinal: u64, raw: &str) -> Result<NodeKey, PlanError> {
        if field.is_empty() || field.len() > MAX_KEY_LENGTH {
            return Err(PlanError::MalformedLine {
                ordinal,
                line: raw.to_string(),
            });
        }
        Ok(NodeKey::new(field))
    }

    fn validate_directive(remainder: &str, ordinal: u64, raw: &str) -> Result<Directive, PlanError> {
        Directive::parse(remainder).ok_or_else(|| PlanError::InvalidDirective {
            ordinal,
            line: raw.to_string(),
        })
    }
}

/// Split off the first whitespace-delimited field; the remainder is
/// returned with its leading whitespace stripped.
fn split_field(input: &str) -> (&str, &str) {
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

// =============================================================================
// TESTS
// =============================================================================
