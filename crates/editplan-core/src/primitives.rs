//! # Innate Primitives
//!
//! Hardcoded runtime constants for the editplan CORE.
//!
//! The planner starts with zero data but fixed grammar.
//! These primitives are compiled into the binary and are immutable at runtime.
//!
//! ## Primitives
//!
//! 1. **Separator Primitive**: The record separator of the directive grammar.
//! 2. **Sentinel Primitive**: The span sentinel carried by header includes.
//! 3. **Limit Primitives**: Hard input bounds enforced by the Ingestor.

/// The field separator of the directive record grammar.
///
/// Directive fields never escape this sequence; only the final field of a
/// record (replacement text, header path) may contain it, because that
/// field takes the remainder of the record.
pub const DIRECTIVE_SEPARATOR: &str = ":::";

/// The span sentinel carried by header-include directives.
///
/// Header includes have no byte span; their offset and length fields must
/// both be this exact literal.
pub const HEADER_SPAN_SENTINEL: &str = "-1";

/// Field count of a replacement directive record.
///
/// `r:::<file>:::<offset>:::<length>:::<precedence>:::<text>`
pub const REPLACEMENT_FIELDS: usize = 6;

/// Field count of a header-include directive record.
///
/// `include-user-header:::<file>:::-1:::-1:::<header-path>`
pub const INCLUDE_FIELDS: usize = 5;

/// Field count of an emitted replacement edit.
///
/// Emission strips the precedence field, leaving
/// `r:::<file>:::<offset>:::<length>:::<text>`.
pub const EMITTED_REPLACEMENT_FIELDS: usize = 5;

/// Current canonical snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// File name of the patch summary written next to the patch files.
pub const PATCH_SUMMARY_FILE: &str = "patches.txt";

/// Leaf directory under the user's home that receives patch output when no
/// explicit output directory is configured.
pub const DEFAULT_OUT_DIR_LEAF: &str = "scratch";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for node keys.
///
/// Keys longer than this will be rejected by the Ingestor.
/// This prevents memory exhaustion from malicious or malformed input.
pub const MAX_KEY_LENGTH: usize = 4096;

/// Maximum length for directive records.
///
/// Directives longer than this (64KB) will be rejected by the Ingestor.
/// This prevents memory exhaustion from malicious or malformed input.
pub const MAX_DIRECTIVE_LENGTH: usize = 65536;

/// Maximum length for a single input line.
///
/// Covers the worst legal case: an `f` line carrying two maximum-length
/// keys and a maximum-length directive, plus separators.
pub const MAX_LINE_LENGTH: usize = 2 * MAX_KEY_LENGTH + MAX_DIRECTIVE_LENGTH + 8;
