//! # Directive Grammar
//!
//! Parsing, validation and rendering of directive records.
//!
//! Directives are `:::`-separated records in one of three forms:
//!
//! ```text
//! r:::<file>:::<offset>:::<length>:::<precedence>:::<text>
//! include-user-header:::<file>:::-1:::-1:::<header-path>
//! include-system-header:::<file>:::-1:::-1:::<header-path>
//! ```
//!
//! The final field of a record takes the remainder, so replacement text
//! and header paths may themselves contain `:::`. Any other deviation
//! from these shapes is invalid; the Ingestor turns an invalid record
//! into a fatal error carrying the verbatim input line.
//!
//! Emission strips the precedence field from replacements:
//! `r:::<file>:::<offset>:::<length>:::<text>`. Header includes are
//! emitted unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::{DIRECTIVE_SEPARATOR, HEADER_SPAN_SENTINEL, MAX_DIRECTIVE_LENGTH};

// =============================================================================
// DIRECTIVE
// =============================================================================

/// A replacement directive: splice `text` over `length` bytes at `offset`
/// in `file`.
///
/// `length == 0` makes this an insertion; co-located insertions are merged
/// by ascending `precedence` at plan time. `text` may be empty, which with
/// `length > 0` is a pure deletion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Replacement {
    /// Target file, as given in the input.
    pub file: String,
    /// Byte offset of the splice.
    pub offset: u64,
    /// Byte length replaced; 0 for insertions.
    pub length: u64,
    /// Caller-assigned merge order for co-located insertions.
    pub precedence: i64,
    /// Replacement text; arbitrary, may be empty, never contains a newline.
    pub text: String,
}

impl Replacement {
    /// The emitted form of this replacement, precedence stripped.
    #[must_use]
    pub fn to_edit(&self) -> Edit {
        Edit::Replace {
            file: self.file.clone(),
            offset: self.offset,
            length: self.length,
            text: self.text.clone(),
        }
    }
}

/// Which include form a header directive uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeaderKind {
    /// `include-user-header`, rendered with quotes by downstream tooling.
    User,
    /// `include-system-header`, rendered with angle brackets downstream.
    System,
}

impl HeaderKind {
    /// The wire tag of this include form.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::User => "include-user-header",
            Self::System => "include-system-header",
        }
    }
}

/// A header-include directive: add an include of `header` to `file`.
///
/// Header includes carry no byte span; their offset and length fields are
/// the `-1` sentinel on the wire and they pass through the merger
/// ungrouped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HeaderInclude {
    /// User or system include form.
    pub kind: HeaderKind,
    /// Target file, as given in the input.
    pub file: String,
    /// Header path to include.
    pub header: String,
}

/// A validated directive record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Directive {
    /// A spliced replacement or insertion.
    Replace(Replacement),
    /// A header include, either form.
    Include(HeaderInclude),
}

impl Directive {
    /// Parse and validate a raw directive record.
    ///
    /// Returns `None` when the record deviates from the grammar in any
    /// way; the caller owns the line context and turns `None` into a
    /// fatal error naming the verbatim line.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() > MAX_DIRECTIVE_LENGTH || raw.contains('\n') {
            return None;
        }
        let (tag, rest) = raw.split_once(DIRECTIVE_SEPARATOR)?;
        match tag {
            "r" => parse_replacement(rest),
            "include-user-header" => parse_include(HeaderKind::User, rest),
            "include-system-header" => parse_include(HeaderKind::System, rest),
            _ => None,
        }
    }

    /// The emitted form of this directive, precedence stripped.
    #[must_use]
    pub fn to_edit(&self) -> Edit {
        match self {
            Self::Replace(r) => r.to_edit(),
            Self::Include(inc) => Edit::Include(inc.clone()),
        }
    }

    /// The file this directive targets.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Replace(r) => &r.file,
            Self::Include(inc) => &inc.file,
        }
    }
}

impl fmt::Display for Directive {
    /// Renders the input wire form, precedence included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(r) => write!(
                f,
                "r:::{}:::{}:::{}:::{}:::{}",
                r.file, r.offset, r.length, r.precedence, r.text
            ),
            Self::Include(inc) => write!(
                f,
                "{}:::{}:::-1:::-1:::{}",
                inc.kind.tag(),
                inc.file,
                inc.header
            ),
        }
    }
}

fn parse_replacement(rest: &str) -> Option<Directive> {
    let mut fields = rest.splitn(5, DIRECTIVE_SEPARATOR);
    let file = fields.next()?;
    let offset = fields.next()?;
    let length = fields.next()?;
    let precedence = fields.next()?;
    let text = fields.next()?;

    if file.is_empty() {
        return None;
    }
    let offset = parse_span_field(offset)?;
    let length = parse_span_field(length)?;
    let precedence: i64 = precedence.parse().ok()?;

    Some(Directive::Replace(Replacement {
        file: file.to_string(),
        offset,
        length,
        precedence,
        text: text.to_string(),
    }))
}

fn parse_include(kind: HeaderKind, rest: &str) -> Option<Directive> {
    let mut fields = rest.splitn(4, DIRECTIVE_SEPARATOR);
    let file = fields.next()?;
    let offset = fields.next()?;
    let length = fields.next()?;
    let header = fields.next()?;

    if file.is_empty() || header.is_empty() {
        return None;
    }
    if offset != HEADER_SPAN_SENTINEL || length != HEADER_SPAN_SENTINEL {
        return None;
    }

    Some(Directive::Include(HeaderInclude {
        kind,
        file: file.to_string(),
        header: header.to_string(),
    }))
}

/// Offset and length fields are digit-only non-negative decimals.
fn parse_span_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

// =============================================================================
// EDIT (EMITTED FORM)
// =============================================================================

/// A directive in its emitted form, with the precedence field removed.
///
/// Emitted replacement lines have exactly five `:::`-separated segments;
/// header includes render identically to their input form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Edit {
    /// `r:::<file>:::<offset>:::<length>:::<text>`
    Replace {
        /// Target file.
        file: String,
        /// Byte offset of the splice.
        offset: u64,
        /// Byte length replaced; 0 for insertions.
        length: u64,
        /// Final text, post merge.
        text: String,
    },
    /// A header include, passed through unchanged.
    Include(HeaderInclude),
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace {
                file,
                offset,
                length,
                text,
            } => write!(f, "r:::{}:::{}:::{}:::{}", file, offset, length, text),
            Self::Include(inc) => write!(
                f,
                "{}:::{}:::-1:::-1:::{}",
                inc.kind.tag(),
                inc.file,
                inc.header
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
