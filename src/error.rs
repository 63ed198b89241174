//! Fatal error taxonomy for the cross-reference engine.
//!
//! Only unrecoverable conditions live here. Rows the tag store is known to
//! carry for bookkeeping are reported as [`Payload::Malformed`](crate::payload::Payload)
//! and skipped, never raised.
//!
//! Two families of failure abort a run:
//!
//! - **decode errors**: the tag database itself is not well formed
//!   (bad line-list token, symbol key mismatch);
//! - **consistency errors**: the tag database and the highlighted source have
//!   diverged (usage missing from the text, no place to put a definition
//!   link). These usually mean the index was built from a different version
//!   of the tree.

use thiserror::Error;

use crate::models::FileId;

/// A fatal error raised while decoding tag rows or annotating a file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XrefError {
    /// A token of a compressed line list could not be parsed.
    #[error("malformed line-list token '{token}' in '{list}'")]
    MalformedLineToken { token: String, list: String },

    /// The line field of a definition payload is not a number.
    #[error("bad line number '{value}' in definition of '{symbol}'")]
    BadLineNumber { symbol: String, value: String },

    /// A decoded payload names a different symbol than the row's key.
    #[error("symbol mismatch: row key '{key}' decoded as '{decoded}'")]
    SymbolMismatch { key: String, decoded: String },

    /// The index points at a line the rendered file does not have.
    #[error("line {line} of file {file} is outside the rendered source ({available} lines)")]
    LineOutOfRange {
        file: FileId,
        line: u32,
        available: usize,
    },

    /// The index claims a usage that the line does not contain.
    #[error("usage of '{symbol}' missing from file {file} line {line}")]
    MissingUsage {
        symbol: String,
        file: FileId,
        line: u32,
    },

    /// No whole-token occurrence of a defined symbol on its declaration line.
    #[error(
        "heuristic failure: no token boundary for '{symbol}' at file {file} line {line}; check language details"
    )]
    HeuristicFailure {
        symbol: String,
        file: FileId,
        line: u32,
    },
}

impl XrefError {
    /// True for errors that mean the index and the source text disagree.
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            XrefError::LineOutOfRange { .. }
                | XrefError::MissingUsage { .. }
                | XrefError::HeuristicFailure { .. }
        )
    }
}

pub type XrefResult<T> = std::result::Result<T, XrefError>;
