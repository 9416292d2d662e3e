//! Error and warning types shared by the report pipeline.

use std::num::ParseIntError;
use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors decoding a single listing line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than the three `size mtime path` tokens.
    #[error("Expected `size mtime path`, got: {line:?}")]
    TooFewTokens { line: String },

    /// Size token is not a non-negative integer.
    #[error("Invalid size in {line:?}: {source}")]
    InvalidSize {
        line: String,
        #[source]
        source: ParseIntError,
    },

    /// Modification time token is not an integer.
    #[error("Invalid modification time in {line:?}: {source}")]
    InvalidTime {
        line: String,
        #[source]
        source: ParseIntError,
    },

    /// The path cannot lose `prefix.len()` leading bytes.
    #[error("Path in {line:?} is shorter than prefix {prefix:?}")]
    PathShorterThanPrefix { line: String, prefix: String },
}

/// Errors that stop ingestion entirely.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The listing directory itself cannot be read.
    #[error("Cannot read listing directory {path}: {source}")]
    ListingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The listing file glob does not compile.
    #[error("Invalid listing pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Kind of ingestion warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A listing line could not be decoded.
    MalformedLine,
    /// A host listing could not be read at all.
    UnreadableListing,
    /// A listing file name does not yield a host name.
    InvalidListingName,
}

/// Non-fatal problem met while ingesting listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestWarning {
    /// Host whose listing produced the warning.
    pub host: CompactString,
    /// 1-based line number, when the warning concerns a single line.
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl IngestWarning {
    /// Create a new warning.
    pub fn new(
        host: impl Into<CompactString>,
        line: Option<usize>,
        message: impl Into<String>,
        kind: WarningKind,
    ) -> Self {
        Self {
            host: host.into(),
            line,
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a line that failed to parse.
    pub fn malformed_line(host: impl Into<CompactString>, line: usize, error: &ParseError) -> Self {
        Self::new(host, Some(line), error.to_string(), WarningKind::MalformedLine)
    }

    /// Create a warning for a host listing that could not be read.
    pub fn unreadable(
        host: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        error: &std::io::Error,
    ) -> Self {
        let path = path.into();
        Self::new(
            host,
            None,
            format!("Cannot read {}: {error}", path.display()),
            WarningKind::UnreadableListing,
        )
    }
}
