//! File records decoded from remote storage listings.

use std::fmt;

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Timestamp format used in materialized group listings.
const LISTING_TIME_FORMAT: &str = "%a, %d.%m.%Y %H:%M:%S";

/// One file reported by a storage node.
///
/// Records are created once during ingestion and never mutated; grouping and
/// tree building only hold references to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Logical path with the mount prefix removed.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in seconds since the epoch.
    pub mod_time: i64,
    /// Storage node that reported the file (may be empty).
    pub host: CompactString,
}

impl FileRecord {
    /// Create a record from already decoded fields.
    pub fn new(
        path: impl Into<String>,
        size: u64,
        mod_time: i64,
        host: impl Into<CompactString>,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            mod_time,
            host: host.into(),
        }
    }

    /// Decode a `size mtime path` listing line.
    ///
    /// The prefix is removed by position: the first `prefix.len()` bytes of
    /// the path are dropped whether or not they spell out the prefix, so
    /// listings from hosts with different mount points can share one prefix
    /// length. Tokens after the path are ignored.
    pub fn parse_line(line: &str, prefix: &str, host: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();

        let (Some(ssize), Some(stime), Some(spath)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::TooFewTokens {
                line: line.to_string(),
            });
        };

        let size = ssize.parse::<u64>().map_err(|source| ParseError::InvalidSize {
            line: line.to_string(),
            source,
        })?;

        let mod_time = stime.parse::<i64>().map_err(|source| ParseError::InvalidTime {
            line: line.to_string(),
            source,
        })?;

        let path = spath
            .get(prefix.len()..)
            .ok_or_else(|| ParseError::PathShorterThanPrefix {
                line: line.to_string(),
                prefix: prefix.to_string(),
            })?;

        Ok(Self::new(path, size, mod_time, host))
    }

    /// Final path component.
    pub fn basename(&self) -> &str {
        basename(&self.path)
    }

    /// Everything before the final path component.
    pub fn dirname(&self) -> &str {
        dirname(&self.path)
    }

    /// Check whether the path starts with `prefix`.
    pub fn begins_with(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }

    /// Format the modification time in the local timezone.
    pub fn formatted_time(&self) -> String {
        match DateTime::from_timestamp(self.mod_time, 0) {
            Some(utc) => utc
                .with_timezone(&Local)
                .format(LISTING_TIME_FORMAT)
                .to_string(),
            None => self.mod_time.to_string(),
        }
    }
}

/// Renders the record as a listing line: `<time> <size> <path> <host>`.
impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.formatted_time(),
            self.size,
            self.path,
            self.host
        )
    }
}

/// Final component of a slash-separated path.
pub fn basename(path: &str) -> &str {
    path.rfind('/').map_or(path, |i| &path[i + 1..])
}

/// A slash-separated path without its final component.
///
/// A path without any slash is returned unchanged.
pub fn dirname(path: &str) -> &str {
    path.rfind('/').map_or(path, |i| &path[..i])
}

/// Non-empty segments of a slash-separated path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
