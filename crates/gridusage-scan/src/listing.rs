//! Decoding of one host's listing text.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::warn;

use gridusage_core::{FileRecord, IngestWarning, WarningKind};

/// Records decoded from one host listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Host that produced the listing.
    pub host: CompactString,
    /// Records in line order.
    pub records: Vec<FileRecord>,
    /// Lines that were skipped.
    pub warnings: Vec<IngestWarning>,
}

impl Listing {
    /// Total size of the listed files.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    fn empty(host: &str) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    fn push_line(&mut self, number: usize, line: &str, prefix: &str) {
        if line.trim().is_empty() {
            return;
        }

        match FileRecord::parse_line(line, prefix, &self.host) {
            Ok(record) => self.records.push(record),
            Err(err) => {
                warn!(host = %self.host, line = number, error = %err, "skipping listing line");
                self.warnings
                    .push(IngestWarning::malformed_line(self.host.clone(), number, &err));
            }
        }
    }
}

/// Decode every `size mtime path` line of `text`.
///
/// Blank lines are ignored. Lines that fail to decode are logged and
/// reported as warnings; the remaining lines are still returned.
pub fn parse_listing(text: &str, prefix: &str, host: &str) -> Listing {
    let mut listing = Listing::empty(host);
    for (index, line) in text.lines().enumerate() {
        listing.push_line(index + 1, line, prefix);
    }
    listing
}

/// Decode a listing read as raw bytes.
///
/// Each line is decoded on its own, so a line that is not valid UTF-8 is
/// skipped with a warning instead of dropping the whole listing.
pub fn parse_listing_bytes(bytes: &[u8], prefix: &str, host: &str) -> Listing {
    let mut listing = Listing::empty(host);

    for (index, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(line) => listing.push_line(index + 1, line, prefix),
            Err(err) => {
                warn!(host, line = index + 1, error = %err, "skipping non UTF-8 listing line");
                listing.warnings.push(IngestWarning::new(
                    host,
                    Some(index + 1),
                    format!("Line is not valid UTF-8: {err}"),
                    WarningKind::MalformedLine,
                ));
            }
        }
    }

    listing
}
