//! Parallel ingestion of per-host listing files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use globset::{Glob, GlobMatcher};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use gridusage_core::{IngestError, IngestWarning, ReportConfig, ScanConfig, WarningKind};

use crate::inventory::Inventory;
use crate::listing::{Listing, parse_listing_bytes};

/// A listing file found in the listing directory.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingFile {
    host: String,
    path: PathBuf,
}

/// Reads one listing file per host and merges them into an [`Inventory`].
///
/// Host files are read in parallel. A host whose listing cannot be read is
/// reported as a warning and the run continues with the others.
#[derive(Debug, Default)]
pub struct ListingScanner;

impl ListingScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Ingest every listing selected by `config`.
    pub fn scan(&self, config: &ScanConfig, report: &ReportConfig) -> Result<Inventory, IngestError> {
        let start = Instant::now();
        let matcher = compile_pattern(&config.listing_pattern)?;

        let mut inventory = Inventory::new();
        let files = self.discover(&config.listing_dir, &matcher, &mut inventory)?;

        debug!(count = files.len(), dir = %config.listing_dir.display(), "found listing files");

        let results = match config.threads {
            0 => read_all(&files, &report.prefix),
            n => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| IngestError::InvalidConfig {
                    message: e.to_string(),
                })?
                .install(|| read_all(&files, &report.prefix)),
        };

        let mut listings = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(listing) => listings.push(listing),
                Err(warning) => inventory.push_warning(warning),
            }
        }

        let merged = Inventory::from_listings(listings);
        inventory.hosts = merged.hosts;
        inventory.records = merged.records;
        inventory.warnings.extend(merged.warnings);

        info!(
            hosts = inventory.hosts.len(),
            records = inventory.len(),
            warnings = inventory.warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingested listings"
        );

        Ok(inventory)
    }

    /// List the host files in `dir` whose name matches the pattern.
    fn discover(
        &self,
        dir: &Path,
        matcher: &GlobMatcher,
        inventory: &mut Inventory,
    ) -> Result<Vec<ListingFile>, IngestError> {
        let entries = std::fs::read_dir(dir).map_err(|source| IngestError::ListingDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "cannot read directory entry");
                    inventory.push_warning(IngestWarning::unreadable("", dir, &err));
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if !matcher.is_match(&name) {
                continue;
            }

            match host_from_file_name(&name) {
                Some(host) => files.push(ListingFile {
                    host: host.to_string(),
                    path: entry.path(),
                }),
                None => {
                    warn!(file = %name, "listing file name does not start with a host name");
                    inventory.push_warning(IngestWarning::new(
                        "",
                        None,
                        format!("Listing file {name} is not valid"),
                        WarningKind::InvalidListingName,
                    ));
                }
            }
        }

        files.sort_by(|a, b| a.host.cmp(&b.host).then_with(|| a.path.cmp(&b.path)));
        Ok(files)
    }
}

/// Host name encoded in a listing file name: everything before the first dot.
pub fn host_from_file_name(name: &str) -> Option<&str> {
    name.split('.').next().filter(|host| !host.is_empty())
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, IngestError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| IngestError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn read_all(files: &[ListingFile], prefix: &str) -> Vec<Result<Listing, IngestWarning>> {
    files
        .par_iter()
        .map(|file| match std::fs::read(&file.path) {
            Ok(bytes) => Ok(parse_listing_bytes(&bytes, prefix, &file.host)),
            Err(err) => {
                warn!(host = %file.host, path = %file.path.display(), error = %err, "cannot read listing");
                Err(IngestWarning::unreadable(file.host.as_str(), &file.path, &err))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_from_file_name() {
        assert_eq!(host_from_file_name("nansaf01.subatech.in2p3.fr.txt"), Some("nansaf01"));
        assert_eq!(host_from_file_name("nansaf01"), Some("nansaf01"));
        assert_eq!(host_from_file_name(".hidden.txt"), None);
    }

    #[test]
    fn test_compile_pattern() {
        let matcher = compile_pattern("nan*.txt").unwrap();
        assert!(matcher.is_match("nansaf01.txt"));
        assert!(!matcher.is_match("other.txt"));
        assert!(compile_pattern("[").is_err());
    }
}
