//! Listing ingestion for gridusage.
//!
//! Storage nodes report their files as plain text listings, one file per
//! line in the order `size mtime path`. This crate turns those listings into
//! one flat list of [`FileRecord`]s:
//!
//! - **Line decoding** with positional mount prefix removal
//! - **Per-host discovery** of listing files in a directory
//! - **Parallel reading** of host listings via rayon, merged in host order
//! - **Partial results**: malformed lines and unreadable hosts become warnings
//!
//! # Example
//!
//! ```rust,no_run
//! use gridusage_scan::{ListingScanner, ReportConfig, ScanConfig};
//!
//! let scan_config = ScanConfig::new("/var/reports/listings").with_name_prefix("nansaf");
//! let inventory = ListingScanner::new()
//!     .scan(&scan_config, &ReportConfig::default())
//!     .unwrap();
//!
//! println!("{} files on {} hosts", inventory.len(), inventory.hosts.len());
//! ```

mod inventory;
mod listing;
mod scanner;

pub use inventory::Inventory;
pub use listing::{Listing, parse_listing, parse_listing_bytes};
pub use scanner::{ListingScanner, host_from_file_name};

// Re-export core types for convenience
pub use gridusage_core::{
    FileRecord, IngestError, IngestWarning, ParseError, ReportConfig, ScanConfig, WarningKind,
};
