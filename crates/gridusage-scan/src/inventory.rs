//! Flat record list merged from every host listing.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use gridusage_core::{FileRecord, IngestWarning};

use crate::listing::Listing;

/// Every record of a report run, in host order then line order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// All decoded records.
    pub records: Vec<FileRecord>,
    /// Hosts whose listing was read.
    pub hosts: Vec<CompactString>,
    /// Problems met while reading listings.
    pub warnings: Vec<IngestWarning>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge listings, ordering them by host name.
    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut listings: Vec<Listing> = listings.into_iter().collect();
        listings.sort_by(|a, b| a.host.cmp(&b.host));

        let mut inventory = Self::new();
        for listing in listings {
            inventory.push_listing(listing);
        }
        inventory
    }

    /// Append one host listing.
    pub fn push_listing(&mut self, listing: Listing) {
        if !self.hosts.contains(&listing.host) {
            self.hosts.push(listing.host);
        }
        self.records.extend(listing.records);
        self.warnings.extend(listing.warnings);
    }

    /// Record a warning that is not tied to a decoded listing.
    pub fn push_warning(&mut self, warning: IngestWarning) {
        self.warnings.push(warning);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no record was ingested.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total size of all records.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// Check if any listing produced warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
