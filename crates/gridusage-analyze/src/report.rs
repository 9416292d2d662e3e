//! One complete report run over an ingested record list.

use serde::{Deserialize, Serialize};
use tracing::warn;

use gridusage_core::{FileRecord, ReportConfig};

use crate::aggregate::{GroupSummary, report};
use crate::error::GroupingError;
use crate::group::GroupBuilder;
use crate::treemap::{TreeAggregator, TreeNode};

/// Group summaries and treemap of one run.
///
/// A treemap failure does not invalidate the group summaries; it is kept in
/// `treemap_error` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Number of records.
    pub total_files: u64,
    /// Sum of all record sizes.
    pub total_size: u64,
    /// Records left out of the fine grained groups.
    pub unclassified_files: u64,
    /// Every group, sorted by key.
    pub groups: Vec<GroupSummary>,
    /// Treemap nodes below the configured root.
    pub treemap: Vec<TreeNode>,
    /// Why the treemap could not be built.
    pub treemap_error: Option<String>,
}

impl UsageReport {
    /// Group and roll up `records` according to `config`.
    pub fn build(records: &[FileRecord], config: &ReportConfig) -> Result<Self, GroupingError> {
        let index = GroupBuilder::with_config(config).build_groups(records)?;

        let (treemap, treemap_error) = match TreeAggregator::with_config(config).build(records) {
            Ok(tree) => (tree.nodes(), None),
            Err(err) => {
                warn!(error = %err, "treemap not available");
                (Vec::new(), Some(err.to_string()))
            }
        };

        Ok(Self {
            total_files: records.len() as u64,
            total_size: records.iter().map(|r| r.size).sum(),
            unclassified_files: index.unclassified().len() as u64,
            groups: report(&index),
            treemap,
            treemap_error,
        })
    }

    /// Check whether the treemap was built.
    pub fn has_treemap(&self) -> bool {
        self.treemap_error.is_none()
    }
}
