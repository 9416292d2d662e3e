//! Analysis algorithms for gridusage.
//!
//! This crate turns a flat list of [`FileRecord`]s into disk usage reports:
//!
//! - **Path classification** - decode period, pass, run number and user from
//!   the storage directory grammar
//! - **Grouping** - file type, server, data type, user, run, period, pass and
//!   dataset groups, with every record in all groups it belongs to
//! - **Aggregation** - per group counts and sizes, category breakdowns
//! - **Treemap** - bottom-up size rollup over the path namespace
//!
//! # Grouping
//!
//! ```rust
//! use gridusage_analyze::{FileRecord, GroupBuilder, report};
//!
//! let records = vec![
//!     FileRecord::new("/alice/data/2015/LHC15o/000246751/ESDs/pass1/AliESDs.root", 100, 0, "nansaf01"),
//!     FileRecord::new("/alice/data/2015/LHC15o/000246751/ESDs/pass1/AliESDs.root", 200, 0, "nansaf02"),
//! ];
//!
//! let index = GroupBuilder::new().build_groups(&records).unwrap();
//! let esd = report(&index)
//!     .into_iter()
//!     .find(|s| s.key == "ESDPASS:LHC15o_pass1")
//!     .unwrap();
//!
//! assert_eq!(esd.file_count, 2);
//! assert_eq!(esd.total_size, 300);
//! ```
//!
//! # Treemap
//!
//! ```rust
//! use gridusage_analyze::{FileRecord, TreeAggregator};
//!
//! let records = vec![
//!     FileRecord::new("/a/b/c/f1", 100, 0, ""),
//!     FileRecord::new("/a/b/d/f2", 200, 0, ""),
//! ];
//!
//! let tree = TreeAggregator::new("/a").build(&records).unwrap();
//! assert_eq!(tree.aggregate_size("/a/b"), Some(300));
//! ```

pub mod aggregate;
mod classify;
mod error;
mod filetype;
mod group;
mod report;
mod treemap;

pub use aggregate::{
    GroupSummary, category_breakdown, group_listing, listing_file_name, report, server_repartition,
    sum_size,
};
pub use classify::{Classification, ClassifyStatus, PathClassifier};
pub use error::{GroupingError, TreeError};
pub use filetype::file_type;
pub use group::{GroupBuilder, GroupCategory, GroupIndex, fine_group_keys};
pub use report::UsageReport;
pub use treemap::{TreeAggregator, TreeNode, Treemap, truncated_dir};

// Re-export core types
pub use gridusage_core::{FailurePolicy, FileRecord, PathGrammar, ReportConfig};
