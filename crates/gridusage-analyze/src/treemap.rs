//! Hierarchical size rollup over the path namespace.
//!
//! Built in two passes:
//! 1. Every record is bucketed under its path minus the file name and its
//!    containing directory (the truncated directory).
//! 2. Every bucket is appended to each of its ancestors, from the top-level
//!    directory down to the bucket itself, so a node holds everything below
//!    it and the ancestor chain of every bucket is complete.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gridusage_core::{FileRecord, ReportConfig, dirname, segments};

use crate::aggregate::sum_size;
use crate::error::TreeError;

/// One treemap node, as consumed by a treemap renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Path of this node.
    pub path: String,
    /// Path of the parent node, `None` for the treemap root.
    pub parent: Option<String>,
    /// Total size of the records at or below this node.
    pub aggregate_size: u64,
    /// Number of records at or below this node.
    pub file_count: u64,
    /// `aggregate_size` relative to the root, in `[0, 1]`.
    pub color_weight: f64,
}

/// Weighted path tree over one record list.
#[derive(Debug, Clone)]
pub struct Treemap<'a> {
    root: String,
    total_size: u64,
    nodes: BTreeMap<String, Vec<&'a FileRecord>>,
    unplaced: Vec<&'a FileRecord>,
}

impl<'a> Treemap<'a> {
    /// Path of the treemap root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Aggregate size of the root.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Records accumulated at a node.
    pub fn members(&self, path: &str) -> Option<&[&'a FileRecord]> {
        self.nodes.get(path).map(Vec::as_slice)
    }

    /// Aggregate size of a node.
    pub fn aggregate_size(&self, path: &str) -> Option<u64> {
        self.members(path).map(sum_size)
    }

    /// Every node path, including those outside the root, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of nodes, including those outside the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Records too shallow to be truncated.
    pub fn unplaced(&self) -> &[&'a FileRecord] {
        &self.unplaced
    }

    /// Check whether `path` is the root or lies below it.
    pub fn is_under_root(&self, path: &str) -> bool {
        is_under(path, &self.root)
    }

    /// The root and all nodes below it, in path order.
    ///
    /// Nodes outside the root are not emitted; they can still be queried
    /// through [`Treemap::paths`] and [`Treemap::aggregate_size`].
    pub fn nodes(&self) -> Vec<TreeNode> {
        self.nodes
            .iter()
            .filter(|(path, _)| self.is_under_root(path))
            .map(|(path, members)| {
                let aggregate_size = sum_size(members);
                TreeNode {
                    path: path.clone(),
                    parent: (*path != self.root).then(|| dirname(path).to_string()),
                    aggregate_size,
                    file_count: members.len() as u64,
                    color_weight: if self.total_size == 0 {
                        0.0
                    } else {
                        aggregate_size as f64 / self.total_size as f64
                    },
                }
            })
            .collect()
    }
}

/// Builds a [`Treemap`] weighted against a fixed root path.
#[derive(Debug, Clone)]
pub struct TreeAggregator {
    root: String,
}

impl Default for TreeAggregator {
    fn default() -> Self {
        Self::with_config(&ReportConfig::default())
    }
}

impl TreeAggregator {
    /// Create an aggregator for the given root path.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Create an aggregator for the configured treemap root.
    pub fn with_config(config: &ReportConfig) -> Self {
        Self::new(config.treemap_root.as_str())
    }

    /// Build the tree.
    ///
    /// Fails when no record lies under the root, since the root size is the
    /// reference for every color weight.
    pub fn build<'a>(&self, records: &'a [FileRecord]) -> Result<Treemap<'a>, TreeError> {
        let root = self.normalized_root()?;

        let mut buckets: BTreeMap<String, Vec<&'a FileRecord>> = BTreeMap::new();
        let mut unplaced = Vec::new();

        for record in records {
            match truncated_dir(&record.path) {
                Some(dir) => buckets.entry(dir).or_default().push(record),
                None => {
                    debug!(path = %record.path, "path too shallow for treemap");
                    unplaced.push(record);
                }
            }
        }

        let mut nodes: BTreeMap<String, Vec<&'a FileRecord>> = BTreeMap::new();

        for (dir, members) in &buckets {
            for ancestor in ancestors(dir) {
                nodes.entry(ancestor).or_default().extend(members.iter().copied());
            }
        }

        let total_size = nodes
            .get(&root)
            .map(|members| sum_size(members))
            .ok_or_else(|| TreeError::MissingRoot { root: root.clone() })?;

        info!(
            root = %root,
            nodes = nodes.len(),
            buckets = buckets.len(),
            unplaced = unplaced.len(),
            total_size,
            "built treemap"
        );

        Ok(Treemap {
            root,
            total_size,
            nodes,
            unplaced,
        })
    }

    fn normalized_root(&self) -> Result<String, TreeError> {
        let trimmed = self.root.trim_end_matches('/');
        if !self.root.starts_with('/') || trimmed.is_empty() {
            return Err(TreeError::InvalidRoot {
                root: self.root.clone(),
            });
        }
        Ok(format!("/{}", segments(trimmed).join("/")))
    }
}

/// Directory of `path` without its innermost segment.
///
/// `None` when the path has fewer than three segments.
pub fn truncated_dir(path: &str) -> Option<String> {
    let tokens: Vec<&str> = segments(path).collect();
    if tokens.len() < 3 {
        return None;
    }
    Some(format!("/{}", tokens[..tokens.len() - 2].join("/")))
}

/// `/a`, `/a/b`, ... down to `dir` itself.
fn ancestors(dir: &str) -> Vec<String> {
    let mut path = String::new();
    segments(dir)
        .map(|segment| {
            path.push('/');
            path.push_str(segment);
            path.clone()
        })
        .collect()
}

fn is_under(path: &str, root: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
