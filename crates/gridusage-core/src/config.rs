//! Report and ingestion configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Maps a raw-data file name prefix to a file type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawYearPrefix {
    /// Leading characters of the raw file name (e.g. `15000`).
    pub prefix: String,
    /// Label used for the file type group (e.g. `RAW 2015`).
    pub label: String,
}

impl RawYearPrefix {
    /// Create a new table entry.
    pub fn new(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
        }
    }
}

/// What to do with a record whose path cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the record in file type, server and data type groups only.
    #[default]
    ExcludeFineGroups,
    /// Stop grouping at the first unclassifiable record.
    Abort,
}

/// Markers of the storage directory grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathGrammar {
    /// Prefix of period segments.
    pub period_prefix: String,
    /// Prefix of the segment whose successor names the pass.
    pub esd_marker: String,
    /// Prefixes of segments that are pass names themselves.
    pub pass_prefixes: Vec<String>,
    /// Prefix of AOD pass segments.
    pub aod_prefix: String,
    /// Root of per-user storage.
    pub user_root: String,
    /// Root of official reconstructed and raw data.
    pub data_root: String,
    /// Root of official simulation output.
    pub sim_root: String,
    /// Substring marking raw data directories.
    pub raw_marker: String,
}

impl Default for PathGrammar {
    fn default() -> Self {
        Self {
            period_prefix: "LHC".to_string(),
            esd_marker: "ESDs".to_string(),
            pass_prefixes: vec!["cpass".to_string(), "vpass".to_string()],
            aod_prefix: "AOD".to_string(),
            user_root: "/alice/cern.ch/user".to_string(),
            data_root: "/alice/data".to_string(),
            sim_root: "/alice/sim".to_string(),
            raw_marker: "/raw/".to_string(),
        }
    }
}

/// Configuration for one report run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ReportConfig {
    /// Mount prefix removed (by length) from every listed path.
    #[builder(default = "default_prefix()")]
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Node whose size is the 100% reference of the treemap.
    #[builder(default = "default_treemap_root()")]
    #[serde(default = "default_treemap_root")]
    pub treemap_root: String,

    /// Raw file name prefixes and their year labels, checked in order.
    #[builder(default = "default_raw_year_prefixes()")]
    #[serde(default = "default_raw_year_prefixes")]
    pub raw_year_prefixes: Vec<RawYearPrefix>,

    /// Handling of records that fail classification.
    #[builder(default)]
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Directory grammar markers.
    #[builder(default)]
    #[serde(default)]
    pub grammar: PathGrammar,
}

fn default_prefix() -> String {
    "/data".to_string()
}

fn default_treemap_root() -> String {
    "/alice".to_string()
}

fn default_raw_year_prefixes() -> Vec<RawYearPrefix> {
    (10..=15)
        .rev()
        .map(|year| RawYearPrefix::new(format!("{year}000"), format!("RAW 20{year}")))
        .collect()
}

impl ReportConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.treemap_root {
            validate_treemap_root(root)?;
        }
        Ok(())
    }
}

fn validate_treemap_root(root: &str) -> Result<(), String> {
    if !root.starts_with('/') || root.trim_matches('/').is_empty() {
        return Err(format!(
            "Treemap root must be an absolute path below /, got {root:?}"
        ));
    }
    Ok(())
}

impl ReportConfig {
    /// Create a new report config builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Check invariants of a config obtained without the builder.
    pub fn validate(&self) -> Result<(), String> {
        validate_treemap_root(&self.treemap_root)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            treemap_root: default_treemap_root(),
            raw_year_prefixes: default_raw_year_prefixes(),
            failure_policy: FailurePolicy::default(),
            grammar: PathGrammar::default(),
        }
    }
}

/// Configuration for discovering and reading host listings.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Directory holding one listing file per host.
    pub listing_dir: PathBuf,

    /// Glob selecting listing file names.
    #[builder(default = "default_listing_pattern()")]
    #[serde(default = "default_listing_pattern")]
    pub listing_pattern: String,

    /// Number of threads for reading listings (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_listing_pattern() -> String {
    "*.txt".to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref dir) = self.listing_dir {
            if dir.as_os_str().is_empty() {
                return Err("Listing directory cannot be empty".to_string());
            }
        } else {
            return Err("Listing directory is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config reading every `*.txt` listing in a directory.
    pub fn new(listing_dir: impl Into<PathBuf>) -> Self {
        Self {
            listing_dir: listing_dir.into(),
            listing_pattern: default_listing_pattern(),
            threads: 0,
        }
    }

    /// Restrict listings to file names starting with `name_prefix`.
    ///
    /// The prefix is matched literally, glob metacharacters included.
    pub fn with_name_prefix(mut self, name_prefix: &str) -> Self {
        self.listing_pattern = format!("{}*.txt", globset::escape(name_prefix));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_config_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.prefix, "/data");
        assert_eq!(config.treemap_root, "/alice");
        assert_eq!(config.raw_year_prefixes.len(), 6);
        assert_eq!(config.raw_year_prefixes[0], RawYearPrefix::new("15000", "RAW 2015"));
        assert_eq!(config.raw_year_prefixes[5], RawYearPrefix::new("10000", "RAW 2010"));
        assert_eq!(config.failure_policy, FailurePolicy::ExcludeFineGroups);
    }

    #[test]
    fn test_report_config_builder() {
        let config = ReportConfig::builder()
            .prefix("/pool")
            .treemap_root("/alice/data")
            .failure_policy(FailurePolicy::Abort)
            .build()
            .unwrap();

        assert_eq!(config.prefix, "/pool");
        assert_eq!(config.treemap_root, "/alice/data");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.grammar, PathGrammar::default());
    }

    #[test]
    fn test_report_config_rejects_bad_root() {
        assert!(ReportConfig::builder().treemap_root("/").build().is_err());
        assert!(ReportConfig::builder().treemap_root("alice").build().is_err());
    }

    #[test]
    fn test_report_config_partial_json() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"prefix": "/pool", "failure_policy": "abort"}"#).unwrap();
        assert_eq!(config.prefix, "/pool");
        assert_eq!(config.treemap_root, "/alice");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.grammar.period_prefix, "LHC");
    }

    #[test]
    fn test_scan_config() {
        let config = ScanConfig::new("/var/reports").with_name_prefix("nan");
        assert_eq!(config.listing_pattern, "nan*.txt");
        assert!(ScanConfig::builder().build().is_err());
    }

    #[test]
    fn test_scan_config_name_prefix_is_literal() {
        let config = ScanConfig::new("/var/reports").with_name_prefix("nan[*");
        assert_eq!(config.listing_pattern, "nan[[][*]*.txt");
    }
}
