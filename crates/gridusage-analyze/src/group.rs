//! Grouping of file records under overlapping category keys.
//!
//! Every record joins several groups at once: its file type, its server, its
//! broad data type and, when its path can be classified, its user, run,
//! period, passes and dataset. Groups hold references into the caller's
//! record list; building them never mutates or copies a record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{debug, info, warn};

use gridusage_core::{FailurePolicy, FileRecord, RawYearPrefix, ReportConfig};

use crate::classify::{Classification, PathClassifier};
use crate::error::GroupingError;
use crate::filetype::file_type;

/// Category part of a group key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum GroupCategory {
    /// Canonical file type.
    FileType,
    /// Storage node.
    Server,
    /// Official data, simulation or user land.
    DataType,
    /// Owner of user land files.
    User,
    /// Run number.
    Run,
    /// Campaign period; its keys carry no category prefix.
    Period,
    /// Period and ESD pass.
    EsdPass,
    /// Period, ESD pass and AOD pass.
    Aod,
    /// Finest grained dataset: period, passes and run.
    Ds,
}

impl GroupCategory {
    /// Build the key for `value` in this category.
    pub fn key(self, value: &str) -> String {
        match self {
            Self::Period => value.to_string(),
            _ => format!("{}:{value}", self.as_ref()),
        }
    }

    /// Split a group key into category and value.
    ///
    /// Keys without a known `CATEGORY:` prefix are period keys.
    pub fn of_key(key: &str) -> (Self, &str) {
        key.split_once(':')
            .and_then(|(category, value)| {
                category
                    .parse::<Self>()
                    .ok()
                    .filter(|c| *c != Self::Period)
                    .map(|c| (c, value))
            })
            .unwrap_or((Self::Period, key))
    }
}

/// Mapping from group key to member records, in key order.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex<'a> {
    groups: BTreeMap<String, Vec<&'a FileRecord>>,
    unclassified: Vec<&'a FileRecord>,
}

impl<'a> GroupIndex<'a> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` to the group `key`, creating the group if needed.
    pub fn add_to_group(&mut self, key: impl Into<String>, record: &'a FileRecord) {
        self.groups.entry(key.into()).or_default().push(record);
    }

    /// Members of a group, in insertion order.
    pub fn get(&self, key: &str) -> Option<&[&'a FileRecord]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Check if a group exists.
    pub fn contains(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Iterate over groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a FileRecord])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Group keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Groups of one category as `(value, members)`, in key order.
    pub fn in_category(
        &self,
        category: GroupCategory,
    ) -> impl Iterator<Item = (&str, &[&'a FileRecord])> {
        self.iter().filter_map(move |(key, members)| {
            let (c, value) = GroupCategory::of_key(key);
            (c == category).then_some((value, members))
        })
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no group was created.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records kept out of the fine grained groups.
    pub fn unclassified(&self) -> &[&'a FileRecord] {
        &self.unclassified
    }
}

/// Assigns records to every group they belong to.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    classifier: PathClassifier,
    raw_year_prefixes: Vec<RawYearPrefix>,
    failure_policy: FailurePolicy,
}

impl Default for GroupBuilder {
    fn default() -> Self {
        Self::with_config(&ReportConfig::default())
    }
}

impl GroupBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a report configuration.
    pub fn with_config(config: &ReportConfig) -> Self {
        Self {
            classifier: PathClassifier::with_grammar(config.grammar.clone()),
            raw_year_prefixes: config.raw_year_prefixes.clone(),
            failure_policy: config.failure_policy,
        }
    }

    /// Override the policy for unclassifiable records.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Classifier used for fine grained groups.
    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    /// Build a fresh index over `records`.
    ///
    /// With [`FailurePolicy::Abort`] the first record that cannot be
    /// classified stops the pass with an error.
    pub fn build_groups<'a>(
        &self,
        records: &'a [FileRecord],
    ) -> Result<GroupIndex<'a>, GroupingError> {
        let mut index = GroupIndex::new();

        for record in records {
            self.add_record(&mut index, record)?;
        }

        info!(
            records = records.len(),
            groups = index.len(),
            unclassified = index.unclassified.len(),
            "built groups"
        );

        Ok(index)
    }

    /// Add one record to all of its groups.
    pub fn add_record<'a>(
        &self,
        index: &mut GroupIndex<'a>,
        record: &'a FileRecord,
    ) -> Result<(), GroupingError> {
        let grammar = self.classifier.grammar();

        index.add_to_group(
            GroupCategory::FileType.key(&file_type(&record.path, &self.raw_year_prefixes)),
            record,
        );
        index.add_to_group(GroupCategory::Server.key(&record.host), record);

        if record.begins_with(&grammar.data_root) {
            index.add_to_group(GroupCategory::DataType.key("DATA"), record);
        }
        if record.begins_with(&grammar.sim_root) {
            index.add_to_group(GroupCategory::DataType.key("SIM"), record);
        }
        if record.begins_with(&grammar.user_root) {
            index.add_to_group(GroupCategory::DataType.key("USER"), record);
        }

        let classification = self.classifier.classify(&record.path);

        if !classification.is_success() {
            match self.failure_policy {
                FailurePolicy::ExcludeFineGroups => {
                    debug!(path = %record.path, status = %classification.status, "excluded from fine groups");
                    index.unclassified.push(record);
                    return Ok(());
                }
                FailurePolicy::Abort => {
                    warn!(path = %record.path, status = %classification.status, "aborting grouping");
                    return Err(GroupingError::ClassificationFailed {
                        path: record.path.clone(),
                        classification: Box::new(classification),
                    });
                }
            }
        }

        for key in fine_group_keys(&classification) {
            index.add_to_group(key, record);
        }

        Ok(())
    }
}

/// Keys of the user, run, period, pass and dataset groups.
pub fn fine_group_keys(c: &Classification) -> Vec<String> {
    let mut keys = Vec::new();

    if !c.user.is_empty() {
        keys.push(GroupCategory::User.key(&c.user));
    }

    if let Some(run) = c.run_number.filter(|&run| run > 0) {
        keys.push(GroupCategory::Run.key(&run.to_string()));
    }

    if c.period.is_empty() {
        return keys;
    }

    keys.push(GroupCategory::Period.key(&c.period));

    let run = c.run_label();
    if !c.pass.is_empty() {
        keys.push(GroupCategory::EsdPass.key(&format!("{}_{}", c.period, c.pass)));
        if !c.aod_pass.is_empty() {
            keys.push(GroupCategory::Aod.key(&format!("{}_{}_{}", c.period, c.pass, c.aod_pass)));
            keys.push(GroupCategory::Ds.key(&format!(
                "{}_{}_{}_{run}",
                c.period, c.pass, c.aod_pass
            )));
        }
    } else if !c.aod_pass.is_empty() {
        keys.push(GroupCategory::Aod.key(&format!("{}_{}", c.period, c.aod_pass)));
        keys.push(GroupCategory::Ds.key(&format!("{}_{}_{run}", c.period, c.aod_pass)));
    }

    keys
}
