//! Size and count summaries of groups.
//!
//! A record contributes its full size to every group it belongs to, so sums
//! of different groups overlap by design and are never added together.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use gridusage_core::FileRecord;

use crate::group::{GroupCategory, GroupIndex};

/// Count and total size of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group key, or group value within a category breakdown.
    pub key: String,
    /// Number of member records.
    pub file_count: u64,
    /// Sum of member sizes in bytes.
    pub total_size: u64,
}

impl GroupSummary {
    /// Summarize a member list.
    pub fn of(key: impl Into<String>, members: &[&FileRecord]) -> Self {
        Self {
            key: key.into(),
            file_count: members.len() as u64,
            total_size: sum_size(members),
        }
    }
}

/// Sum of member sizes.
pub fn sum_size(members: &[&FileRecord]) -> u64 {
    members.iter().map(|r| r.size).sum()
}

/// One summary per group, sorted by key.
pub fn report(index: &GroupIndex<'_>) -> Vec<GroupSummary> {
    index
        .iter()
        .map(|(key, members)| GroupSummary::of(key, members))
        .collect()
}

/// Summaries of one category keyed by group value, sorted by value.
pub fn category_breakdown(index: &GroupIndex<'_>, category: GroupCategory) -> Vec<GroupSummary> {
    index
        .in_category(category)
        .map(|(value, members)| GroupSummary::of(value, members))
        .collect()
}

/// Size per server, with host names cut at the first dot.
///
/// Hosts sharing a short name are merged into one entry.
pub fn server_repartition(index: &GroupIndex<'_>) -> Vec<GroupSummary> {
    let mut servers: BTreeMap<&str, GroupSummary> = BTreeMap::new();

    for (host, members) in index.in_category(GroupCategory::Server) {
        let short = host.split('.').next().unwrap_or(host);
        let entry = servers.entry(short).or_insert_with(|| GroupSummary {
            key: short.to_string(),
            file_count: 0,
            total_size: 0,
        });
        entry.file_count += members.len() as u64;
        entry.total_size += sum_size(members);
    }

    servers.into_values().collect()
}

/// Members of a group as listing text, one record per line.
pub fn group_listing(index: &GroupIndex<'_>, key: &str) -> Option<String> {
    index
        .get(key)
        .map(|members| members.iter().map(|r| format!("{r}\n")).join(""))
}

/// Name of the file a group listing is published under:
/// `<report host>.<CATEGORY>.<value>.txt`.
pub fn listing_file_name(report_host: &str, key: &str) -> String {
    let (category, value) = GroupCategory::of_key(key);
    format!("{report_host}.{category}.{value}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FileRecord> {
        vec![
            FileRecord::new("/a", 10, 0, "nansaf01.in2p3.fr"),
            FileRecord::new("/b", 20, 0, "nansaf01.cern.ch"),
            FileRecord::new("/c", 30, 0, "nansaf02.in2p3.fr"),
        ]
    }

    fn index(records: &[FileRecord]) -> GroupIndex<'_> {
        let mut index = GroupIndex::new();
        for record in records {
            index.add_to_group(GroupCategory::Server.key(&record.host), record);
            index.add_to_group("ALL", record);
        }
        index
    }

    #[test]
    fn test_sum_size() {
        let records = records();
        let members: Vec<&FileRecord> = records.iter().collect();
        assert_eq!(sum_size(&members), 60);
        assert_eq!(sum_size(&[]), 0);
    }

    #[test]
    fn test_report_sorted_by_key() {
        let records = records();
        let summaries = report(&index(&records));
        let keys: Vec<&str> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "ALL",
                "SERVER:nansaf01.cern.ch",
                "SERVER:nansaf01.in2p3.fr",
                "SERVER:nansaf02.in2p3.fr",
            ]
        );
        assert_eq!(summaries[0].file_count, 3);
        assert_eq!(summaries[0].total_size, 60);
    }

    #[test]
    fn test_server_repartition_merges_short_names() {
        let records = records();
        let servers = server_repartition(&index(&records));
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].key, "nansaf01");
        assert_eq!(servers[0].total_size, 30);
        assert_eq!(servers[0].file_count, 2);
        assert_eq!(servers[1].key, "nansaf02");
    }

    #[test]
    fn test_group_listing() {
        let records = records();
        let listing = group_listing(&index(&records), "SERVER:nansaf02.in2p3.fr").unwrap();
        assert_eq!(listing.lines().count(), 1);
        assert!(listing.ends_with(" 30 /c nansaf02.in2p3.fr\n"));
        assert!(group_listing(&index(&records), "nothing").is_none());
    }

    #[test]
    fn test_listing_file_name() {
        assert_eq!(
            listing_file_name("nanaf", "ESDPASS:LHC15o_pass1"),
            "nanaf.ESDPASS.LHC15o_pass1.txt"
        );
        assert_eq!(listing_file_name("nanaf", "LHC15o"), "nanaf.PERIOD.LHC15o.txt");
    }
}
