//! Canonical file type labels derived from base names.

use gridusage_core::{RawYearPrefix, basename};

/// Marker of filtered muon raw data files.
const FILTER_RAWMUON: &str = "FILTER_RAWMUON";

/// Maps a path to the label of its `FILETYPE:` group.
///
/// Files whose name contains a known marker get the marker as label, raw
/// data chunks get the year label of their numeric prefix, anything else is
/// labelled by its own base name. Each check sees the label left by the
/// previous one, so a marker label is never replaced by a year label.
pub fn file_type(path: &str, raw_year_prefixes: &[RawYearPrefix]) -> String {
    let name = basename(path);

    let mut label = name;
    if name.contains(FILTER_RAWMUON) {
        label = FILTER_RAWMUON;
    }
    for entry in raw_year_prefixes {
        if label.starts_with(entry.prefix.as_str()) {
            label = entry.label.as_str();
        }
    }

    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridusage_core::ReportConfig;

    fn table() -> Vec<RawYearPrefix> {
        ReportConfig::default().raw_year_prefixes
    }

    #[test]
    fn test_plain_names() {
        assert_eq!(file_type("/a/b/AliESDs.root", &table()), "AliESDs.root");
        assert_eq!(file_type("AliAOD.root", &table()), "AliAOD.root");
    }

    #[test]
    fn test_raw_years() {
        assert_eq!(file_type("/raw/15000246751019.100.root", &table()), "RAW 2015");
        assert_eq!(file_type("/raw/10000117112006.10.root", &table()), "RAW 2010");
        assert_eq!(file_type("/raw/09000080000000.1.root", &table()), "09000080000000.1.root");
    }

    #[test]
    fn test_filter_rawmuon() {
        assert_eq!(
            file_type("/a/AliESDs_FILTER_RAWMUON_1.root", &table()),
            "FILTER_RAWMUON"
        );
        assert_eq!(
            file_type("/raw/15000246751019.100_FILTER_RAWMUON.root", &table()),
            "FILTER_RAWMUON"
        );
    }

    #[test]
    fn test_custom_table() {
        let table = vec![RawYearPrefix::new("16000", "RAW 2016")];
        assert_eq!(file_type("/raw/16000255000.root", &table), "RAW 2016");
        assert_eq!(file_type("/raw/15000246751.root", &table), "15000246751.root");
    }
}
