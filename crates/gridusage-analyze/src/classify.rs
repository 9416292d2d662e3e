//! Decoding of period, pass, run number and user out of storage paths.
//!
//! Directory segments are scanned in order against a fixed list of rules.
//! Each rule that matches a segment writes its field, so when several
//! segments match the same rule the last one wins.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use gridusage_core::{PathGrammar, dirname, segments};

/// Outcome of classifying one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassifyStatus {
    /// All required fields were found.
    Success,
    /// Neither a run number nor a user could be determined.
    Undetermined,
    /// No period outside of user land.
    FailNoPeriod,
    /// Neither an ESD nor an AOD pass for non-raw official data.
    FailNoPass,
}

impl ClassifyStatus {
    /// Check if the path was classified.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Legacy numeric code: 0 on success, negative on failure.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Undetermined | Self::FailNoPeriod => -1,
            Self::FailNoPass => -2,
        }
    }
}

/// Fields decoded from a path.
///
/// Failed classifications still carry whatever was decoded so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Campaign period, e.g. `LHC15o`.
    pub period: CompactString,
    /// ESD processing pass, e.g. `pass1` or `cpass1`.
    pub pass: CompactString,
    /// AOD pass, e.g. `AOD175`.
    pub aod_pass: CompactString,
    /// Run number.
    pub run_number: Option<u32>,
    /// Owner of a user land path.
    pub user: CompactString,
    /// Outcome.
    pub status: ClassifyStatus,
}

impl Classification {
    fn undetermined() -> Self {
        Self {
            period: CompactString::default(),
            pass: CompactString::default(),
            aod_pass: CompactString::default(),
            run_number: None,
            user: CompactString::default(),
            status: ClassifyStatus::Undetermined,
        }
    }

    /// Check if the path was classified.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Run number rendered the legacy way, `-1` when unknown.
    pub fn run_label(&self) -> String {
        self.run_number
            .map_or_else(|| "-1".to_string(), |run| run.to_string())
    }
}

/// A field a segment rule writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Period,
    EsdMarker,
    PassName,
    AodPass,
    PaddedRun,
    BareRun,
}

/// Rules in the order they are applied to every segment.
const RULES: [Rule; 6] = [
    Rule::Period,
    Rule::EsdMarker,
    Rule::PassName,
    Rule::AodPass,
    Rule::PaddedRun,
    Rule::BareRun,
];

/// Classifies paths according to a [`PathGrammar`].
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    grammar: PathGrammar,
}

impl PathClassifier {
    /// Create a classifier with the default grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with a custom grammar.
    pub fn with_grammar(grammar: PathGrammar) -> Self {
        Self { grammar }
    }

    /// Grammar in use.
    pub fn grammar(&self) -> &PathGrammar {
        &self.grammar
    }

    /// Check whether the path lies in user land.
    pub fn is_user_land(&self, path: &str) -> bool {
        path.contains(self.grammar.user_root.as_str())
    }

    /// Decode the directory of `path`.
    pub fn classify(&self, path: &str) -> Classification {
        let dir = dirname(path);
        let parts: Vec<&str> = segments(dir).collect();
        let mut result = Classification::undetermined();

        for (i, segment) in parts.iter().enumerate() {
            for rule in RULES {
                self.apply(rule, segment, parts.get(i + 1).copied(), &mut result);
            }
        }

        if dir.starts_with(self.grammar.user_root.as_str()) {
            if let Some(user) = parts.get(4) {
                result.user = (*user).into();
            }
            result.status = ClassifyStatus::Success;
            return result;
        }

        // Both checks may fail; the period check runs last and takes precedence.
        if result.pass.is_empty()
            && result.aod_pass.is_empty()
            && !path.contains(self.grammar.data_root.as_str())
            && !path.contains(self.grammar.raw_marker.as_str())
        {
            result.status = ClassifyStatus::FailNoPass;
        }

        if result.period.is_empty() && !self.is_user_land(path) {
            result.status = ClassifyStatus::FailNoPeriod;
        }

        if !result.is_success() {
            debug!(
                path,
                status = %result.status,
                period = %result.period,
                pass = %result.pass,
                aod_pass = %result.aod_pass,
                run = %result.run_label(),
                user = %result.user,
                "could not classify path"
            );
        }

        result
    }

    fn apply(&self, rule: Rule, segment: &str, next: Option<&str>, result: &mut Classification) {
        let grammar = &self.grammar;
        match rule {
            Rule::Period => {
                if segment.starts_with(grammar.period_prefix.as_str()) {
                    result.period = segment.into();
                }
            }
            Rule::EsdMarker => {
                if segment.starts_with(grammar.esd_marker.as_str()) {
                    if let Some(next) = next {
                        result.pass = next.into();
                    }
                }
            }
            Rule::PassName => {
                if grammar
                    .pass_prefixes
                    .iter()
                    .any(|prefix| segment.starts_with(prefix.as_str()))
                {
                    result.pass = segment.into();
                }
            }
            Rule::AodPass => {
                if segment.starts_with(grammar.aod_prefix.as_str()) {
                    result.aod_pass = segment.into();
                }
            }
            Rule::PaddedRun => {
                if let Some(run) = padded_run_number(segment) {
                    result.run_number = Some(run);
                    result.status = ClassifyStatus::Success;
                }
            }
            Rule::BareRun => {
                if let Some(run) = bare_run_number(segment) {
                    result.run_number = Some(run);
                    result.status = ClassifyStatus::Success;
                }
            }
        }
    }
}

/// `000` followed by six digits, e.g. `000246751`.
fn padded_run_number(segment: &str) -> Option<u32> {
    let digits = segment.strip_prefix("000")?;
    if segment.len() != 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Six digits with a positive value, e.g. `246751`.
fn bare_run_number(segment: &str) -> Option<u32> {
    if segment.len() != 6 || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok().filter(|&run| run > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_number_patterns() {
        assert_eq!(padded_run_number("000246751"), Some(246751));
        assert_eq!(padded_run_number("00024675"), None);
        assert_eq!(padded_run_number("000a46751"), None);
        assert_eq!(bare_run_number("246751"), Some(246751));
        assert_eq!(bare_run_number("000000"), None);
        assert_eq!(bare_run_number("24675x"), None);
        assert_eq!(bare_run_number("2015"), None);
    }

    #[test]
    fn test_classify_esd_path() {
        let result = PathClassifier::new()
            .classify("/alice/data/2015/LHC15o/000246751/ESDs/pass1/AliESDs.root");
        assert_eq!(result.period, "LHC15o");
        assert_eq!(result.run_number, Some(246751));
        assert_eq!(result.pass, "pass1");
        assert!(result.aod_pass.is_empty());
        assert_eq!(result.status, ClassifyStatus::Success);
    }

    #[test]
    fn test_classify_user_land() {
        let result = PathClassifier::new().classify("/alice/cern.ch/user/j/jdoe/analysis/output.root");
        assert_eq!(result.user, "jdoe");
        assert!(result.period.is_empty());
        assert_eq!(result.status, ClassifyStatus::Success);
    }

    #[test]
    fn test_classify_no_period() {
        let result = PathClassifier::new().classify("/some/random/path/file.root");
        assert_eq!(result.status, ClassifyStatus::FailNoPeriod);
        assert_eq!(result.status.code(), -1);
    }

    #[test]
    fn test_classify_no_pass() {
        let result = PathClassifier::new().classify("/alice/sim/2015/LHC15k1/246751/file.root");
        assert_eq!(result.period, "LHC15k1");
        assert_eq!(result.run_number, Some(246751));
        assert_eq!(result.status, ClassifyStatus::FailNoPass);
        assert_eq!(result.status.code(), -2);
    }

    #[test]
    fn test_classify_no_period_wins_over_no_pass() {
        let result = PathClassifier::new().classify("/alice/sim/246751/file.root");
        assert_eq!(result.run_number, Some(246751));
        assert_eq!(result.status, ClassifyStatus::FailNoPeriod);
    }

    #[test]
    fn test_classify_without_run_is_undetermined() {
        let result = PathClassifier::new().classify("/alice/data/2015/LHC15o/ESDs/pass1/f.root");
        assert_eq!(result.period, "LHC15o");
        assert_eq!(result.pass, "pass1");
        assert_eq!(result.status, ClassifyStatus::Undetermined);
        assert_eq!(result.run_label(), "-1");
    }

    #[test]
    fn test_classify_last_match_wins() {
        let result = PathClassifier::new()
            .classify("/alice/data/2015/LHC15n/LHC15o/000246751/246752/ESDs/pass1/cpass2/f.root");
        assert_eq!(result.period, "LHC15o");
        assert_eq!(result.run_number, Some(246752));
        assert_eq!(result.pass, "cpass2");
    }

    #[test]
    fn test_classify_esd_marker_then_pass_name() {
        let result = PathClassifier::new()
            .classify("/alice/data/2015/LHC15o/000246751/cpass1/ESDs/pass2/f.root");
        assert_eq!(result.pass, "pass2");
    }

    #[test]
    fn test_classify_trailing_esd_marker() {
        let result = PathClassifier::new().classify("/alice/data/LHC15o/000246751/ESDs/AliESDs.root");
        assert!(result.pass.is_empty());
        assert!(result.is_success());
    }

    #[test]
    fn test_classify_aod_sim() {
        let result = PathClassifier::new().classify("/alice/sim/2015/LHC15k1a1/244918/AOD175/0001/AliAOD.root");
        assert_eq!(result.period, "LHC15k1a1");
        assert_eq!(result.aod_pass, "AOD175");
        assert!(result.pass.is_empty());
        assert_eq!(result.run_number, Some(244918));
        assert!(result.is_success());
    }

    #[test]
    fn test_classify_raw_needs_no_pass() {
        let result = PathClassifier::new().classify("/other/2015/LHC15o/000246751/raw/15000246751019.100.root");
        assert_eq!(result.status, ClassifyStatus::Success);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ClassifyStatus::FailNoPeriod.to_string(), "FAIL_NO_PERIOD");
        assert_eq!(ClassifyStatus::Success.to_string(), "SUCCESS");
    }
}
