use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::rules::catalog::RuleId;
use crate::rules::eval::{CategoryResult, Outcome};

/// Top-level conformance report.
///
/// This is the stable JSON contract of `--format json`. It must remain
/// deterministic for identical inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub source: SourceInfo,
    pub contract: ContractInfo,
    pub analysis: AnalysisInfo,
    /// Checklist in rule-set declaration order.
    pub categories: Vec<CategoryResult>,
    pub verdict: VerdictInfo,
}

impl Report {
    pub fn new(
        tool: ToolInfo,
        source: SourceInfo,
        contract: ContractInfo,
        analysis: AnalysisInfo,
        categories: Vec<CategoryResult>,
        verdict: VerdictInfo,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            source,
            contract,
            analysis,
            categories,
            verdict,
        }
    }

    /// Count of results per outcome, across all categories.
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for result in self.categories.iter().flat_map(|c| c.results.iter()) {
            match result.outcome {
                Outcome::Satisfied => tally.satisfied += 1,
                Outcome::Violated => tally.violated += 1,
                Outcome::NotApplicable => tally.not_applicable += 1,
            }
        }
        tally
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub satisfied: usize,
    pub violated: usize,
    pub not_applicable: usize,
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
    pub commit: Option<String>,
}

/// Input file bound to this report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    pub path: Option<String>,
    pub size_bytes: u64,
    pub hash: SourceHash,
}

/// Content fingerprint of the input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceHash {
    pub algorithm: String,
    pub value: String,
}

/// The contract that was checked and against what.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractInfo {
    pub name: String,
    pub standard: String,
    pub ruleset_version: String,
}

/// Adapter status and notes.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AnalysisInfo {
    pub status: String,
    pub warnings: Vec<String>,
}

impl AnalysisInfo {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            warnings: vec![],
        }
    }

    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            status: "ok".into(),
            warnings,
        }
    }
}

/// Overall verdict level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConformanceLevel {
    Conformant,
    NonConformant,
}

impl ConformanceLevel {
    pub fn exit_code(self) -> i32 {
        match self {
            ConformanceLevel::Conformant => 0,
            ConformanceLevel::NonConformant => 1,
        }
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConformanceLevel::Conformant => "CONFORMANT",
            ConformanceLevel::NonConformant => "NON_CONFORMANT",
        };
        f.write_str(s)
    }
}

/// Final verdict block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictInfo {
    pub level: ConformanceLevel,
    pub policy: String,
    pub reason: String,
    /// Violated rules in gating categories.
    pub violated_rule_ids: Vec<RuleId>,
    /// Violated rules in advisory categories.
    pub advisory_rule_ids: Vec<RuleId>,
    pub exit_code: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::eval::CheckResult;

    fn sample() -> Report {
        Report::new(
            ToolInfo {
                name: "ercscope".into(),
                version: "1.0.0".into(),
                commit: None,
            },
            SourceInfo {
                path: Some("Token.sol".into()),
                size_bytes: 123,
                hash: SourceHash {
                    algorithm: "sha256".into(),
                    value: "abc".into(),
                },
            },
            ContractInfo {
                name: "Token".into(),
                standard: "ERC20".into(),
                ruleset_version: "0.1.0".into(),
            },
            AnalysisInfo::ok(),
            vec![CategoryResult {
                name: "ERC20 functions".into(),
                gating: true,
                results: vec![
                    CheckResult {
                        rule_id: RuleId("ERC20-FN-01".into()),
                        title: "transfer(address,uint256) returns (bool)".into(),
                        outcome: Outcome::Satisfied,
                        detail: None,
                    },
                    CheckResult {
                        rule_id: RuleId("ERC20-FN-02".into()),
                        title: "approve(address,uint256) returns (bool)".into(),
                        outcome: Outcome::Violated,
                        detail: Some("not found".into()),
                    },
                ],
            }],
            VerdictInfo {
                level: ConformanceLevel::NonConformant,
                policy: "gating-categories".into(),
                reason: "1 gating rule(s) violated".into(),
                violated_rule_ids: vec![RuleId("ERC20-FN-02".into())],
                advisory_rule_ids: vec![],
                exit_code: 1,
            },
        )
    }

    #[test]
    fn report_carries_schema_version() {
        assert_eq!(sample().schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn json_shape_is_stable() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["verdict"]["level"], "NON_CONFORMANT");
        assert_eq!(json["verdict"]["violated_rule_ids"][0], "ERC20-FN-02");
        assert_eq!(json["categories"][0]["results"][1]["outcome"], "VIOLATED");
        assert_eq!(json["source"]["hash"]["algorithm"], "sha256");
        // Absent details are omitted rather than null.
        assert!(json["categories"][0]["results"][0].get("detail").is_none());
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = sample();
        let text = serde_json::to_string(&report).unwrap();
        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn tally_counts_outcomes() {
        assert_eq!(
            sample().tally(),
            Tally {
                satisfied: 1,
                violated: 1,
                not_applicable: 0,
            }
        );
    }

    #[test]
    fn level_display_matches_serialisation() {
        for level in [ConformanceLevel::Conformant, ConformanceLevel::NonConformant] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json.trim_matches('"'), level.to_string());
        }
    }
}
