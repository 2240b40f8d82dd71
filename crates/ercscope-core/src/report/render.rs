use crate::TOOL_NAME;
use crate::report::model::Report;
use crate::rules::eval::Outcome;

fn marker(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Satisfied => "[✓]",
        Outcome::Violated => "[x]",
        Outcome::NotApplicable => "[-]",
    }
}

/// Plain-text checklist.
///
/// One header per category and one line per rule, both in rule-set order,
/// so two runs over the same input diff cleanly.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    out.push_str(&format!(
        "Contract: {} ({})\n",
        report.contract.name, report.contract.standard
    ));
    if let Some(path) = &report.source.path {
        out.push_str(&format!("Source: {path}\n"));
    }
    for w in &report.analysis.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }

    for category in &report.categories {
        out.push('\n');
        if category.gating {
            out.push_str(&format!("== {} ==\n", category.name));
        } else {
            out.push_str(&format!("== {} == (advisory)\n", category.name));
        }
        for r in &category.results {
            match &r.detail {
                Some(detail) => out.push_str(&format!(
                    "{} {} ({})\n",
                    marker(r.outcome),
                    r.title,
                    detail
                )),
                None => out.push_str(&format!("{} {}\n", marker(r.outcome), r.title)),
            }
        }
    }

    let tally = report.tally();
    out.push('\n');
    out.push_str(&format!(
        "Result: {} ({} satisfied, {} violated, {} not applicable)\n",
        report.verdict.level, tally.satisfied, tally.violated, tally.not_applicable
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::*;
    use crate::rules::catalog::RuleId;
    use crate::rules::eval::{CategoryResult, CheckResult};

    fn result(id: &str, title: &str, outcome: Outcome, detail: Option<&str>) -> CheckResult {
        CheckResult {
            rule_id: RuleId(id.into()),
            title: title.into(),
            outcome,
            detail: detail.map(str::to_string),
        }
    }

    fn report() -> Report {
        Report::new(
            ToolInfo {
                name: TOOL_NAME.into(),
                version: "0.1.0".into(),
                commit: None,
            },
            SourceInfo {
                path: Some("src/Token.sol".into()),
                size_bytes: 10,
                hash: SourceHash {
                    algorithm: "sha256".into(),
                    value: "00".into(),
                },
            },
            ContractInfo {
                name: "Token".into(),
                standard: "ERC20".into(),
                ruleset_version: "0.1.0".into(),
            },
            AnalysisInfo::with_warnings(vec!["`Token` is an interface".into()]),
            vec![
                CategoryResult {
                    name: "ERC20 functions".into(),
                    gating: true,
                    results: vec![
                        result("A", "transfer(address,uint256) returns (bool)", Outcome::Satisfied, None),
                        result("B", "approve(address,uint256) returns (bool)", Outcome::Violated, Some("not found")),
                    ],
                },
                CategoryResult {
                    name: "ERC20 getters".into(),
                    gating: false,
                    results: vec![result("C", "name() returns (string)", Outcome::NotApplicable, None)],
                },
            ],
            VerdictInfo {
                level: ConformanceLevel::NonConformant,
                policy: "gating-categories".into(),
                reason: "1 gating rule(s) violated".into(),
                violated_rule_ids: vec![RuleId("B".into())],
                advisory_rule_ids: vec![],
                exit_code: 1,
            },
        )
    }

    #[test]
    fn renders_checklist() {
        let text = render_text(&report());
        let expected = "\
ercscope 0.1.0
Contract: Token (ERC20)
Source: src/Token.sol
warning: `Token` is an interface

== ERC20 functions ==
[✓] transfer(address,uint256) returns (bool)
[x] approve(address,uint256) returns (bool) (not found)

== ERC20 getters == (advisory)
[-] name() returns (string)

Result: NON_CONFORMANT (1 satisfied, 1 violated, 1 not applicable)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_text(&report()), render_text(&report()));
    }
}
