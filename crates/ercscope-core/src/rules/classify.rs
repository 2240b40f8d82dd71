//! Verdict derivation.
//!
//! Folds the checklist into a single conformance verdict and a CI exit code.
//!
//! The policy is deliberately small:
//!
//!   - Any VIOLATED rule in a gating category → NON_CONFORMANT (exit 1)
//!   - Otherwise                              → CONFORMANT     (exit 0)
//!
//! NOT_APPLICABLE never fails a run on its own; the rule that made it
//! inapplicable has already been reported as violated. Violations in
//! advisory categories are listed but do not affect the level.

use crate::report::model::{ConformanceLevel, VerdictInfo};
use crate::rules::catalog::RuleId;
use crate::rules::eval::{CategoryResult, Outcome};

pub const POLICY: &str = "gating-categories";

/// Derives the verdict for a completed checklist.
///
/// Rule ids are listed in checklist order, which is the rule set's
/// declaration order.
pub fn classify(categories: &[CategoryResult]) -> VerdictInfo {
    let violated_in = |gating: bool| -> Vec<RuleId> {
        categories
            .iter()
            .filter(|c| c.gating == gating)
            .flat_map(|c| c.results.iter())
            .filter(|r| r.outcome == Outcome::Violated)
            .map(|r| r.rule_id.clone())
            .collect()
    };

    let violated_rule_ids = violated_in(true);
    let advisory_rule_ids = violated_in(false);

    let (level, reason) = if violated_rule_ids.is_empty() {
        (
            ConformanceLevel::Conformant,
            "every gating rule is satisfied or not applicable".to_string(),
        )
    } else {
        (
            ConformanceLevel::NonConformant,
            format!("{} gating rule(s) violated", violated_rule_ids.len()),
        )
    };

    VerdictInfo {
        exit_code: level.exit_code(),
        level,
        policy: POLICY.to_string(),
        reason,
        violated_rule_ids,
        advisory_rule_ids,
    }
}
