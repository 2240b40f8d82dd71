//! Checker engine.
//!
//! Runs every rule of a rule set against one adapted contract and produces
//! exactly one `CheckResult` per rule, grouped by category in declaration
//! order. Rules are independent: a rule that errors or panics is recorded as
//! violated and the run carries on.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RuleError;
use crate::ir::model::ContractIr;
use crate::rules::catalog::{Rule, RuleId, RuleKind, RuleSet};
use crate::rules::matcher;
use crate::rules::predicates::{self, Evaluation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Satisfied,
    Violated,
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub rule_id: RuleId,
    pub title: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub name: String,
    /// Mirrors `Category::gating` so the report is self-describing.
    pub gating: bool,
    pub results: Vec<CheckResult>,
}

/// Evaluates `ruleset` against `ir`.
///
/// Never short-circuits: every category and every rule is visited, in the
/// order the rule set declares them.
pub fn run(ruleset: &RuleSet, ir: &ContractIr) -> Vec<CategoryResult> {
    ruleset
        .categories
        .iter()
        .map(|category| CategoryResult {
            name: category.name.to_string(),
            gating: category.gating,
            results: category.rules.iter().map(|rule| check(rule, ir)).collect(),
        })
        .collect()
}

fn check(rule: &Rule, ir: &ContractIr) -> CheckResult {
    let evaluation = match &rule.kind {
        RuleKind::Function(template) => match matcher::find_function(template, &ir.functions) {
            Some(f) => Evaluation {
                outcome: Outcome::Satisfied,
                detail: Some(format!("matched `{}` in {}", f.signature(), f.declared_in)),
            },
            None => Evaluation {
                outcome: Outcome::Violated,
                detail: Some(matcher::explain_function_miss(template, &ir.functions)),
            },
        },
        RuleKind::Event(template) => match matcher::find_event(template, &ir.events) {
            Some(e) => Evaluation {
                outcome: Outcome::Satisfied,
                detail: Some(format!("matched `{}`", e.signature())),
            },
            None => Evaluation {
                outcome: Outcome::Violated,
                detail: Some(matcher::explain_event_miss(template, &ir.events)),
            },
        },
        RuleKind::Predicate(predicate) => {
            guarded(rule.id, || predicates::evaluate(predicate, ir))
        }
    };

    CheckResult {
        rule_id: RuleId(rule.id.to_string()),
        title: rule.title(),
        outcome: evaluation.outcome,
        detail: evaluation.detail,
    }
}

/// Runs a predicate, turning errors and panics into a violated evaluation.
fn guarded<F>(rule_id: &str, f: F) -> Evaluation
where
    F: FnOnce() -> Result<Evaluation, RuleError>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

    match result {
        Ok(evaluation) => evaluation,
        Err(err) => {
            warn!(rule = rule_id, error = %err, "rule could not be evaluated");
            Evaluation {
                outcome: Outcome::Violated,
                detail: Some(format!("rule could not be evaluated: {err}")),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
