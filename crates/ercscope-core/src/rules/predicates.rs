use std::collections::BTreeSet;

use crate::error::RuleError;
use crate::ir::model::{ContractIr, FunctionKey};
use crate::rules::catalog::{EventTemplate, FunctionTemplate, Predicate};
use crate::rules::eval::Outcome;
use crate::rules::matcher::find_function;

/// Outcome of one predicate before it is attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl Evaluation {
    fn satisfied() -> Self {
        Self {
            outcome: Outcome::Satisfied,
            detail: None,
        }
    }

    fn violated(detail: String) -> Self {
        Self {
            outcome: Outcome::Violated,
            detail: Some(detail),
        }
    }

    /// Skipped because `function` is absent; its own rule reports that.
    fn not_applicable(function: &FunctionTemplate) -> Self {
        Self {
            outcome: Outcome::NotApplicable,
            detail: Some(format!("skipped: `{}` not found", function.name)),
        }
    }
}

pub fn evaluate(predicate: &Predicate, ir: &ContractIr) -> Result<Evaluation, RuleError> {
    match predicate {
        Predicate::NoCustomModifiers { functions } => Ok(no_custom_modifiers(functions, ir)),
        Predicate::EmitsEvent { function, event } => emits_event(function, event, ir),
        Predicate::NoBalanceGuard { function } => no_balance_guard(function, ir),
    }
}

fn no_custom_modifiers(functions: &[FunctionTemplate], ir: &ContractIr) -> Evaluation {
    let mut offending = Vec::new();
    for template in functions {
        let Some(f) = find_function(template, &ir.functions) else {
            continue;
        };
        let custom: Vec<&str> = f
            .modifiers
            .iter()
            .filter(|m| ir.modifier(m).is_none_or(|d| d.user_defined))
            .map(String::as_str)
            .collect();
        if !custom.is_empty() {
            offending.push(format!("{} modified by {}", f.name, custom.join(", ")));
        }
    }

    if offending.is_empty() {
        Evaluation::satisfied()
    } else {
        Evaluation::violated(offending.join("; "))
    }
}

fn emits_event(
    function: &FunctionTemplate,
    event: &EventTemplate,
    ir: &ContractIr,
) -> Result<Evaluation, RuleError> {
    let Some(f) = find_function(function, &ir.functions) else {
        return Ok(Evaluation::not_applicable(function));
    };
    let key = f.key();
    if !ir.facts.contains_key(&key) {
        return Err(RuleError::MissingFacts {
            function: key.to_string(),
        });
    }

    let mut visited = BTreeSet::new();
    if reaches_emit(ir, &key, event, &mut visited) {
        Ok(Evaluation::satisfied())
    } else {
        Ok(Evaluation::violated(format!(
            "`{key}` does not emit `{}`",
            event.signature()
        )))
    }
}

/// Depth-first search through internal calls; each function is visited once.
fn reaches_emit(
    ir: &ContractIr,
    key: &FunctionKey,
    event: &EventTemplate,
    visited: &mut BTreeSet<FunctionKey>,
) -> bool {
    if !visited.insert(key.clone()) {
        return false;
    }
    let Some(facts) = ir.facts.get(key) else {
        return false;
    };

    let direct = facts.emitted_events.iter().any(|e| {
        e.name == event.name
            && e.types
                .as_ref()
                .is_none_or(|types| types.iter().map(String::as_str).eq(event.params.iter().copied()))
    });

    direct
        || facts
            .internal_calls
            .iter()
            .any(|callee| reaches_emit(ir, callee, event, visited))
}

fn is_balance_read(name: &str) -> bool {
    name.to_ascii_lowercase().contains("balance")
}

fn no_balance_guard(function: &FunctionTemplate, ir: &ContractIr) -> Result<Evaluation, RuleError> {
    let Some(f) = find_function(function, &ir.functions) else {
        return Ok(Evaluation::not_applicable(function));
    };
    let facts = ir.facts_for(f).ok_or_else(|| RuleError::MissingFacts {
        function: f.key().to_string(),
    })?;

    let offending = facts.guards.iter().find_map(|g| {
        if !g.gates_state_write {
            return None;
        }
        g.reads.iter().find(|r| is_balance_read(r))
    });

    Ok(match offending {
        Some(read) => Evaluation::violated(format!(
            "condition reading `{read}` gates a state write in `{}`",
            f.key()
        )),
        None => Evaluation::satisfied(),
    })
}
