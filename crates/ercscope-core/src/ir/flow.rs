//! Single-hop statement facts.
//!
//! The analysis looks at one function body at a time. Guards are conditions
//! of `if`, `require`/`assert` and loops; a guard "gates a state write" when
//! a write is reachable only past it. Calls are recorded but never followed
//! here; callers that need transitive facts walk `internal_calls` themselves.

use std::collections::{BTreeMap, BTreeSet};

use crate::ir::model::{
    EmittedEvent, EventDescriptor, FunctionKey, GuardFact, Mutability, StatementFacts,
};
use crate::solc::ast::{Block, Expression, Statement};

/// A callable member of the contract hierarchy.
#[derive(Debug, Clone)]
pub struct Callee {
    pub key: FunctionKey,
    pub mutability: Mutability,
}

/// Name resolution tables for one contract hierarchy.
///
/// Lookups go by AST id when the compiler supplied one and fall back to
/// names otherwise.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub state_vars: BTreeMap<i64, String>,
    pub state_var_names: BTreeSet<String>,
    pub functions_by_id: BTreeMap<i64, Callee>,
    pub functions_by_name: BTreeMap<String, Vec<Callee>>,
    pub events_by_id: BTreeMap<i64, EventDescriptor>,
    pub events_by_name: BTreeMap<String, EventDescriptor>,
}

impl Scope {
    fn state_var(&self, name: &str, referenced: Option<i64>) -> Option<&str> {
        match referenced {
            Some(id) => self.state_vars.get(&id).map(String::as_str),
            None => self.state_var_names.get(name).map(String::as_str),
        }
    }

    fn callees(&self, name: &str, referenced: Option<i64>) -> Vec<&Callee> {
        match referenced {
            Some(id) => self.functions_by_id.get(&id).into_iter().collect(),
            None => self
                .functions_by_name
                .get(name)
                .map(|c| c.iter().collect())
                .unwrap_or_default(),
        }
    }

    fn event(&self, name: &str, referenced: Option<i64>) -> Option<&EventDescriptor> {
        referenced
            .and_then(|id| self.events_by_id.get(&id))
            .or_else(|| self.events_by_name.get(name))
    }
}

pub fn statement_facts(body: Option<&Block>, scope: &Scope) -> StatementFacts {
    let mut facts = StatementFacts::default();
    let Some(body) = body else {
        return facts;
    };

    collect_guards(&body.statements, scope, &mut facts.guards);

    for stmt in &body.statements {
        walk_statements(stmt, &mut |s| {
            if let Statement::EmitStatement { event_call } = s {
                if let Some(event) = emitted_event(event_call, scope) {
                    facts.emitted_events.push(event);
                }
            }
        });
        walk_statement_exprs(stmt, &mut |e| {
            if let Expression::FunctionCall { expression, .. } = e {
                for callee in resolve_callees(expression, scope) {
                    facts.internal_calls.insert(callee.key.clone());
                }
            }
        });
    }

    facts
}

fn collect_guards(stmts: &[Statement], scope: &Scope, out: &mut Vec<GuardFact>) {
    for (i, stmt) in stmts.iter().enumerate() {
        let rest = &stmts[i + 1..];
        match stmt {
            Statement::IfStatement {
                condition,
                true_body,
                false_body,
            } => {
                let mut gates = statement_writes(true_body, scope)
                    || false_body
                        .as_deref()
                        .is_some_and(|s| statement_writes(s, scope));
                if terminates(true_body) {
                    gates |= rest.iter().any(|s| statement_writes(s, scope));
                }
                out.push(guard(condition, gates, scope));

                collect_guards(std::slice::from_ref(&**true_body), scope, out);
                if let Some(f) = false_body {
                    collect_guards(std::slice::from_ref(&**f), scope, out);
                }
            }
            Statement::ExpressionStatement { expression } => {
                if let Some(condition) = assertion_condition(expression) {
                    let gates = rest.iter().any(|s| statement_writes(s, scope));
                    out.push(guard(condition, gates, scope));
                }
            }
            Statement::ForStatement {
                condition, body, ..
            } => {
                if let Some(c) = condition {
                    out.push(guard(c, statement_writes(body, scope), scope));
                }
                collect_guards(std::slice::from_ref(&**body), scope, out);
            }
            Statement::WhileStatement { condition, body }
            | Statement::DoWhileStatement { condition, body } => {
                out.push(guard(condition, statement_writes(body, scope), scope));
                collect_guards(std::slice::from_ref(&**body), scope, out);
            }
            Statement::Block(b) | Statement::UncheckedBlock(b) => {
                collect_guards(&b.statements, scope, out);
            }
            _ => {}
        }
    }
}

fn guard(condition: &Expression, gates_state_write: bool, scope: &Scope) -> GuardFact {
    let mut reads = BTreeSet::new();
    walk_expr(condition, &mut |e| match e {
        Expression::Identifier {
            name,
            referenced_declaration,
        } => {
            if let Some(var) = scope.state_var(name, *referenced_declaration) {
                reads.insert(var.to_string());
            }
        }
        Expression::FunctionCall { expression, .. } => match expression.as_ref() {
            Expression::Identifier { name, .. } => {
                reads.insert(name.clone());
            }
            Expression::MemberAccess { member_name, .. } => {
                reads.insert(member_name.clone());
            }
            _ => {}
        },
        _ => {}
    });
    GuardFact {
        reads,
        gates_state_write,
    }
}

/// `require(cond, ..)` / `assert(cond)` yield their condition.
fn assertion_condition(expression: &Expression) -> Option<&Expression> {
    let Expression::FunctionCall {
        expression: callee,
        arguments,
    } = expression
    else {
        return None;
    };
    match callee.as_ref() {
        Expression::Identifier { name, .. } if name == "require" || name == "assert" => {
            arguments.first()
        }
        _ => None,
    }
}

/// Whether control never falls through the statement.
fn terminates(stmt: &Statement) -> bool {
    match stmt {
        Statement::RevertStatement { .. } | Statement::Return { .. } => true,
        Statement::ExpressionStatement { expression } => matches!(
            expression,
            Expression::FunctionCall { expression: callee, .. }
                if matches!(callee.as_ref(), Expression::Identifier { name, .. } if name == "revert")
        ),
        Statement::Block(b) | Statement::UncheckedBlock(b) => {
            b.statements.last().is_some_and(terminates)
        }
        Statement::IfStatement {
            true_body,
            false_body,
            ..
        } => terminates(true_body) && false_body.as_deref().is_some_and(terminates),
        _ => false,
    }
}

fn statement_writes(stmt: &Statement, scope: &Scope) -> bool {
    let mut writes = false;
    walk_statement_exprs(stmt, &mut |e| {
        writes |= expression_writes(e, scope);
    });
    writes
}

/// Whether this node (not its children) mutates contract state.
fn expression_writes(expr: &Expression, scope: &Scope) -> bool {
    match expr {
        Expression::Assignment { left_hand_side, .. } => is_state_rooted(left_hand_side, scope),
        Expression::UnaryOperation {
            operator,
            sub_expression,
        } => {
            matches!(operator.as_str(), "++" | "--" | "delete")
                && is_state_rooted(sub_expression, scope)
        }
        Expression::FunctionCall { expression, .. } => match expression.as_ref() {
            Expression::MemberAccess {
                member_name,
                expression: target,
                ..
            } if member_name == "push" || member_name == "pop" => is_state_rooted(target, scope),
            callee => resolve_callees(callee, scope)
                .iter()
                .any(|c| c.mutability.mutates_state()),
        },
        _ => false,
    }
}

fn is_state_rooted(expr: &Expression, scope: &Scope) -> bool {
    match expr {
        Expression::Identifier {
            name,
            referenced_declaration,
        } => scope.state_var(name, *referenced_declaration).is_some(),
        Expression::IndexAccess {
            base_expression, ..
        } => is_state_rooted(base_expression, scope),
        Expression::MemberAccess { expression, .. } => is_state_rooted(expression, scope),
        Expression::TupleExpression { components } => components
            .iter()
            .flatten()
            .any(|c| is_state_rooted(c, scope)),
        _ => false,
    }
}

/// Hierarchy functions a call expression may dispatch to.
///
/// Member calls count only through `super` and `this`; anything else is a
/// call into another contract.
fn resolve_callees<'s>(callee: &Expression, scope: &'s Scope) -> Vec<&'s Callee> {
    match callee {
        Expression::Identifier {
            name,
            referenced_declaration,
        } => scope.callees(name, *referenced_declaration),
        Expression::MemberAccess {
            member_name,
            expression,
            referenced_declaration,
        } => match expression.as_ref() {
            Expression::Identifier { name, .. } if name == "super" || name == "this" => {
                scope.callees(member_name, *referenced_declaration)
            }
            _ => Vec::new(),
        },
        Expression::FunctionCallOptions { expression } => resolve_callees(expression, scope),
        _ => Vec::new(),
    }
}

fn emitted_event(event_call: &Expression, scope: &Scope) -> Option<EmittedEvent> {
    let Expression::FunctionCall { expression, .. } = event_call else {
        return None;
    };
    let (name, referenced) = match expression.as_ref() {
        Expression::Identifier {
            name,
            referenced_declaration,
        } => (name, *referenced_declaration),
        Expression::MemberAccess {
            member_name,
            referenced_declaration,
            ..
        } => (member_name, *referenced_declaration),
        _ => return None,
    };
    let types = scope
        .event(name, referenced)
        .map(|e| e.param_types().map(str::to_string).collect());
    Some(EmittedEvent {
        name: name.clone(),
        types,
    })
}

fn walk_statements<'a>(stmt: &'a Statement, f: &mut impl FnMut(&'a Statement)) {
    f(stmt);
    match stmt {
        Statement::Block(b) | Statement::UncheckedBlock(b) => {
            for s in &b.statements {
                walk_statements(s, f);
            }
        }
        Statement::IfStatement {
            true_body,
            false_body,
            ..
        } => {
            walk_statements(true_body, f);
            if let Some(s) = false_body {
                walk_statements(s, f);
            }
        }
        Statement::ForStatement {
            initialization_expression,
            loop_expression,
            body,
            ..
        } => {
            if let Some(s) = initialization_expression {
                walk_statements(s, f);
            }
            if let Some(s) = loop_expression {
                walk_statements(s, f);
            }
            walk_statements(body, f);
        }
        Statement::WhileStatement { body, .. } | Statement::DoWhileStatement { body, .. } => {
            walk_statements(body, f);
        }
        _ => {}
    }
}

/// Visits every expression in a statement tree, skipping the event and
/// error constructors of `emit`/`revert` (their arguments are visited).
fn walk_statement_exprs<'a>(stmt: &'a Statement, f: &mut impl FnMut(&'a Expression)) {
    walk_statements(stmt, &mut |s| match s {
        Statement::ExpressionStatement { expression } => walk_expr(expression, f),
        Statement::IfStatement { condition, .. }
        | Statement::WhileStatement { condition, .. }
        | Statement::DoWhileStatement { condition, .. } => walk_expr(condition, f),
        Statement::ForStatement {
            condition: Some(c), ..
        } => walk_expr(c, f),
        Statement::VariableDeclarationStatement {
            initial_value: Some(e),
        }
        | Statement::Return { expression: Some(e) } => walk_expr(e, f),
        Statement::EmitStatement { event_call: call }
        | Statement::RevertStatement { error_call: call } => {
            if let Expression::FunctionCall { arguments, .. } = call {
                for a in arguments {
                    walk_expr(a, f);
                }
            }
        }
        _ => {}
    });
}

fn walk_expr<'a>(expr: &'a Expression, f: &mut impl FnMut(&'a Expression)) {
    f(expr);
    match expr {
        Expression::MemberAccess { expression, .. }
        | Expression::FunctionCallOptions { expression } => walk_expr(expression, f),
        Expression::IndexAccess {
            base_expression,
            index_expression,
        } => {
            walk_expr(base_expression, f);
            if let Some(i) = index_expression {
                walk_expr(i, f);
            }
        }
        Expression::FunctionCall {
            expression,
            arguments,
        } => {
            walk_expr(expression, f);
            for a in arguments {
                walk_expr(a, f);
            }
        }
        Expression::BinaryOperation {
            left_expression,
            right_expression,
        } => {
            walk_expr(left_expression, f);
            walk_expr(right_expression, f);
        }
        Expression::UnaryOperation { sub_expression, .. } => walk_expr(sub_expression, f),
        Expression::Assignment {
            left_hand_side,
            right_hand_side,
        } => {
            walk_expr(left_hand_side, f);
            walk_expr(right_hand_side, f);
        }
        Expression::Conditional {
            condition,
            true_expression,
            false_expression,
        } => {
            walk_expr(condition, f);
            walk_expr(true_expression, f);
            walk_expr(false_expression, f);
        }
        Expression::TupleExpression { components } => {
            for c in components.iter().flatten() {
                walk_expr(c, f);
            }
        }
        Expression::Identifier { .. } | Expression::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::model::EventParam;
    use crate::solc::fixtures::*;
    use serde_json::{Value, json};

    fn block(statements: Vec<Value>) -> Block {
        serde_json::from_value(json!({ "statements": statements })).unwrap()
    }

    fn scope() -> Scope {
        let mut scope = Scope::default();
        for (id, name) in [(2, "_balances"), (3, "_allowances"), (4, "paused")] {
            scope.state_vars.insert(id, name.to_string());
            scope.state_var_names.insert(name.to_string());
        }
        let callee = |name: &str, params: &[&str], mutability| Callee {
            key: FunctionKey {
                name: name.into(),
                params: params.iter().map(|p| p.to_string()).collect(),
            },
            mutability,
        };
        scope.functions_by_name.insert(
            "_approve".into(),
            vec![callee("_approve", &["address", "address", "uint256"], Mutability::Nonpayable)],
        );
        scope.functions_by_name.insert(
            "balanceOf".into(),
            vec![callee("balanceOf", &["address"], Mutability::View)],
        );
        scope.events_by_name.insert(
            "Approval".into(),
            EventDescriptor {
                name: "Approval".into(),
                params: ["address", "address", "uint256"]
                    .iter()
                    .map(|t| EventParam {
                        ty: t.to_string(),
                        indexed: false,
                    })
                    .collect(),
            },
        );
        scope
    }

    fn allowance_write() -> Value {
        stmt(assign(
            index(index(ident("_allowances"), sender()), ident("spender")),
            ident("value"),
        ))
    }

    #[test]
    fn require_on_balance_gates_following_write() {
        let body = block(vec![
            require(binop(call(ident("balanceOf"), vec![sender()]), ident("value"))),
            allowance_write(),
        ]);

        let facts = statement_facts(Some(&body), &scope());

        assert_eq!(facts.guards.len(), 1);
        assert!(facts.guards[0].gates_state_write);
        assert!(facts.guards[0].reads.contains("balanceOf"));
        assert!(facts.internal_calls.iter().any(|k| k.name == "balanceOf"));
    }

    #[test]
    fn require_after_write_does_not_gate_it() {
        let body = block(vec![
            allowance_write(),
            require(binop(index(ident("_balances"), sender()), ident("value"))),
        ]);

        let facts = statement_facts(Some(&body), &scope());

        assert_eq!(facts.guards.len(), 1);
        assert!(!facts.guards[0].gates_state_write);
        assert!(facts.guards[0].reads.contains("_balances"));
    }

    #[test]
    fn if_with_revert_gates_rest_of_block() {
        let body = block(vec![
            if_stmt(
                binop(index(ident("_balances"), sender()), ident("value")),
                vec![revert()],
            ),
            stmt(call(ident("_approve"), vec![sender(), ident("spender"), ident("value")])),
        ]);

        let facts = statement_facts(Some(&body), &scope());

        assert!(facts.guards[0].gates_state_write);
    }

    #[test]
    fn if_branch_write_is_gated() {
        let body = block(vec![if_stmt(
            call(ident("balanceOf"), vec![sender()]),
            vec![allowance_write()],
        )]);

        let facts = statement_facts(Some(&body), &scope());

        assert!(facts.guards[0].gates_state_write);
    }

    #[test]
    fn view_calls_and_locals_are_not_writes() {
        let body = block(vec![
            require(ident("paused")),
            stmt(call(ident("balanceOf"), vec![sender()])),
            stmt(assign(ident("localCounter"), ident("value"))),
        ]);

        let facts = statement_facts(Some(&body), &scope());

        assert!(!facts.guards[0].gates_state_write);
        assert!(facts.guards[0].reads.contains("paused"));
    }

    #[test]
    fn referenced_ids_take_precedence_over_names() {
        // A local shadowing a state variable name is not a state read.
        let shadow = json!({ "nodeType": "Identifier", "name": "_balances", "referencedDeclaration": 99 });
        let body = block(vec![require(shadow), allowance_write()]);

        let facts = statement_facts(Some(&body), &scope());

        assert!(facts.guards[0].reads.is_empty());
    }

    #[test]
    fn records_emits_with_resolved_types() {
        let body = block(vec![
            emit("Approval", vec![sender(), ident("spender"), ident("value")]),
            emit("Unknown", vec![]),
        ]);

        let facts = statement_facts(Some(&body), &scope());

        assert_eq!(facts.emitted_events.len(), 2);
        assert_eq!(facts.emitted_events[0].name, "Approval");
        assert_eq!(
            facts.emitted_events[0].types.as_deref(),
            Some(&["address".to_string(), "address".to_string(), "uint256".to_string()][..])
        );
        assert_eq!(facts.emitted_events[1].types, None);
    }

    #[test]
    fn nested_blocks_and_loops_are_visited() {
        let body = block(vec![json!({
            "nodeType": "UncheckedBlock",
            "statements": [{
                "nodeType": "WhileStatement",
                "condition": index(ident("_balances"), sender()),
                "body": { "nodeType": "Block", "statements": [
                    { "nodeType": "ExpressionStatement", "expression": {
                        "nodeType": "UnaryOperation", "operator": "--",
                        "subExpression": index(ident("_balances"), sender()) } },
                    emit("Approval", vec![])
                ]}
            }]
        })]);

        let facts = statement_facts(Some(&body), &scope());

        assert_eq!(facts.guards.len(), 1);
        assert!(facts.guards[0].gates_state_write);
        assert_eq!(facts.emitted_events.len(), 1);
    }

    #[test]
    fn for_loop_initialiser_is_visited() {
        let body = block(vec![json!({
            "nodeType": "ForStatement",
            "initializationExpression": stmt(call(
                ident("_approve"),
                vec![sender(), ident("spender"), ident("value")],
            )),
            "condition": index(ident("_balances"), sender()),
            "body": { "nodeType": "Block", "statements": [] }
        })]);

        let facts = statement_facts(Some(&body), &scope());

        assert!(facts.internal_calls.iter().any(|k| k.name == "_approve"));
        assert_eq!(facts.guards.len(), 1);
        assert!(!facts.guards[0].gates_state_write);
    }

    #[test]
    fn missing_body_yields_empty_facts() {
        assert_eq!(statement_facts(None, &scope()), StatementFacts::default());
    }
}
