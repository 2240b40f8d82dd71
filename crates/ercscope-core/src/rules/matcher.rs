//! Signature matching.
//!
//! Names compare case-sensitively; parameter types compare element-wise with
//! exact arity. Parameter names are never looked at. Return types,
//! visibility, mutability and event indexing are compared only when the
//! template constrains them.

use crate::ir::model::{EventDescriptor, FunctionDescriptor};
use crate::rules::catalog::{EventTemplate, FunctionTemplate};

fn same_params<'a>(declared: impl Iterator<Item = &'a str>, required: &[&str]) -> bool {
    declared.eq(required.iter().copied())
}

fn returns_match(template: &FunctionTemplate, f: &FunctionDescriptor) -> bool {
    template
        .returns
        .is_none_or(|r| f.returns.iter().map(String::as_str).eq(r.iter().copied()))
}

fn visibility_matches(template: &FunctionTemplate, f: &FunctionDescriptor) -> bool {
    !template.callable_externally || f.visibility.is_externally_callable()
}

fn mutability_matches(template: &FunctionTemplate, f: &FunctionDescriptor) -> bool {
    template.mutability.is_none_or(|m| f.mutability == m)
}

/// The declared function satisfying `template`, if any.
pub fn find_function<'a>(
    template: &FunctionTemplate,
    candidates: &'a [FunctionDescriptor],
) -> Option<&'a FunctionDescriptor> {
    candidates.iter().find(|f| {
        f.name == template.name
            && same_params(f.param_types(), template.params)
            && returns_match(template, f)
            && visibility_matches(template, f)
            && mutability_matches(template, f)
    })
}

/// Why no candidate satisfies `template`, naming the nearest declaration.
pub fn explain_function_miss(
    template: &FunctionTemplate,
    candidates: &[FunctionDescriptor],
) -> String {
    let same_name: Vec<&FunctionDescriptor> = candidates
        .iter()
        .filter(|f| f.name == template.name)
        .collect();

    let Some(first) = same_name.first() else {
        return "not found".to_string();
    };

    let Some(f) = same_name
        .iter()
        .find(|f| same_params(f.param_types(), template.params))
    else {
        return format!("found `{}` with different parameter types", first.key());
    };

    if !visibility_matches(template, f) {
        return format!("`{}` is {}, not externally callable", f.key(), f.visibility);
    }
    if !returns_match(template, f) {
        let expected = template.returns.unwrap_or_default().join(",");
        return format!(
            "`{}` returns ({}) instead of ({expected})",
            f.key(),
            f.returns.join(",")
        );
    }
    if let Some(m) = template.mutability {
        if f.mutability != m {
            return format!("`{}` is {}, expected {m}", f.key(), f.mutability);
        }
    }
    "not found".to_string()
}

/// The declared event satisfying `template`, if any.
pub fn find_event<'a>(
    template: &EventTemplate,
    candidates: &'a [EventDescriptor],
) -> Option<&'a EventDescriptor> {
    candidates.iter().find(|e| {
        e.name == template.name
            && same_params(e.param_types(), template.params)
            && indexed_matches(template, e)
    })
}

fn indexed_matches(template: &EventTemplate, e: &EventDescriptor) -> bool {
    template
        .indexed
        .is_none_or(|flags| e.params.iter().map(|p| p.indexed).eq(flags.iter().copied()))
}

pub fn explain_event_miss(template: &EventTemplate, candidates: &[EventDescriptor]) -> String {
    let same_name: Vec<&EventDescriptor> = candidates
        .iter()
        .filter(|e| e.name == template.name)
        .collect();

    let Some(first) = same_name.first() else {
        return "not found".to_string();
    };

    match same_name
        .iter()
        .find(|e| same_params(e.param_types(), template.params))
    {
        Some(e) => format!("`{}` differs in indexed parameters", e.signature()),
        None => format!("found `{}` with different parameter types", first.signature()),
    }
}
