//! Deterministic ordering helpers.
//!
//! The adapter sorts every member collection so that the order in which a
//! contract declares things never leaks into details or JSON output.

use crate::ir::model::{EventDescriptor, FunctionDescriptor, ModifierDescriptor};

/// Sort functions by identity `(name, parameter types)`.
pub fn sort_functions(functions: &mut [FunctionDescriptor]) {
    functions.sort_by(|a, b| a.key().cmp(&b.key()));
}

/// Sort events by `(name, parameter types)`.
pub fn sort_events(events: &mut [EventDescriptor]) {
    events.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.param_types().cmp(b.param_types()))
    });
}

/// Sort modifiers by name.
pub fn sort_modifiers(modifiers: &mut [ModifierDescriptor]) {
    modifiers.sort_by(|a, b| a.name.cmp(&b.name));
}
