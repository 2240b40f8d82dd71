use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalised view of one contract, ready for rule evaluation.
///
/// Built once by `ir::adapt` and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ContractIr {
    pub name: String,
    /// `contract`, `interface` or `library`.
    pub kind: String,
    pub source_path: String,
    /// Sorted by identity.
    pub functions: Vec<FunctionDescriptor>,
    /// Sorted by identity.
    pub events: Vec<EventDescriptor>,
    /// Sorted by name.
    pub modifiers: Vec<ModifierDescriptor>,
    pub facts: BTreeMap<FunctionKey, StatementFacts>,
    /// Deterministic, sorted adapter notes.
    pub warnings: Vec<String>,
}

impl ContractIr {
    pub fn modifier(&self, name: &str) -> Option<&ModifierDescriptor> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    pub fn facts_for(&self, function: &FunctionDescriptor) -> Option<&StatementFacts> {
        self.facts.get(&function.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    External,
    Public,
    Internal,
    Private,
}

impl Visibility {
    pub fn is_externally_callable(self) -> bool {
        matches!(self, Visibility::External | Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::External => "external",
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl Mutability {
    pub fn mutates_state(self) -> bool {
        matches!(self, Mutability::Nonpayable | Mutability::Payable)
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mutability::Pure => "pure",
            Mutability::View => "view",
            Mutability::Nonpayable => "nonpayable",
            Mutability::Payable => "payable",
        };
        f.write_str(s)
    }
}

/// Function identity: name plus canonical parameter types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionKey {
    pub name: String,
    pub params: Vec<String>,
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Informational only; never compared by the matcher.
    pub name: String,
    /// Canonical ABI-style type.
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Vec<String>,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub modifiers: BTreeSet<String>,
    /// Contract that declares this member.
    pub declared_in: String,
}

impl FunctionDescriptor {
    pub fn param_types(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.ty.as_str())
    }

    pub fn key(&self) -> FunctionKey {
        FunctionKey {
            name: self.name.clone(),
            params: self.param_types().map(str::to_string).collect(),
        }
    }

    /// `name(types) returns (types)`.
    pub fn signature(&self) -> String {
        let key = self.key().to_string();
        if self.returns.is_empty() {
            key
        } else {
            format!("{key} returns ({})", self.returns.join(","))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    pub ty: String,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: String,
    pub params: Vec<EventParam>,
}

impl EventDescriptor {
    pub fn param_types(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.ty.as_str())
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.indexed {
                    format!("{} indexed", p.ty)
                } else {
                    p.ty.clone()
                }
            })
            .collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierDescriptor {
    pub name: String,
    /// False when declared in a recognised library source.
    pub user_defined: bool,
    pub declared_in: String,
}

/// A condition and whether it controls a state write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardFact {
    /// State variables and called function/member names read by the condition.
    pub reads: BTreeSet<String>,
    pub gates_state_write: bool,
}

/// An `emit` found in a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    /// `None` when the event declaration could not be resolved.
    pub types: Option<Vec<String>>,
}

/// Simplified control/data-flow facts of one function body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFacts {
    pub guards: Vec<GuardFact>,
    pub emitted_events: Vec<EmittedEvent>,
    pub internal_calls: BTreeSet<FunctionKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> FunctionDescriptor {
        FunctionDescriptor {
            name: "transfer".into(),
            params: vec![
                Parameter { name: "to".into(), ty: "address".into() },
                Parameter { name: "value".into(), ty: "uint256".into() },
            ],
            returns: vec!["bool".into()],
            visibility: Visibility::External,
            mutability: Mutability::Nonpayable,
            modifiers: BTreeSet::new(),
            declared_in: "Token".into(),
        }
    }

    #[test]
    fn key_ignores_parameter_names() {
        let mut renamed = transfer();
        renamed.params[0].name = "recipient".into();
        assert_eq!(transfer().key(), renamed.key());
        assert_eq!(transfer().key().to_string(), "transfer(address,uint256)");
    }

    #[test]
    fn signature_includes_returns() {
        assert_eq!(transfer().signature(), "transfer(address,uint256) returns (bool)");
    }

    #[test]
    fn event_signature_marks_indexed() {
        let e = EventDescriptor {
            name: "Transfer".into(),
            params: vec![
                EventParam { ty: "address".into(), indexed: true },
                EventParam { ty: "uint256".into(), indexed: false },
            ],
        };
        assert_eq!(e.signature(), "Transfer(address indexed,uint256)");
    }

    #[test]
    fn visibility_and_mutability_helpers() {
        assert!(Visibility::Public.is_externally_callable());
        assert!(!Visibility::Internal.is_externally_callable());
        assert!(Mutability::Payable.mutates_state());
        assert!(!Mutability::View.mutates_state());
    }
}
