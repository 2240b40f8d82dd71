//! Static rule vocabulary.
//!
//! Rule sets are plain `static` data: one per supported standard, built at
//! compile time and never mutated. A rule is either structural (a required
//! function or event shape) or a named semantic predicate over the whole
//! contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::ir::model::Mutability;
use crate::rules::{erc20, erc721};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standard {
    Erc20,
    Erc721,
}

impl Standard {
    pub const ALL: [Standard; 2] = [Standard::Erc20, Standard::Erc721];

    pub fn name(self) -> &'static str {
        match self {
            Standard::Erc20 => "ERC20",
            Standard::Erc721 => "ERC721",
        }
    }

    pub fn ruleset(self) -> &'static RuleSet {
        match self {
            Standard::Erc20 => &erc20::RULESET,
            Standard::Erc721 => &erc721::RULESET,
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Standard {
    type Err = ConfigurationError;

    /// Accepts `erc20`, `ERC20`, `erc-20` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        Standard::ALL
            .into_iter()
            .find(|std| std.name() == normalized)
            .ok_or_else(|| ConfigurationError::UnknownStandard {
                name: s.to_string(),
                supported: Standard::ALL.map(Standard::name).join(", "),
            })
    }
}

/// Required function shape. Parameter names are never part of a template.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTemplate {
    pub name: &'static str,
    pub params: &'static [&'static str],
    /// `None` leaves return types unconstrained.
    pub returns: Option<&'static [&'static str]>,
    /// Requires `external` or `public`.
    pub callable_externally: bool,
    pub mutability: Option<Mutability>,
}

impl FunctionTemplate {
    pub const fn external(
        name: &'static str,
        params: &'static [&'static str],
        returns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            params,
            returns: Some(returns),
            callable_externally: true,
            mutability: None,
        }
    }

    pub const fn with_mutability(mut self, mutability: Mutability) -> Self {
        self.mutability = Some(mutability);
        self
    }

    pub fn signature(&self) -> String {
        let base = format!("{}({})", self.name, self.params.join(","));
        match self.returns {
            Some(r) if !r.is_empty() => format!("{base} returns ({})", r.join(",")),
            _ => base,
        }
    }
}

/// Required event shape.
#[derive(Debug, Clone, Copy)]
pub struct EventTemplate {
    pub name: &'static str,
    pub params: &'static [&'static str],
    /// Positional `indexed` flags; `None` leaves indexing unconstrained.
    pub indexed: Option<&'static [bool]>,
}

impl EventTemplate {
    pub const fn new(name: &'static str, params: &'static [&'static str]) -> Self {
        Self {
            name,
            params,
            indexed: None,
        }
    }

    pub const fn indexed(mut self, flags: &'static [bool]) -> Self {
        self.indexed = Some(flags);
        self
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| match self.indexed {
                Some(flags) if flags.get(i).copied().unwrap_or(false) => format!("{ty} indexed"),
                _ => ty.to_string(),
            })
            .collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// Semantic checks evaluated over the whole contract.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// No user-defined modifier is applied to any of the listed functions.
    NoCustomModifiers {
        functions: &'static [FunctionTemplate],
    },
    /// The function emits the event, directly or through internal calls.
    EmitsEvent {
        function: FunctionTemplate,
        event: EventTemplate,
    },
    /// No balance read in a condition gates a state write in the function.
    NoBalanceGuard { function: FunctionTemplate },
}

#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    Function(FunctionTemplate),
    Event(EventTemplate),
    Predicate(Predicate),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub kind: RuleKind,
}

impl Rule {
    pub const fn function(id: &'static str, template: FunctionTemplate) -> Self {
        Self {
            id,
            kind: RuleKind::Function(template),
        }
    }

    pub const fn event(id: &'static str, template: EventTemplate) -> Self {
        Self {
            id,
            kind: RuleKind::Event(template),
        }
    }

    pub const fn predicate(id: &'static str, predicate: Predicate) -> Self {
        Self {
            id,
            kind: RuleKind::Predicate(predicate),
        }
    }

    /// Checklist line text.
    pub fn title(&self) -> String {
        match &self.kind {
            RuleKind::Function(t) => t.signature(),
            RuleKind::Event(t) => t.signature(),
            RuleKind::Predicate(Predicate::NoCustomModifiers { .. }) => {
                "No custom modifiers on core functions".to_string()
            }
            RuleKind::Predicate(Predicate::EmitsEvent { function, event }) => {
                format!("{} must emit {}", function.name, event.signature())
            }
            RuleKind::Predicate(Predicate::NoBalanceGuard { function }) => {
                format!("{} does not check the caller's balance", function.name)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    /// Violations in a gating category fail the overall verdict.
    pub gating: bool,
    pub rules: &'static [Rule],
}

#[derive(Debug)]
pub struct RuleSet {
    pub standard: Standard,
    pub categories: &'static [Category],
}

impl RuleSet {
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.categories.iter().flat_map(|c| c.rules.iter())
    }
}
