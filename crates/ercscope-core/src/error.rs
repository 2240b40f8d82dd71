//! Error taxonomy for the inspection pipeline.
//!
//! Configuration and adapter errors abort a run before any report exists.
//! Rule errors never escape the engine: they are folded into the report as
//! violated results (see `rules::eval`).

use std::path::PathBuf;

use thiserror::Error;

/// Invalid invocation, detected before the compiler is ever started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown standard `{name}` (supported: {supported})")]
    UnknownStandard { name: String, supported: String },

    #[error("contract name must not be empty")]
    EmptyContractName,
}

/// The front-end could not produce a contract representation to check.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compiler `{}` could not be started: {source}", program.display())]
    CompilerUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compilation failed:\n{messages}")]
    Compilation { messages: String },

    #[error("compiler output is not valid AST JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("compiler output contains no AST for any source")]
    NoCompiledRepresentation,

    #[error("contract `{name}` not found (available: {})", available.join(", "))]
    ContractNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("unexpected AST shape in `{contract}`: {detail}")]
    MalformedAst { contract: String, detail: String },
}

/// A single rule could not be evaluated against the adapted contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("no statement facts recorded for `{function}`")]
    MissingFacts { function: String },

    #[error("predicate panicked: {0}")]
    Panicked(String),
}

/// Errors that prevent an inspection from producing a report.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),
}
