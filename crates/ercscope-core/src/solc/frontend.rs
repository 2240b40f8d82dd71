use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::config::CheckConfig;
use crate::error::AdapterError;
use crate::solc::ast::SourceUnit;
use crate::solc::read::SourceContext;

/// All source units produced by one compilation, ordered by source path.
#[derive(Debug, Clone, Default)]
pub struct CompiledUnits {
    pub units: Vec<SourceUnit>,
}

/// Compilation boundary.
///
/// Implementations are one-shot and blocking: either a complete set of
/// source units comes back, or the run ends with an `AdapterError`.
pub trait FrontEnd {
    fn compile(&self, source: &SourceContext) -> Result<CompiledUnits, AdapterError>;
}

/// Invokes `solc --combined-json ast` on the source path.
#[derive(Debug, Clone)]
pub struct SolcFrontEnd {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SolcFrontEnd {
    pub fn from_config(config: &CheckConfig) -> Self {
        Self {
            program: config.solc.clone(),
            args: config.solc_args.clone(),
        }
    }
}

impl FrontEnd for SolcFrontEnd {
    fn compile(&self, source: &SourceContext) -> Result<CompiledUnits, AdapterError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--combined-json")
            .arg("ast")
            .arg(&source.path);
        debug!(?command, "running solc");

        let output = command
            .output()
            .map_err(|source| AdapterError::CompilerUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AdapterError::Compilation {
                messages: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_compiler_output(&output.stdout)
    }
}

/// Treats the input file as compiler output that was produced earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstJsonFrontEnd;

impl FrontEnd for AstJsonFrontEnd {
    fn compile(&self, source: &SourceContext) -> Result<CompiledUnits, AdapterError> {
        parse_compiler_output(&source.bytes)
    }
}

/// Picks the front-end for an input path: `.json` is precompiled output,
/// anything else goes through `solc`.
pub fn frontend_for(path: &Path, config: &CheckConfig) -> Box<dyn FrontEnd> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(AstJsonFrontEnd)
    } else {
        Box::new(SolcFrontEnd::from_config(config))
    }
}

#[derive(Debug, Deserialize)]
struct CompilerOutput {
    #[serde(default)]
    sources: BTreeMap<String, CompiledSource>,
    #[serde(default)]
    errors: Vec<CompilerMessage>,
}

#[derive(Debug, Deserialize)]
struct CompiledSource {
    /// `AST` in combined-json output, `ast` in standard-json output.
    #[serde(rename = "AST", alias = "ast")]
    ast: Option<SourceUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerMessage {
    #[serde(default)]
    severity: String,
    #[serde(default)]
    message: String,
    formatted_message: Option<String>,
}

/// Parses combined-json or standard-json compiler output into source units.
pub fn parse_compiler_output(bytes: &[u8]) -> Result<CompiledUnits, AdapterError> {
    let output: CompilerOutput = serde_json::from_slice(bytes)?;

    let errors: Vec<String> = output
        .errors
        .iter()
        .filter(|m| m.severity.eq_ignore_ascii_case("error"))
        .map(|m| {
            m.formatted_message
                .clone()
                .unwrap_or_else(|| m.message.clone())
        })
        .collect();
    if !errors.is_empty() {
        return Err(AdapterError::Compilation {
            messages: errors.join("\n"),
        });
    }

    let units: Vec<SourceUnit> = output
        .sources
        .into_iter()
        .filter_map(|(path, source)| {
            source.ast.map(|mut unit| {
                if unit.absolute_path.is_empty() {
                    unit.absolute_path = path;
                }
                unit
            })
        })
        .collect();

    if units.is_empty() {
        return Err(AdapterError::NoCompiledRepresentation);
    }

    debug!(units = units.len(), "parsed compiler output");
    Ok(CompiledUnits { units })
}
