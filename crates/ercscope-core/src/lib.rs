use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::CheckConfig;
use crate::error::{ConfigurationError, InspectError};
use crate::report::model::{AnalysisInfo, ContractInfo, Report, ToolInfo};
use crate::rules::catalog::Standard;
use crate::solc::frontend::{FrontEnd, frontend_for};

pub mod config;
pub mod error;
pub mod ir;
pub mod report;
pub mod rules;
pub mod solc;
pub mod util;

pub const TOOL_NAME: &str = "ercscope";

/// JSON schema version of ercscope reports.
/// Bump only when the report shape changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

pub const RULE_CATALOG_VERSION: &str = "0.1.0";

/// What to check.
#[derive(Debug, Clone)]
pub struct InspectRequest {
    /// `.sol` source, or precompiled `.json` compiler output.
    pub source: PathBuf,
    pub contract: String,
    /// Standard name, e.g. `erc20` or `ERC-721`.
    pub standard: String,
}

/// Runs the full pipeline with the front-end chosen from the source path.
pub fn inspect(
    request: &InspectRequest,
    config: &CheckConfig,
    tool: ToolInfo,
) -> Result<Report, InspectError> {
    let front_end = frontend_for(&request.source, config);
    inspect_with(front_end.as_ref(), request, config, tool)
}

/// Runs the full pipeline against an explicit front-end.
///
/// The standard and contract name are validated before the front-end is
/// touched, so a bad invocation never starts a compiler.
pub fn inspect_with(
    front_end: &dyn FrontEnd,
    request: &InspectRequest,
    config: &CheckConfig,
    tool: ToolInfo,
) -> Result<Report, InspectError> {
    let standard: Standard = request.standard.parse()?;
    if request.contract.trim().is_empty() {
        return Err(ConfigurationError::EmptyContractName.into());
    }
    info!(standard = %standard, contract = %request.contract, "inspecting");

    let source = solc::read::read_source(&request.source)?;
    let compiled = front_end.compile(&source)?;
    info!(units = compiled.units.len(), "compilation finished");

    let contract_ir = ir::adapt::adapt(&compiled, &request.contract, &source.path, config)?;
    debug!(warnings = contract_ir.warnings.len(), "contract adapted");

    let categories = rules::eval::run(standard.ruleset(), &contract_ir);
    let verdict = rules::classify::classify(&categories);
    info!(level = %verdict.level, violated = verdict.violated_rule_ids.len(), "verdict");

    Ok(Report::new(
        tool,
        source.to_info(),
        ContractInfo {
            name: contract_ir.name.clone(),
            standard: standard.name().to_string(),
            ruleset_version: RULE_CATALOG_VERSION.to_string(),
        },
        AnalysisInfo::with_warnings(contract_ir.warnings),
        categories,
        verdict,
    ))
}
