use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "ercscope",
    version,
    about = "Check a Solidity contract against an ERC interface standard"
)]
pub struct Args {
    /// Solidity source file, or precompiled solc JSON output (.json)
    pub source: PathBuf,

    /// Name of the contract to check
    pub contract: String,

    /// Standard to check against (erc20, erc721)
    #[arg(long, default_value = "erc20")]
    pub standard: String,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// solc binary used for .sol inputs
    #[arg(long, env = "ERCSCOPE_SOLC", default_value = "solc")]
    pub solc: PathBuf,

    /// Extra argument passed to solc (repeatable), e.g. a remapping
    #[arg(long = "solc-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub solc_args: Vec<String>,

    /// Additional source path prefix treated as library code (repeatable)
    #[arg(long = "library-prefix", value_name = "PREFIX")]
    pub library_prefixes: Vec<String>,

    /// Optional git commit hash for tool metadata
    #[arg(long)]
    pub commit: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
