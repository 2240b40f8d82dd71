use std::path::PathBuf;

/// Source paths treated as third-party libraries by default.
pub const DEFAULT_LIBRARY_PREFIXES: &[&str] = &[
    "@openzeppelin/",
    "node_modules/",
    "lib/openzeppelin-contracts/",
    "lib/solmate/",
    "lib/solady/",
];

/// Run-time configuration for an inspection.
///
/// Note: This is *not* the rule set. Rule tables are static per standard;
/// this only tells the pipeline how to reach the compiler and how to
/// classify declarations it finds.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// `solc` binary to invoke for `.sol` inputs.
    pub solc: PathBuf,

    /// Extra arguments passed to `solc` before the source path (remappings, base path).
    pub solc_args: Vec<String>,

    /// Modifiers declared under these source prefixes are not user-defined.
    pub library_prefixes: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            solc: PathBuf::from("solc"),
            solc_args: Vec::new(),
            library_prefixes: DEFAULT_LIBRARY_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl CheckConfig {
    /// Whether a source unit path belongs to a known library.
    pub fn is_library_path(&self, path: &str) -> bool {
        let path = path.trim_start_matches("./");
        self.library_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()) || path.contains(&format!("/{prefix}")))
    }
}
