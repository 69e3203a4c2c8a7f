//! Configuration model for Symquery

use serde::{Deserialize, Serialize};

use super::symbol::{ExclusionSet, SymbolKind};

/// Symquery configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SymqueryConfig {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub lsp: LspConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Context query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Symbol kinds never reported by the symbol query
    #[serde(default = "defaults::excluded_kinds")]
    pub excluded_kinds: Vec<SymbolKind>,

    /// Lines returned by the window query (<= 0 means whole buffer)
    #[serde(default = "defaults::window_lines")]
    pub window_lines: i64,

    /// Traversal stops once an outline nests deeper than this
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            excluded_kinds: defaults::excluded_kinds(),
            window_lines: defaults::window_lines(),
            max_depth: defaults::max_depth(),
        }
    }
}

impl QueryConfig {
    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::new(self.excluded_kinds.iter().copied())
    }
}

/// Language server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspConfig {
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Server command lines, e.g. `"rust-analyzer"` or `"pyright-langserver --stdio"`
    #[serde(default = "defaults::servers")]
    pub servers: Vec<String>,
}

impl Default for LspConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::timeout_secs(),
            retry_attempts: defaults::retry_attempts(),
            servers: defaults::servers(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: defaults::format(),
        }
    }
}

mod defaults {
    use super::SymbolKind;

    // Query
    pub fn excluded_kinds() -> Vec<SymbolKind> {
        SymbolKind::default_excluded()
    }
    pub fn window_lines() -> i64 {
        20
    }
    pub fn max_depth() -> usize {
        512
    }

    // LSP
    pub fn timeout_secs() -> u64 {
        30
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn servers() -> Vec<String> {
        vec!["rust-analyzer".to_string()]
    }

    // Output
    pub fn format() -> String {
        "json".to_string()
    }
}
