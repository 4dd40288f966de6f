use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};
use crate::filters::normalize_patterns;

/// Tuning knobs for content scanning.
///
/// These only affect how files are scanned, never which files are
/// discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Files larger than this are not scanned
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Upper bound on snippet length, in characters (0 for unbounded)
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,

    /// Retry BOM-less files as UTF-8 and then UTF-16LE when the default
    /// encoding finds nothing
    #[serde(default)]
    pub allow_encoding_fallback: bool,
}

fn default_max_file_size_bytes() -> u64 {
    1024 * 1024
}

fn default_max_snippet_chars() -> usize {
    256
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            max_snippet_chars: default_max_snippet_chars(),
            allow_encoding_fallback: false,
        }
    }
}

/// A complete search request, as read from configuration files and the CLI.
///
/// # Configuration Locations
///
/// Files are layered in order of increasing precedence:
/// 1. Global `$HOME/.config/depthscan/config.yaml`
/// 2. Local `.depthscan.yaml` in the current directory
/// 3. A file given explicitly via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// root_path: "."
/// include_patterns: ["*.cs", "*.ps1"]
/// exclude_patterns: ["*/bin/*", "*/obj/*"]
/// text_pattern: "*TODO*"
/// options:
///   max_file_size_bytes: 1048576
///   max_snippet_chars: 256
///   allow_encoding_fallback: true
/// log_level: "warn"
/// ```
///
/// Patterns use the wildcard dialect (`*`, `?`, `[...]`, `[!...]`, with
/// backslash or backtick escapes), not regular expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory to start search from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// File-name patterns; a file must match at least one
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Full-path patterns; a file matching any of them is skipped
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Pattern each line is tested against
    #[serde(default)]
    pub text_pattern: String,

    #[serde(default)]
    pub options: SearchOptions,

    /// Log level (trace, debug, info, warn, error, off)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_include_patterns() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
            text_pattern: String::new(),
            options: SearchOptions::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line. `None` leaves the configured value
/// alone, whatever it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub root_path: Option<PathBuf>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub text_pattern: Option<String>,
    pub max_file_size_bytes: Option<u64>,
    pub max_snippet_chars: Option<usize>,
    pub allow_encoding_fallback: Option<bool>,
    pub log_level: Option<String>,
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl SearchConfig {
    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("depthscan/config.yaml")),
            Some(PathBuf::from(".depthscan.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // an explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Applies command-line values over configuration file values.
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(include_patterns) = cli.include_patterns {
            self.include_patterns = include_patterns;
        }
        if let Some(exclude_patterns) = cli.exclude_patterns {
            self.exclude_patterns = exclude_patterns;
        }
        if let Some(text_pattern) = cli.text_pattern {
            self.text_pattern = text_pattern;
        }
        if let Some(max_file_size_bytes) = cli.max_file_size_bytes {
            self.options.max_file_size_bytes = max_file_size_bytes;
        }
        if let Some(max_snippet_chars) = cli.max_snippet_chars {
            self.options.max_snippet_chars = max_snippet_chars;
        }
        if let Some(allow_encoding_fallback) = cli.allow_encoding_fallback {
            self.options.allow_encoding_fallback = allow_encoding_fallback;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Rejects requests that could never search anything, and unknown log levels
    pub fn validate(&self) -> SearchResult<()> {
        if normalize_patterns(&self.include_patterns).is_empty() {
            return Err(SearchError::empty_pattern("include patterns"));
        }
        if self.text_pattern.trim().is_empty() {
            return Err(SearchError::empty_pattern("text pattern"));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(SearchError::config_error(format!(
                "Unknown log level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}
