//! TOML configuration: request defaults, exclusion filters and custom
//! category rules.
//!
//! Configuration is optional; every field has a default. The command line
//! overrides anything set here.
//!
//! # Configuration File Format
//!
//! ```toml
//! [defaults]
//! delete_originals = false
//! dry_run = false
//! min_size = 0.0
//! max_size = 0.0
//! size_unit = "Megabytes"
//! workers = 4
//!
//! [filters]
//! exclude_filenames = ["Thumbs.db", "desktop.ini"]
//! exclude_extensions = ["tmp", "partial"]
//! exclude_patterns = ["*.crdownload"]
//! exclude_regex = []
//!
//! [[categories]]
//! label = "Archives"
//! extensions = ["zip", "rar", "7z"]
//! ```
//!
//! An unrecognized `size_unit` label is treated as `"Bytes"` rather than
//! rejected; see [`crate::size::SizeUnit::from_label`].

use crate::size::SizeUnit;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Default request values supplied by the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Delete originals after a successful copy.
    pub delete_originals: bool,
    /// Simulate without touching the filesystem.
    pub dry_run: bool,
    /// Minimum size magnitude; `0` disables the bound.
    pub min_size: f64,
    /// Maximum size magnitude; `0` disables the bound.
    pub max_size: f64,
    /// Size unit label; unrecognized labels mean bytes.
    pub size_unit: String,
    /// Worker pool size; `0` selects the automatic default.
    pub workers: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            delete_originals: false,
            dry_run: false,
            min_size: 0.0,
            max_size: 0.0,
            size_unit: "Bytes".to_string(),
            workers: 0,
        }
    }
}

impl Defaults {
    /// Parses the configured unit label, leniently.
    pub fn unit(&self) -> SizeUnit {
        SizeUnit::from_label(&self.size_unit)
    }
}

/// Name-based exclusion rules, applied on top of the built-in hidden-file
/// skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Exact filenames to exclude (e.g. "Thumbs.db").
    pub exclude_filenames: Vec<String>,
    /// File extensions to exclude, matched case-insensitively.
    pub exclude_extensions: Vec<String>,
    /// Glob patterns to exclude (e.g. "*.crdownload").
    pub exclude_patterns: Vec<String>,
    /// Regex patterns to exclude, matched against the file name.
    pub exclude_regex: Vec<String>,
}

/// A user-defined classification rule, appended after the built-ins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRuleConfig {
    /// Destination category label.
    pub label: String,
    /// Extensions routed to this label.
    pub extensions: Vec<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    pub defaults: Defaults,
    pub filters: FilterRules,
    pub categories: Vec<CategoryRuleConfig>,
}

impl OrganizeConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, when given (missing file is then an error)
    /// 2. `.dirsiftrc.toml` in the current directory
    /// 3. `~/.config/dirsift/config.toml`
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".dirsiftrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsift")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the filter rules into matchers.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Precompiled exclusion matchers.
///
/// Glob and regex patterns are compiled once at load time so per-file
/// matching never reparses anything.
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude_regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: rules.exclude_filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns true when the file passes every exclusion rule.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
        {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
        {
            return false;
        }

        true
    }
}
