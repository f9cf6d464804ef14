//! Configuration for molcure-core
//!
//! A configuration file declares shared input and canonicalization settings
//! plus any number of `[[run]]` tables executed in order by batch mode.
//!
//! ```toml
//! [input]
//! header_sentinel = "SMILES"
//!
//! [canonical]
//! keep_largest_fragment = true
//!
//! [output]
//! directory = "curated"
//!
//! [[run]]
//! name = "zinc-novel"
//! target = "data/zinc.txt"
//! references = ["data/coconut.txt", "data/chembl.txt"]
//! output = "zinc_novel.txt"
//! summary = "zinc_novel_summary.txt"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::{CurationRequest, PipelineSettings};
use crate::record::DEFAULT_HEADER_SENTINEL;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Input parsing settings
    #[serde(default)]
    pub input: InputConfig,
    /// Canonical form settings
    #[serde(default)]
    pub canonical: CanonicalConfig,
    /// Output location settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Declared runs, executed in order
    #[serde(default, rename = "run")]
    pub runs: Vec<CurationRequest>,
}

/// Input parsing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Lines containing this token are skipped as headers
    pub header_sentinel: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            header_sentinel: DEFAULT_HEADER_SENTINEL.to_string(),
        }
    }
}

/// Canonical form configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalConfig {
    /// Reduce multi-fragment structures to their largest fragment
    pub keep_largest_fragment: bool,
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            keep_largest_fragment: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that relative output and summary paths resolve against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl CurationConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read, parse, and validate a configuration file.
    ///
    /// Files ending in `.json` are read as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            Self::from_toml(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        config.validate()?;
        tracing::debug!(
            "Loaded {} run(s) from {}",
            config.runs.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            header_sentinel: self.input.header_sentinel.clone(),
        }
    }

    #[cfg(feature = "smiles")]
    pub fn canonicalizer(&self) -> crate::canonical::SmilesCanonicalizer {
        crate::canonical::SmilesCanonicalizer::new()
            .with_largest_fragment(self.canonical.keep_largest_fragment)
    }

    /// Runs with paths resolved.
    ///
    /// Relative targets and references resolve against `base_dir` (normally
    /// the directory holding the configuration file). Relative outputs and
    /// summaries resolve against `[output] directory`, itself relative to
    /// `base_dir`.
    pub fn requests(&self, base_dir: &Path) -> Vec<CurationRequest> {
        let output_dir = match &self.output.directory {
            Some(directory) => resolve(base_dir, directory),
            None => base_dir.to_path_buf(),
        };

        self.runs
            .iter()
            .map(|run| CurationRequest {
                name: run.name.clone(),
                target: resolve(base_dir, &run.target),
                references: run.references.iter().map(|r| resolve(base_dir, r)).collect(),
                output: resolve(&output_dir, &run.output),
                summary: run.summary.as_deref().map(|s| resolve(&output_dir, s)),
            })
            .collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.header_sentinel.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "header_sentinel must not be empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for request in self.requests(Path::new("")) {
            request.validate()?;
            if !names.insert(request.name.clone()) {
                return Err(ConfigError::DuplicateRun(request.name));
            }
        }

        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not acceptable
    InvalidValue(String),
    /// Two runs share a name
    DuplicateRun(String),
    /// Configuration file could not be read
    Io(String),
    /// Configuration file could not be parsed
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            ConfigError::DuplicateRun(name) => write!(f, "Duplicate run name: {}", name),
            ConfigError::Io(msg) => write!(f, "Cannot read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Cannot parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
