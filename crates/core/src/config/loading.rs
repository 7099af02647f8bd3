//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::EvalConfig;

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl EvalConfig {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// A missing file is not an error; defaults and the environment still
    /// apply. Environment variables are prefixed with `TRECEVAL_` and use
    /// double underscores for nested values. For example:
    /// - `TRECEVAL_EVALUATION__DOCUMENT_CUTOFF=100`
    /// - `TRECEVAL_RELEVANCE__QRELS__KIND=binary`
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_sources(Some(path))
    }

    /// Merges defaults, the optional file and the environment without validating
    pub fn from_sources(path: Option<&Path>) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(builder, "evaluation.judged_only", false)?;
        let builder = set_config_default(
            builder,
            "evaluation.average_over_all_topics",
            default_average_over_all_topics(),
        )?;
        let builder = set_config_default(builder, "evaluation.metrics", default_metrics())?;
        let builder = set_config_default(builder, "output.format", "trec")?;
        let mut builder = set_config_default(builder, "output.per_topic", false)?;

        if let Some(path) = path.filter(|p| p.exists()) {
            debug!(path = %path.display(), "reading configuration file");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Parses configuration from a TOML string, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Serializes the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))
    }

    /// Loads and validates configuration
    ///
    /// Without a path only defaults and environment variables are used.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Self::from_sources(config_path)?;
        config.validate()?;
        Ok(config)
    }
}
