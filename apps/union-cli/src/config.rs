//! Layered CLI configuration: defaults, then YAML, then `MEITUAN_UNION__*` env.

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use meituan_union::MeituanUnionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix; nested keys are separated by `__`,
/// e.g. `MEITUAN_UNION__CLIENT__APP_KEY`.
pub const ENV_PREFIX: &str = "MEITUAN_UNION__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Credentials and transport settings for the SDK client
    pub client: MeituanUnionConfig,
    pub logging: LoggingConfig,
    /// API call log; absent means calls are not logged
    pub api_log: Option<ApiLogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiLogConfig {
    /// sea-orm connection string; without one records go to the tracing log
    pub database_url: Option<String>,
    /// Table name, `meituan` when unset
    pub table: Option<String>,
    /// Delete older rows at startup
    pub prune_older_than_hours: Option<u32>,
}

impl CliConfig {
    /// Load the effective configuration.
    ///
    /// # Errors
    /// Fails when `path` is given but is not a file, or when a layer does not
    /// match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Apply command-line overrides on top of the loaded layers.
    pub fn apply_cli_overrides(&mut self, verbose: u8, json_logs: bool) {
        if let Some(level) = level_for_verbosity(verbose) {
            level.clone_into(&mut self.logging.level);
        }
        if json_logs {
            self.logging.json = true;
        }
    }

    /// YAML rendering with the secret redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}

/// `-v` info, `-vv` debug, `-vvv` and more trace.
#[must_use]
pub fn level_for_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}
