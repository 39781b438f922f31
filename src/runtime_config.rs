//! # Runtime Configuration Module
//!
//! Settings that change how a chainrouter application behaves at runtime,
//! loaded from the environment or from a TOML file.
//!
//! ## Environment Variables
//!
//! ### `CHAINR_ENV` / `CHAINR_PRODUCTION`
//!
//! `CHAINR_ENV=production` or `CHAINR_PRODUCTION=true` switch on production
//! mode: failed chains answer with an empty body instead of a JSON message.
//!
//! ### `CHAINR_LOG_*`
//!
//! See [`crate::logging`].
//!
//! ## Example Configuration
//!
//! ```toml
//! production = true
//!
//! [logging]
//! log_level = "warn"
//! format = "json"
//! ```
//!
//! ```rust,ignore
//! let config = RuntimeConfig::from_file("chainrouter.toml")?;
//! let dispatcher = Dispatcher::from_config(TaskQueue::new(), &config);
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::logging::LogConfig;

/// Runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Hide failure details from clients
    pub production: bool,
    pub logging: LogConfig,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let production = env::var("CHAINR_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false)
            || env::var("CHAINR_PRODUCTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false);

        Self {
            production,
            logging: LogConfig::from_env(),
        }
    }

    /// Parse configuration from TOML text
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse runtime configuration")
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
