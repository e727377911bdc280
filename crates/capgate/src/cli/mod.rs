//! CLI command implementations.

pub mod check;
pub mod config;
pub mod serve;

use std::path::Path;

use anyhow::Context;
use capgate_core::Config;

/// Load the configuration for a command.
///
/// An explicit path must load cleanly. A broken file at the default location
/// only produces a warning and falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `capgate config path`."
            );
            Ok(Config::default())
        }
    }
}
