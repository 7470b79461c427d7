pub mod config;
pub mod search;
pub mod sources;

use crate::cli::Cli;
use diecast_core::{build_registry, render, AdapterRegistry, DiecastConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown source '{0}'. Run 'diecast sources' to list registered sources")]
    UnknownSource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] diecast_core::ConfigError),

    #[error("Search failed: {0}")]
    Search(#[from] diecast_core::SearchError),

    #[error("Source setup failed: {0}")]
    Adapter(#[from] diecast_core::AdapterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Resolve the configuration from `--config`, `$DIECAST_CONFIG` or the default location.
pub fn load_config(cli: &Cli) -> Result<DiecastConfig> {
    Ok(DiecastConfig::load(cli.config.as_deref())?)
}

/// Build the registry of enabled sources for `config`.
pub fn create_registry(config: &DiecastConfig) -> Result<AdapterRegistry> {
    let renderer = render::build_renderer(&config.render)?;
    Ok(build_registry(config, renderer)?)
}
