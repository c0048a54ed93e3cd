pub mod config;
pub mod validate;

use super::args::{Cli, Command};
use sift_core::{load_config, ConfigError, SiftConfig};
use std::path::Path;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Validate(args) => validate::run(args).await,
        Command::Config(args) => config::run(args),
    }
}

/// Config file when given, built-in defaults otherwise.
pub(crate) fn resolve_config(path: Option<&Path>) -> Result<SiftConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SiftConfig::default()),
    }
}
