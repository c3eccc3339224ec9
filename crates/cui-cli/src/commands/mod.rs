pub mod config;
pub mod list;
pub mod run;

use cui_core::Config;
use std::path::Path;

/// Load the config from `path`, or the default location when not given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load_default()?,
    };
    Ok(config)
}
