use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::permission::Grants;

pub const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory new export files are created in
    pub export_dir: PathBuf,

    pub permissions: Grants,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("Documents"),
            permissions: Grants::default(),
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    parse(&data)
}

/// Loads `path` if given, otherwise the default file when it exists.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load(path),
        None if Path::new(DEFAULT_PATH).exists() => load(Path::new(DEFAULT_PATH)),
        None => Ok(Config::default()),
    }
}

fn parse(data: &str) -> Result<Config> {
    let config = toml::from_str(data).context("Failed to parse config")?;
    Ok(config)
}
