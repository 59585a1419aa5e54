//! Per-user config file: the database connection string and the name of the
//! logged-in user.
//!
//! Lives at `~/.gatorconfig.json` unless `GATOR_CONFIG` names another path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = ".gatorconfig.json";
const CONFIG_PATH_ENV: &str = "GATOR_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db_url: String,
    #[serde(default)]
    pub current_user_name: String,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// Path from `GATOR_CONFIG`, or the file in the home directory.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path()?)
    }

    /// Read the config at `path`. A missing file yields an empty config that
    /// will be created on the first write.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Config>(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };
        config.path = path;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `name` as the current user and rewrite the file.
    pub fn set_user(&mut self, name: &str) -> Result<()> {
        self.current_user_name = name.to_string();
        self.write()
    }

    fn write(&self) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}
