// User settings read from config.toml in the platform config directory

use crate::storage::STORE_FILE_NAME;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const QUALIFIER: &str = "net.roblillack";
const ORGANIZATION: &str = "Draftpad";
const APPLICATION: &str = "draftpad";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_LOG_FILTER: &str = "warn";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the key-value store file; the data directory when unset
    pub store_path: Option<PathBuf>,
    pub font_size: u8,
    /// tracing filter directive used when RUST_LOG is not set
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: None,
            font_size: 14,
            log_filter: None,
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Default store location inside the platform data directory
pub fn default_store_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(STORE_FILE_NAME))
}

impl Config {
    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the platform location, falling back to defaults on error.
    /// The error is returned alongside so it can be reported once logging is up.
    pub fn load_user_config() -> (Self, Option<ConfigError>) {
        let Some(path) = config_file_path() else {
            return (Config::default(), None);
        };
        match Config::load(&path) {
            Ok(config) => (config, None),
            Err(err) => (Config::default(), Some(err)),
        }
    }

    /// Store path from the config, or the default data location
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(default_store_path)
    }
}

/// Install the global tracing subscriber. RUST_LOG wins over the configured filter.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}
