//! Configuration file for gql.
//!
//! Looked up at `$GQL_CONFIG`, then `<config dir>/gql/config.toml`. A missing
//! file is not an error; every section is optional and command line flags
//! override what the file sets.
//!
//! ```toml
//! endpoint = "https://api.example.com/graphql"
//!
//! [headers]
//! Authorization = "Bearer ..."
//!
//! [cache]
//! ttl_secs = 600
//! key = "hashed"
//!
//! [query]
//! max_depth_ceiling = 8
//!
//! [http]
//! timeout_secs = 30
//! ```

use crate::core::error::GqlError;
use crate::core::query::DEFAULT_MAX_DEPTH_CEILING;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "GQL_CONFIG";
const APP_DIR: &str = "gql";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub endpoint: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub http: HttpConfig,
}

/// How cache entries are named on disk.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeyPolicy {
    /// Endpoint with every non-alphanumeric character replaced by `-`.
    #[default]
    Sanitized,
    /// Hex SHA-256 of the endpoint.
    Hashed,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum age of a reusable entry. Zero disables reuse.
    pub ttl_secs: u64,
    pub dir: Option<PathBuf>,
    pub key: CacheKeyPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 600,
            dir: None,
            key: CacheKeyPolicy::Sanitized,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Configured directory, else `<user cache dir>/gql`.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join(APP_DIR)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub max_depth_ceiling: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            max_depth_ceiling: DEFAULT_MAX_DEPTH_CEILING,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<Config, GqlError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| GqlError::Config(format!("{}: {}", path.display(), e)))
}

/// Loads the config from `explicit` if given, else the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, GqlError> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(GqlError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            load_config_from(path)
        }
        None => match default_config_path() {
            Some(path) => load_config_from(&path),
            None => Ok(Config::default()),
        },
    }
}
