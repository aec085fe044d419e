//! Layered configuration for seasync.
//!
//! Values are resolved, lowest priority first, from:
//! 1. built-in defaults ([`Config::default`]),
//! 2. a TOML file (`seasync.toml` in the working directory, or an explicit path),
//! 3. `OPENSEA_API_KEY` (the API key only),
//! 4. any `SEASYNC_*` environment variable (e.g. `SEASYNC_CHAIN`, `SEASYNC_DATABASE`).

pub mod error;

use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use seasync_transform::consts::TARGET_CHAIN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

pub const DEFAULT_CONFIG_FILE: &str = "seasync.toml";
pub const ENV_PREFIX: &str = "SEASYNC_";
/// Kept for compatibility with existing `.env` files.
pub const API_KEY_ENV: &str = "OPENSEA_API_KEY";
/// Keys read from `SEASYNC_*`; anything else under the prefix is ignored.
const ENV_KEYS: [&str; 6] = ["api_key", "endpoint", "chain", "timeout_secs", "database", "snapshot"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Marketplace API key, sent as `X-API-KEY`.
    pub api_key: Option<String>,
    /// Full URL of the collections endpoint.
    pub endpoint: String,
    /// Chain filter sent to the API.
    pub chain: String,
    /// Request timeout, in seconds.
    pub timeout_secs: u64,
    /// SQLite database file.
    pub database: PathBuf,
    /// Where the last raw API response is archived.
    pub snapshot: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.opensea.io/api/v2/collections".to_string(),
            chain: TARGET_CHAIN.to_string(),
            timeout_secs: 30,
            database: PathBuf::from("data/opensea_collections.db"),
            snapshot: PathBuf::from("data/raw_collections.json"),
        }
    }
}

impl Config {
    /// Load configuration from every source.
    ///
    /// When `path` is given the file must exist; otherwise the default file
    /// is used if present.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        let config: Self = Self::figment(&file).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(
            endpoint = %config.endpoint,
            chain = %config.chain,
            database = %config.database.display(),
            api_key = config.api_key.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api_key".into()))
            .merge(Env::prefixed(ENV_PREFIX).only(&ENV_KEYS))
    }

    fn validate(&self) -> Result<()> {
        if self.chain != TARGET_CHAIN {
            exn::bail!(ErrorKind::Invalid(format!(
                "chain `{}` is not supported; only `{TARGET_CHAIN}` contracts are kept",
                self.chain
            )));
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            exn::bail!(ErrorKind::Invalid(format!("endpoint `{}` is not an HTTP(S) URL", self.endpoint)));
        }
        if self.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key with blank values treated as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}
