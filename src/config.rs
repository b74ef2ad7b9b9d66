use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DeskError;

pub const CONFIG_FILE: &str = "rfq-desk.toml";
pub const ENV_PREFIX: &str = "RFQ_DESK_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub basic: BasicConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5012".to_string(),
            loglevel: "info".to_string(),
            body_limit: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Directory holding `rfq.json` and `solt.json` for the JSON backend.
    pub data_dir: PathBuf,
    pub database_url: String,
    /// Create the demo RFQ and SOLT rows at startup when missing.
    pub seed: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            data_dir: PathBuf::from("instance"),
            database_url: "sqlite:instance/rfq.sqlite".to_string(),
            seed: true,
        }
    }
}

impl Config {
    /// Defaults, then `rfq-desk.toml` if present, then `RFQ_DESK_*` env vars
    /// (`__` separates nesting, e.g. `RFQ_DESK_STORAGE__BACKEND=sqlite`).
    pub fn load() -> Result<Self, DeskError> {
        Self::figment().extract().map_err(DeskError::from)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
