use std::{env, fs, net::IpAddr, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    cleanup::DEFAULT_SWEEP_INTERVAL,
    error::Error,
    logic::registry::{DEFAULT_CAPACITY, DEFAULT_TTL},
};

pub const CONFIG_PATH_VAR: &str = "JIRAI_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub datasource: DataSourceConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

/// Selects and parameterizes the field catalog.
///
/// No container-level default here: a `datasource` section that is present
/// but has no `type` is a configuration error, not a request for `sample`.
#[derive(Debug, Deserialize)]
pub struct DataSourceConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// JSON file of fields, for `file`.
    pub path: Option<PathBuf>,
    /// Fields to generate, for `random`.
    #[serde(default)]
    pub fields: Vec<RandomFieldConfig>,
    pub seed: Option<u64>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            kind: Some("sample".to_string()),
            path: None,
            fields: Vec::new(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomFieldConfig {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_secs: DEFAULT_TTL.as_secs(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Config {
    /// Loads the file named by `JIRAI_CONFIG`, or `config.json`.
    pub fn load() -> Result<Self, Error> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Falls back to defaults when the file is missing or unparsable, then
    /// validates whatever was loaded.
    pub fn load_from(path: &str) -> Result<Self, Error> {
        let config = match fs::read_to_string(path) {
            Ok(text) => match Self::parse(&text) {
                Ok(config) => {
                    info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using default config", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to load {}: {}. Using default config", path, e);
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.datasource.kind.is_none() {
            return Err(Error::unavailable("datasource.type is not defined in config"));
        }
        if self.sessions.capacity == 0 {
            return Err(Error::unavailable("sessions.capacity must be positive"));
        }
        if self.sessions.ttl_secs == 0 || self.sessions.sweep_interval_secs == 0 {
            return Err(Error::unavailable(
                "sessions.ttl_secs and sessions.sweep_interval_secs must be positive",
            ));
        }
        Ok(())
    }
}
