use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::config_defaults::*;

/// Which storage engine backs the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    PostgreSQL,
    InMemory,
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::PostgreSQL => write!(f, "postgresql"),
            StorageEngineType::InMemory => write!(f, "inmemory"),
        }
    }
}

impl FromStr for StorageEngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(StorageEngineType::PostgreSQL),
            "inmemory" | "in-memory" | "memory" => Ok(StorageEngineType::InMemory),
            other => Err(format!(
                "unknown storage engine '{}', expected postgresql or inmemory",
                other
            )),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub storage_engine_type: StorageEngineType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            storage_engine_type: StorageEngineType::PostgreSQL,
            host: DEFAULT_PG_HOST.to_string(),
            port: DEFAULT_PG_PORT,
            username: DEFAULT_PG_USER.to_string(),
            password: DEFAULT_PG_PASSWORD.to_string(),
            database: DEFAULT_PG_DATABASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level application configuration, as read from
/// `hospital_config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HospitalConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Reject status changes the entity's lifecycle does not allow, such as
    /// re-confirming a cancelled appointment.
    pub enforce_status_transitions: bool,
    pub request_timeout_secs: u64,
}

impl Default for HospitalConfig {
    fn default() -> Self {
        HospitalConfig {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            enforce_status_transitions: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl HospitalConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
