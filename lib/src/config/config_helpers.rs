use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use serde_yaml2 as serde_yaml;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::config_defaults::*;
use crate::config::config_structs::*;

/// Loads the configuration file, falling back to defaults when it is absent,
/// then applies `PG_*` / `HOSPITAL_PORT` environment overrides.
pub fn load_hospital_config(config_file_path: Option<&Path>) -> Result<HospitalConfig> {
    let mut config = load_config_file(config_file_path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

fn load_config_file(config_file_path: Option<&Path>) -> Result<HospitalConfig> {
    let path_to_use = config_file_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH_RELATIVE));

    info!("Attempting to load hospital config from {:?}", path_to_use);

    if !path_to_use.exists() {
        if config_file_path.is_some() {
            return Err(anyhow!("Config file not found: {}", path_to_use.display()));
        }
        warn!("Config file not found at {}. Using default config.", path_to_use.display());
        return Ok(HospitalConfig::default());
    }

    let config_content = fs::read_to_string(&path_to_use)
        .context(format!("Failed to read config file: {}", path_to_use.display()))?;
    debug!("Hospital config content: {}", config_content);
    parse_hospital_config(&config_content).map_err(|e| {
        error!("YAML parsing error at {:?}: {:?}", path_to_use, e);
        e.context(format!("Failed to parse config YAML: {}", path_to_use.display()))
    })
}

pub fn parse_hospital_config(content: &str) -> Result<HospitalConfig> {
    if content.trim().is_empty() {
        return Ok(HospitalConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| anyhow!("{}", e))
}

/// Applies environment overrides through `lookup` so tests can supply their
/// own variables.
pub fn apply_env_overrides<F>(config: &mut HospitalConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user) = lookup(ENV_PG_USER) {
        config.storage.username = user;
    }
    if let Some(host) = lookup(ENV_PG_HOST) {
        config.storage.host = host;
    }
    if let Some(database) = lookup(ENV_PG_DATABASE) {
        config.storage.database = database;
    }
    if let Some(password) = lookup(ENV_PG_PASSWORD) {
        config.storage.password = password;
    }
    if let Some(port) = lookup(ENV_PG_PORT) {
        config.storage.port = port
            .parse()
            .with_context(|| format!("{} must be a port number, got '{}'", ENV_PG_PORT, port))?;
    }
    if let Some(port) = lookup(ENV_HTTP_PORT) {
        config.server.port = port
            .parse()
            .with_context(|| format!("{} must be a port number, got '{}'", ENV_HTTP_PORT, port))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_legacy_deployment() {
        let config = HospitalConfig::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.storage.port, 5433);
        assert_eq!(config.storage.database, "hospital_db");
        assert!(!config.enforce_status_transitions);
        assert_eq!(config.storage.username, "aj");
        assert_eq!(config.storage.host, "localhost");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "server:\n  port: 8080\n\
                    storage:\n  storage_engine_type: inmemory\n\
                    enforce_status_transitions: true\n";
        let config = parse_hospital_config(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.storage.storage_engine_type, StorageEngineType::InMemory);
        assert_eq!(config.storage.username, DEFAULT_PG_USER);
        assert!(config.enforce_status_transitions);
    }

    #[test]
    fn environment_overrides_storage_settings() {
        let vars: HashMap<&str, &str> = [
            ("PG_HOST", "db.internal"),
            ("PG_PORT", "6543"),
            ("HOSPITAL_PORT", "9000"),
        ]
        .into_iter()
        .collect();
        let mut config = HospitalConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.storage.host, "db.internal");
        assert_eq!(config.storage.port, 6543);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.password, DEFAULT_PG_PASSWORD);
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = HospitalConfig::default();
        let result =
            apply_env_overrides(&mut config, |key| (key == "PG_PORT").then(|| "abc".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_config_file(Some(Path::new("/nonexistent/hospital.yaml"))).is_err());
    }
}
