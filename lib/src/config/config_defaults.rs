// lib/src/config/config_defaults.rs

pub const DEFAULT_CONFIG_PATH_RELATIVE: &str = "./config/hospital_config.yaml";

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 5001;

pub const DEFAULT_PG_USER: &str = "aj";
pub const DEFAULT_PG_HOST: &str = "localhost";
pub const DEFAULT_PG_DATABASE: &str = "hospital_db";
pub const DEFAULT_PG_PASSWORD: &str = "123";
pub const DEFAULT_PG_PORT: u16 = 5433;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_PG_USER: &str = "PG_USER";
pub const ENV_PG_HOST: &str = "PG_HOST";
pub const ENV_PG_DATABASE: &str = "PG_DATABASE";
pub const ENV_PG_PASSWORD: &str = "PG_PASSWORD";
pub const ENV_PG_PORT: &str = "PG_PORT";
pub const ENV_HTTP_PORT: &str = "HOSPITAL_PORT";
