//! The configuration structs used to build the AppConfig, and their impls.
use std::{
    collections::{hash_map::Entry, HashMap},
    io::Read,
};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;
use toml::Value;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub upstream_config: UpstreamConfig,
    pub cors_config: CorsConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// The upstream newsletter provider. Subscriptions get created with a
/// bearer-authenticated POST scoped to `publication_id`.
#[derive(Deserialize, Clone, Debug)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub publication_id: String,
    pub api_key: SecretString,
    pub timeout_millis: u64,
}

/// Comma-separated list of origin patterns allowed to call the proxy.
/// Patterns may contain `*` wildcards, see `web::cors::OriginPolicy`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: String,
}

/// Intermediate TOML representation used to merge multiple config files.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct AppConfigBuilder(HashMap<String, HashMap<String, Value>>);

// ###################################
// ->   IMPLs
// ###################################
impl UpstreamConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl AppConfig {
    pub fn init() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

impl AppConfigBuilder {
    /// Merges the contents of `file` into this builder.
    /// Values from later sources override earlier ones, section by section.
    pub fn add_source(mut self, mut file: std::fs::File) -> ConfigResult<Self> {
        let mut file_content = String::new();
        file.read_to_string(&mut file_content)?;

        let app_conf_builder: AppConfigBuilder = toml::from_str(&file_content)?;

        for (entry, entry_hm) in app_conf_builder.0 {
            if let Entry::Vacant(e) = self.0.entry(entry.clone()) {
                e.insert(entry_hm);
            } else {
                let target_hm = self.0.get_mut(&entry).expect("Checked above!");
                for (inner_entry, inner_value) in entry_hm {
                    target_hm.insert(inner_entry, inner_value);
                }
            }
        }

        Ok(self)
    }

    pub fn build(self) -> ConfigResult<AppConfig> {
        let serialized = toml::to_string(&self)?;
        let app_config: AppConfig = toml::from_str(&serialized)?;
        Ok(app_config)
    }
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::StringToEnvironmentFail),
        }
    }
}
