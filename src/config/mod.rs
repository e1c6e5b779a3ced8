//! TOML configuration for endpoints and contract addresses

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// A node endpoint entry; exactly one of the transports should be set
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

/// Deployed contract addresses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractAddresses {
    pub clonefactory: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub contracts: ContractAddresses,
}

/// Load the config file, falling back to defaults on any error
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

/// Config file location: `LUMERIN_CONFIG` env var, then XDG, then HOME
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("LUMERIN_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("lumerin").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("lumerin").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "lumerin", "lumerin")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
