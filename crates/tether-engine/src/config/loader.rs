use super::schema::TetherConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HOST_ENV: &str = "TETHER_CDP_HOST";
pub const PORT_ENV: &str = "TETHER_CDP_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./tether.yaml
    /// 2. ~/.tether/config.yaml
    /// 3. Default configuration
    ///
    /// Environment overrides are applied on top of whichever was found.
    pub async fn load_default() -> Result<TetherConfig, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path).await?,
            None => TetherConfig::default(),
        };
        Self::apply_env(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<TetherConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: TetherConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("./tether.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?.join(".tether").join("config.yaml");
        home_config.exists().then_some(home_config)
    }

    /// Apply `TETHER_CDP_HOST` / `TETHER_CDP_PORT` using `lookup` to read variables.
    pub fn apply_env<F>(config: &mut TetherConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            let host = host.trim();
            if !host.is_empty() {
                config.endpoint.host = host.to_string();
            }
        }
        if let Some(port) = lookup(PORT_ENV) {
            config.endpoint.port =
                port.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        name: PORT_ENV.to_string(),
                        value: port.clone(),
                    })?;
        }
        Ok(())
    }
}
