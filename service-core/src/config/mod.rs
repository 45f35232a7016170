use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load the shared settings from an optional `configuration` file and
    /// `APP__*` environment variables. A plain `PORT` variable, as set by most
    /// hosting platforms, takes precedence over `APP__PORT`.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("PORT must be a valid port: {}", e))
            })?;
        }

        Ok(config)
    }
}
