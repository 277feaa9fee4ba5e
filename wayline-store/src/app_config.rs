use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// How many upcoming options the home listing shows
    #[serde(default = "default_home_page_size")]
    pub home_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            home_page_size: default_home_page_size(),
        }
    }
}

fn default_home_page_size() -> i64 {
    6
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer the current environment file on top (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Finally environment variables, e.g. WAYLINE__SERVER__PORT=9000
            .add_source(config::Environment::with_prefix("WAYLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
