use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Unset: run on the in-process store
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Defaults for the list and portal endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub search_limit: i64,
    pub portal_entries_limit: i64,
    pub history_months: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
            },
            ledger: LedgerConfig {
                search_limit: 20,
                portal_entries_limit: 50,
                history_months: 6,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default.toml` and `config/local.toml` (both
    /// optional), then `DAIRY__SECTION__KEY` variables, then the plain
    /// `DATABASE_URL` / `SERVER_HOST` / `SERVER_PORT` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default("ledger.search_limit", defaults.ledger.search_limit)?
            .set_default("ledger.portal_entries_limit", defaults.ledger.portal_entries_limit)?
            .set_default("ledger.history_months", i64::from(defaults.ledger.history_months))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DAIRY")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
