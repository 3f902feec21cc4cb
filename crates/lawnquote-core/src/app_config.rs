use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only the server needs a database; the CLI runs without one.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML override for the built-in service/suburb catalog.
    pub catalog_path: Option<PathBuf>,
    pub addy_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub linz_api_key: Option<String>,
    pub provider_timeout_secs: u64,
    pub provider_user_agent: String,
    pub elevation_dataset: String,
    pub region_hint: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// `true` when the server should accept requests without bearer tokens.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "addy_api_key",
                &self.addy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "linz_api_key",
                &self.linz_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_user_agent", &self.provider_user_agent)
            .field("elevation_dataset", &self.elevation_dataset)
            .field("region_hint", &self.region_hint)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
