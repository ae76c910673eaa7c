use crate::auth::JwtConfig;

/// Server configuration
///
/// Every item can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | REALTIME_PORT | 8081 | Realtime gateway TCP port |
/// | DATABASE_PATH | delivery.db | SQLite database file |
/// | AUTH_WINDOW_SECS | 10 | Realtime authentication grace window |
/// | PUSH_ENDPOINT | (unset) | Push provider HTTP endpoint |
/// | PUSH_SERVER_KEY | (unset) | Push provider server key |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_DIR | (unset) | Daily-rolling log directory |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Realtime gateway TCP port
    pub realtime_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Seconds an unauthenticated realtime connection may live
    pub auth_window_secs: u64,
    /// Push provider endpoint; log-only delivery when unset
    pub push_endpoint: Option<String>,
    /// Push provider server key
    pub push_server_key: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Optional log directory for daily-rolling file output
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            realtime_port: std::env::var("REALTIME_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "delivery.db".into()),
            jwt: JwtConfig::from_env(),
            auth_window_secs: std::env::var("AUTH_WINDOW_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            push_endpoint: std::env::var("PUSH_ENDPOINT").ok(),
            push_server_key: std::env::var("PUSH_SERVER_KEY").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override the ports and database path, for tests.
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16, realtime_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config.realtime_port = realtime_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
