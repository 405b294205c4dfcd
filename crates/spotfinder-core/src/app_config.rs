use crate::locations::Coordinate;

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
    pub env: Environment,
    pub log_level: String,
    pub backend_url: String,
    pub backend_key: String,
    pub locations_table: String,
    pub bookings_table: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub feed_poll_interval_ms: u64,
    pub position_url: Option<String>,
    pub position_timeout_ms: u64,
    /// Origin used when the current position cannot be determined.
    pub default_origin: Coordinate,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("backend_url", &self.backend_url)
            .field("backend_key", &"[redacted]")
            .field("locations_table", &self.locations_table)
            .field("bookings_table", &self.bookings_table)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("feed_poll_interval_ms", &self.feed_poll_interval_ms)
            .field("position_url", &self.position_url)
            .field("position_timeout_ms", &self.position_timeout_ms)
            .field("default_origin", &self.default_origin)
            .finish()
    }
}
