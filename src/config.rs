use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_CHAT_URL: &str = "http://localhost:5003";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://dropout-risk-client.db?mode=rwc";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where the backend services live and where local state is kept.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub chat_base_url: String,
    pub database_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            chat_base_url: DEFAULT_CHAT_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Same backend for auth, dashboards and chat.
    pub fn single_host(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.to_string(),
            chat_base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}
