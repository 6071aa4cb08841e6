use serde::Deserialize;

use yamdb_core::config::Config;

/// API service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    /// Mail relay endpoint; confirmation codes are only logged when unset.
    #[serde(default)]
    pub mail_relay_url: Option<String>,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
}

fn default_api_port() -> u16 {
    8000
}

fn default_access_token_ttl_secs() -> u64 {
    86_400
}

fn default_mail_from() -> String {
    "noreply@yamdb.local".to_owned()
}

impl Config for ApiConfig {}
