use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    pub auth_mode: AuthMode,
    /// Seconds a heartbeat stays "live" (presence freshness window).
    pub freshness_seconds: u64,
    /// Live-feed poll period in seconds, clamped to 5..=60.
    pub poll_seconds: u64,
    /// Default value for the retention selector; the operator still confirms
    /// every cleanup explicitly.
    pub default_retention_months: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    None,
    /// Holds the plaintext token value read from `BIZPULSE_PASSWORD`.
    Password(String),
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("BIZPULSE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("BIZPULSE_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("BIZPULSE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            auth_mode: {
                let raw = std::env::var("BIZPULSE_AUTH").unwrap_or_else(|_| "none".to_string());
                match raw.as_str() {
                    "password" => {
                        let pw = std::env::var("BIZPULSE_PASSWORD").map_err(|_| {
                            "BIZPULSE_PASSWORD required when BIZPULSE_AUTH=password".to_string()
                        })?;
                        AuthMode::Password(pw)
                    }
                    _ => AuthMode::None,
                }
            },
            freshness_seconds: std::env::var("BIZPULSE_FRESHNESS_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            poll_seconds: std::env::var("BIZPULSE_POLL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(|v| v.clamp(5, 60))
                .unwrap_or(10),
            default_retention_months: std::env::var("BIZPULSE_RETENTION_MONTHS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            cors_origins: std::env::var("BIZPULSE_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.freshness_seconds as i64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_seconds)
    }
}
