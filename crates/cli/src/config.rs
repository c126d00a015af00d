/// Runtime configuration, environment-driven.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vision API key.
    pub api_key: Option<String>,
    /// Vision API base URL.
    pub endpoint: Option<String>,
    /// Raw label threshold string; resolved (with fallback) at client
    /// construction.
    pub label_threshold: Option<String>,
    /// Visibility poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum visibility poll attempts before giving up on a node.
    pub max_poll_attempts: u32,
    /// Log filter.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            label_threshold: None,
            poll_interval_ms: 500,
            max_poll_attempts: 120,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GOOGLE_VISION_API_KEY").ok(),
            endpoint: std::env::var("AUTOLABEL_VISION_ENDPOINT").ok(),
            label_threshold: std::env::var("AUTOLABEL_LABEL_THRESHOLD").ok(),
            poll_interval_ms: std::env::var("AUTOLABEL_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            max_poll_attempts: std::env::var("AUTOLABEL_MAX_POLL_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_poll_attempts),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.max_poll_attempts, 120);
        assert_eq!(config.log_level, "info");
        assert!(config.api_key.is_none());
    }
}
