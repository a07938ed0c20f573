use std::time::Duration;
use tracing::Level;

/// Fixed client tag sent as the `user_agent` query parameter.
pub const USER_AGENT_TAG: &str = "dashboard";

/// The backend only streams audio when this flag is set on the URL.
pub const ENFORCE_STREAMING: bool = true;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base WebSocket endpoint of the agent backend (`ws://` or `wss://`).
    pub endpoint: String,
    /// Identifier of the agent to converse with; becomes a URL path segment
    /// and the local display name used when joining a room.
    pub agent_id: String,
    /// Access token passed through the URL; the bridge performs no
    /// authentication of its own.
    pub auth_token: String,
    /// Display name of the remote agent participant whose audio is played.
    pub agent_user_name: String,
    /// Pace of microphone chunk capture.
    pub chunk_interval: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let endpoint = std::env::var("BRIDGE_ENDPOINT")
            .map_err(|_| ConfigError::MissingVar("BRIDGE_ENDPOINT".to_string()))?;
        if !endpoint.starts_with("ws://") && !endpoint.starts_with("wss://") {
            return Err(ConfigError::InvalidValue(
                "BRIDGE_ENDPOINT".to_string(),
                format!("'{}' is not a ws:// or wss:// URL", endpoint),
            ));
        }

        let agent_id = std::env::var("BRIDGE_AGENT_ID")
            .map_err(|_| ConfigError::MissingVar("BRIDGE_AGENT_ID".to_string()))?;

        let auth_token = std::env::var("BRIDGE_AUTH_TOKEN")
            .map_err(|_| ConfigError::MissingVar("BRIDGE_AUTH_TOKEN".to_string()))?;

        let agent_user_name =
            std::env::var("BRIDGE_AGENT_NAME").unwrap_or_else(|_| "agent".to_string());

        let interval_str =
            std::env::var("BRIDGE_CHUNK_INTERVAL_MS").unwrap_or_else(|_| "200".to_string());
        let interval_ms = interval_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "BRIDGE_CHUNK_INTERVAL_MS".to_string(),
                format!("'{}' is not a number of milliseconds", interval_str),
            )
        })?;
        if interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "BRIDGE_CHUNK_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            endpoint,
            agent_id,
            auth_token,
            agent_user_name,
            chunk_interval: Duration::from_millis(interval_ms),
            log_level,
        })
    }

    /// The full endpoint URL: agent id as a path segment, token, the fixed
    /// client tag, and the streaming-mode flag as query parameters.
    pub fn websocket_url(&self) -> String {
        format!(
            "{}/{}?auth_token={}&user_agent={}&enforce_streaming={}",
            self.endpoint.trim_end_matches('/'),
            self.agent_id,
            self.auth_token,
            USER_AGENT_TAG,
            ENFORCE_STREAMING,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BRIDGE_ENDPOINT");
            env::remove_var("BRIDGE_AGENT_ID");
            env::remove_var("BRIDGE_AUTH_TOKEN");
            env::remove_var("BRIDGE_AGENT_NAME");
            env::remove_var("BRIDGE_CHUNK_INTERVAL_MS");
            env::remove_var("RUST_LOG");
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("BRIDGE_ENDPOINT", "wss://agents.example/chat/v1");
            env::set_var("BRIDGE_AGENT_ID", "agent-123");
            env::set_var("BRIDGE_AUTH_TOKEN", "tok-abc");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.endpoint, "wss://agents.example/chat/v1");
        assert_eq!(config.agent_id, "agent-123");
        assert_eq!(config.auth_token, "tok-abc");
        assert_eq!(config.agent_user_name, "agent");
        assert_eq!(config.chunk_interval, Duration::from_millis(200));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BRIDGE_AGENT_NAME", "concierge");
            env::set_var("BRIDGE_CHUNK_INTERVAL_MS", "100");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.agent_user_name, "concierge");
        assert_eq!(config.chunk_interval, Duration::from_millis(100));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_missing_endpoint() {
        clear_env_vars();
        unsafe {
            env::set_var("BRIDGE_AGENT_ID", "agent-123");
            env::set_var("BRIDGE_AUTH_TOKEN", "tok-abc");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "BRIDGE_ENDPOINT"),
            _ => panic!("Expected MissingVar for BRIDGE_ENDPOINT"),
        }
    }

    #[test]
    #[serial]
    fn test_config_rejects_non_websocket_endpoint() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BRIDGE_ENDPOINT", "https://agents.example/chat/v1");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BRIDGE_ENDPOINT"),
            _ => panic!("Expected InvalidValue for BRIDGE_ENDPOINT"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_chunk_interval() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BRIDGE_CHUNK_INTERVAL_MS", "soon");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BRIDGE_CHUNK_INTERVAL_MS"),
            _ => panic!("Expected InvalidValue for BRIDGE_CHUNK_INTERVAL_MS"),
        }

        unsafe {
            env::set_var("BRIDGE_CHUNK_INTERVAL_MS", "0");
        }
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, _)));
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_websocket_url_shape() {
        clear_env_vars();
        unsafe {
            env::set_var("BRIDGE_ENDPOINT", "wss://agents.example/chat/v1/");
            env::set_var("BRIDGE_AGENT_ID", "agent-123");
            env::set_var("BRIDGE_AUTH_TOKEN", "tok-abc");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(
            config.websocket_url(),
            "wss://agents.example/chat/v1/agent-123?auth_token=tok-abc&user_agent=dashboard&enforce_streaming=true"
        );
    }
}
