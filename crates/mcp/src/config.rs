// Server configuration pulled from the environment at startup

use anyhow::{bail, Result};

/// Environment variable holding the Airtable personal access token.
pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Log severity, lowest to highest. Unrecognized or missing values fall
/// back to [`LogLevel::Info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("debug") => Self::Debug,
            Some("info") => Self::Info,
            Some("warn") => Self::Warn,
            Some("error") => Self::Error,
            _ => Self::default(),
        }
    }
}

/// Configuration read once at process start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub log_level: LogLevel,
}

impl ServerConfig {
    /// Read configuration from the process environment. A missing or empty
    /// API key is fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(LOG_LEVEL_ENV).ok(),
        )
    }

    fn from_values(api_key: Option<String>, log_level: Option<String>) -> Result<Self> {
        let Some(api_key) = api_key.filter(|key| !key.is_empty()) else {
            bail!("{API_KEY_ENV} environment variable is required");
        };

        Ok(Self {
            api_key,
            log_level: LogLevel::parse(log_level.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert!(ServerConfig::from_values(None, None).is_err());
        assert!(ServerConfig::from_values(Some(String::new()), None).is_err());
    }

    #[test]
    fn test_log_level_defaults_to_info() {
        let config = ServerConfig::from_values(Some("pat-key".to_string()), None).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);

        let config =
            ServerConfig::from_values(Some("pat-key".to_string()), Some("verbose".to_string()))
                .unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_log_level_parsing_ignores_case() {
        for (value, expected) in [
            ("DEBUG", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("Warn", LogLevel::Warn),
            ("ERROR", LogLevel::Error),
        ] {
            let config =
                ServerConfig::from_values(Some("pat-key".to_string()), Some(value.to_string()))
                    .unwrap();
            assert_eq!(config.log_level, expected, "{value}");
        }
    }
}
