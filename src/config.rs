//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::policy::Sensitivity;
use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Canonical message shown at a checkpoint when a candidate message is rejected
/// by the sanitizer.
pub const DEFAULT_CHECKPOINT_MESSAGE: &str =
    "This next step explores your request in more depth. Would you like to continue?";

#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Governance tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    /// Action bundles classified at or above this level raise a checkpoint
    pub checkpoint_threshold: Sensitivity,
    /// Substituted for any checkpoint message that fails sanitization
    pub default_checkpoint_message: String,
    /// Agent outputs below this confidence are treated as uncertain
    pub confidence_floor: f64,
    /// Known partitions. Empty means any non-empty partition id is accepted.
    pub partitions: Vec<String>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            checkpoint_threshold: Sensitivity::High,
            default_checkpoint_message: DEFAULT_CHECKPOINT_MESSAGE.to_string(),
            confidence_floor: 0.5,
            partitions: Vec::new(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "governed-pipeline-dev-secret-change-in-production".to_string(),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub governance: GovernanceConfig,
    pub auth: AuthConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| split_list(&s))
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let defaults = GovernanceConfig::default();
        let checkpoint_threshold = match std::env::var("CHECKPOINT_THRESHOLD") {
            Ok(raw) => raw.parse::<Sensitivity>().map_err(ConfigError::InvalidValue)?,
            Err(_) => defaults.checkpoint_threshold,
        };

        let confidence_floor = match std::env::var("CONFIDENCE_FLOOR") {
            Ok(raw) => Self::parse_confidence(&raw)?,
            Err(_) => defaults.confidence_floor,
        };

        let governance = GovernanceConfig {
            checkpoint_threshold,
            default_checkpoint_message: std::env::var("CHECKPOINT_DEFAULT_MESSAGE")
                .unwrap_or(defaults.default_checkpoint_message),
            confidence_floor,
            partitions: std::env::var("GOVERNANCE_PARTITIONS")
                .ok()
                .map(|s| split_list(&s))
                .unwrap_or_default(),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using default (INSECURE - set in production!)");
                AuthConfig::default().jwt_secret
            }),
        };

        Ok(Self {
            server,
            cors,
            governance,
            auth,
        })
    }

    fn parse_confidence(raw: &str) -> Result<f64, ConfigError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("CONFIDENCE_FLOOR '{}' is not a number", raw)))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidValue(
                "CONFIDENCE_FLOOR must be between 0 and 1".to_string(),
            ));
        }
        Ok(value)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_default_governance_config() {
        let config = GovernanceConfig::default();
        assert_eq!(config.checkpoint_threshold, Sensitivity::High);
        assert!(config.partitions.is_empty());
        assert_eq!(config.default_checkpoint_message, DEFAULT_CHECKPOINT_MESSAGE);
    }

    #[test]
    fn test_parse_confidence_bounds() {
        assert_eq!(Settings::parse_confidence("0.75").unwrap(), 0.75);
        assert!(Settings::parse_confidence("1.5").is_err());
        assert!(Settings::parse_confidence("high").is_err());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list("business, health,,"), vec!["business", "health"]);
    }
}
