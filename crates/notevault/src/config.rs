//! Configuration loading and management

use anyhow::{Context, Result};
use notevault_auth::{AccessPolicy, RoleRule, RouteAccess};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret; must be at least 32 bytes
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in milliseconds
    #[serde(default = "default_token_lifetime_ms")]
    pub token_lifetime_ms: i64,
    /// Provision baseline accounts at startup if missing
    #[serde(default = "default_seed_accounts")]
    pub seed_accounts: bool,
    /// Ordered route access rules; first match wins
    #[serde(default = "default_rules")]
    pub rules: Vec<RouteRuleConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_lifetime_ms: default_token_lifetime_ms(),
            seed_accounts: default_seed_accounts(),
            rules: default_rules(),
        }
    }
}

/// A single route access rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRuleConfig {
    /// Path pattern (`*` matches one segment, `**` any suffix)
    pub pattern: String,
    /// `public`, `authenticated`, or `role:<NAME>`
    pub access: String,
}

impl AuthConfig {
    /// Build the access policy table from the configured rules
    ///
    /// An unparseable access string is a configuration error, not a runtime
    /// fallback.
    pub fn access_policy(&self) -> Result<AccessPolicy> {
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                rule.access
                    .parse::<RouteAccess>()
                    .map(|access| RoleRule::new(&rule.pattern, access))
                    .map_err(|e| {
                        anyhow::anyhow!("invalid rule for pattern '{}': {}", rule.pattern, e)
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AccessPolicy::new(rules))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "data/notevault.db".to_string()
}

fn default_jwt_secret() -> String {
    // Long enough for development; deployments must override it
    "change-me-in-production-0123456789abcdef".to_string()
}

fn default_token_lifetime_ms() -> i64 {
    3_600_000 // 1 hour
}

fn default_seed_accounts() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rules() -> Vec<RouteRuleConfig> {
    [
        ("/api/auth/public/**", "public"),
        ("/hello", "public"),
        ("/health", "public"),
        ("/healthz", "public"),
        ("/api/admin/**", "role:ROLE_ADMIN"),
    ]
    .into_iter()
    .map(|(pattern, access)| RouteRuleConfig {
        pattern: pattern.to_string(),
        access: access.to_string(),
    })
    .collect()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}
