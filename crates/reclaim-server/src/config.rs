//! Configuration file management for the booking server.
//!
//! Provides a TOML-based config file at `~/.config/reclaim/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8430;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub payment: PaymentSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentSection {
    /// `"mock"` for local development, `"http"` for a real provider.
    pub provider: String,
    /// Base URL of the payment provider API (http provider only).
    pub base_url: Option<String>,
    /// Bearer token for the payment provider (http provider only).
    pub api_key: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSection {
                bind: DEFAULT_BIND.to_owned(),
                port: DEFAULT_PORT,
            },
            payment: PaymentSection {
                provider: "mock".to_owned(),
                base_url: None,
                api_key: None,
            },
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the reclaim config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/reclaim` or
/// `~/.config/reclaim`, regardless of platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("reclaim");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("reclaim")
}

/// Return the path to the reclaim config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Load the config file from the default location.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

/// Serialize and write a config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Write the config file to the default location.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

// -----------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub payment: PaymentConfig,
}

/// Which payment gateway to construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentConfig {
    Mock,
    Http {
        base_url: String,
        api_key: Option<String>,
    },
}

impl ServerConfig {
    /// Resolve runtime settings: CLI flag > env var > config file >
    /// default. A missing config file is not an error; defaults apply.
    pub fn resolve(
        bind_flag: Option<String>,
        port_flag: Option<u16>,
        mock_payments: bool,
    ) -> Result<Self> {
        let file = match load_config() {
            Ok(file) => Some(file),
            Err(_) => {
                tracing::debug!("no config file found, using defaults");
                None
            }
        };

        let bind = bind_flag
            .or_else(|| std::env::var("RECLAIM_BIND").ok())
            .or_else(|| file.as_ref().map(|f| f.server.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_owned());

        let port = match port_flag.or_else(|| {
            std::env::var("RECLAIM_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
        }) {
            Some(port) => port,
            None => file.as_ref().map(|f| f.server.port).unwrap_or(DEFAULT_PORT),
        };

        let payment = if mock_payments {
            PaymentConfig::Mock
        } else {
            let provider = std::env::var("RECLAIM_PAYMENT_PROVIDER")
                .ok()
                .or_else(|| file.as_ref().map(|f| f.payment.provider.clone()))
                .unwrap_or_else(|| "mock".to_owned());

            match provider.as_str() {
                "mock" => PaymentConfig::Mock,
                "http" => {
                    let base_url = std::env::var("RECLAIM_PAYMENT_API_URL")
                        .ok()
                        .or_else(|| file.as_ref().and_then(|f| f.payment.base_url.clone()))
                        .context("payment provider is http but no base URL is configured")?;
                    let api_key = std::env::var("RECLAIM_PAYMENT_API_KEY")
                        .ok()
                        .or_else(|| file.as_ref().and_then(|f| f.payment.api_key.clone()));
                    PaymentConfig::Http { base_url, api_key }
                }
                other => anyhow::bail!(
                    "invalid payment provider {other:?} (expected mock or http)"
                ),
            }
        };

        Ok(Self {
            bind,
            port,
            payment,
        })
    }
}
