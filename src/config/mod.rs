/// Configuration management for the Flowvault server
///
/// Handles server binding, database location and the encryption key material.
/// Loaded once at startup; nothing here is read again at request time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Length in bytes of the AES-256 key
pub const KEY_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Encryption key material for graphs at rest
    pub crypto: CryptoConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL (e.g., "sqlite://data/flowvault.db")
    pub url: String,
}

/// Symmetric key material for the crypto codec
///
/// Debug output is redacted so the key never reaches the logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Raw 32-byte key
    pub key: [u8; KEY_LEN],
}

impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig").field("key", &"<redacted>").finish()
    }
}

impl CryptoConfig {
    /// Parse key material from its hex form (64 hex characters)
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let bytes = hex::decode(key_hex.trim()).context("encryption key is not valid hex")?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            anyhow::anyhow!(
                "encryption key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )
        })?;
        Ok(Self { key })
    }
}

impl Config {
    /// Build configuration from the environment
    ///
    /// Reads an optional `.env` file first. `FLOWVAULT_ENCRYPTION_KEY` is
    /// mandatory: without it the process must not start.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let key_hex = std::env::var("FLOWVAULT_ENCRYPTION_KEY")
            .context("FLOWVAULT_ENCRYPTION_KEY must be set")?;

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("FLOWVAULT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FLOWVAULT_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("FLOWVAULT_PORT must be a port number")?,
            },
            database: DatabaseConfig {
                url: std::env::var("FLOWVAULT_DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/flowvault.db".to_string()),
            },
            crypto: CryptoConfig::from_hex(&key_hex)?,
        })
    }
}
