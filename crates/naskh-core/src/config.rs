//! Configuration for naskh

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: AccountConfig,

    #[serde(default)]
    pub destination: DestinationConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MirrorConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay NASKH_* environment variables on top of the current values.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("NASKH_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("NASKH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(conn) = std::env::var("NASKH_SOURCE_CONNECTION_STRING") {
            self.source.connection_string = conn;
        }
        if let Ok(conn) = std::env::var("NASKH_DESTINATION_CONNECTION_STRING") {
            self.destination.connection_string = conn;
        }
        if let Ok(fs) = std::env::var("NASKH_BACKUP_FILESYSTEM") {
            self.destination.filesystem = fs;
        }
        if let Ok(level) = std::env::var("NASKH_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.connection_string.is_empty() {
            return Err(Error::InvalidConfig(
                "source connection string not configured".into(),
            ));
        }
        if self.destination.connection_string.is_empty() {
            return Err(Error::InvalidConfig(
                "destination connection string not configured".into(),
            ));
        }
        if self.destination.filesystem.is_empty() {
            return Err(Error::InvalidConfig(
                "destination filesystem not configured".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: crate::DEFAULT_PORT,
        }
    }
}

/// A storage account naskh reads from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    pub connection_string: String,
}

/// The storage account mirrored mutations are replayed against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub connection_string: String,
    /// Filesystem mirrored objects are written under
    pub filesystem: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            filesystem: crate::DEFAULT_BACKUP_FILESYSTEM.to_string(),
        }
    }
}

/// Timeouts for the outbound storage client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 7071);
        assert_eq!(config.destination.filesystem, "backup");
        assert_eq!(config.transport.request_timeout_secs, 30);
    }

    #[test]
    fn test_parse_toml() {
        let config: MirrorConfig = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1"
            port = 8080

            [source]
            connection_string = "AccountName=src;AccountKey=a2V5"

            [destination]
            connection_string = "AccountName=dst;AccountKey=a2V5"
            filesystem = "mirror"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.destination.filesystem, "mirror");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_accounts() {
        let config = MirrorConfig::default();
        assert!(config.validate().is_err());
    }
}
