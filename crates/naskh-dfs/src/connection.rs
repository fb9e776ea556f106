//! Storage account connection strings
//!
//! `AccountName=…;AccountKey=…;EndpointSuffix=…` as handed out by the
//! portal. The account key is base64; the DFS endpoint is derived from the
//! account name unless a `DfsEndpoint` member overrides it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use naskh_core::{Error, Result};

/// Parsed storage account connection string
#[derive(Debug, Clone)]
pub struct ConnectionString {
    pub account_name: String,
    /// Decoded shared key
    pub account_key: Vec<u8>,
    pub endpoint_suffix: String,
    /// Resolved DFS endpoint, no trailing slash
    pub dfs_endpoint: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut account_name = None;
        let mut account_key = None;
        let mut endpoint_suffix = "core.windows.net".to_string();
        let mut dfs_endpoint = None;
        let mut protocol = "https".to_string();

        for pair in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidConnectionString(format!("expected key=value, got {:?}", pair))
            })?;

            match key {
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "EndpointSuffix" => endpoint_suffix = value.to_string(),
                "DfsEndpoint" => dfs_endpoint = Some(value.trim_end_matches('/').to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                // BlobEndpoint, QueueEndpoint etc. do not concern this client
                _ => {}
            }
        }

        let account_name = account_name
            .ok_or_else(|| Error::InvalidConnectionString("missing AccountName".into()))?;
        let key = account_key
            .ok_or_else(|| Error::InvalidConnectionString("missing AccountKey".into()))?;

        let account_key = BASE64.decode(key.as_bytes()).map_err(|e| {
            Error::InvalidConnectionString(format!("AccountKey is not valid base64: {}", e))
        })?;

        let dfs_endpoint = dfs_endpoint
            .unwrap_or_else(|| format!("{}://{}.dfs.{}", protocol, account_name, endpoint_suffix));

        Ok(Self {
            account_name,
            account_key,
            endpoint_suffix,
            dfs_endpoint,
        })
    }
}
