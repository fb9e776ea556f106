//! Storage event notification types
//!
//! Push-delivered notifications for hierarchical storage accounts:
//! - Created/Renamed/Deleted events for files and directories
//! - The subscription validation handshake event
//! - Typed payload records with explicit parse-and-validate constructors;
//!   the `data` member of an envelope entry is never cast unchecked
//!
//! Renamed payloads carry either `sourceUrl`/`destinationUrl` or the
//! `sourceBlobUrl`/`destinationBlobUrl` spelling depending on which API
//! performed the mutation; both are accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Event Kinds
// ============================================================================

/// Event kinds delivered over the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageEventKind {
    #[serde(rename = "Microsoft.Storage.BlobCreated")]
    FileCreated,
    #[serde(rename = "Microsoft.Storage.BlobRenamed")]
    FileRenamed,
    #[serde(rename = "Microsoft.Storage.BlobDeleted")]
    FileDeleted,
    #[serde(rename = "Microsoft.Storage.DirectoryCreated")]
    DirectoryCreated,
    #[serde(rename = "Microsoft.Storage.DirectoryRenamed")]
    DirectoryRenamed,
    #[serde(rename = "Microsoft.Storage.DirectoryDeleted")]
    DirectoryDeleted,
    #[serde(rename = "Microsoft.EventGrid.SubscriptionValidationEvent")]
    SubscriptionValidation,
}

impl StorageEventKind {
    /// Wire name of the event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageEventKind::FileCreated => "Microsoft.Storage.BlobCreated",
            StorageEventKind::FileRenamed => "Microsoft.Storage.BlobRenamed",
            StorageEventKind::FileDeleted => "Microsoft.Storage.BlobDeleted",
            StorageEventKind::DirectoryCreated => "Microsoft.Storage.DirectoryCreated",
            StorageEventKind::DirectoryRenamed => "Microsoft.Storage.DirectoryRenamed",
            StorageEventKind::DirectoryDeleted => "Microsoft.Storage.DirectoryDeleted",
            StorageEventKind::SubscriptionValidation => {
                "Microsoft.EventGrid.SubscriptionValidationEvent"
            }
        }
    }
}

impl std::fmt::Display for StorageEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// One entry of the push envelope. `data` stays opaque until the handler
/// re-parses it for the kind declared in `event_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEvent {
    pub id: String,
    pub event_type: StorageEventKind,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_version: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    pub data: Value,
}

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload of a file/directory created event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventData {
    pub url: Url,
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub e_tag: Option<String>,
    #[serde(default)]
    pub sequencer: Option<String>,
}

impl CreatedEventData {
    pub fn parse(data: &Value) -> Result<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| Error::MalformedPayload(format!("created event: {}", e)))
    }
}

/// Payload of a file/directory deleted event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEventData {
    pub url: Url,
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub sequencer: Option<String>,
}

impl DeletedEventData {
    pub fn parse(data: &Value) -> Result<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| Error::MalformedPayload(format!("deleted event: {}", e)))
    }
}

/// Payload of a file/directory renamed event
#[derive(Debug, Clone)]
pub struct RenamedEventData {
    pub source_url: Url,
    pub destination_url: Url,
    pub api: Option<String>,
}

impl RenamedEventData {
    pub fn parse(data: &Value) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            #[serde(default, alias = "sourceBlobUrl")]
            source_url: Option<Url>,
            #[serde(default, alias = "destinationBlobUrl")]
            destination_url: Option<Url>,
            #[serde(default)]
            api: Option<String>,
        }

        let raw: Raw = serde_json::from_value(data.clone())
            .map_err(|e| Error::MalformedPayload(format!("renamed event: {}", e)))?;

        let source_url = raw
            .source_url
            .ok_or_else(|| Error::MalformedPayload("renamed event missing source URL".into()))?;
        let destination_url = raw.destination_url.ok_or_else(|| {
            Error::MalformedPayload("renamed event missing destination URL".into())
        })?;

        Ok(Self {
            source_url,
            destination_url,
            api: raw.api,
        })
    }
}

/// Payload of the subscription validation handshake
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionValidationData {
    pub validation_code: String,
    #[serde(default)]
    pub validation_url: Option<String>,
}

impl SubscriptionValidationData {
    pub fn parse(data: &Value) -> Result<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| Error::MalformedPayload(format!("validation event: {}", e)))
    }
}
