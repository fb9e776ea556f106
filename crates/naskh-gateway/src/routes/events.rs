//! Storage event webhook handlers
//!
//! One hook per event kind, matching the webhook URLs registered with the
//! event subscription. Every handler decodes the push envelope, answers the
//! subscription validation handshake, and otherwise hands each event to the
//! dispatcher. Failures translate into HTTP status codes so the delivery
//! platform's retry policy engages.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use naskh_core::types::{
    CreatedEventData, EventGridEvent, StorageEventKind, SubscriptionValidationData,
};
use naskh_core::utils::{generate_request_id, path_from_url};
use naskh_core::{Error, Result};

use crate::server::AppState;

/// Resolve a hook path segment to the event kind it is registered for
fn hook_kind(hook: &str) -> Option<StorageEventKind> {
    match hook {
        "file-created" => Some(StorageEventKind::FileCreated),
        "file-renamed" => Some(StorageEventKind::FileRenamed),
        "file-deleted" => Some(StorageEventKind::FileDeleted),
        "directory-created" => Some(StorageEventKind::DirectoryCreated),
        "directory-renamed" => Some(StorageEventKind::DirectoryRenamed),
        "directory-deleted" => Some(StorageEventKind::DirectoryDeleted),
        _ => None,
    }
}

/// POST /events/{hook} - receive a push envelope for one event kind
pub async fn handle_events(
    State(state): State<AppState>,
    Path(hook): Path<String>,
    body: Bytes,
) -> Response {
    let request_id = generate_request_id();

    let Some(kind) = hook_kind(&hook) else {
        warn!(hook = %hook, request_id = %request_id, "unknown event hook");
        return (
            StatusCode::NOT_FOUND,
            [("x-naskh-request-id", request_id.clone())],
            Json(json!({"error": format!("unknown event hook: {}", hook)})),
        )
            .into_response();
    };

    let events: Vec<EventGridEvent> = match serde_json::from_slice(&body) {
        Ok(events) => events,
        Err(e) => {
            let err = Error::MalformedPayload(format!("event envelope: {}", e));
            warn!(hook = %hook, request_id = %request_id, error = %err, "rejecting envelope");
            return error_response(&err, &request_id);
        }
    };

    // The handshake arrives on subscription creation, before any storage
    // events are delivered
    if let Some(validation) = events
        .iter()
        .find(|e| e.event_type == StorageEventKind::SubscriptionValidation)
    {
        return match SubscriptionValidationData::parse(&validation.data) {
            Ok(data) => {
                info!(hook = %hook, request_id = %request_id, "answering subscription validation handshake");
                (
                    StatusCode::OK,
                    [("x-naskh-request-id", request_id.clone())],
                    Json(json!({"validationResponse": data.validation_code})),
                )
                    .into_response()
            }
            Err(err) => {
                warn!(hook = %hook, request_id = %request_id, error = %err, "malformed validation event");
                error_response(&err, &request_id)
            }
        };
    }

    for event in &events {
        if event.event_type != kind {
            let err = Error::UnexpectedEventType {
                expected: kind.as_str().to_string(),
                got: event.event_type.as_str().to_string(),
            };
            warn!(hook = %hook, request_id = %request_id, event_id = %event.id, error = %err, "rejecting event");
            return error_response(&err, &request_id);
        }

        if let Err(err) = process_event(&state, event).await {
            error!(
                hook = %hook,
                request_id = %request_id,
                event_kind = %event.event_type,
                event_id = %event.id,
                subject = %event.subject,
                error = %err,
                "mirroring failed"
            );
            return error_response(&err, &request_id);
        }

        info!(
            hook = %hook,
            request_id = %request_id,
            event_kind = %event.event_type,
            event_id = %event.id,
            "event mirrored"
        );
    }

    (StatusCode::OK, [("x-naskh-request-id", request_id)]).into_response()
}

async fn process_event(state: &AppState, event: &EventGridEvent) -> Result<()> {
    match event.event_type {
        StorageEventKind::FileCreated => {
            // Resolve the created object's content from the source account;
            // an object that is already gone dispatches as no content
            let data = CreatedEventData::parse(&event.data)?;
            let content = state.source.read(&path_from_url(&data.url)).await?;
            state.dispatcher.file_created(&event.data, content).await
        }
        StorageEventKind::FileRenamed => state.dispatcher.file_renamed(&event.data).await,
        StorageEventKind::FileDeleted => state.dispatcher.file_deleted(&event.data).await,
        StorageEventKind::DirectoryCreated => state.dispatcher.directory_created(&event.data).await,
        StorageEventKind::DirectoryRenamed => state.dispatcher.directory_renamed(&event.data).await,
        StorageEventKind::DirectoryDeleted => state.dispatcher.directory_deleted(&event.data).await,
        // Handled before dispatch
        StorageEventKind::SubscriptionValidation => Ok(()),
    }
}

fn error_response(err: &Error, request_id: &str) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [("x-naskh-request-id", request_id.to_string())],
        Json(json!({"error": err.to_string()})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::MirrorDispatcher;
    use crate::routes;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use naskh_core::MirrorConfig;
    use naskh_dfs::{ClientConfig, DataLakeClient, MirrorStore};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingStore {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(Error::TransferFailed {
                    status: 503,
                    message: "injected".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MirrorStore for RecordingStore {
        async fn upload(&self, path: &str, data: bytes::Bytes, overwrite: bool) -> Result<()> {
            self.record(format!("upload {} {} {}", path, data.len(), overwrite))
        }

        async fn rename_file(&self, source: &str, destination: &str) -> Result<()> {
            self.record(format!("rename_file {} {}", source, destination))
        }

        async fn rename_directory(&self, source: &str, destination: &str) -> Result<()> {
            self.record(format!("rename_directory {} {}", source, destination))
        }

        async fn create_directory(&self, path: &str) -> Result<()> {
            self.record(format!("create_directory {}", path))
        }

        async fn delete_file(&self, path: &str) -> Result<()> {
            self.record(format!("delete_file {}", path))
        }

        async fn delete_directory(&self, path: &str) -> Result<()> {
            self.record(format!("delete_directory {}", path))
        }
    }

    fn app(store: Arc<RecordingStore>) -> Router {
        let source = DataLakeClient::from_connection_string(
            "AccountName=src;AccountKey=a2V5",
            ClientConfig::default(),
        )
        .unwrap();

        let store: Arc<dyn MirrorStore> = store;
        routes::router(AppState {
            config: Arc::new(MirrorConfig::default()),
            source: Arc::new(source),
            dispatcher: Arc::new(MirrorDispatcher::new(store)),
            start_time: Instant::now(),
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_subscription_validation_handshake() {
        let store = Arc::new(RecordingStore::default());

        let envelope = json!([{
            "id": "1",
            "eventType": "Microsoft.EventGrid.SubscriptionValidationEvent",
            "data": {"validationCode": "code-123"}
        }]);
        let (status, body) = post_json(app(store.clone()), "/events/file-created", envelope).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["validationResponse"], "code-123");
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_file_renamed_hook_dispatches() {
        let store = Arc::new(RecordingStore::default());

        let envelope = json!([{
            "id": "2",
            "subject": "/blobServices/default/containers/c/blobs/a/old.txt",
            "eventType": "Microsoft.Storage.BlobRenamed",
            "data": {
                "sourceBlobUrl": "https://acct.dfs.core.windows.net/c/a/old.txt",
                "destinationBlobUrl": "https://acct.dfs.core.windows.net/c/a/new.txt"
            }
        }]);
        let (status, _) = post_json(app(store.clone()), "/events/file-renamed", envelope).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.calls(), vec!["rename_file /c/a/old.txt /c/a/new.txt"]);
    }

    #[tokio::test]
    async fn test_directory_deleted_hook_dispatches() {
        let store = Arc::new(RecordingStore::default());

        let envelope = json!([{
            "id": "3",
            "eventType": "Microsoft.Storage.DirectoryDeleted",
            "data": {"url": "https://acct.dfs.core.windows.net/c/olddir"}
        }]);
        let (status, _) = post_json(app(store.clone()), "/events/directory-deleted", envelope).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.calls(), vec!["delete_directory /c/olddir"]);
    }

    #[tokio::test]
    async fn test_event_kind_mismatch_is_rejected() {
        let store = Arc::new(RecordingStore::default());

        let envelope = json!([{
            "id": "4",
            "eventType": "Microsoft.Storage.BlobDeleted",
            "data": {"url": "https://acct.dfs.core.windows.net/c/a.txt"}
        }]);
        let (status, body) = post_json(app(store.clone()), "/events/file-created", envelope).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Unexpected event type"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_rejected() {
        let store = Arc::new(RecordingStore::default());

        let (status, body) =
            post_json(app(store.clone()), "/events/file-deleted", json!({"not": "an array"}))
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Malformed"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let store = Arc::new(RecordingStore::default());

        let envelope = json!([{
            "id": "5",
            "eventType": "Microsoft.Storage.BlobDeleted",
            "data": {"api": "DeleteFile"}
        }]);
        let (status, _) = post_json(app(store.clone()), "/events/file-deleted", envelope).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_hook_is_not_found() {
        let store = Arc::new(RecordingStore::default());

        let (status, _) = post_json(app(store), "/events/blob-archived", json!([])).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_bad_gateway() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });

        let envelope = json!([{
            "id": "6",
            "eventType": "Microsoft.Storage.DirectoryCreated",
            "data": {"url": "https://acct.dfs.core.windows.net/c/newdir"}
        }]);
        let (status, body) =
            post_json(app(store.clone()), "/events/directory-created", envelope).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("Transfer failed"));
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let store = Arc::new(RecordingStore::default());

        let response = app(store)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
