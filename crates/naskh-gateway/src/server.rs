//! Gateway server

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;

use naskh_core::{MirrorConfig, Result};
use naskh_dfs::{BackupStore, ClientConfig, ConnectionString, DataLakeClient, MirrorStore};

use crate::dispatcher::MirrorDispatcher;
use crate::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MirrorConfig>,
    /// Source-account client, used to fetch created objects' content
    pub source: Arc<DataLakeClient>,
    pub dispatcher: Arc<MirrorDispatcher<dyn MirrorStore>>,
    pub start_time: Instant,
}

/// Webhook gateway server
pub struct GatewayServer {
    config: MirrorConfig,
}

impl GatewayServer {
    pub fn new(config: MirrorConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        self.config.validate()?;

        let client_config = ClientConfig {
            timeout: Duration::from_secs(self.config.transport.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.config.transport.connect_timeout_secs),
        };

        let source_conn = ConnectionString::parse(&self.config.source.connection_string)?;
        let source = DataLakeClient::new(&source_conn, client_config.clone())?;

        let destination_conn = ConnectionString::parse(&self.config.destination.connection_string)?;
        let destination = DataLakeClient::new(&destination_conn, client_config)?;
        let store: Arc<dyn MirrorStore> = Arc::new(BackupStore::new(
            destination,
            self.config.destination.filesystem.clone(),
        ));

        info!(
            source = %source_conn.account_name,
            destination = %destination_conn.account_name,
            filesystem = %self.config.destination.filesystem,
            "mirroring configured"
        );

        let state = AppState {
            config: Arc::new(self.config.clone()),
            source: Arc::new(source),
            dispatcher: Arc::new(MirrorDispatcher::new(store)),
            start_time: Instant::now(),
        };

        let app = routes::router(state).layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new()),
        );

        let addr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );
        let listener = TcpListener::bind(&addr).await?;

        info!("naskh gateway listening on http://{}", addr);
        info!("event hooks at http://{}/events/{{hook}}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
