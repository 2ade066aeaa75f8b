//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::{broadcast, Mutex};
use tower_http::services::ServeDir;

use oqsite_static::{BuildConfig, StaticBuilder};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{
    inject_client_script, live_reload_client_script, ReloadHub, ReloadMessage, LIVE_RELOAD_PATH,
    LIVE_RELOAD_SCRIPT_PATH,
};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build settings
    pub build: BuildConfig,

    /// Files and directories that trigger a rebuild
    pub watch_paths: Vec<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            watch_paths: vec![PathBuf::from("src"), PathBuf::from("content")],
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    builder: StaticBuilder,
    hub: ReloadHub,
    /// Serialises rebuilds
    rebuild_lock: Mutex<()>,
}

impl ServerState {
    fn new(build: BuildConfig) -> Arc<Self> {
        Arc::new(Self {
            builder: StaticBuilder::new(build),
            hub: ReloadHub::new(),
            rebuild_lock: Mutex::new(()),
        })
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it and rebuild on every change.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

        let state = ServerState::new(self.config.build.clone());

        // A failed first build still serves whatever output exists
        match state.builder.build().await {
            Ok(result) => tracing::info!(
                "Built {} pages in {}ms",
                result.pages,
                result.duration_ms
            ),
            Err(e) => tracing::error!("Initial build failed: {}", e),
        }

        let (watcher, mut rx) = FileWatcher::new(&self.config.watch_paths)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state);

        tracing::info!("Starting dev server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: Arc<ServerState>) -> Router {
    let output_dir = state.builder.config().output_path();

    Router::new()
        .route(LIVE_RELOAD_PATH, get(ws_handler))
        .route(LIVE_RELOAD_SCRIPT_PATH, get(script_handler))
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::map_response(inject_live_reload))
        .with_state(state)
}

/// Rebuild after a change and tell connected browsers what to do.
async fn handle_watch_event(state: &ServerState, event: WatchEvent) {
    let config = state.builder.config();
    let path = event.path();

    if path.starts_with(config.output_path()) {
        return;
    }

    tracing::info!("Changed: {}", path.display());

    let _guard = state.rebuild_lock.lock().await;

    match state.builder.build().await {
        Ok(result) => {
            tracing::info!("Rebuilt {} pages in {}ms", result.pages, result.duration_ms);

            let msg = match &event {
                WatchEvent::StyleModified(p) => ReloadMessage::CssUpdate {
                    path: p
                        .strip_prefix(&config.root)
                        .unwrap_or(p)
                        .to_string_lossy()
                        .replace('\\', "/"),
                },
                _ => ReloadMessage::Reload,
            };
            state.hub.send(msg);
        }
        Err(e) => {
            tracing::error!("Rebuild failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Add the live reload script to every HTML response.
async fn inject_live_reload(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if !is_html || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_client_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(html))
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if send_message(&mut socket, &msg).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Live reload client skipped {} messages", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        live_reload_client_script(),
    )
}
