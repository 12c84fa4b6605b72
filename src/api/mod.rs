//! HTTP API server for the Parlance gateway

pub mod health;
pub mod voice;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::pipeline::Pipeline;
use crate::session::ConversationSession;

/// Shared state for API handlers
///
/// The HTTP surface keeps one conversation session for the process, behind
/// an async mutex so at most one pipeline execution is in flight for it.
/// The realtime channel creates a fresh session per connection instead.
pub struct ApiState {
    pub pipeline: Pipeline,
    pub session: Mutex<ConversationSession>,
}

impl ApiState {
    /// Create API state around a pipeline
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            session: Mutex::new(ConversationSession::new()),
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    #[must_use]
    pub fn new(pipeline: Pipeline, port: u16) -> Self {
        Self {
            state: Arc::new(ApiState::new(pipeline)),
            port,
        }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/api", voice::router(self.state.clone()))
            .merge(websocket::router(self.state.clone()))
            .merge(health::router())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
