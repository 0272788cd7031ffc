//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig, domain::IdentityService, infrastructure::registry::ConnectionRegistry,
};

use super::{
    error::ServerError,
    handler::{
        http::{health_check, list_connections},
        stream::accept_loop,
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
    status::spawn_status_display,
};

/// Chat relay server
///
/// Owns both listeners, its own route table and the registry handed to it.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(ConnectionRegistry::new());
/// let identity = Arc::new(HttpIdentityService::new(&config.auth_url));
/// let server = Server::bind(&config, registry, identity).await?;
/// server.run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    stream_listener: TcpListener,
    framed_listener: TcpListener,
    status_interval: Option<Duration>,
}

impl Server {
    /// Bind the TCP and WebSocket listeners
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if either address cannot be bound.
    pub async fn bind(
        config: &ServerConfig,
        registry: Arc<ConnectionRegistry>,
        identity: Arc<dyn IdentityService>,
    ) -> Result<Self, ServerError> {
        let stream_listener = bind_listener(&config.stream_addr).await?;
        let framed_listener = bind_listener(&config.framed_addr).await?;
        let state = Arc::new(AppState::new(registry, identity, config.write_timeout));

        Ok(Self {
            state,
            stream_listener,
            framed_listener,
            status_interval: config.status_interval,
        })
    }

    /// Address of the TCP listener
    pub fn stream_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.stream_listener.local_addr()?)
    }

    /// Address of the WebSocket / HTTP listener
    pub fn framed_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.framed_listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.state.registry.clone()
    }

    /// Run until Ctrl+C or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves, then stop both accept loops and close
    /// every remaining connection.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let stream_addr = self.stream_addr()?;
        let framed_addr = self.framed_addr()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stream_task = tokio::spawn(accept_loop(
            self.stream_listener,
            self.state.clone(),
            shutdown_rx.clone(),
        ));
        let status_task = self.status_interval.map(|interval| {
            spawn_status_display(self.state.registry.clone(), interval, shutdown_rx.clone())
        });
        let trigger = tokio::spawn(async move {
            shutdown.await;
            let _ = shutdown_tx.send(true);
        });

        tracing::info!("TCP chat listening on {}", stream_addr);
        tracing::info!("WebSocket chat listening on ws://{}/ws", framed_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let mut framed_shutdown = shutdown_rx;
        let served = axum::serve(
            self.framed_listener,
            router(self.state.clone()).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = framed_shutdown.changed().await;
        })
        .await;

        // Dropping the sender also releases the other loops if serving failed.
        trigger.abort();
        if let Err(e) = stream_task.await {
            tracing::warn!("TCP accept loop ended abnormally: {}", e);
        }
        if let Some(status_task) = status_task {
            let _ = status_task.await;
        }

        let closed = self.state.registry.close_all().await;
        tracing::info!("Closed {} remaining connection(s)", closed);

        served?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Route table of the WebSocket / HTTP listener
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/connections", get(list_connections))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn bind_listener(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}
