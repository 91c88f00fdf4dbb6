//! Server runtime: HTTP, GraphQL and WebSocket endpoints over the stub operations.

mod graphql;
mod ops;
mod routes;
mod ws;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use codeviz_core::Store;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use crate::graphql::{build_schema, AppSchema, ExecutionResultObject, UserContext};
pub use crate::ops::{run_blocking, Operations, Resolvers};
pub use crate::routes::ApiError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(String),
}

#[derive(Clone)]
pub struct Server {
    ops: Arc<dyn Operations>,
    schema: AppSchema,
}

impl Server {
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: Store + Send + Sync + 'static,
    {
        Self::with_shared_store(Arc::new(store))
    }

    /// Build a server around a store the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_store<S>(store: Arc<S>) -> Self
    where
        S: Store + Send + Sync + 'static,
    {
        let ops: Arc<dyn Operations> = Arc::new(Resolvers::new(store));
        let schema = build_schema(Arc::clone(&ops));
        Self { ops, schema }
    }

    #[must_use]
    pub fn operations(&self) -> Arc<dyn Operations> {
        Arc::clone(&self.ops)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        routes::build_router(routes::AppState {
            ops: Arc::clone(&self.ops),
            schema: self.schema.clone(),
        })
    }

    /// Serve on `listener` until `shutdown` is cancelled.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
            })
            .into_future()
            .await
            .map_err(|e| ServerError::Io(e.to_string()))
    }

    pub async fn run_http(&self, addr: &str) -> Result<(), ServerError> {
        let bind_addr: SocketAddr = addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::Io(e.to_string()))?;
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| ServerError::Io(e.to_string()))?;

        let shutdown_token = CancellationToken::new();
        info!(%addr, "http server listening");
        let server = self.serve(listener, shutdown_token.clone());
        tokio::pin!(server);

        let http_result: Result<(), ServerError> = tokio::select! {
            res = &mut server => res,
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl_c received; shutting down http server");
                shutdown_token.cancel();
                server.as_mut().await
            }
        };
        http_result?;
        info!("graceful shutdown complete");
        Ok(())
    }
}
