use crate::{RelayConfig, RelayService, ws_handler};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(config: &RelayConfig, service: RelayService) -> Router {
    Router::new()
        .route(&config.path, get(ws_handler))
        .with_state(service)
}

/// Binds `config.listen` and serves until `shutdown` resolves.
pub async fn serve(
    config: RelayConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.listen).await?;
    serve_on(listener, config, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    config: RelayConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let service = RelayService::with_token(config.token.clone());
    let app = router(&config, service);

    info!(
        "Relay listening on ws://{}{}",
        listener.local_addr()?,
        config.path
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
