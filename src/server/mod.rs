//! HTTP surface: `GET /ubs/perto?cep=...` and `GET /health`.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::resolver::FacilityResolver;

pub fn build_router(resolver: FacilityResolver) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/ubs/perto", get(handlers::nearby))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: FacilityResolver) -> std::io::Result<()> {
    let app = build_router(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Consulta Certa listening on http://{}", addr);
    info!("Try: http://{}/ubs/perto?cep=01001000", addr);

    axum::serve(listener, app).await
}
