use crate::signaling::{SignalingService, ws_handler};
use axum::{Router, routing::get};

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}

pub async fn health_handler() -> &'static str {
    "OK"
}
