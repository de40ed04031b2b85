use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{auto_assign, healthz, preview_auto_assign, readyz};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/v1/operations/auto-assign", post(auto_assign))
        .route(
            "/v1/operations/auto-assign/preview",
            post(preview_auto_assign),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
