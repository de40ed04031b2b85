mod app;
mod assignment;
mod db;
mod handlers;
#[cfg(test)]
mod memory_store;
mod models;
mod scoring;
mod service;
mod state;
mod status;
mod store;

use std::sync::Arc;

use ooh_common::{bind_listener, env_or, init_tracing, require_env, shutdown_signal};
use tokio_postgres::NoTls;

use crate::db::PgStore;
use crate::scoring::{GeographicScorer, ScoringConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let _guards = init_tracing("operations-service");

    if let Err(err) = run().await {
        tracing::error!(error = %err, "operations-service stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let port = env_or("PORT", 8080u16);
    let database_url = require_env("DATABASE_URL")?;
    let scorer = GeographicScorer::new(ScoringConfig::from_env());
    tracing::info!(scoring = ?scorer.config(), "scoring weights loaded");

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(|err| format!("connect db failed: {err}"))?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::error!(error = %err, "database connection error");
        }
    });

    let state = AppState {
        store: Arc::new(PgStore::new(client)),
        scorer: Arc::new(scorer),
    };

    let app = app::build_router(state);
    let listener = bind_listener(port)
        .await
        .map_err(|err| format!("bind port {port} failed: {err}"))?;
    tracing::info!(port, "operations-service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("serve failed: {err}"))
}
