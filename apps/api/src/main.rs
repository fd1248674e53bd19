mod config;
mod errors;
mod extraction;
mod grammar;
mod models;
mod routes;
mod state;
mod validation;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS validation API v{}", env!("CARGO_PKG_VERSION"));

    // Grammar collaborator: disabled unless an endpoint is configured
    let grammar = grammar::build_grammar_checker(config.grammar_api_url.as_deref());
    match &config.grammar_api_url {
        Some(url) => info!("Grammar checker enabled ({url})"),
        None => info!("Grammar checker disabled"),
    }

    let state = AppState {
        config: config.clone(),
        grammar,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
