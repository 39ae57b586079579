use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use jobtrack::config::Config;
use jobtrack::parser::EmailParser;
use jobtrack::routes::build_router;
use jobtrack::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    jobtrack::init_tracing(env!("CARGO_CRATE_NAME"), &config.rust_log);

    info!("Starting jobtrack API v{}", env!("CARGO_PKG_VERSION"));

    let parser = EmailParser::new()?.with_max_input_bytes(config.max_input_bytes);
    info!(
        "Email parser ready (review threshold {}, max input {} bytes)",
        config.review_threshold, config.max_input_bytes
    );

    let state = AppState::new(config.clone(), parser);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the dashboard origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
