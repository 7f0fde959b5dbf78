//! Napkin relay - backend for the Napkin diagram canvas
//!
//! Accepts canvas images, generation prompts and GitHub repository references,
//! turns them into prompts for a hosted model, and returns the model's text
//! unchanged. No diagram state is kept between requests.
//!
//! # Usage
//! ```bash
//! GEMINI_API_KEY=... napkin-relay                 # Serve on 127.0.0.1:8000
//! napkin-relay --port 9000 --github-token ghp_... # Custom port, authenticated GitHub
//! ```

mod config;
mod error;
mod github;
mod llm;
mod models;
mod prompts;
mod routes;
mod shapes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Cli;
use github::GitHubClient;
use llm::GeminiClient;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "napkin_relay=info,tower_http=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let github = GitHubClient::new(&cli.github_settings())?;
    let gemini = GeminiClient::new(&cli.gemini_settings())?;
    let state = AppState {
        github: Arc::new(github),
        gemini: Arc::new(gemini),
    };

    // CORS configuration
    let origin: HeaderValue = cli
        .allowed_origin
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid allowed origin: {}", cli.allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(DefaultBodyLimit::max(cli.max_body_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = cli.address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    tracing::info!("Napkin relay listening on http://{} (model {})", addr, cli.model);
    tracing::info!("Allowing browser requests from {}", cli.allowed_origin);

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
