//! Gitamite - read-only web viewer for a directory of git repositories
//!
//! # Usage
//! ```bash
//! gitamite --repo-dir /srv/git          # Serve every repository under /srv/git
//! gitamite --repo-dir /srv/git --open   # Start and open browser
//! ```

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitamite::Config;
use gitamite::git::Registry;
use gitamite::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing (quiet unless asked)
    let filter = config
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load every repository under the configured root
    let registry = match Registry::load(&config.repo_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Failed to read repository directory: {}", e);
            eprintln!("  Path: {}", config.repo_dir.display());
            std::process::exit(1);
        }
    };
    let repo_count = registry.list()?.len();

    let state = AppState::from_config(&config, registry);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let url = format!("http://{}", addr);
    println!();
    println!("  Gitamite");
    println!();
    println!("  Repositories: {} ({})", config.repo_dir.display(), repo_count);
    println!("  Server:       {}", url);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    if config.open {
        if let Err(e) = open::that(&url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
