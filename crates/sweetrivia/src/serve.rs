use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use sweetrivia_db::Database;
use sweetrivia_publish::Publisher;

use crate::api;

pub async fn handle_serve_command(db: Database, publisher: Publisher, port: u16) -> Result<()> {
    let backend = publisher.backend().to_string();
    let router = api::create_router(Arc::new(db), Arc::new(publisher));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("API listening on http://localhost:{}", port).bold()
    );
    eprintln!("  {} Publishing to {}", "->".dimmed(), backend.bright_cyan());
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    tracing::info!(port, backend = %backend, "Server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
