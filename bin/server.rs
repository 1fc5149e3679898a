// ZIP Forecast Dashboard - Web Server

use anyhow::{Context, Result};
use tracing::{info, warn};
use zip_dashboard::server::{create_router, AppState};
use zip_dashboard::{DashboardConfig, DataCache};

#[tokio::main]
async fn main() -> Result<()> {
    zip_dashboard::init_tracing();

    println!("🌐 ZIP Forecast Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = DashboardConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "using processed data directory");

    let state = AppState::new(DataCache::new(config.clone()));

    // Warm the cache so a broken data directory shows up at startup.
    // The server still starts; each request reports the error until fixed.
    match state.cache.get() {
        Ok(dataset) => println!(
            "✓ Loaded {} time-series rows, {} summary rows",
            dataset.timeseries.len(),
            dataset.summary.len()
        ),
        Err(e) => warn!("data not loaded yet: {}", e),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    println!("\n🚀 Server running on http://{}", config.bind_address);
    println!("   UI:  http://{}/", config.bind_address);
    println!("   API: http://{}/api/zips", config.bind_address);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
