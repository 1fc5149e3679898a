// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::env;

use zip_dashboard::{load_dataset, zip_options, DashboardConfig};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = DashboardConfig::from_env();

    if args.len() > 1 && args[1] == "check" {
        // Check mode
        run_check(&config)?;
    } else {
        // UI mode (default)
        run_ui_mode(config)?;
    }

    Ok(())
}

fn run_check(config: &DashboardConfig) -> Result<()> {
    zip_dashboard::init_tracing();

    println!("🔍 ZIP Forecast Dashboard - Data Check");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Data directory: {}", config.data_dir.display());

    let dataset = load_dataset(config).context("Failed to load processed data")?;

    println!("✓ Time series rows: {}", dataset.timeseries.len());
    println!("✓ Summary rows:     {}", dataset.summary.len());

    if dataset.is_empty() {
        println!("\n⚠️  Processed data is empty. Re-run the modeling notebook to regenerate it.");
        return Ok(());
    }

    let series_zips: BTreeSet<String> = zip_options(&dataset.timeseries).into_iter().collect();
    let summary_zips: BTreeSet<String> = dataset.summary.iter().map(|r| r.zip.clone()).collect();

    println!("✓ ZIP codes in time series: {}", series_zips.len());

    let no_summary: Vec<&String> = series_zips.difference(&summary_zips).collect();
    let no_series: Vec<&String> = summary_zips.difference(&series_zips).collect();

    if !no_summary.is_empty() {
        println!("⚠️  ZIPs without a summary row: {:?}", no_summary);
    }
    if !no_series.is_empty() {
        println!("⚠️  ZIPs without time-series rows: {:?}", no_series);
    }
    if no_summary.is_empty() && no_series.is_empty() {
        println!("✅ Every ZIP has both time-series and summary data");
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: DashboardConfig) -> Result<()> {
    // No tracing subscriber here: log lines on stderr would draw over the alternate screen
    println!("🖥️  Loading ZIP Forecast Dashboard...\n");

    let cache = zip_dashboard::DataCache::new(config);
    let mut app = ui::App::new(cache).context("Failed to load processed data")?;

    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin zip-dashboard-server --features server");
    std::process::exit(1);
}
