// ZIP Forecast Dashboard - Core Library
// Exposes all modules for use in the terminal UI, the web server, and tests

pub mod config;
pub mod error;
pub mod data;       // Data Loader + cache
pub mod filter;     // Filter Resolver
pub mod format;
pub mod kpi;        // KPI Renderer
pub mod chart;      // Trend Chart Renderer
pub mod table;      // Table Renderer
pub mod insight;    // Insight Generator
pub mod page;       // Page Controller
pub mod web;        // HTML front end

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::{DashboardConfig, SUMMARY_FILE, TIMESERIES_FILE};
pub use error::{DashboardError, DashboardResult};
pub use data::{
    DataCache, Dataset, SeriesType, SummaryRow, TimeSeriesRow,
    load_dataset, load_summary, load_timeseries,
};
pub use filter::{slice_for_zip, zip_options, HasZip};
pub use kpi::{build_kpis, Kpi, KpiPanel};
pub use chart::{
    build_trend, ChartPoint, ChartSeries, ChartView,
    ForecastSeries, HistoricalSeries, TrendChart,
};
pub use table::{build_table, DataTable, TableRow};
pub use insight::{generate_insight, Direction, Insight};
pub use page::{build_page, resolve_page, DashboardPage, PageState, ZipSelection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the tracing subscriber used by both binaries.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zip_dashboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
