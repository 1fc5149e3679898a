// Page Controller
// Load -> filter -> KPIs, chart, table, insight. Terminal states halt early.

use crate::chart::{build_trend, ChartView};
use crate::data::{DataCache, Dataset};
use crate::error::DashboardResult;
use crate::filter::{slice_for_zip, zip_options};
use crate::insight::{generate_insight, Insight};
use crate::kpi::{build_kpis, KpiPanel};
use crate::table::{build_table, DataTable};
use serde::Serialize;
use tracing::{debug, instrument, warn};

pub const PAGE_TITLE: &str = "Baltimore County 5-Year Real Estate Price Prediction Dashboard";

pub const NO_DATA_MESSAGE: &str = "Processed data files are empty or missing. \
     Please run the modeling notebook to regenerate them.";

/// The ZIP selector: sorted options plus the current choice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipSelection {
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub selection: ZipSelection,
    pub kpis: KpiPanel,
    pub chart: ChartView,
    pub table: DataTable,
    pub insight: Insight,
}

/// Where a render pass ends up once the data is loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState {
    /// Either table is empty; nothing but the remediation message is shown
    NoData { message: &'static str },
    /// The selected ZIP has no summary row
    NoZipMatch {
        selection: ZipSelection,
        message: String,
    },
    Rendered(Box<DashboardPage>),
}

impl PageState {
    pub fn selection(&self) -> Option<&ZipSelection> {
        match self {
            PageState::NoData { .. } => None,
            PageState::NoZipMatch { selection, .. } => Some(selection),
            PageState::Rendered(page) => Some(&page.selection),
        }
    }
}

pub fn no_zip_match_message(zip: &str) -> String {
    format!("No summary data found for ZIP {}.", zip)
}

/// Resolve the page for `requested_zip`, defaulting to the first option
#[instrument(skip(dataset))]
pub fn resolve_page(dataset: &Dataset, requested_zip: Option<&str>) -> PageState {
    if dataset.is_empty() {
        warn!("processed data is empty");
        return PageState::NoData {
            message: NO_DATA_MESSAGE,
        };
    }

    let options = zip_options(&dataset.timeseries);
    let selected = requested_zip
        .map(str::to_string)
        .or_else(|| options.first().cloned())
        .unwrap_or_default();
    let selection = ZipSelection { options, selected };

    let zip_ts = slice_for_zip(&dataset.timeseries, &selection.selected);

    let Some(summary_row) = dataset.summary_for(&selection.selected) else {
        warn!(zip = %selection.selected, "no summary row for ZIP");
        return PageState::NoZipMatch {
            message: no_zip_match_message(&selection.selected),
            selection,
        };
    };

    let zip = selection.selected.as_str();
    let kpis = build_kpis(zip, summary_row);
    let chart = build_trend(&zip_ts);
    let table = build_table(&zip_ts);
    let insight = generate_insight(zip, &zip_ts, summary_row);

    debug!(zip, rows = zip_ts.len(), "page rendered");

    PageState::Rendered(Box::new(DashboardPage {
        selection,
        kpis,
        chart,
        table,
        insight,
    }))
}

/// One full pass: read through the cache, then resolve. Load errors propagate.
pub fn build_page(cache: &DataCache, requested_zip: Option<&str>) -> DashboardResult<PageState> {
    let dataset = cache.get()?;
    Ok(resolve_page(&dataset, requested_zip))
}
