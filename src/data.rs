use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument};

// ============================================================================
// ROW TYPES
// ============================================================================

/// Which segment of the series a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SeriesType {
    Historical,
    Forecast,
}

impl SeriesType {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesType::Historical => "Historical",
            SeriesType::Forecast => "Forecast",
        }
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One observation of the long-format time series
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "Zip", deserialize_with = "deserialize_zip")]
    pub zip: String,

    #[serde(rename = "Date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,

    #[serde(rename = "MedianValue")]
    pub median_value: f64,

    #[serde(rename = "Type")]
    pub series_type: SeriesType,
}

/// Per-ZIP KPIs computed upstream
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Zip", deserialize_with = "deserialize_zip")]
    pub zip: String,

    #[serde(rename = "CurrentValue")]
    pub current_value: f64,

    #[serde(rename = "Forecast5Yr")]
    pub forecast_5yr: f64,

    #[serde(rename = "GrowthPct5Yr")]
    pub growth_pct_5yr: f64,

    #[serde(rename = "CAGR")]
    pub cagr: f64,
}

/// Both tables, as loaded. Never mutated after load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub timeseries: Vec<TimeSeriesRow>,
    pub summary: Vec<SummaryRow>,
}

impl Dataset {
    pub fn new(timeseries: Vec<TimeSeriesRow>, summary: Vec<SummaryRow>) -> Self {
        Self { timeseries, summary }
    }

    /// True when either table has no rows
    pub fn is_empty(&self) -> bool {
        self.timeseries.is_empty() || self.summary.is_empty()
    }

    /// First summary row for `zip`, if any
    pub fn summary_for(&self, zip: &str) -> Option<&SummaryRow> {
        self.summary.iter().find(|row| row.zip == zip)
    }
}

// ============================================================================
// FIELD PARSING
// ============================================================================

/// ZIPs are kept as text. Whitespace is trimmed and a float artefact
/// such as `21201.0` is reduced to `21201`.
pub fn normalize_zip(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            digits.to_string()
        }
        _ => trimmed.to_string(),
    }
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a calendar date, dropping any time-of-day component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn deserialize_zip<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_zip(&raw))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

// ============================================================================
// LOADING
// ============================================================================

fn read_rows<T>(path: &Path) -> DashboardResult<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Err(DashboardError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DashboardError::from_csv(path, e))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.map_err(|e| DashboardError::from_csv(path, e))?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn load_timeseries(path: &Path) -> DashboardResult<Vec<TimeSeriesRow>> {
    read_rows(path)
}

pub fn load_summary(path: &Path) -> DashboardResult<Vec<SummaryRow>> {
    read_rows(path)
}

/// Read both processed files from the configured directory
#[instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
pub fn load_dataset(config: &DashboardConfig) -> DashboardResult<Dataset> {
    let timeseries = load_timeseries(&config.timeseries_path())?;
    let summary = load_summary(&config.summary_path())?;

    info!(
        timeseries_rows = timeseries.len(),
        summary_rows = summary.len(),
        "loaded processed data"
    );

    Ok(Dataset::new(timeseries, summary))
}

// ============================================================================
// CACHE
// ============================================================================

#[derive(Debug)]
enum DataSource {
    Directory(DashboardConfig),
    Static(Arc<Dataset>),
}

/// Lazily loaded, read-only dataset shared by every interaction.
///
/// The first `get` reads the files; later calls hand out the same `Arc`
/// until `clear` is called. Failed loads are not remembered.
#[derive(Debug)]
pub struct DataCache {
    source: DataSource,
    slot: RwLock<Option<Arc<Dataset>>>,
}

impl DataCache {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            source: DataSource::Directory(config),
            slot: RwLock::new(None),
        }
    }

    /// A cache that never touches the filesystem
    pub fn preloaded(dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);
        Self {
            source: DataSource::Static(dataset.clone()),
            slot: RwLock::new(Some(dataset)),
        }
    }

    pub fn get(&self) -> DashboardResult<Arc<Dataset>> {
        if let Some(dataset) = self.slot.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(dataset.clone());
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = slot.as_ref() {
            return Ok(dataset.clone());
        }

        let dataset = match &self.source {
            DataSource::Directory(config) => Arc::new(load_dataset(config)?),
            DataSource::Static(dataset) => dataset.clone(),
        };
        *slot = Some(dataset.clone());

        Ok(dataset)
    }

    /// Drop the cached tables; the next `get` reloads them
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("dataset cache cleared");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}
