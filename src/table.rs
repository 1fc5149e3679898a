// Table Renderer - the filtered series as a date-sorted grid

use crate::data::{SeriesType, TimeSeriesRow};
use crate::format::format_currency;
use chrono::NaiveDate;
use serde::Serialize;

pub const TABLE_COLUMNS: [&str; 4] = ["Zip", "Date", "MedianValue", "Type"];
pub const TABLE_PANEL_TITLE: &str = "Show underlying data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub zip: String,
    pub date: NaiveDate,
    pub median_value: f64,
    pub series_type: SeriesType,
}

impl TableRow {
    /// Cell text in column order
    pub fn cells(&self) -> [String; 4] {
        [
            self.zip.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            format_currency(self.median_value),
            self.series_type.label().to_string(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataTable {
    pub rows: Vec<TableRow>,
}

impl DataTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows sorted by date ascending; equal dates keep table order
pub fn build_table(zip_ts: &[TimeSeriesRow]) -> DataTable {
    let mut rows: Vec<TableRow> = zip_ts
        .iter()
        .map(|row| TableRow {
            zip: row.zip.clone(),
            date: row.date,
            median_value: row.median_value,
            series_type: row.series_type,
        })
        .collect();
    rows.sort_by_key(|row| row.date);

    DataTable { rows }
}
