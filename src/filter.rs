// Filter Resolver - ZIP options and per-ZIP slices

use crate::data::{SummaryRow, TimeSeriesRow};
use std::collections::BTreeSet;

/// Rows that can be sliced by ZIP code
pub trait HasZip {
    fn zip(&self) -> &str;
}

impl HasZip for TimeSeriesRow {
    fn zip(&self) -> &str {
        &self.zip
    }
}

impl HasZip for SummaryRow {
    fn zip(&self) -> &str {
        &self.zip
    }
}

/// Distinct ZIPs of the time series, sorted lexicographically
pub fn zip_options(timeseries: &[TimeSeriesRow]) -> Vec<String> {
    timeseries
        .iter()
        .map(|row| row.zip.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Rows whose ZIP equals `zip`, in table order. May be empty.
pub fn slice_for_zip<T: HasZip + Clone>(rows: &[T], zip: &str) -> Vec<T> {
    rows.iter().filter(|row| row.zip() == zip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::*;
    use crate::data::SeriesType;

    #[test]
    fn test_zip_options_sorted_and_unique() {
        let dataset = scenario_dataset();
        let options = zip_options(&dataset.timeseries);

        assert_eq!(options, vec!["21201".to_string(), "21204".to_string()]);
        assert!(options.windows(2).all(|w| w[0] < w[1]));
        for zip in &options {
            assert!(dataset.timeseries.iter().any(|row| &row.zip == zip));
        }
    }

    #[test]
    fn test_zip_options_ignore_summary_only_zips() {
        let dataset = scenario_dataset();
        let options = zip_options(&dataset.timeseries);

        // 21202 has a summary row but no series
        assert!(!options.contains(&"21202".to_string()));
    }

    #[test]
    fn test_zip_options_lexicographic_not_numeric() {
        let rows = vec![
            ts_row("9", date(2020, 1, 1), 1.0, SeriesType::Historical),
            ts_row("10", date(2020, 1, 1), 1.0, SeriesType::Historical),
            ts_row("02134", date(2020, 1, 1), 1.0, SeriesType::Historical),
        ];

        assert_eq!(zip_options(&rows), vec!["02134", "10", "9"]);
    }

    #[test]
    fn test_slice_for_zip_returns_only_matching_rows() {
        let dataset = scenario_dataset();

        let ts = slice_for_zip(&dataset.timeseries, "21201");
        assert_eq!(ts.len(), 3);
        assert!(ts.iter().all(|row| row.zip == "21201"));

        let summary = slice_for_zip(&dataset.summary, "21204");
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].current_value, 310_000.0);

        assert!(slice_for_zip(&dataset.timeseries, "99999").is_empty());
    }

    #[test]
    fn test_slices_partition_the_table() {
        let dataset = scenario_dataset();

        let mut rebuilt: Vec<TimeSeriesRow> = zip_options(&dataset.timeseries)
            .iter()
            .flat_map(|zip| slice_for_zip(&dataset.timeseries, zip))
            .collect();
        assert_eq!(rebuilt.len(), dataset.timeseries.len());

        let key = |row: &TimeSeriesRow| (row.zip.clone(), row.date, row.series_type.label());
        let mut original = dataset.timeseries.clone();
        original.sort_by_key(key);
        rebuilt.sort_by_key(key);
        assert_eq!(original, rebuilt);
    }
}
