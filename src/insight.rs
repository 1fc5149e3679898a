// Insight Generator
// Direction from the latest historical value vs. the 5-year forecast;
// magnitude is the upstream growth percentage, taken verbatim.

use crate::data::{SeriesType, SummaryRow, TimeSeriesRow};
use crate::format::format_percent;
use serde::Serialize;

pub const INSUFFICIENT_DATA_NOTICE: &str =
    "Not enough historical data to generate insights for this ZIP.";

pub const DISCLOSURE: &str = "These estimates are based on Zillow ZHVI ZIP-level time-series data \
     and a Prophet forecasting model trained on historical trends.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Appreciate,
    Decline,
    Flat,
}

impl Direction {
    pub fn icon(&self) -> &'static str {
        match self {
            Direction::Appreciate => "📈",
            Direction::Decline => "📉",
            Direction::Flat => "⏸",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Insight {
    InsufficientData {
        message: &'static str,
    },
    Outlook {
        direction: Direction,
        latest_value: f64,
        forecast_value: f64,
        headline: String,
        disclosure: &'static str,
    },
}

impl Insight {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Insight::Outlook { direction, .. } => Some(*direction),
            Insight::InsufficientData { .. } => None,
        }
    }

    /// Full text as shown to the user
    pub fn text(&self) -> String {
        match self {
            Insight::InsufficientData { message } => message.to_string(),
            Insight::Outlook {
                direction,
                headline,
                disclosure,
                ..
            } => format!("{} {}\n{}", direction.icon(), headline, disclosure),
        }
    }
}

/// Latest historical value: the row with the greatest date, first one on ties
pub fn latest_historical_value(zip_ts: &[TimeSeriesRow]) -> Option<f64> {
    zip_ts
        .iter()
        .filter(|row| row.series_type == SeriesType::Historical)
        .fold(None::<&TimeSeriesRow>, |latest, row| match latest {
            Some(current) if current.date >= row.date => Some(current),
            _ => Some(row),
        })
        .map(|row| row.median_value)
}

pub fn generate_insight(zip: &str, zip_ts: &[TimeSeriesRow], summary: &SummaryRow) -> Insight {
    let Some(latest_value) = latest_historical_value(zip_ts) else {
        return Insight::InsufficientData {
            message: INSUFFICIENT_DATA_NOTICE,
        };
    };

    let forecast_value = summary.forecast_5yr;
    let growth = summary.growth_pct_5yr;

    let (direction, headline) = if forecast_value > latest_value {
        (
            Direction::Appreciate,
            format!(
                "ZIP {} is expected to appreciate by {} over the next 5 years.",
                zip,
                format_percent(growth)
            ),
        )
    } else if forecast_value < latest_value {
        (
            Direction::Decline,
            format!(
                "ZIP {} is expected to decline by {} over the next 5 years.",
                zip,
                format_percent(growth.abs())
            ),
        )
    } else {
        (
            Direction::Flat,
            format!("ZIP {} is expected to remain roughly flat over the next 5 years.", zip),
        )
    };

    Insight::Outlook {
        direction,
        latest_value,
        forecast_value,
        headline,
        disclosure: DISCLOSURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::*;
    use crate::filter::slice_for_zip;

    fn history(values: &[(i32, f64)]) -> Vec<TimeSeriesRow> {
        values
            .iter()
            .map(|(year, value)| ts_row("1", date(*year, 1, 31), *value, SeriesType::Historical))
            .collect()
    }

    #[test]
    fn test_appreciation_uses_growth_verbatim() {
        let dataset = scenario_dataset();
        let zip_ts = slice_for_zip(&dataset.timeseries, "21201");
        let insight = generate_insight("21201", &zip_ts, dataset.summary_for("21201").unwrap());

        assert_eq!(insight.direction(), Some(Direction::Appreciate));
        match &insight {
            Insight::Outlook { headline, latest_value, .. } => {
                assert_eq!(
                    headline,
                    "ZIP 21201 is expected to appreciate by 19.0% over the next 5 years."
                );
                assert_eq!(*latest_value, 210_000.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(insight.text().ends_with(DISCLOSURE));
    }

    #[test]
    fn test_decline_reports_absolute_growth() {
        let dataset = scenario_dataset();
        let zip_ts = slice_for_zip(&dataset.timeseries, "21204");
        let insight = generate_insight("21204", &zip_ts, dataset.summary_for("21204").unwrap());

        assert_eq!(insight.direction(), Some(Direction::Decline));
        assert!(insight
            .text()
            .contains("ZIP 21204 is expected to decline by 4.8% over the next 5 years."));
    }

    #[test]
    fn test_flat_when_values_equal() {
        let rows = history(&[(2020, 100.0), (2021, 150.0)]);
        let insight = generate_insight("1", &rows, &summary_row("1", 150.0, 150.0, 0.0, 0.0));

        assert_eq!(insight.direction(), Some(Direction::Flat));
        assert!(insight.text().contains("remain roughly flat"));
    }

    #[test]
    fn test_direction_follows_values_not_growth_sign() {
        // Upstream inconsistency is passed through, not corrected
        let rows = history(&[(2021, 100.0)]);
        let insight = generate_insight("1", &rows, &summary_row("1", 100.0, 120.0, -3.0, -1.0));

        assert_eq!(insight.direction(), Some(Direction::Appreciate));
        assert!(insight.text().contains("appreciate by -3.0%"));
    }

    #[test]
    fn test_direction_matches_comparison_across_values() {
        let latest = 200.0;
        let rows = history(&[(2019, 10.0), (2021, latest)]);

        for forecast in [0.0, 199.99, 200.0, 200.01, 1e9] {
            let insight = generate_insight("1", &rows, &summary_row("1", latest, forecast, 1.0, 1.0));
            let text = insight.text();

            assert_eq!(text.contains("appreciate"), forecast > latest);
            assert_eq!(text.contains("decline"), forecast < latest);
            assert_eq!(text.contains("flat"), forecast == latest);
        }
    }

    #[test]
    fn test_latest_value_uses_max_date_not_table_order() {
        let rows = vec![
            ts_row("1", date(2021, 1, 31), 100.0, SeriesType::Historical),
            ts_row("1", date(2021, 12, 31), 130.0, SeriesType::Historical),
            ts_row("1", date(2021, 6, 30), 120.0, SeriesType::Historical),
            ts_row("1", date(2030, 1, 31), 999.0, SeriesType::Forecast),
        ];

        assert_eq!(latest_historical_value(&rows), Some(130.0));
    }

    #[test]
    fn test_latest_value_tie_keeps_first_row() {
        let rows = vec![
            ts_row("1", date(2021, 12, 31), 1.0, SeriesType::Historical),
            ts_row("1", date(2021, 12, 31), 2.0, SeriesType::Historical),
        ];

        assert_eq!(latest_historical_value(&rows), Some(1.0));
    }

    #[test]
    fn test_forecast_only_is_insufficient() {
        let rows = vec![ts_row("21202", date(2026, 1, 31), 160_000.0, SeriesType::Forecast)];
        let insight = generate_insight("21202", &rows, &summary_row("21202", 1.0, 2.0, 3.0, 4.0));

        assert_eq!(insight.text(), INSUFFICIENT_DATA_NOTICE);
        assert!(insight.direction().is_none());
    }
}
