// KPI Renderer - four headline metrics for one ZIP

use crate::data::SummaryRow;
use crate::format::{format_currency, format_percent};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaDirection {
    Up,
    Down,
    Flat,
}

impl DeltaDirection {
    fn of(value: f64) -> Self {
        if value > 0.0 {
            DeltaDirection::Up
        } else if value < 0.0 {
            DeltaDirection::Down
        } else {
            DeltaDirection::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            DeltaDirection::Up => "↑",
            DeltaDirection::Down => "↓",
            DeltaDirection::Flat => "→",
        }
    }
}

/// Change indicator shown under a metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delta {
    pub text: String,
    pub direction: DeltaDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiPanel {
    pub title: String,
    pub metrics: [Kpi; 4],
}

pub fn build_kpis(zip: &str, summary: &SummaryRow) -> KpiPanel {
    KpiPanel {
        title: format!("Key Metrics – ZIP {}", zip),
        metrics: [
            Kpi {
                label: "Current Median Value",
                value: format_currency(summary.current_value),
                delta: None,
            },
            Kpi {
                label: "Forecasted Value in 5 Years",
                value: format_currency(summary.forecast_5yr),
                delta: None,
            },
            Kpi {
                label: "5-Year Growth",
                value: format_percent(summary.growth_pct_5yr),
                delta: Some(Delta {
                    text: format_percent(summary.growth_pct_5yr),
                    direction: DeltaDirection::of(summary.growth_pct_5yr),
                }),
            },
            Kpi {
                label: "Annualized Growth (CAGR)",
                value: format_percent(summary.cagr),
                delta: None,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::summary_row;

    #[test]
    fn test_kpis_for_appreciating_zip() {
        let panel = build_kpis("21201", &summary_row("21201", 210_000.0, 250_000.0, 19.0, 3.5));

        assert_eq!(panel.title, "Key Metrics – ZIP 21201");
        let values: Vec<&str> = panel.metrics.iter().map(|k| k.value.as_str()).collect();
        assert_eq!(values, vec!["$210,000", "$250,000", "19.0%", "3.5%"]);

        let delta = panel.metrics[2].delta.as_ref().unwrap();
        assert_eq!(delta.text, "19.0%");
        assert_eq!(delta.direction, DeltaDirection::Up);
        assert!(panel.metrics[0].delta.is_none());
    }

    #[test]
    fn test_negative_growth_keeps_sign() {
        let panel = build_kpis("21204", &summary_row("21204", 310_000.0, 295_000.0, -4.8, -1.0));

        assert_eq!(panel.metrics[2].value, "-4.8%");
        assert_eq!(panel.metrics[3].value, "-1.0%");
        assert_eq!(panel.metrics[2].delta.as_ref().unwrap().direction, DeltaDirection::Down);
    }
}
