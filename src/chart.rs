// Trend Chart Renderer
// Historical and forecast values drawn as two line series on shared axes

use crate::data::{SeriesType, TimeSeriesRow};
use crate::format::{format_axis_currency, format_currency, html_escape};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt::Write;

pub const NO_DATA_NOTICE: &str = "No time series data available for this ZIP.";
pub const NO_HISTORICAL_NOTICE: &str = "No historical data available for this ZIP.";

pub const X_AXIS_TITLE: &str = "Year";
pub const Y_AXIS_TITLE: &str = "Typical Home Value ($)";

const SVG_WIDTH: f64 = 900.0;
const SVG_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 36.0;
const MARGIN_BOTTOM: f64 = 56.0;
const MAX_YEAR_TICKS: usize = 12;
const TARGET_VALUE_TICKS: f64 = 5.0;

// ============================================================================
// SERIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ChartPoint {
    /// Position on the time axis, in days
    pub fn x(&self) -> f64 {
        self.date.num_days_from_ce() as f64
    }
}

fn points_of(rows: &[TimeSeriesRow], series_type: SeriesType) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = rows
        .iter()
        .filter(|row| row.series_type == series_type)
        .map(|row| ChartPoint {
            date: row.date,
            value: row.median_value,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries(pub Vec<ChartPoint>);

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries(pub Vec<ChartPoint>);

impl HistoricalSeries {
    pub fn from_rows(rows: &[TimeSeriesRow]) -> Self {
        HistoricalSeries(points_of(rows, SeriesType::Historical))
    }
}

impl ForecastSeries {
    pub fn from_rows(rows: &[TimeSeriesRow]) -> Self {
        ForecastSeries(points_of(rows, SeriesType::Forecast))
    }
}

/// Stroke settings for one line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub stroke_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "points")]
pub enum ChartSeries {
    Historical(Vec<ChartPoint>),
    Forecast(Vec<ChartPoint>),
}

impl From<HistoricalSeries> for ChartSeries {
    fn from(series: HistoricalSeries) -> Self {
        ChartSeries::Historical(series.0)
    }
}

impl From<ForecastSeries> for ChartSeries {
    fn from(series: ForecastSeries) -> Self {
        ChartSeries::Forecast(series.0)
    }
}

impl ChartSeries {
    pub fn series_type(&self) -> SeriesType {
        match self {
            ChartSeries::Historical(_) => SeriesType::Historical,
            ChartSeries::Forecast(_) => SeriesType::Forecast,
        }
    }

    pub fn points(&self) -> &[ChartPoint] {
        match self {
            ChartSeries::Historical(points) | ChartSeries::Forecast(points) => points,
        }
    }

    pub fn style(&self) -> LineStyle {
        match self {
            ChartSeries::Historical(_) => LineStyle {
                color: "#1f77b4",
                stroke_width: 2.0,
                dash: None,
            },
            ChartSeries::Forecast(_) => LineStyle {
                color: "#ff7f0e",
                stroke_width: 2.0,
                dash: Some("4 4"),
            },
        }
    }
}

// ============================================================================
// CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub series: Vec<ChartSeries>,
    pub x_domain: (NaiveDate, NaiveDate),
    pub y_domain: (f64, f64),
    pub x_ticks: Vec<NaiveDate>,
    pub y_ticks: Vec<f64>,
}

impl TrendChart {
    /// Put both series on one coordinate space
    pub fn compose(historical: HistoricalSeries, forecast: Option<ForecastSeries>) -> Self {
        let mut series = vec![ChartSeries::from(historical)];
        if let Some(forecast) = forecast.filter(|f| !f.0.is_empty()) {
            series.push(ChartSeries::from(forecast));
        }

        let all_points = || series.iter().flat_map(|s| s.points().iter());

        let x_min = all_points().map(|p| p.date).min().unwrap_or_default();
        let x_max = all_points().map(|p| p.date).max().unwrap_or(x_min);

        let v_min = all_points().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let v_max = all_points().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        let (y_domain, y_ticks) = value_axis(v_min, v_max);

        Self {
            x_ticks: year_ticks(x_min, x_max),
            x_domain: (x_min, x_max),
            y_domain,
            y_ticks,
            series,
        }
    }

    pub fn historical(&self) -> Option<&[ChartPoint]> {
        self.series
            .iter()
            .find(|s| s.series_type() == SeriesType::Historical)
            .map(ChartSeries::points)
    }

    pub fn forecast(&self) -> Option<&[ChartPoint]> {
        self.series
            .iter()
            .find(|s| s.series_type() == SeriesType::Forecast)
            .map(ChartSeries::points)
    }

    fn plot_width() -> f64 {
        SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        SVG_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn scale_x(&self, date: NaiveDate) -> f64 {
        let span = (self.x_domain.1 - self.x_domain.0).num_days() as f64;
        if span <= 0.0 {
            return MARGIN_LEFT + Self::plot_width() / 2.0;
        }
        let offset = (date - self.x_domain.0).num_days() as f64;
        MARGIN_LEFT + Self::plot_width() * offset / span
    }

    fn scale_y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_domain;
        MARGIN_TOP + Self::plot_height() * (1.0 - (value - lo) / (hi - lo))
    }

    /// Self-contained SVG; each point carries a hover tooltip
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg class="trend-chart" viewBox="0 0 {w} {h}" width="100%" height="{h}" preserveAspectRatio="xMidYMid meet" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="Historical trend and 5-year forecast">"#,
            w = SVG_WIDTH,
            h = SVG_HEIGHT,
        );

        self.write_value_axis(&mut svg);
        self.write_time_axis(&mut svg);
        for series in &self.series {
            self.write_series(&mut svg, series);
        }
        self.write_legend(&mut svg);

        svg.push_str("</svg>");
        svg
    }

    fn write_value_axis(&self, svg: &mut String) {
        let x0 = MARGIN_LEFT;
        let x1 = SVG_WIDTH - MARGIN_RIGHT;

        for tick in &self.y_ticks {
            let y = self.scale_y(*tick);
            let _ = write!(
                svg,
                r##"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="#e5e7eb" stroke-width="1"/><text x="{lx:.1}" y="{ty:.1}" text-anchor="end" font-size="11" fill="#4b5563">{label}</text>"##,
                lx = x0 - 8.0,
                ty = y + 4.0,
                label = html_escape(&format_axis_currency(*tick)),
            );
        }

        let mid = MARGIN_TOP + Self::plot_height() / 2.0;
        let _ = write!(
            svg,
            r##"<text x="18" y="{mid:.1}" transform="rotate(-90 18 {mid:.1})" text-anchor="middle" font-size="12" fill="#111827">{title}</text>"##,
            title = html_escape(Y_AXIS_TITLE),
        );
    }

    fn write_time_axis(&self, svg: &mut String) {
        let base = MARGIN_TOP + Self::plot_height();
        let _ = write!(
            svg,
            r##"<line x1="{x0:.1}" y1="{base:.1}" x2="{x1:.1}" y2="{base:.1}" stroke="#9ca3af" stroke-width="1"/>"##,
            x0 = MARGIN_LEFT,
            x1 = SVG_WIDTH - MARGIN_RIGHT,
        );

        for tick in &self.x_ticks {
            let x = self.scale_x(*tick);
            let _ = write!(
                svg,
                r##"<line x1="{x:.1}" y1="{base:.1}" x2="{x:.1}" y2="{end:.1}" stroke="#9ca3af" stroke-width="1"/><text x="{x:.1}" y="{ty:.1}" text-anchor="middle" font-size="11" fill="#4b5563">{year}</text>"##,
                end = base + 5.0,
                ty = base + 18.0,
                year = tick.year(),
            );
        }

        let _ = write!(
            svg,
            r##"<text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" font-size="12" fill="#111827">{title}</text>"##,
            cx = MARGIN_LEFT + Self::plot_width() / 2.0,
            ty = SVG_HEIGHT - 12.0,
            title = X_AXIS_TITLE,
        );
    }

    fn write_series(&self, svg: &mut String, series: &ChartSeries) {
        let style = series.style();
        let points = series.points();
        if points.is_empty() {
            return;
        }

        let path = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let cmd = if i == 0 { 'M' } else { 'L' };
                format!("{}{:.1},{:.1}", cmd, self.scale_x(p.date), self.scale_y(p.value))
            })
            .collect::<Vec<_>>()
            .join(" ");

        let dash = style
            .dash
            .map(|d| format!(r#" stroke-dasharray="{}""#, d))
            .unwrap_or_default();

        let _ = write!(
            svg,
            r#"<g class="series series-{kind}"><path d="{path}" fill="none" stroke="{color}" stroke-width="{width}"{dash}/>"#,
            kind = series.series_type().label().to_lowercase(),
            color = style.color,
            width = style.stroke_width,
        );

        for point in points {
            let _ = write!(
                svg,
                r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="3" fill="{color}" fill-opacity="0.001"><title>{tooltip}</title></circle>"#,
                cx = self.scale_x(point.date),
                cy = self.scale_y(point.value),
                color = style.color,
                tooltip = tooltip(point, series.series_type()),
            );
        }

        svg.push_str("</g>");
    }

    fn write_legend(&self, svg: &mut String) {
        let mut x = SVG_WIDTH - MARGIN_RIGHT - 90.0 * self.series.len() as f64;
        for series in &self.series {
            let style = series.style();
            let dash = style
                .dash
                .map(|d| format!(r#" stroke-dasharray="{}""#, d))
                .unwrap_or_default();
            let _ = write!(
                svg,
                r##"<line x1="{x:.1}" y1="14" x2="{x2:.1}" y2="14" stroke="{color}" stroke-width="{width}"{dash}/><text x="{tx:.1}" y="18" font-size="11" fill="#111827">{label}</text>"##,
                x2 = x + 20.0,
                tx = x + 26.0,
                color = style.color,
                width = style.stroke_width,
                label = series.series_type().label(),
            );
            x += 90.0;
        }
    }
}

/// Hover text: year, dollar value and series type
pub fn tooltip(point: &ChartPoint, series_type: SeriesType) -> String {
    format!(
        "Year: {}&#10;Value: {}&#10;Type: {}",
        point.date.year(),
        format_currency(point.value),
        series_type.label()
    )
}

/// Linear value domain containing zero, with evenly spaced round ticks
fn value_axis(v_min: f64, v_max: f64) -> ((f64, f64), Vec<f64>) {
    if !v_min.is_finite() || !v_max.is_finite() {
        return ((0.0, 1.0), vec![0.0, 1.0]);
    }

    let lo = v_min.min(0.0);
    let mut hi = v_max.max(0.0);
    if hi <= lo {
        hi = lo + 1.0;
    }

    let step = nice_step((hi - lo) / TARGET_VALUE_TICKS);
    let lo = (lo / step).floor() * step;
    let hi = (hi / step).ceil() * step;

    let count = ((hi - lo) / step).round() as usize;
    let ticks = (0..=count).map(|i| lo + step * i as f64).collect();

    ((lo, hi), ticks)
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// January 1st of each year inside the domain, thinned to a readable count
fn year_ticks(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let first_year = if start.month() == 1 && start.day() == 1 {
        start.year()
    } else {
        start.year() + 1
    };

    let years: Vec<i32> = (first_year..=end.year()).collect();
    if years.is_empty() {
        return vec![start];
    }

    let stride = years.len().div_ceil(MAX_YEAR_TICKS);
    years
        .into_iter()
        .step_by(stride.max(1))
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        .collect()
}

// ============================================================================
// VIEW
// ============================================================================

/// What the chart section shows for one ZIP
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "chart", rename_all = "snake_case")]
pub enum ChartView {
    NoData,
    /// Forecast rows exist but there is nothing to anchor them to; the
    /// forecast line is omitted along with the historical one.
    NoHistorical,
    Chart(TrendChart),
}

impl ChartView {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            ChartView::NoData => Some(NO_DATA_NOTICE),
            ChartView::NoHistorical => Some(NO_HISTORICAL_NOTICE),
            ChartView::Chart(_) => None,
        }
    }
}

pub fn build_trend(zip_ts: &[TimeSeriesRow]) -> ChartView {
    let historical = HistoricalSeries::from_rows(zip_ts);
    let forecast = ForecastSeries::from_rows(zip_ts);

    match (historical.0.is_empty(), forecast.0.is_empty()) {
        (true, true) => ChartView::NoData,
        (true, false) => ChartView::NoHistorical,
        (false, _) => ChartView::Chart(TrendChart::compose(historical, Some(forecast))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::*;
    use crate::filter::slice_for_zip;

    fn chart_for(zip: &str) -> TrendChart {
        let dataset = scenario_dataset();
        match build_trend(&slice_for_zip(&dataset.timeseries, zip)) {
            ChartView::Chart(chart) => chart,
            other => panic!("expected a chart, got {:?}", other),
        }
    }

    #[test]
    fn test_both_series_sorted_on_shared_axes() {
        let chart = chart_for("21201");

        let historical = chart.historical().unwrap();
        assert_eq!(
            historical.iter().map(|p| p.date).collect::<Vec<_>>(),
            vec![date(2020, 1, 31), date(2021, 1, 31)]
        );
        assert_eq!(chart.forecast().unwrap().len(), 1);

        assert_eq!(chart.x_domain, (date(2020, 1, 31), date(2026, 1, 31)));
        assert_eq!(chart.y_domain, (0.0, 250_000.0));
        assert_eq!(chart.y_ticks.len(), 6);
        assert_eq!(
            chart.x_ticks.iter().map(|d| d.year()).collect::<Vec<_>>(),
            vec![2021, 2022, 2023, 2024, 2025, 2026]
        );
    }

    #[test]
    fn test_no_forecast_draws_historical_only() {
        let chart = chart_for("21204");
        assert_eq!(chart.series.len(), 1);
        assert!(chart.forecast().is_none());

        let svg = chart.to_svg();
        assert!(!svg.contains("stroke-dasharray"));
        assert!(svg.contains("series-historical"));
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let view = build_trend(&[]);
        assert_eq!(view, ChartView::NoData);
        assert_eq!(view.notice(), Some(NO_DATA_NOTICE));
    }

    #[test]
    fn test_forecast_without_history_is_omitted() {
        let rows = vec![ts_row("21202", date(2026, 1, 31), 160_000.0, SeriesType::Forecast)];
        let view = build_trend(&rows);

        assert_eq!(view, ChartView::NoHistorical);
        assert_eq!(view.notice(), Some(NO_HISTORICAL_NOTICE));
    }

    #[test]
    fn test_svg_styles_and_tooltips() {
        let svg = chart_for("21201").to_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"stroke="#1f77b4""##));
        assert!(svg.contains(r##"stroke="#ff7f0e" stroke-width="2" stroke-dasharray="4 4""##));
        assert!(svg.contains("<title>Year: 2020&#10;Value: $200,000&#10;Type: Historical</title>"));
        assert!(svg.contains("<title>Year: 2026&#10;Value: $250,000&#10;Type: Forecast</title>"));
        assert!(svg.contains(Y_AXIS_TITLE));
        assert!(svg.contains(">$250K<"));
    }

    #[test]
    fn test_single_point_chart_is_centered() {
        let rows = vec![ts_row("1", date(2020, 6, 30), 100.0, SeriesType::Historical)];
        let ChartView::Chart(chart) = build_trend(&rows) else {
            panic!("expected chart");
        };

        assert_eq!(chart.x_ticks, vec![date(2020, 6, 30)]);
        assert!(chart.to_svg().contains(r#"<path d="M478.0,36.0"#));
    }

    #[test]
    fn test_value_axis_includes_negative_values() {
        let ((lo, hi), ticks) = value_axis(-30.0, 70.0);
        assert_eq!((lo, hi), (-40.0, 80.0));
        assert_eq!(ticks.first(), Some(&-40.0));
        assert_eq!(ticks.last(), Some(&80.0));
    }

    #[test]
    fn test_year_ticks_are_thinned() {
        let ticks = year_ticks(date(1996, 1, 31), date(2030, 12, 31));
        assert!(ticks.len() <= MAX_YEAR_TICKS);
        assert_eq!(ticks[0], date(1997, 1, 1));
    }
}
