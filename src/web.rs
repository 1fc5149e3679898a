//! Browser rendering of a resolved page
//!
//! Produces a self-contained HTML document (inline CSS, inline SVG chart and
//! a few lines of JavaScript for the ZIP selector and table sorting).

use crate::chart::ChartView;
use crate::error::DashboardError;
use crate::format::html_escape;
use crate::insight::Insight;
use crate::kpi::{DeltaDirection, KpiPanel};
use crate::page::{DashboardPage, PageState, ZipSelection, PAGE_TITLE};
use crate::table::{DataTable, TABLE_COLUMNS, TABLE_PANEL_TITLE};

const BROWSER_TITLE: &str = "Baltimore County 5-Year Real Estate Price Forecast";

pub fn render_page(state: &PageState) -> String {
    let body = match state {
        PageState::NoData { message } => render_error_block(message),
        PageState::NoZipMatch { selection, message } => format!(
            "{}{}<main>{}</main>",
            render_header(),
            render_sidebar(selection),
            render_error_block(message)
        ),
        PageState::Rendered(page) => render_dashboard(page),
    };

    render_document(&body)
}

/// Page shown when the data files cannot be loaded
pub fn render_load_error(err: &DashboardError) -> String {
    render_document(&render_error_block(&err.to_string()))
}

fn render_document(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {body}
    </div>
    <script>{js}</script>
</body>
</html>"#,
        title = BROWSER_TITLE,
        css = inline_css(),
        js = inline_javascript(),
        body = body,
    )
}

fn render_dashboard(page: &DashboardPage) -> String {
    format!(
        "{header}{sidebar}<main>{kpis}{chart}{table}{insight}</main>",
        header = render_header(),
        sidebar = render_sidebar(&page.selection),
        kpis = render_kpis(&page.kpis),
        chart = render_chart(&page.chart),
        table = render_table(&page.table),
        insight = render_insight(&page.insight),
    )
}

fn render_header() -> String {
    format!(
        r#"<header>
            <h1>{title}</h1>
            <p>This dashboard uses historical <strong>Zillow Home Value Index (ZHVI)</strong> data to model and
            forecast typical home values in <strong>Baltimore County, MD</strong> for the next 5 years.</p>
            <p><strong>Personas:</strong> Home buyers, real estate investors, and real estate agents.<br>
            <strong>KPIs:</strong> Current median price, forecasted median price in 5 years, 5-year % growth, annualized growth (CAGR).</p>
        </header>"#,
        title = html_escape(PAGE_TITLE),
    )
}

fn render_sidebar(selection: &ZipSelection) -> String {
    // A ZIP requested by URL may be missing from the options; list it first so
    // the select shows what the page shows.
    let requested = if selection.options.contains(&selection.selected) {
        String::new()
    } else {
        format!(
            r#"<option value="{zip}" selected>{zip}</option>"#,
            zip = html_escape(&selection.selected),
        )
    };

    let options: String = selection
        .options
        .iter()
        .map(|zip| {
            let selected = if *zip == selection.selected { " selected" } else { "" };
            format!(
                r#"<option value="{zip}"{selected}>{zip}</option>"#,
                zip = html_escape(zip),
                selected = selected,
            )
        })
        .collect();

    format!(
        r#"<aside class="sidebar">
            <h2>Filters</h2>
            <form method="get" action="/">
                <label for="zip">Select ZIP Code</label>
                <select id="zip" name="zip" data-autosubmit>{requested}{options}</select>
                <noscript><button type="submit">Apply</button></noscript>
            </form>
            <a class="json-link" href="/api/zips/{encoded}">View as JSON</a>
        </aside>"#,
        requested = requested,
        options = options,
        encoded = urlencoding::encode(&selection.selected),
    )
}

fn render_kpis(panel: &KpiPanel) -> String {
    let cards: String = panel
        .metrics
        .iter()
        .map(|kpi| {
            let delta = kpi
                .delta
                .as_ref()
                .map(|d| {
                    let class = match d.direction {
                        DeltaDirection::Up => "up",
                        DeltaDirection::Down => "down",
                        DeltaDirection::Flat => "flat",
                    };
                    format!(
                        r#"<div class="delta {}">{} {}</div>"#,
                        class,
                        d.direction.arrow(),
                        html_escape(&d.text)
                    )
                })
                .unwrap_or_default();

            format!(
                r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div>{}</div>"#,
                html_escape(kpi.label),
                html_escape(&kpi.value),
                delta
            )
        })
        .collect();

    format!(
        r#"<section class="kpis"><h2>{}</h2><div class="metrics">{}</div></section>"#,
        html_escape(&panel.title),
        cards
    )
}

fn render_chart(chart: &ChartView) -> String {
    let content = match chart {
        ChartView::Chart(trend) => trend.to_svg(),
        other => render_notice(other.notice().unwrap_or_default()),
    };

    format!(
        r#"<section class="trend"><h2>Historical Trend and 5-Year Forecast</h2>{}</section>"#,
        content
    )
}

fn render_table(table: &DataTable) -> String {
    let header: String = TABLE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| format!(r#"<th data-col="{}">{}</th>"#, i, name))
        .collect();

    let rows: String = table
        .rows
        .iter()
        .map(|row| {
            let cells = row.cells();
            let sort_keys = [
                cells[0].clone(),
                cells[1].clone(),
                format!("{}", row.median_value),
                cells[3].clone(),
            ];
            let tds: String = cells
                .iter()
                .zip(sort_keys.iter())
                .map(|(text, key)| {
                    format!(
                        r#"<td data-sort="{}">{}</td>"#,
                        html_escape(key),
                        html_escape(text)
                    )
                })
                .collect();
            format!("<tr>{}</tr>", tds)
        })
        .collect();

    format!(
        r#"<details class="data-table"><summary>{title}</summary>
            <table class="sortable"><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>
        </details>"#,
        title = TABLE_PANEL_TITLE,
        header = header,
        rows = rows,
    )
}

fn render_insight(insight: &Insight) -> String {
    let content = match insight {
        Insight::InsufficientData { message } => format!("<p>{}</p>", html_escape(message)),
        Insight::Outlook {
            direction,
            headline,
            disclosure,
            ..
        } => format!(
            r#"<p class="headline">{} <strong>{}</strong></p><p>{}</p>"#,
            direction.icon(),
            html_escape(headline),
            html_escape(disclosure)
        ),
    };

    format!(
        r#"<section class="insights"><h2>Automated Insights</h2>{}</section>"#,
        content
    )
}

fn render_notice(message: &str) -> String {
    format!(r#"<div class="notice info">{}</div>"#, html_escape(message))
}

fn render_error_block(message: &str) -> String {
    format!(r#"<div class="notice error">{}</div>"#, html_escape(message))
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; color: #111827; background: #ffffff; }
.container { max-width: 1400px; margin: 0 auto; padding: 2rem; display: grid; grid-template-columns: 240px 1fr; gap: 2rem; }
header { grid-column: 1 / -1; padding-bottom: 1rem; border-bottom: 2px solid #e5e7eb; }
header h1 { font-size: 2rem; margin-bottom: 0.5rem; }
header p { color: #374151; margin-bottom: 0.5rem; }
.sidebar { background: #f9fafb; padding: 1rem; border-radius: 8px; align-self: start; }
.sidebar label { display: block; font-size: 0.875rem; margin: 0.5rem 0 0.25rem; }
.sidebar select { width: 100%; padding: 0.4rem; }
.json-link { display: inline-block; margin-top: 1rem; font-size: 0.8rem; color: #6b7280; }
main section, main details { margin-bottom: 2rem; }
h2 { font-size: 1.25rem; margin-bottom: 0.75rem; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric .label { font-size: 0.875rem; color: #6b7280; }
.metric .value { font-size: 1.75rem; font-weight: 600; }
.delta { font-size: 0.875rem; }
.delta.up { color: #15803d; }
.delta.down { color: #b91c1c; }
.delta.flat { color: #6b7280; }
.notice { padding: 0.75rem 1rem; border-radius: 6px; }
.notice.info { background: #eff6ff; color: #1e40af; }
.notice.error { grid-column: 1 / -1; background: #fef2f2; color: #991b1b; }
details summary { cursor: pointer; font-weight: 600; }
table { width: 100%; border-collapse: collapse; margin-top: 0.75rem; font-size: 0.875rem; }
th, td { text-align: left; padding: 0.4rem 0.75rem; border-bottom: 1px solid #e5e7eb; }
th { cursor: pointer; background: #f3f4f6; user-select: none; }
.headline { font-size: 1.1rem; margin-bottom: 0.5rem; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
document.querySelectorAll('select[data-autosubmit]').forEach(function (select) {
    select.addEventListener('change', function () { select.form.submit(); });
});
document.querySelectorAll('table.sortable').forEach(function (table) {
    table.querySelectorAll('th').forEach(function (th) {
        th.addEventListener('click', function () {
            var col = Number(th.dataset.col);
            var asc = th.dataset.dir !== 'asc';
            th.dataset.dir = asc ? 'asc' : 'desc';
            var body = table.tBodies[0];
            var rows = Array.from(body.rows);
            rows.sort(function (a, b) {
                var x = a.cells[col].dataset.sort, y = b.cells[col].dataset.sort;
                var nx = parseFloat(x), ny = parseFloat(y);
                var cmp = (col === 2 && !isNaN(nx) && !isNaN(ny)) ? nx - ny : x.localeCompare(y);
                return asc ? cmp : -cmp;
            });
            rows.forEach(function (row) { body.appendChild(row); });
        });
    });
});
"#
}
