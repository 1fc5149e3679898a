use anyhow::{Context, Result};
use chrono::Datelike;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use zip_dashboard::chart::{X_AXIS_TITLE, Y_AXIS_TITLE};
use zip_dashboard::format::format_axis_currency;
use zip_dashboard::insight::Insight;
use zip_dashboard::kpi::DeltaDirection;
use zip_dashboard::page::PAGE_TITLE;
use zip_dashboard::table::{TABLE_COLUMNS, TABLE_PANEL_TITLE};
use zip_dashboard::{
    build_page, ChartSeries, ChartView, DashboardPage, DashboardResult, DataCache, PageState,
    TrendChart,
};

const FORECAST_COLOR: Color = Color::Rgb(255, 127, 14);
const HISTORICAL_COLOR: Color = Color::Rgb(31, 119, 180);

pub struct App {
    pub cache: DataCache,
    pub page: PageState,
    pub zip_state: ListState,
    pub table_state: TableState,
    pub show_table: bool,
    pub status: Option<String>,
}

impl App {
    /// Load through the cache and resolve the default ZIP
    pub fn new(cache: DataCache) -> DashboardResult<Self> {
        let page = build_page(&cache, None)?;

        let mut zip_state = ListState::default();
        if page.selection().map_or(false, |s| !s.options.is_empty()) {
            zip_state.select(Some(0));
        }

        Ok(Self {
            cache,
            page,
            zip_state,
            table_state: TableState::default(),
            show_table: false,
            status: None,
        })
    }

    pub fn options(&self) -> &[String] {
        self.page
            .selection()
            .map(|s| s.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_zip(&self) -> Option<&str> {
        self.page.selection().map(|s| s.selected.as_str())
    }

    /// Re-enter the page flow for the ZIP at `index` (data stays cached)
    pub fn select(&mut self, index: usize) {
        let Some(zip) = self.options().get(index).cloned() else {
            return;
        };

        match build_page(&self.cache, Some(&zip)) {
            Ok(page) => {
                self.page = page;
                self.zip_state.select(Some(index));
                self.table_state.select(None);
                self.status = None;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn next(&mut self) {
        let len = self.options().len();
        if len == 0 {
            return;
        }
        let i = match self.zip_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        let len = self.options().len();
        if len == 0 {
            return;
        }
        let i = match self.zip_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    pub fn toggle_table(&mut self) {
        self.show_table = !self.show_table;
    }

    pub fn scroll_table(&mut self, delta: isize) {
        let PageState::Rendered(page) = &self.page else {
            return;
        };
        let len = page.table.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    /// Drop the cache and read the files again, keeping the current ZIP
    pub fn reload(&mut self) {
        self.cache.clear();
        let zip = self.selected_zip().map(str::to_string);

        match build_page(&self.cache, zip.as_deref()) {
            Ok(page) => {
                let index = page
                    .selection()
                    .and_then(|s| s.options.iter().position(|o| *o == s.selected));
                self.page = page;
                self.zip_state.select(index);
                self.status = Some("Data reloaded".to_string());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, event::read);

    // Restore terminal before reporting anything
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Terminal UI stopped")
}

fn run_app<B, E>(terminal: &mut Terminal<B>, app: &mut App, mut next_event: E) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    E: FnMut() -> io::Result<Event>,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = next_event()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('t') | KeyCode::Enter => app.toggle_table(),
                KeyCode::PageDown => app.scroll_table(10),
                KeyCode::PageUp => app.scroll_table(-10),
                KeyCode::Char('r') => app.reload(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);

    if let PageState::NoData { message } = &app.page {
        render_message(f, chunks[1], message, Color::Red);
    } else {
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(0)])
            .split(chunks[1]);

        render_sidebar(f, content[0], app);
        match &app.page {
            PageState::NoZipMatch { message, .. } => {
                render_message(f, content[1], message, Color::Red)
            }
            PageState::Rendered(page) => {
                render_dashboard(f, content[1], page, app.show_table, &mut app.table_state)
            }
            PageState::NoData { .. } => {}
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        PAGE_TITLE,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_message(f: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .options()
        .iter()
        .map(|zip| ListItem::new(zip.clone()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" ZIP Code "))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(list, area, &mut app.zip_state);
}

fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    page: &DashboardPage,
    show_table: bool,
    table_state: &mut TableState,
) {
    let table_height = if show_table { Constraint::Percentage(35) } else { Constraint::Length(0) };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // KPIs
            Constraint::Min(8),    // Chart
            table_height,          // Table (collapsed by default)
            Constraint::Length(5), // Insight
        ])
        .split(area);

    render_kpis(f, chunks[0], page);
    match &page.chart {
        ChartView::Chart(chart) => render_chart(f, chunks[1], chart),
        other => render_message(f, chunks[1], other.notice().unwrap_or_default(), Color::Blue),
    }
    if show_table {
        render_table(f, chunks[2], page, table_state);
    }
    render_insight(f, chunks[3], &page.insight);
}

fn render_kpis(f: &mut Frame, area: Rect, page: &DashboardPage) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", page.kpis.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);

    for (kpi, col) in page.kpis.metrics.iter().zip(cols.iter()) {
        let mut lines = vec![
            Line::from(Span::styled(kpi.label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                kpi.value.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(delta) = &kpi.delta {
            let color = match delta.direction {
                DeltaDirection::Up => Color::Green,
                DeltaDirection::Down => Color::Red,
                DeltaDirection::Flat => Color::DarkGray,
            };
            lines.push(Line::from(Span::styled(
                format!("{} {}", delta.direction.arrow(), delta.text),
                Style::default().fg(color),
            )));
        }
        f.render_widget(Paragraph::new(lines), *col);
    }
}

fn render_chart(f: &mut Frame, area: Rect, chart: &TrendChart) {
    let series_points: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| s.points().iter().map(|p| (p.x(), p.value)).collect())
        .collect();

    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .zip(series_points.iter())
        .map(|(series, points)| {
            // Terminal cells cannot dash a line; the forecast uses sparser dots
            let (marker, color) = match series {
                ChartSeries::Historical(_) => (Marker::Braille, HISTORICAL_COLOR),
                ChartSeries::Forecast(_) => (Marker::Dot, FORECAST_COLOR),
            };
            Dataset::default()
                .name(series.series_type().label())
                .marker(marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(points)
        })
        .collect();

    let (start, end) = chart.x_domain;
    let mut x_bounds = [start.num_days_from_ce() as f64, end.num_days_from_ce() as f64];
    if x_bounds[0] >= x_bounds[1] {
        x_bounds = [x_bounds[0] - 1.0, x_bounds[1] + 1.0];
    }

    let x_labels = vec![
        Span::raw(start.format("%Y").to_string()),
        Span::raw(end.format("%Y").to_string()),
    ];
    let y_labels: Vec<Span> = [chart.y_domain.0, (chart.y_domain.0 + chart.y_domain.1) / 2.0, chart.y_domain.1]
        .iter()
        .map(|v| Span::raw(format_axis_currency(*v)))
        .collect();

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Historical Trend and 5-Year Forecast "),
        )
        .x_axis(
            Axis::default()
                .title(X_AXIS_TITLE)
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Y_AXIS_TITLE)
                .style(Style::default().fg(Color::Gray))
                .bounds([chart.y_domain.0, chart.y_domain.1])
                .labels(y_labels),
        );

    f.render_widget(widget, area);
}

fn render_table(f: &mut Frame, area: Rect, page: &DashboardPage, table_state: &mut TableState) {
    let header = Row::new(TABLE_COLUMNS.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = page.table.rows.iter().map(|row| {
        Row::new(row.cells().into_iter().map(Cell::from)).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", TABLE_PANEL_TITLE)),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, table_state);
}

fn render_insight(f: &mut Frame, area: Rect, insight: &Insight) {
    let lines = match insight {
        Insight::InsufficientData { message } => vec![Line::from(*message)],
        Insight::Outlook {
            direction,
            headline,
            disclosure,
            ..
        } => vec![
            Line::from(Span::styled(
                format!("{} {}", direction.icon(), headline),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(*disclosure, Style::default().fg(Color::DarkGray))),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Automated Insights "));

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(zip) = app.selected_zip() {
        status_spans.push(Span::styled(format!(" ZIP: {} ", zip), Style::default().fg(Color::Cyan)));
        status_spans.push(Span::raw(" | "));
    }
    if let Some(status) = &app.status {
        status_spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" ZIP | "));
    status_spans.push(Span::styled("t", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(if app.show_table { " Hide data | " } else { " Show data | " }));
    status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Reload | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use zip_dashboard::{SeriesType, SummaryRow, TimeSeriesRow};

    fn ts(zip: &str, year: i32, value: f64, series_type: SeriesType) -> TimeSeriesRow {
        TimeSeriesRow {
            zip: zip.to_string(),
            date: NaiveDate::from_ymd_opt(year, 1, 31).unwrap(),
            median_value: value,
            series_type,
        }
    }

    fn summary(zip: &str, current: f64, forecast: f64, growth: f64) -> SummaryRow {
        SummaryRow {
            zip: zip.to_string(),
            current_value: current,
            forecast_5yr: forecast,
            growth_pct_5yr: growth,
            cagr: 1.0,
        }
    }

    fn test_app() -> App {
        let dataset = zip_dashboard::Dataset::new(
            vec![
                ts("21201", 2020, 200_000.0, SeriesType::Historical),
                ts("21201", 2021, 210_000.0, SeriesType::Historical),
                ts("21201", 2026, 250_000.0, SeriesType::Forecast),
                ts("21204", 2021, 310_000.0, SeriesType::Historical),
                ts("21286", 2021, 280_000.0, SeriesType::Historical),
            ],
            vec![
                summary("21201", 210_000.0, 250_000.0, 19.0),
                summary("21204", 310_000.0, 295_000.0, -4.8),
            ],
        );
        App::new(DataCache::preloaded(dataset)).unwrap()
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    /// Replays `events`, then fails like a closed terminal
    fn scripted(events: Vec<Event>) -> impl FnMut() -> io::Result<Event> {
        let mut events = VecDeque::from(events);
        move || {
            events
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))
        }
    }

    #[test]
    fn test_event_loop_handles_keys_until_quit() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();

        let res = run_app(&mut terminal, &mut app, scripted(vec![key('j'), key('t'), key('q')]));

        assert!(res.is_ok());
        assert_eq!(app.selected_zip(), Some("21204"));
        assert!(app.show_table);
    }

    #[test]
    fn test_event_loop_returns_input_errors() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();

        let err = run_app(&mut terminal, &mut app, scripted(vec![key('j')])).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(app.selected_zip(), Some("21204"));
    }

    #[test]
    fn test_app_starts_on_first_zip() {
        let app = test_app();
        assert_eq!(app.selected_zip(), Some("21201"));
        assert_eq!(app.options(), ["21201", "21204", "21286"]);
        assert!(!app.show_table);
    }

    #[test]
    fn test_navigation_wraps_and_reresolves() {
        let mut app = test_app();

        app.next();
        assert_eq!(app.selected_zip(), Some("21204"));
        assert!(matches!(app.page, PageState::Rendered(_)));

        app.next();
        assert_eq!(app.selected_zip(), Some("21286"));
        assert!(matches!(app.page, PageState::NoZipMatch { .. }));

        app.next();
        assert_eq!(app.selected_zip(), Some("21201"));

        app.previous();
        assert_eq!(app.selected_zip(), Some("21286"));
    }

    #[test]
    fn test_screen_shows_kpis_chart_and_insight() {
        let mut app = test_app();
        let text = screen(&mut app);

        assert!(text.contains("$210,000"));
        assert!(text.contains("$250,000"));
        assert!(text.contains("Historical Trend and 5-Year Forecast"));
        assert!(text.contains("appreciate by 19.0%"));
        assert!(!text.contains(TABLE_PANEL_TITLE));
    }

    #[test]
    fn test_table_toggle_and_scroll() {
        let mut app = test_app();
        app.toggle_table();

        let text = screen(&mut app);
        assert!(text.contains(TABLE_PANEL_TITLE));
        assert!(text.contains("2020-01-31"));

        app.scroll_table(10);
        assert_eq!(app.table_state.selected(), Some(2));
        app.scroll_table(-10);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_no_zip_match_screen() {
        let mut app = test_app();
        app.select(2);

        let text = screen(&mut app);
        assert!(text.contains("No summary data found for ZIP 21286."));
        assert!(!text.contains("Key Metrics"));
    }

    #[test]
    fn test_empty_data_screen_has_no_sidebar() {
        let mut app = App::new(DataCache::preloaded(zip_dashboard::Dataset::default())).unwrap();
        assert!(app.options().is_empty());

        let text = screen(&mut app);
        assert!(text.contains("Processed data files are empty or missing."));
        assert!(!text.contains("ZIP Code"));
    }
}
