use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fraud_hunter::{
    detect_columns, run_analysis, AnalysisConfig, AnalysisReport, ColumnMapping, CurrencyFormat,
    RawTable, Section, Transaction,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

pub const THRESHOLD_STEP: f64 = 500.0;
pub const THRESHOLD_MIN: f64 = 1_000.0;
pub const THRESHOLD_MAX: f64 = 50_000.0;
const INSPECTOR_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Mapping,
    Overview,
    Forensic,
    Details,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Mapping, Page::Overview, Page::Forensic, Page::Details];

    pub fn next(&self) -> Self {
        match self {
            Page::Mapping => Page::Overview,
            Page::Overview => Page::Forensic,
            Page::Forensic => Page::Details,
            Page::Details => Page::Mapping,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Mapping => Page::Details,
            Page::Overview => Page::Mapping,
            Page::Forensic => Page::Overview,
            Page::Details => Page::Forensic,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Mapping => "Column Mapping",
            Page::Overview => "Overview",
            Page::Forensic => "Forensic Analysis",
            Page::Details => "Detailed Findings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingField {
    Date,
    Amount,
    Vendor,
}

impl MappingField {
    pub fn label(&self) -> &str {
        match self {
            MappingField::Date => "Date",
            MappingField::Amount => "Amount",
            MappingField::Vendor => "Vendor",
        }
    }

    fn next(&self) -> Self {
        match self {
            MappingField::Date => MappingField::Amount,
            MappingField::Amount => MappingField::Vendor,
            MappingField::Vendor => MappingField::Date,
        }
    }

    fn previous(&self) -> Self {
        match self {
            MappingField::Date => MappingField::Vendor,
            MappingField::Amount => MappingField::Date,
            MappingField::Vendor => MappingField::Amount,
        }
    }
}

pub struct App {
    pub raw: RawTable,
    pub mapping: ColumnMapping,
    pub selected_field: MappingField,
    pub config: AnalysisConfig,
    pub currency: CurrencyFormat,
    pub current_page: Page,
    pub report: Option<AnalysisReport>,
    pub detail_section: Section,
    pub detail_state: TableState,
    pub status: Option<String>,
}

impl App {
    pub fn new(raw: RawTable, config: AnalysisConfig) -> Self {
        let mapping = ColumnMapping::for_dashboard(detect_columns(&raw.headers), raw.headers.len());

        Self {
            raw,
            mapping,
            selected_field: MappingField::Date,
            config,
            currency: CurrencyFormat::default(),
            current_page: Page::Mapping,
            report: None,
            detail_section: Section::Duplicates,
            detail_state: TableState::default(),
            status: None,
        }
    }

    pub fn column_for(&self, field: MappingField) -> Option<usize> {
        match field {
            MappingField::Date => Some(self.mapping.date),
            MappingField::Amount => Some(self.mapping.amount),
            MappingField::Vendor => self.mapping.vendor,
        }
    }

    pub fn column_name(&self, field: MappingField) -> &str {
        self.column_for(field)
            .and_then(|c| self.raw.headers.get(c))
            .map(String::as_str)
            .unwrap_or("-")
    }

    // ------------------------------------------------------------------
    // Mapping page
    // ------------------------------------------------------------------

    pub fn next_field(&mut self) {
        self.selected_field = self.selected_field.next();
    }

    pub fn previous_field(&mut self) {
        self.selected_field = self.selected_field.previous();
    }

    /// Move the selected field to the next (or previous) column, wrapping
    pub fn cycle_column(&mut self, forward: bool) {
        let count = self.raw.headers.len();
        if count == 0 {
            return;
        }

        let current = self.column_for(self.selected_field).unwrap_or(0);
        let column = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };

        match self.selected_field {
            MappingField::Date => self.mapping.date = column,
            MappingField::Amount => self.mapping.amount = column,
            MappingField::Vendor => self.mapping.vendor = Some(column),
        }
        self.reset_analysis();
    }

    pub fn adjust_threshold(&mut self, delta: f64) {
        let threshold = (self.config.threshold_amount + delta).clamp(THRESHOLD_MIN, THRESHOLD_MAX);
        if threshold != self.config.threshold_amount {
            self.config.threshold_amount = threshold;
            self.reset_analysis();
        }
    }

    /// Drop results computed under a different mapping/threshold
    pub fn reset_analysis(&mut self) {
        if self.report.take().is_some() {
            self.status = Some("Settings changed - press Enter to re-run the analysis".to_string());
        }
        self.detail_state.select(None);
    }

    pub fn inspector_rows(&self) -> &[Vec<String>] {
        let end = self.raw.rows.len().min(INSPECTOR_ROWS);
        &self.raw.rows[..end]
    }

    pub fn run_analysis(&mut self) {
        let outcome = match self.raw.to_dataset(&self.mapping) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report = None;
                self.status = Some(format!("❌ {}", e));
                return;
            }
        };

        let report = match run_analysis(&outcome.dataset, &self.config) {
            Ok(report) => report,
            Err(e) => {
                self.report = None;
                self.status = Some(format!("❌ {}", e));
                return;
            }
        };

        let mut messages = outcome.warnings(&self.mapping, &self.raw.headers);
        for (section, err) in report.failures() {
            messages.push(format!("{} failed: {}", section.label(), err));
        }

        self.status = if messages.is_empty() {
            Some(format!("✓ Analyzed {} transactions", report.total_transactions))
        } else {
            Some(format!("⚠️  {}", messages.join(" | ")))
        };

        self.report = Some(report);
        self.current_page = Page::Overview;
        self.detail_section = Section::Duplicates;
        self.reset_detail_selection();
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Result pages only exist once an analysis has run
    pub fn next_page(&mut self) {
        if self.report.is_some() {
            self.current_page = self.current_page.next();
        }
    }

    pub fn previous_page(&mut self) {
        if self.report.is_some() {
            self.current_page = self.current_page.previous();
        }
    }

    pub fn next_detail_section(&mut self) {
        let sections = Section::ROW_SECTIONS;
        let i = sections.iter().position(|s| *s == self.detail_section).unwrap_or(0);
        self.detail_section = sections[(i + 1) % sections.len()];
        self.reset_detail_selection();
    }

    pub fn previous_detail_section(&mut self) {
        let sections = Section::ROW_SECTIONS;
        let i = sections.iter().position(|s| *s == self.detail_section).unwrap_or(0);
        self.detail_section = sections[(i + sections.len() - 1) % sections.len()];
        self.reset_detail_selection();
    }

    fn reset_detail_selection(&mut self) {
        let selected = if self.detail_rows().is_empty() { None } else { Some(0) };
        self.detail_state.select(selected);
    }

    pub fn detail_rows(&self) -> &[Transaction] {
        self.report
            .as_ref()
            .and_then(|r| r.rows(self.detail_section))
            .and_then(|rows| rows.as_ref().ok())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn next(&mut self) {
        let len = self.detail_rows().len();
        if len == 0 {
            return;
        }
        let i = match self.detail_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.detail_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.detail_rows().len();
        if len == 0 {
            return;
        }
        let i = match self.detail_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.detail_state.select(Some(i));
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn overview_metrics(&self) -> Vec<(&'static str, Option<usize>)> {
        let count = |section| self.report.as_ref().and_then(|r| r.count(section));
        vec![
            ("Duplicates", count(Section::Duplicates)),
            ("Weekend", count(Section::UnusualTiming)),
            ("Round Numbers", count(Section::RoundNumbers)),
            ("Near Threshold", count(Section::ThresholdFlags)),
        ]
    }

    /// `[0.9 × threshold, threshold)` under the threshold the report was run with
    pub fn threshold_band(&self) -> (f64, f64) {
        let threshold = self
            .report
            .as_ref()
            .map(|r| r.threshold_amount)
            .unwrap_or(self.config.threshold_amount);
        (threshold * fraud_hunter::detectors::THRESHOLD_BAND_RATIO, threshold)
    }

    /// Returns false when the dashboard should close
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => self.previous_page(),
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char('$') => self.currency.cycle_symbol(),
            KeyCode::Char('d') => self.currency.cycle_decimals(),
            KeyCode::Char('s') => self.currency.toggle_thousands_separator(),
            code => match self.current_page {
                Page::Mapping => match code {
                    KeyCode::Up | KeyCode::Char('k') => self.previous_field(),
                    KeyCode::Down | KeyCode::Char('j') => self.next_field(),
                    KeyCode::Left | KeyCode::Char('h') => self.cycle_column(false),
                    KeyCode::Right | KeyCode::Char('l') => self.cycle_column(true),
                    KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_threshold(THRESHOLD_STEP),
                    KeyCode::Char('-') => self.adjust_threshold(-THRESHOLD_STEP),
                    KeyCode::Enter => self.run_analysis(),
                    _ => {}
                },
                Page::Details => match code {
                    KeyCode::Left | KeyCode::Char('h') => self.previous_detail_section(),
                    KeyCode::Right | KeyCode::Char('l') => self.next_detail_section(),
                    KeyCode::Down | KeyCode::Char('j') => self.next(),
                    KeyCode::Up | KeyCode::Char('k') => self.previous(),
                    _ => {}
                },
                Page::Overview | Page::Forensic => {}
            },
        }
        true
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Mapping => render_mapping(f, chunks[1], app),
        Page::Overview => render_overview(f, chunks[1], app),
        Page::Forensic => render_forensic(f, chunks[1], app),
        Page::Details => render_details(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled("🕵️ Fraud Hunter  ", Style::default().fg(Color::Cyan))];

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else if *page != Page::Mapping && app.report.is_none() {
            Style::default().fg(Color::Black)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Threshold: {}", app.currency.format(app.config.threshold_amount)),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Rows: {}", app.raw.rows.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_mapping(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    // Field → column assignments
    let mut lines = vec![Line::from("")];
    for field in [MappingField::Date, MappingField::Amount, MappingField::Vendor] {
        let selected = field == app.selected_field;
        let marker = if selected { "→ " } else { "  " };
        let style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<8}", marker, field.label()), style),
            Span::styled(format!("◀ {} ▶", app.column_name(field)), style),
        ]));
    }

    let mapping = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 🔧 Map Your Data Columns "),
    );
    f.render_widget(mapping, top[0]);

    let settings = vec![
        Line::from(""),
        Line::from(format!(
            "  Approval threshold: {}",
            app.currency.format(app.config.threshold_amount)
        )),
        Line::from(format!("  Currency symbol:    {}", app.currency.symbol)),
        Line::from(format!("  Decimal places:     {}", app.currency.decimals)),
        Line::from(format!(
            "  Thousands sep:      {}",
            if app.currency.thousands_separator { "on" } else { "off" }
        )),
        Line::from(format!("  Preview:            {}", app.currency.format(1_234_567.891))),
    ];
    let settings = Paragraph::new(settings)
        .block(Block::default().borders(Borders::ALL).title(" ⚙️  Settings "));
    f.render_widget(settings, top[1]);

    // Raw data inspector
    let header = Row::new(
        app.raw
            .headers
            .iter()
            .map(|h| Cell::from(h.clone()).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.inspector_rows().iter().map(|row| {
        Row::new(row.iter().map(|c| Cell::from(truncate(c, 24)))).height(1)
    });

    let widths: Vec<Constraint> = app.raw.headers.iter().map(|_| Constraint::Min(10)).collect();
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 📄 Data Inspector: {} ", app.raw.source)),
    );
    f.render_widget(table, chunks[1]);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let metrics = app.overview_metrics();
    let metric_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);

    for (i, (label, count)) in metrics.iter().enumerate() {
        let (text, color) = match count {
            Some(0) => ("0".to_string(), Color::Green),
            Some(n) => (n.to_string(), Color::Red),
            None => ("FAILED".to_string(), Color::Magenta),
        };
        let metric = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        ])
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", label)));
        f.render_widget(metric, metric_chunks[i]);
    }

    let data: Vec<(&str, u64)> = metrics
        .iter()
        .map(|(label, count)| (*label, count.unwrap_or(0) as u64))
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Risk Distribution "))
        .data(data.as_slice())
        .bar_width(14)
        .bar_gap(4)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD));
    f.render_widget(chart, chunks[1]);
}

fn render_forensic(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let Some(report) = app.report.as_ref() else {
        return;
    };

    // Benford
    let benford_block = Block::default()
        .borders(Borders::ALL)
        .title(" 📊 Benford's Law ");
    match &report.benford {
        Ok(analysis) if analysis.is_insufficient_data() => {
            let msg = Paragraph::new("\n  Insufficient data for Benford analysis").block(benford_block);
            f.render_widget(msg, chunks[0]);
        }
        Ok(analysis) => {
            let header = Row::new(["Digit", "Actual", "Expected", "Δ"].map(|h| Cell::from(h).style(header_style())));
            let rows = analysis.rows.iter().map(|row| {
                let deviation = row.deviation();
                let color = if deviation.abs() > 0.05 { Color::Red } else { Color::White };
                Row::new(vec![
                    Cell::from(row.digit.to_string()),
                    Cell::from(format!("{:.1}%", row.actual * 100.0)),
                    Cell::from(format!("{:.1}%", row.expected * 100.0)),
                    Cell::from(format!("{:+.1}", deviation * 100.0)).style(Style::default().fg(color)),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Length(8),
                ],
            )
            .header(header)
            .block(benford_block.title(format!(" n = {} ", analysis.sample_size)));
            f.render_widget(table, chunks[0]);
        }
        Err(e) => {
            let msg = Paragraph::new(format!("\n  ❌ {}", e)).block(benford_block);
            f.render_widget(msg, chunks[0]);
        }
    }

    // Fuzzy vendor pairs
    let fuzzy_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 🔤 Similar Vendor Names (≥ {}) ", report.fuzzy_cutoff));
    match &report.fuzzy_duplicates {
        Ok(pairs) if pairs.is_empty() => {
            let msg = Paragraph::new("\n  No suspicious similar vendor names found").block(fuzzy_block);
            f.render_widget(msg, chunks[1]);
        }
        Ok(pairs) => {
            let header = Row::new(["Vendor A", "Vendor B", "Score"].map(|h| Cell::from(h).style(header_style())));
            let rows = pairs.iter().map(|pair| {
                Row::new(vec![
                    Cell::from(truncate(&pair.vendor_a, 28)),
                    Cell::from(truncate(&pair.vendor_b, 28)),
                    Cell::from(pair.similarity_score.to_string()),
                ])
            });
            let table = Table::new(
                rows,
                [Constraint::Length(30), Constraint::Length(30), Constraint::Length(6)],
            )
            .header(header)
            .block(fuzzy_block);
            f.render_widget(table, chunks[1]);
        }
        Err(e) => {
            let msg = Paragraph::new(format!("\n  ❌ {}", e)).block(fuzzy_block);
            f.render_widget(msg, chunks[1]);
        }
    }
}

fn render_details(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let mut tab_spans = vec![];
    for (i, section) in Section::ROW_SECTIONS.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *section == app.detail_section {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(section.label(), style));
    }
    if app.detail_section == Section::ThresholdFlags {
        let (low, high) = app.threshold_band();
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Band: [{}, {})", app.currency.format(low), app.currency.format(high)),
            Style::default().fg(Color::Cyan),
        ));
    }
    let tabs = Paragraph::new(Line::from(tab_spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(tabs, chunks[0]);

    let section_error = app
        .report
        .as_ref()
        .and_then(|r| r.error(app.detail_section))
        .map(|e| e.to_string());
    if let Some(e) = section_error {
        let msg = Paragraph::new(format!("\n  ❌ {}", e))
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", app.detail_section.label())));
        f.render_widget(msg, chunks[1]);
        return;
    }

    let header = Row::new(["ID", "Date", "Amount", "Vendor"].map(|h| Cell::from(h).style(header_style())))
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .detail_rows()
        .iter()
        .map(|tx| {
            Row::new(vec![
                Cell::from(tx.id.clone()),
                Cell::from(tx.date.format("%Y-%m-%d (%a)").to_string()),
                Cell::from(app.currency.format(tx.amount)),
                Cell::from(truncate(&tx.vendor, 40)),
            ])
            .height(1)
        })
        .collect();

    let title = format!(" {} ({}) ", app.detail_section.label(), rows.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.detail_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let help = match app.current_page {
        Page::Mapping => "↑↓ field  ←→ column  +/- threshold  $ d s currency  Enter analyze  q quit",
        Page::Details => "Tab page  ←→ detector  ↑↓ row  $ d s currency  q quit",
        Page::Overview | Page::Forensic => "Tab/Shift-Tab page  $ d s currency  q quit",
    };

    let mut lines = vec![];
    if let Some(status) = &app.status {
        let color = if status.starts_with('❌') {
            Color::Red
        } else if status.starts_with('⚠') {
            Color::Yellow
        } else {
            Color::Green
        };
        lines.push(Line::from(vec![
            Span::styled(status.clone(), Style::default().fg(color)),
            Span::raw("   "),
            Span::styled(help, Style::default().fg(Color::DarkGray)),
        ]));
    } else {
        lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));
    }

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "transaction_id,date,amount,vendor\n\
        TXN_T1,2025-12-01,1000,Vendor A\n\
        TXN_T2,2025-12-06,9500,Vendor B\n\
        TXN_T3,2025-12-07,10000,Vendor A\n\
        TXN_T4,2025-12-02,5000,Vendor C\n\
        TXN_T5,2025-12-01,1000,Vendor A\n";

    fn create_test_app(csv: &str) -> App {
        let raw = RawTable::from_reader(csv.as_bytes()).unwrap();
        App::new(raw, AnalysisConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_auto_mapping_on_load() {
        let app = create_test_app(SAMPLE_CSV);
        assert_eq!(app.column_name(MappingField::Date), "date");
        assert_eq!(app.column_name(MappingField::Amount), "amount");
        assert_eq!(app.column_name(MappingField::Vendor), "vendor");
        assert_eq!(app.current_page, Page::Mapping);
        assert!(app.report.is_none());
    }

    #[test]
    fn test_run_analysis_populates_overview() {
        let mut app = create_test_app(SAMPLE_CSV);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.current_page, Page::Overview);
        assert_eq!(
            app.overview_metrics(),
            vec![
                ("Duplicates", Some(2)),
                ("Weekend", Some(2)),
                ("Round Numbers", Some(4)),
                ("Near Threshold", Some(1)),
            ]
        );
        assert!(app.status.as_deref().unwrap().contains("Analyzed 5"));
    }

    #[test]
    fn test_pages_locked_until_analysis() {
        let mut app = create_test_app(SAMPLE_CSV);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Mapping);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Forensic);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page, Page::Overview);
    }

    #[test]
    fn test_mapping_change_resets_analysis() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.run_analysis();
        app.current_page = Page::Mapping;

        press(&mut app, KeyCode::Down); // Amount
        press(&mut app, KeyCode::Right);

        assert_eq!(app.column_name(MappingField::Amount), "vendor");
        assert!(app.report.is_none());
        assert!(app.status.as_deref().unwrap().contains("re-run"));
    }

    #[test]
    fn test_cycle_column_wraps() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.selected_field = MappingField::Date;
        app.cycle_column(false);
        assert_eq!(app.mapping.date, 0);
        app.cycle_column(false);
        assert_eq!(app.mapping.date, 3);
        app.cycle_column(true);
        assert_eq!(app.mapping.date, 0);
    }

    #[test]
    fn test_bad_mapping_reports_ingestion_error() {
        let mut app = create_test_app(SAMPLE_CSV);
        // Map date onto the vendor column: nothing parses
        app.mapping.date = 3;
        app.run_analysis();

        assert!(app.report.is_none());
        assert_eq!(app.current_page, Page::Mapping);
        assert!(app.status.as_deref().unwrap().contains("No valid data after parsing"));
    }

    #[test]
    fn test_exclusion_warnings_shown() {
        let csv = "date,amount,vendor\n2025-12-01,1000,A\nbad,5,B\n2025-12-03,n/a,C\n";
        let mut app = create_test_app(csv);
        app.run_analysis();

        assert!(app.report.is_some());
        let status = app.status.as_deref().unwrap();
        assert!(status.contains("could not be parsed as dates"));
        assert!(status.contains("non-numeric values"));
    }

    #[test]
    fn test_threshold_adjustment_clamped() {
        let mut app = create_test_app(SAMPLE_CSV);
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.config.threshold_amount, 10_500.0);

        app.config.threshold_amount = THRESHOLD_MAX;
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.config.threshold_amount, THRESHOLD_MAX);

        app.config.threshold_amount = 1_200.0;
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.config.threshold_amount, THRESHOLD_MIN);
    }

    #[test]
    fn test_threshold_change_reruns_with_new_band() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.run_analysis();
        app.current_page = Page::Mapping;

        app.adjust_threshold(500.0);
        assert!(app.report.is_none());

        app.run_analysis();
        assert_eq!(app.threshold_band(), (9_450.0, 10_500.0));
        // 10000 is now inside [9450, 10500)
        assert_eq!(app.overview_metrics()[3], ("Near Threshold", Some(2)));
    }

    #[test]
    fn test_detail_sections_cycle() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.run_analysis();
        app.current_page = Page::Details;

        let ids = |app: &App| app.detail_rows().iter().map(|tx| tx.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&app), vec!["TXN_T1", "TXN_T5"]);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.detail_section, Section::UnusualTiming);
        assert_eq!(ids(&app), vec!["TXN_T2", "TXN_T3"]);

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.detail_section, Section::ThresholdFlags);
        assert_eq!(ids(&app), vec!["TXN_T2"]);
    }

    #[test]
    fn test_detail_row_navigation_wraps() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.run_analysis();
        app.current_page = Page::Details;

        assert_eq!(app.detail_state.selected(), Some(0));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail_state.selected(), Some(1));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail_state.selected(), Some(0));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.detail_state.selected(), Some(1));
    }

    #[test]
    fn test_currency_keys_keep_analysis() {
        let mut app = create_test_app(SAMPLE_CSV);
        app.run_analysis();

        press(&mut app, KeyCode::Char('$'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.currency.symbol, "€");
        assert!(!app.currency.thousands_separator);
        assert!(app.report.is_some());
    }

    #[test]
    fn test_inspector_limited_to_ten_rows() {
        let mut csv = String::from("date,amount,vendor\n");
        for i in 1..=25 {
            csv.push_str(&format!("2025-12-01,{},V{}\n", i, i));
        }
        let app = create_test_app(&csv);
        assert_eq!(app.inspector_rows().len(), 10);
        assert_eq!(app.inspector_rows()[0][1], "1");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = create_test_app(SAMPLE_CSV);
        assert!(press(&mut app, KeyCode::Down));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long vendor name", 10), "a very ...");
    }
}
