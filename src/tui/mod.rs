//! Ratatui-based terminal UI.
//!
//! The left pane lists catalog series (with a title search); the right pane
//! shows the annual price table and the USD / sats charts for the selection.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::app::Session;
use crate::app::pipeline::{SelectionOutput, run_selection};
use crate::app::session::LoadedTables;
use crate::domain::{PipelineConfig, SeriesDescriptor};
use crate::error::AppError;
use crate::io::find_series;
use crate::report::{COLUMNS, PriceReport, fmt_grouped};

mod plotters_chart;

use plotters_chart::{PriceLineChart, chart_bounds};

const NO_SELECTION: &str = "Please select a series to continue.";

/// Start the TUI.
///
/// Tables are loaded before the terminal is switched over, so input errors
/// print normally.
pub fn run(config: PipelineConfig) -> Result<(), AppError> {
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    session: Session,
    tables: LoadedTables,
    search: String,
    searching: bool,
    /// Catalog indices matching `search`, in catalog order.
    visible: Vec<usize>,
    /// Position within `visible`.
    cursor: usize,
    selection: Option<SelectionOutput>,
    status: String,
}

impl App {
    fn new(config: PipelineConfig) -> Result<Self, AppError> {
        let mut session = Session::new(config);
        let tables = session.tables()?;
        let status = format!("{} series loaded", tables.catalog.len());

        let mut app = Self {
            session,
            tables,
            search: String::new(),
            searching: false,
            visible: Vec::new(),
            cursor: 0,
            selection: None,
            status,
        };
        app.refresh_visible();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.searching {
            self.handle_search_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('/') => {
                self.searching = true;
                self.status = "Search titles. Enter to keep, Esc to clear.".to_string();
            }
            KeyCode::Esc => self.clear_search(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Enter => self.select_highlighted(),
            KeyCode::Backspace => {
                self.selection = None;
                self.status = "Selection cleared.".to_string();
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.clear_search(),
            KeyCode::Enter => {
                self.searching = false;
                self.status = format!("{} match(es) for '{}'", self.visible.len(), self.search);
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.refresh_visible();
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char(c) => {
                self.search.push(c);
                self.cursor = 0;
                self.refresh_visible();
            }
            _ => {}
        }
    }

    fn clear_search(&mut self) {
        self.searching = false;
        if !self.search.is_empty() {
            self.search.clear();
            self.refresh_visible();
            self.status = "Search cleared.".to_string();
        }
    }

    fn refresh_visible(&mut self) {
        let needle = self.search.to_lowercase();
        self.visible = self
            .tables
            .catalog
            .rows
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                needle.is_empty() || s.title.to_lowercase().contains(&needle) || s.id.to_lowercase().contains(&needle)
            })
            .map(|(idx, _)| idx)
            .collect();
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.visible.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    fn highlighted(&self) -> Option<&SeriesDescriptor> {
        self.visible
            .get(self.cursor)
            .and_then(|&idx| self.tables.catalog.rows.get(idx))
    }

    fn select_highlighted(&mut self) {
        let Some(series) = self.highlighted().cloned() else {
            self.status = "No series to select.".to_string();
            return;
        };

        let run = self.run_for(&series);
        self.status = if run.report.is_empty() {
            run.report.no_data_message()
        } else {
            format!("{}: {} year(s)", series.id, run.report.rows.len())
        };
        self.selection = Some(run);
    }

    fn run_for(&self, series: &SeriesDescriptor) -> SelectionOutput {
        run_selection(
            &self.tables.prices.rows,
            &self.tables.reference.rows,
            series,
            self.session.config().min_year,
        )
    }

    /// Re-read all input files and re-run the current selection.
    fn reload(&mut self) {
        self.session.invalidate();
        let tables = match self.session.tables() {
            Ok(tables) => tables,
            Err(err) => {
                self.status = format!("Reload failed: {err}");
                return;
            }
        };
        self.tables = tables;
        self.refresh_visible();

        if let Some(id) = self.selection.as_ref().map(|run| run.series.id.clone()) {
            self.selection = find_series(&self.tables.catalog.rows, &id)
                .cloned()
                .map(|series| self.run_for(&series));
        }
        self.status = format!("Reloaded {} series.", self.tables.catalog.len());
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);
        self.draw_series_list(frame, body[0]);
        self.draw_selection(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let config = self.session.config();
        let filter = config.title_filter.as_deref().unwrap_or("any title");
        let since = config
            .min_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "all years".to_string());

        let line = Line::from(vec![
            Span::styled("cpi", Style::default().fg(Color::Cyan)),
            Span::raw(" CPI prices in USD and Bitcoin"),
            Span::styled(
                format!(" | filter: {filter} | since: {since} | series: {}", self.tables.catalog.len()),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_series_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.searching || !self.search.is_empty() {
            let cursor = if self.searching { "_" } else { "" };
            format!("Series /{}{cursor} ({})", self.search, self.visible.len())
        } else {
            format!("Series ({})", self.visible.len())
        };

        let items: Vec<ListItem> = self
            .visible
            .iter()
            .filter_map(|&idx| self.tables.catalog.rows.get(idx))
            .map(|s| {
                ListItem::new(Line::from(vec![
                    Span::styled(s.id.clone(), Style::default().fg(Color::Gray)),
                    Span::raw("  "),
                    Span::raw(s.title.clone()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !self.visible.is_empty() {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_selection(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Annual average price").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.selection else {
            let msg = Paragraph::new(NO_SELECTION).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let report = &run.report;

        let table_height = (report.rows.len() as u16).saturating_add(2).min(inner.height / 2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(table_height), Constraint::Min(0)])
            .split(inner);

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                report.series.id.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(report.series.title.clone()),
        ]);
        frame.render_widget(header, chunks[0]);

        if report.is_empty() {
            let msg = Paragraph::new(report.no_data_message()).style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, chunks[1].union(chunks[2]));
            return;
        }

        draw_price_table(frame, chunks[1], report);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        draw_chart(
            frame,
            charts[0],
            "USD",
            &report.charts.usd,
            RGBColor(0, 255, 255),
            fmt_axis_usd,
        );
        draw_chart(
            frame,
            charts[1],
            "sats",
            &report.charts.sats,
            RGBColor(255, 165, 0),
            fmt_axis_sats,
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.searching {
            "type to search  ↑/↓ move  Enter keep  Esc clear"
        } else {
            "↑/↓ move  Enter select  Backspace clear  / search  r reload  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_price_table(frame: &mut ratatui::Frame<'_>, area: Rect, report: &PriceReport) {
    let widths = column_widths(report);

    let header = Row::new(COLUMNS.iter().map(|c| Cell::from(*c)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let last = COLUMNS.len() - 1;
    let rows = report.rows.iter().map(|row| {
        Row::new(row.cells().into_iter().enumerate().map(|(i, cell)| {
            let line = Line::from(cell.to_string());
            // Method is text; every other column is numeric.
            if i == last {
                Cell::from(line)
            } else {
                Cell::from(line.alignment(Alignment::Right))
            }
        }))
    });

    let table = Table::new(rows, widths.map(Constraint::Length)).header(header).column_spacing(2);
    frame.render_widget(table, area);
}

/// Widest cell (or heading) per column, in terminal cells.
fn column_widths(report: &PriceReport) -> [u16; 7] {
    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &report.rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths.map(|w| u16::try_from(w).unwrap_or(u16::MAX))
}

fn draw_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    unit: &str,
    series: &[(i32, f64)],
    color: RGBColor,
    fmt_y: fn(f64) -> String,
) {
    let block = Block::default().title(format!("Annual Average ({unit})")).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let points: Vec<(f64, f64)> = series.iter().map(|&(year, v)| (f64::from(year), v)).collect();
    let Some((x_bounds, y_bounds)) = chart_bounds(&points) else {
        let msg = Paragraph::new("No data.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    };

    let (chart_rect, insets) = chart_layout(inner);
    let widget = PriceLineChart {
        points: &points,
        x_bounds,
        y_bounds,
        color,
        fmt_x: fmt_axis_year,
        fmt_y,
    };
    frame.render_widget(widget, chart_rect);

    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, fmt_y);
    }
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_usd(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_axis_sats(v: f64) -> String {
    fmt_grouped(v, 0)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 11,
        right: 2,
        top: 1,
        bottom: 1,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    fmt_y: fn(f64) -> String,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    // Year ticks: one per distinct year when they fit, otherwise evenly spaced.
    let first = x_bounds[0].ceil() as i32;
    let last = x_bounds[1].floor() as i32;
    let years: Vec<i32> = if last >= first && (last - first) < ticks as i32 {
        (first..=last).collect()
    } else {
        (0..ticks)
            .map(|i| {
                let u = i as f64 / (ticks as f64 - 1.0);
                (x_bounds[0] + u * (x_bounds[1] - x_bounds[0])).round() as i32
            })
            .collect()
    };

    let y = chart.y + chart.height;
    if y < inner.y + inner.height {
        for year in years {
            let u = (f64::from(year) - x_bounds[0]) / (x_bounds[1] - x_bounds[0]);
            let x = chart.x + ((chart.width - 1) as f64 * u.clamp(0.0, 1.0)).round() as u16;
            let label = year.to_string();
            let label_len = label.len() as u16;
            let start = x.saturating_sub(label_len / 2);
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width: label_len,
                    height: 1,
                },
            );
        }
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_y(y_val);
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }
}
