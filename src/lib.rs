//! datadesk: a terminal workbench for tabular data. Load a delimited or
//! spreadsheet file, preview and edit it, filter rows with simple conditions,
//! clean it, chart it, and export a PDF report.

pub mod chart;
pub mod config;
pub mod error;
pub mod io;
mod predicate;
pub mod processor;
pub mod report;
pub mod statistics;
pub mod widgets;

use std::path::PathBuf;
use std::sync::mpsc::Sender;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell as UiCell, Clear, Padding, Paragraph, Row as UiRow, StatefulWidget,
        Table, Widget, Wrap,
    },
};

use crate::chart::ChartKind;
use crate::config::{AppConfig, Theme};
use crate::error::DataError;
use crate::io::LoadOptions;
use crate::processor::DataProcessor;
use crate::report::PageMetrics;
use crate::widgets::datatable::cell_text;
use crate::widgets::{Controls, DataTable, DataTableState};

pub const APP_NAME: &str = "datadesk";

/// Help content lives next to the binary's working directory and is read on
/// demand; a missing file is reported but nothing else breaks.
const HELP_FILE: &str = "help.txt";

/// A chart the user asked for: axes, kind, row limit, and the PNG
/// destination. `limit` of `None` falls back to the configured default.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub x: String,
    pub y: Option<String>,
    pub kind: ChartKind,
    pub limit: Option<usize>,
    pub path: PathBuf,
}

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, LoadOptions),
    DoLoad(PathBuf, LoadOptions), // perform the load after the "Loading" frame renders
    Filter { column: String, condition: String },
    Clean,
    Reset,
    EditCell { row: usize, column: String, value: String },
    SaveTable(PathBuf),
    ExportChart(ChartRequest),
    Report(PathBuf),
    Exit,
    Crash(String),
    Resize(u16, u16),
}

/// The prompt state machine. Multi-step flows carry what was already
/// entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    FilterColumn,
    FilterCondition { column: String },
    EditCell { row: usize, column: String },
    SavePath,
    ChartX,
    ChartY { x: String },
    ChartKind { x: String, y: Option<String> },
    ChartLimit { x: String, y: Option<String>, kind: ChartKind },
    ChartPath { x: String, y: Option<String>, kind: ChartKind, limit: Option<usize> },
    ReportPath,
}

impl Prompt {
    fn title(&self) -> String {
        match self {
            Prompt::FilterColumn => "Filter: column".to_string(),
            Prompt::FilterCondition { column } => {
                format!("Filter {}: condition over x", column)
            }
            Prompt::EditCell { row, column } => format!("Edit {} (row {})", column, row + 1),
            Prompt::SavePath => "Save as (.csv, .tsv, .xlsx)".to_string(),
            Prompt::ChartX => "Chart: X column".to_string(),
            Prompt::ChartY { .. } => "Chart: Y column (empty for counts)".to_string(),
            Prompt::ChartKind { .. } => {
                "Chart kind (auto, line, bar, scatter, histogram, pie)".to_string()
            }
            Prompt::ChartLimit { .. } => "Rows to chart (empty for default)".to_string(),
            Prompt::ChartPath { .. } => "Chart output (.png)".to_string(),
            Prompt::ReportPath => "Report output (.pdf)".to_string(),
        }
    }
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

pub struct App {
    pub processor: Option<DataProcessor>,
    path: Option<PathBuf>,
    events: Sender<AppEvent>,
    pub table_state: DataTableState,
    input: String,
    input_cursor: usize,
    prompt: Option<Prompt>,
    error_modal: ErrorModal,
    show_help: bool,
    help_scroll: usize,
    help_text: Option<String>,
    show_stats: bool,
    stats: Option<DataFrame>,
    /// Columns marked for the report; empty means all numeric columns.
    report_columns: Vec<String>,
    /// Charts exported this session, attached to the next report.
    figures: Vec<PathBuf>,
    status: String,
    loading: bool,
    theme: Theme,
    config: AppConfig,
    color_mode: String,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme, &config.theme.color_mode)
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to create default theme: {}", e);
                Theme {
                    colors: std::collections::HashMap::new(),
                }
            });
        Self::new_with_config(events, theme, config)
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        let color_mode = config.theme.color_mode.clone();
        App {
            processor: None,
            path: None,
            events,
            table_state: DataTableState::new(),
            input: String::new(),
            input_cursor: 0,
            prompt: None,
            error_modal: ErrorModal::default(),
            show_help: false,
            help_scroll: 0,
            help_text: None,
            show_stats: false,
            stats: None,
            report_columns: Vec::new(),
            figures: Vec::new(),
            status: String::new(),
            loading: false,
            theme,
            config,
            color_mode,
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    /// Handle one event to completion. A returned event is fed back through
    /// the channel by the run loop.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                self.loading = true;
                self.status = format!("Loading {}", path.display());
                Some(AppEvent::DoLoad(path.clone(), *options))
            }
            AppEvent::DoLoad(path, options) => {
                self.loading = false;
                match io::load_table(path, options) {
                    Ok(df) => {
                        self.status = format!(
                            "{}: {} rows, {} columns",
                            path.display(),
                            df.height(),
                            df.width()
                        );
                        self.path = Some(path.clone());
                        self.processor = Some(DataProcessor::new(df));
                        self.table_state = DataTableState::new();
                        None
                    }
                    Err(e) => Some(AppEvent::Crash(e.to_string())),
                }
            }
            AppEvent::Filter { column, condition } => {
                self.run(|app| app.do_filter(column, condition));
                None
            }
            AppEvent::Clean => {
                self.run(|app| app.do_clean());
                None
            }
            AppEvent::Reset => {
                self.run(|app| app.do_reset());
                None
            }
            AppEvent::EditCell { row, column, value } => {
                self.run(|app| app.do_edit(*row, column, value));
                None
            }
            AppEvent::SaveTable(path) => {
                self.run(|app| app.do_save(path));
                None
            }
            AppEvent::ExportChart(request) => {
                self.run(|app| app.do_chart(request));
                None
            }
            AppEvent::Report(path) => {
                self.run(|app| app.do_report(path));
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    /// Run an operation, routing any error into the error modal.
    fn run(&mut self, op: impl FnOnce(&mut Self) -> Result<()>) {
        if let Err(e) = op(self) {
            self.error_modal.show(e.to_string());
        }
    }

    fn processor_mut(&mut self) -> Result<&mut DataProcessor> {
        self.processor.as_mut().ok_or_else(|| eyre!("No data loaded"))
    }

    fn after_data_change(&mut self) -> Result<()> {
        if let Some(processor) = &self.processor {
            let (rows, cols) = (processor.height(), processor.data().width());
            self.table_state.clamp(rows, cols);
        }
        if self.show_stats {
            self.refresh_stats()?;
        }
        Ok(())
    }

    fn refresh_stats(&mut self) -> Result<()> {
        let processor = self.processor.as_ref().ok_or_else(|| eyre!("No data loaded"))?;
        self.stats = Some(processor.statistics()?);
        Ok(())
    }

    fn do_filter(&mut self, column: &str, condition: &str) -> Result<()> {
        let kept = self.processor_mut()?.filter(column, condition)?;
        self.status = format!("Filter kept {} rows", kept);
        self.after_data_change()
    }

    fn do_clean(&mut self) -> Result<()> {
        let summary = self.processor_mut()?.clean()?;
        self.status = format!(
            "Cleaned: filled {} missing values, removed {} duplicate rows",
            summary.values_filled, summary.duplicates_removed
        );
        self.after_data_change()
    }

    fn do_reset(&mut self) -> Result<()> {
        self.processor_mut()?.reset();
        self.status = "Reset to the file as loaded".to_string();
        self.after_data_change()
    }

    fn do_edit(&mut self, row: usize, column: &str, value: &str) -> Result<()> {
        self.processor_mut()?.set_cell(row, column, value)?;
        self.status = format!("Updated {} in row {}", column, row + 1);
        self.after_data_change()
    }

    fn do_save(&mut self, path: &std::path::Path) -> Result<()> {
        let processor = self.processor.as_ref().ok_or_else(|| eyre!("No data loaded"))?;
        io::save_table(processor.data(), path)?;
        self.status = format!("Saved {}", path.display());
        Ok(())
    }

    fn do_chart(&mut self, request: &ChartRequest) -> Result<()> {
        let processor = self.processor.as_ref().ok_or_else(|| eyre!("No data loaded"))?;
        let data = chart::prepare(
            processor.data(),
            &request.x,
            request.y.as_deref(),
            request.kind,
            request.limit.unwrap_or(self.config.chart.row_limit),
        )?;
        chart::render_png(
            &request.path,
            &data,
            (self.config.chart.width, self.config.chart.height),
        )?;
        self.figures.push(request.path.clone());
        self.status = format!("{} chart written to {}", data.kind.as_str(), request.path.display());
        Ok(())
    }

    fn do_report(&mut self, path: &std::path::Path) -> Result<()> {
        let processor = self.processor.as_ref().ok_or_else(|| eyre!("No data loaded"))?;
        let all = statistics::summarize(processor.data())?;
        let summaries: Vec<_> = if self.report_columns.is_empty() {
            all
        } else {
            all.into_iter()
                .filter(|s| self.report_columns.contains(&s.name))
                .collect()
        };
        // marked columns without a numeric summary have no statistics row
        let dropped: Vec<String> = self
            .report_columns
            .iter()
            .filter(|c| !summaries.iter().any(|s| &s.name == *c))
            .cloned()
            .collect();
        let skipped = report::write_report(
            path,
            &self.config.report.title,
            &summaries,
            &self.figures,
            PageMetrics::default(),
        )?;
        let mut status = format!("Report written to {}", path.display());
        if !dropped.is_empty() {
            status.push_str(&format!(
                " (non-numeric columns skipped: {})",
                dropped.join(", ")
            ));
        }
        if !skipped.is_empty() {
            status.push_str(&format!(" ({} figure(s) skipped)", skipped.len()));
        }
        self.status = status;
        Ok(())
    }

    fn toggle_theme(&mut self) {
        let mode = if self.color_mode == "dark" { "light" } else { "dark" };
        match Theme::from_config(&self.config.theme, mode) {
            Ok(theme) => {
                self.theme = theme;
                self.color_mode = mode.to_string();
                self.status = format!("{} theme", mode);
            }
            Err(e) => self.error_modal.show(e.to_string()),
        }
    }

    fn cursor_column(&self) -> Option<String> {
        let processor = self.processor.as_ref()?;
        processor
            .column_names()
            .get(self.table_state.cursor_col)
            .cloned()
    }

    fn toggle_report_column(&mut self) {
        let Some(name) = self.cursor_column() else { return };
        if let Some(pos) = self.report_columns.iter().position(|c| c == &name) {
            self.report_columns.remove(pos);
            self.status = format!("{} removed from report", name);
        } else {
            self.report_columns.push(name.clone());
            self.status = format!("{} marked for report", name);
        }
    }

    fn open_prompt(&mut self, prompt: Prompt, prefill: &str) {
        self.input = prefill.to_string();
        self.input_cursor = self.input.chars().count();
        self.prompt = Some(prompt);
    }

    fn close_prompt(&mut self) {
        self.prompt = None;
        self.input.clear();
        self.input_cursor = 0;
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if self.error_modal.active {
            self.error_modal.hide();
            return None;
        }
        if self.show_help {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.help_scroll += 1,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1)
                }
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1) => {
                    self.show_help = false
                }
                _ => {}
            }
            return None;
        }
        if self.prompt.is_some() {
            return self.prompt_key(key);
        }

        let (rows, cols) = self
            .processor
            .as_ref()
            .map(|p| (p.height(), p.data().width()))
            .unwrap_or((0, 0));

        match key.code {
            KeyCode::Char('q') => {
                if self.show_stats {
                    self.show_stats = false;
                } else {
                    return Some(AppEvent::Exit);
                }
            }
            KeyCode::Esc if self.show_stats => self.show_stats = false,
            KeyCode::Char('?') | KeyCode::F(1) => match std::fs::read_to_string(HELP_FILE) {
                Ok(text) => {
                    self.help_text = Some(text);
                    self.show_help = true;
                    self.help_scroll = 0;
                }
                Err(e) => self.error_modal.show(format!("{}: {}", HELP_FILE, e)),
            },
            KeyCode::Down | KeyCode::Char('j') => self.table_state.move_rows(1, rows),
            KeyCode::Up | KeyCode::Char('k') => self.table_state.move_rows(-1, rows),
            KeyCode::Left | KeyCode::Char('h') => self.table_state.move_cols(-1, cols),
            KeyCode::Right | KeyCode::Char('l') => self.table_state.move_cols(1, cols),
            KeyCode::PageDown => self.table_state.page_down(rows),
            KeyCode::PageUp => self.table_state.page_up(rows),
            KeyCode::Home => self.table_state.first_row(),
            KeyCode::End => self.table_state.last_row(rows),
            KeyCode::Char('F') => self.open_prompt(Prompt::FilterColumn, ""),
            KeyCode::Char('c') => return Some(AppEvent::Clean),
            KeyCode::Char('R') => return Some(AppEvent::Reset),
            KeyCode::Char('s') => {
                self.show_stats = !self.show_stats;
                if self.show_stats {
                    self.run(|app| app.refresh_stats());
                    if self.error_modal.active {
                        self.show_stats = false;
                    }
                }
            }
            KeyCode::Char('m') => self.toggle_report_column(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('e') => {
                if let Some(column) = self.cursor_column() {
                    let row = self.table_state.cursor_row;
                    let current = self
                        .processor
                        .as_ref()
                        .and_then(|p| p.data().column(&column).ok()?.get(row).ok())
                        .map(|v| cell_text(&v))
                        .unwrap_or_default();
                    self.open_prompt(Prompt::EditCell { row, column }, &current);
                }
            }
            KeyCode::Char('w') => {
                let prefill = self
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.open_prompt(Prompt::SavePath, &prefill);
            }
            KeyCode::Char('g') => self.open_prompt(Prompt::ChartX, ""),
            KeyCode::Char('p') => self.open_prompt(Prompt::ReportPath, "report.pdf"),
            _ => {}
        }
        None
    }

    fn prompt_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Esc => self.close_prompt(),
            KeyCode::Enter => return self.submit_prompt(),
            KeyCode::Backspace => {
                if self.input_cursor > 0 {
                    let idx = byte_index(&self.input, self.input_cursor - 1);
                    self.input.remove(idx);
                    self.input_cursor -= 1;
                }
            }
            KeyCode::Left => self.input_cursor = self.input_cursor.saturating_sub(1),
            KeyCode::Right => {
                self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count())
            }
            KeyCode::Char(c) => {
                let idx = byte_index(&self.input, self.input_cursor);
                self.input.insert(idx, c);
                self.input_cursor += 1;
            }
            _ => {}
        }
        None
    }

    fn submit_prompt(&mut self) -> Option<AppEvent> {
        let text = self.input.trim().to_string();
        let prompt = self.prompt.clone()?;
        match prompt {
            Prompt::FilterColumn => {
                if text.is_empty() {
                    return None;
                }
                self.open_prompt(Prompt::FilterCondition { column: text }, "");
            }
            Prompt::FilterCondition { column } => {
                self.close_prompt();
                return Some(AppEvent::Filter {
                    column,
                    condition: text,
                });
            }
            Prompt::EditCell { row, column } => {
                self.close_prompt();
                return Some(AppEvent::EditCell {
                    row,
                    column,
                    value: text,
                });
            }
            Prompt::SavePath => {
                if text.is_empty() {
                    return None;
                }
                self.close_prompt();
                return Some(AppEvent::SaveTable(PathBuf::from(text)));
            }
            Prompt::ChartX => {
                if text.is_empty() {
                    return None;
                }
                self.open_prompt(Prompt::ChartY { x: text }, "");
            }
            Prompt::ChartY { x } => {
                let y = if text.is_empty() { None } else { Some(text) };
                self.open_prompt(Prompt::ChartKind { x, y }, "auto");
            }
            Prompt::ChartKind { x, y } => match ChartKind::from_name(&text) {
                Some(kind) => {
                    self.open_prompt(Prompt::ChartLimit { x, y, kind }, "");
                }
                None => {
                    self.error_modal
                        .show(format!("Unknown chart kind: '{}'", text));
                }
            },
            Prompt::ChartLimit { x, y, kind } => {
                let limit = if text.is_empty() {
                    None
                } else {
                    match text.parse::<usize>() {
                        Ok(n) => Some(n),
                        Err(_) => {
                            let e = DataError::MalformedInput(format!(
                                "'{}' is not a row count",
                                text
                            ));
                            self.error_modal.show(e.to_string());
                            return None;
                        }
                    }
                };
                self.open_prompt(Prompt::ChartPath { x, y, kind, limit }, "chart.png");
            }
            Prompt::ChartPath { x, y, kind, limit } => {
                if text.is_empty() {
                    return None;
                }
                self.close_prompt();
                return Some(AppEvent::ExportChart(ChartRequest {
                    x,
                    y,
                    kind,
                    limit,
                    path: PathBuf::from(text),
                }));
            }
            Prompt::ReportPath => {
                if text.is_empty() {
                    return None;
                }
                self.close_prompt();
                return Some(AppEvent::Report(PathBuf::from(text)));
            }
        }
        None
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dimmed = self.color("dimmed");
        let controls_bg = self.color("controls_bg");
        let text_primary = self.color("text_primary");
        let modal_border = self.color("modal_border");
        let modal_border_error = self.color("modal_border_error");
        let secondary = self.color("secondary");
        let table_header = self.color("table_header");

        let mut constraints = vec![Constraint::Fill(1)];
        if self.prompt.is_some() {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1)); // status
        constraints.push(Constraint::Length(1)); // controls
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let main_area = layout[0];

        // main area: table, or a placeholder while nothing is loaded
        if self.loading {
            Paragraph::new("Loading...")
                .centered()
                .block(Block::default().padding(Padding::top(main_area.height / 2)))
                .render(main_area, buf);
        } else if let Some(processor) = &self.processor {
            DataTable::new(processor.data(), &self.theme)
                .with_report_columns(&self.report_columns)
                .render(main_area, buf, &mut self.table_state);
        } else {
            Paragraph::new("No data loaded")
                .centered()
                .block(Block::default().padding(Padding::top(main_area.height / 2)))
                .render(main_area, buf);
        }

        // prompt input line
        if let Some(prompt) = &self.prompt {
            let prompt_area = layout[1];
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(secondary))
                .title(prompt.title());
            let inner = block.inner(prompt_area);
            block.render(prompt_area, buf);

            // show the cursor by reversing the char under it
            let chars: Vec<char> = self.input.chars().collect();
            let cursor = self.input_cursor.min(chars.len());
            let before: String = chars[..cursor].iter().collect();
            let at: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or(" ".to_string());
            let after: String = if cursor < chars.len() {
                chars[cursor + 1..].iter().collect()
            } else {
                String::new()
            };
            Paragraph::new(Line::from(vec![
                Span::raw(before),
                Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
                Span::raw(after),
            ]))
            .render(inner, buf);
        }

        let status_area = layout[layout.len() - 2];
        Paragraph::new(self.status.as_str())
            .style(Style::default().fg(dimmed))
            .render(status_area, buf);

        let controls = Controls::new(controls_bg, text_primary)
            .with_dimmed(self.prompt.is_some())
            .with_row_count(self.processor.as_ref().map(|p| p.height()).unwrap_or(0));
        (&controls).render(layout[layout.len() - 1], buf);

        // statistics overlay
        if self.show_stats {
            if let Some(stats) = &self.stats {
                let overlay = centered_rect(80, 70, area);
                Clear.render(overlay, buf);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(modal_border))
                    .title("Summary statistics (q to close)");
                let inner = block.inner(overlay);
                block.render(overlay, buf);

                let names = stats.get_column_names();
                let header = UiRow::new(names.iter().map(|n| UiCell::from(n.as_str().to_string())))
                    .style(Style::default().fg(table_header).add_modifier(Modifier::BOLD));
                let rows = (0..stats.height()).map(|row_idx| {
                    UiRow::new((0..stats.width()).map(|col_idx| {
                        let value = stats[col_idx].get(row_idx);
                        let text = match value {
                            Ok(AnyValue::Float64(v)) => format!("{:.2}", v),
                            Ok(v) => cell_text(&v),
                            Err(_) => String::new(),
                        };
                        UiCell::from(text)
                    }))
                });
                let constraints: Vec<Constraint> = (0..stats.width())
                    .map(|_| Constraint::Length(12))
                    .collect();
                let table = Table::new(rows, constraints)
                    .header(header)
                    .column_spacing(1);
                Widget::render(table, inner, buf);
            }
        }

        // help overlay
        if self.show_help {
            let overlay = centered_rect(70, 80, area);
            Clear.render(overlay, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(modal_border))
                .title("Help");
            let inner = block.inner(overlay);
            block.render(overlay, buf);
            Paragraph::new(self.help_text.as_deref().unwrap_or(""))
                .scroll((self.help_scroll as u16, 0))
                .wrap(Wrap { trim: false })
                .render(inner, buf);
        }

        // error modal on top of everything
        if self.error_modal.active {
            let overlay = centered_rect(60, 30, area);
            Clear.render(overlay, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(modal_border_error))
                .title("Error (press any key)");
            let inner = block.inner(overlay);
            block.render(overlay, buf);
            Paragraph::new(self.error_modal.message.as_str())
                .wrap(Wrap { trim: true })
                .render(inner, buf);
        }
    }
}
