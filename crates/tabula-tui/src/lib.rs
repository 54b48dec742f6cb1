// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tabula_core::{
    ActionCatalog, Align, BulkCommand, BulkEvent, CheckState, ColumnId, DropSide,
    ExecutionReport, ExecutionRequest, HeaderView, LayoutStore, OrchestratorState, PageItem,
    RowId, SelectionSummary, SortClick, SortDirection, TableCommand, TableController, TableEvent,
    TableRow, TableView, spawn_execution,
};
use tracing::{info, warn};

/// Layout widths are kept in pixels; one terminal cell stands for this many.
pub const PIXELS_PER_CELL: u32 = 10;

const SORT_ASC_SINGLE: &str = "↑";
const SORT_DESC_SINGLE: &str = "↓";
const SORT_ASC_MULTI: &str = "▲";
const SORT_DESC_MULTI: &str = "▼";
const DROP_MARK: &str = "┃";
const PRINT_QUEUE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaSort {
    Ascending,
    Descending,
    None,
}

impl AriaSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::None => "none",
        }
    }
}

pub fn aria_sort(header: &HeaderView) -> AriaSort {
    match header.sort.as_ref().map(|entry| entry.direction) {
        Some(SortDirection::Asc) => AriaSort::Ascending,
        Some(SortDirection::Desc) => AriaSort::Descending,
        None => AriaSort::None,
    }
}

/// Sortable headers are activatable; the rest are plain labels.
pub fn header_role(header: &HeaderView) -> Option<&'static str> {
    header.sortable.then_some("button")
}

/// Header text with its sort marker. A lone sort shows an arrow; with more
/// than one active sort each sorted header also shows its 1-based priority.
pub fn header_label(header: &HeaderView, sort_count: usize) -> String {
    let Some(entry) = header.sort.as_ref() else {
        return header.header.clone();
    };
    if sort_count > 1 {
        let marker = match entry.direction {
            SortDirection::Asc => SORT_ASC_MULTI,
            SortDirection::Desc => SORT_DESC_MULTI,
        };
        format!("{} {marker}{}", header.header, entry.priority + 1)
    } else {
        let marker = match entry.direction {
            SortDirection::Asc => SORT_ASC_SINGLE,
            SortDirection::Desc => SORT_DESC_SINGLE,
        };
        format!("{} {marker}", header.header)
    }
}

pub fn checkbox_glyph(state: CheckState) -> &'static str {
    match state {
        CheckState::Checked => "[x]",
        CheckState::Indeterminate => "[-]",
        CheckState::Unchecked => "[ ]",
    }
}

pub fn column_cells(width_px: u32) -> u16 {
    u16::try_from((width_px / PIXELS_PER_CELL).max(1)).unwrap_or(u16::MAX)
}

pub fn pagination_text(pages: &[PageItem], current: u32) -> String {
    if pages.is_empty() {
        return String::new();
    }
    let items = pages
        .iter()
        .map(|item| match item {
            PageItem::Page(page) if *page == current => format!("[{page}]"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("‹ {items} ›")
}

pub fn toolbar_text(summary: &SelectionSummary, catalog: &ActionCatalog) -> String {
    let mut text = format!(
        "{} {}/{} selected",
        checkbox_glyph(summary.all),
        summary.selected_count,
        summary.total_count
    );
    if summary.selected_count > 0 {
        for (index, action) in catalog.actions().iter().enumerate().take(9) {
            text.push_str(&format!("  {} {}", index + 1, action.label));
        }
    }
    text
}

/// Notices shown between the toolbar and the table.
pub fn banner_lines(view: &TableView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(banner) = &view.banner {
        lines.push(banner.clone());
    }
    if let Some(error) = &view.last_error {
        lines.push(format!("last bulk action failed: {error}"));
    }
    lines
}

/// What the cursor points at when a key arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub column: Option<ColumnId>,
    pub row: Option<RowId>,
    pub selection: SelectionSummary,
}

impl Focus {
    pub fn of(view: &TableView, ui: &UiState) -> Self {
        Self {
            column: view
                .headers
                .get(ui.focused_column)
                .map(|header| header.id.clone()),
            row: view.rows.get(ui.cursor_row).map(|row| row.id),
            selection: view.selection,
        }
    }
}

pub fn table_command_for_key(
    key: KeyEvent,
    focus: &Focus,
    catalog: &ActionCatalog,
) -> Option<TableCommand> {
    let column = focus.column.clone();
    match (key.code, key.modifiers) {
        (KeyCode::Enter, modifiers) | (KeyCode::Char(' '), modifiers) => {
            let click = if modifiers.contains(KeyModifiers::SHIFT) {
                SortClick::Additive
            } else {
                SortClick::Plain
            };
            column.map(|column_id| TableCommand::ClickHeader { column_id, click })
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => column.map(|column_id| {
            TableCommand::ClickHeader {
                column_id,
                click: SortClick::Plain,
            }
        }),
        (KeyCode::Char('S'), _) => column.map(|column_id| TableCommand::ClickHeader {
            column_id,
            click: SortClick::Additive,
        }),
        (KeyCode::Char('x'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TableCommand::ClearSort)
        }
        (KeyCode::Char('x'), _) => focus.row.map(TableCommand::ToggleRow),
        (KeyCode::Char('a'), _) => Some(if focus.selection.all == CheckState::Checked {
            TableCommand::DeselectAll
        } else {
            TableCommand::SelectAll
        }),
        (KeyCode::Char('v'), _) => Some(if focus.selection.page == CheckState::Checked {
            TableCommand::DeselectPage
        } else {
            TableCommand::SelectPage
        }),
        (KeyCode::Char('i'), _) => Some(TableCommand::InvertSelection),
        (KeyCode::PageDown, _) | (KeyCode::Char(']'), _) => Some(TableCommand::NextPage),
        (KeyCode::PageUp, _) | (KeyCode::Char('['), _) => Some(TableCommand::PrevPage),
        (KeyCode::Home, _) => Some(TableCommand::GoToPage(1)),
        (KeyCode::End, _) => Some(TableCommand::GoToPage(u32::MAX)),
        (KeyCode::Char('<'), _) => column.map(|column_id| TableCommand::MoveColumn {
            column_id,
            delta: -1,
        }),
        (KeyCode::Char('>'), _) => column.map(|column_id| TableCommand::MoveColumn {
            column_id,
            delta: 1,
        }),
        (KeyCode::Char('c'), KeyModifiers::NONE) => column.map(TableCommand::ToggleColumn),
        (KeyCode::Char('C'), _) => Some(TableCommand::ShowAllColumns),
        (KeyCode::Char('R'), _) => Some(TableCommand::ResetLayout),
        (KeyCode::Char(digit @ '1'..='9'), _) => {
            let index = digit.to_digit(10).map(|value| value as usize - 1)?;
            catalog.actions().get(index).map(|action| {
                TableCommand::Bulk(BulkCommand::Trigger {
                    action_id: action.id.clone(),
                })
            })
        }
        _ => None,
    }
}

/// A keyboard resize is a press, a move by `delta_cells`, and a release.
pub fn resize_commands(column_id: ColumnId, delta_cells: i32) -> [TableCommand; 3] {
    let delta_px = delta_cells.saturating_mul(PIXELS_PER_CELL as i32);
    [
        TableCommand::ResizePress {
            column_id,
            pointer_x: 0,
        },
        TableCommand::ResizeMove { pointer_x: delta_px },
        TableCommand::ResizeRelease,
    ]
}

/// Terminal-only state that never reaches the table controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub focused_column: usize,
    pub cursor_row: usize,
    pub edit: Option<String>,
    pub status: Option<String>,
    pub quit: bool,
    pub layout_dirty: bool,
}

impl UiState {
    fn clamp_to(&mut self, view: &TableView) {
        self.focused_column = self
            .focused_column
            .min(view.headers.len().saturating_sub(1));
        self.cursor_row = self.cursor_row.min(view.rows.len().saturating_sub(1));
    }
}

pub fn handle_key<R: TableRow>(
    table: &mut TableController<R>,
    ui: &mut UiState,
    key: KeyEvent,
) -> Vec<TableEvent> {
    let view = table.view();
    let events = match table.bulk().state().clone() {
        OrchestratorState::ConfirmPending { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                table.dispatch(TableCommand::Bulk(BulkCommand::Confirm))
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                table.dispatch(TableCommand::Bulk(BulkCommand::Dismiss))
            }
            _ => Vec::new(),
        },
        OrchestratorState::InputPending { mut value, .. } => match key.code {
            KeyCode::Enter => table.dispatch(TableCommand::Bulk(BulkCommand::Submit)),
            KeyCode::Esc => table.dispatch(TableCommand::Bulk(BulkCommand::Dismiss)),
            KeyCode::Backspace => {
                value.pop();
                table.dispatch(TableCommand::Bulk(BulkCommand::SetInput(value)))
            }
            KeyCode::Char(ch) => {
                value.push(ch);
                table.dispatch(TableCommand::Bulk(BulkCommand::SetInput(value)))
            }
            _ => Vec::new(),
        },
        _ if ui.edit.is_some() => handle_edit_key(table, ui, &view, key),
        _ => handle_browse_key(table, ui, &view, key),
    };
    apply_events(ui, &events);
    ui.clamp_to(&table.view());
    events
}

fn handle_edit_key<R: TableRow>(
    table: &mut TableController<R>,
    ui: &mut UiState,
    view: &TableView,
    key: KeyEvent,
) -> Vec<TableEvent> {
    let focus = Focus::of(view, ui);
    let Some(buffer) = ui.edit.as_mut() else {
        return Vec::new();
    };
    match key.code {
        KeyCode::Esc => {
            ui.edit = None;
            ui.status = Some("edit cancelled".to_owned());
            Vec::new()
        }
        KeyCode::Backspace => {
            buffer.pop();
            Vec::new()
        }
        KeyCode::Char(ch) => {
            buffer.push(ch);
            Vec::new()
        }
        KeyCode::Enter => {
            let raw = buffer.clone();
            let (Some(row_id), Some(column_id)) = (focus.row, focus.column) else {
                ui.edit = None;
                return Vec::new();
            };
            table.dispatch(TableCommand::EditCell {
                row_id,
                column_id,
                raw,
            })
        }
        _ => Vec::new(),
    }
}

fn handle_browse_key<R: TableRow>(
    table: &mut TableController<R>,
    ui: &mut UiState,
    view: &TableView,
    key: KeyEvent,
) -> Vec<TableEvent> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
            ui.quit = true;
            return Vec::new();
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => {
            ui.cursor_row = ui.cursor_row.saturating_add(1);
            return Vec::new();
        }
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => {
            ui.cursor_row = ui.cursor_row.saturating_sub(1);
            return Vec::new();
        }
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => {
            ui.focused_column = ui.focused_column.saturating_sub(1);
            return Vec::new();
        }
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => {
            ui.focused_column = ui.focused_column.saturating_add(1);
            return Vec::new();
        }
        _ => {}
    }

    let focus = Focus::of(view, ui);
    match key.code {
        KeyCode::Char('e') => {
            let editable = focus
                .column
                .as_ref()
                .and_then(|column_id| table.definition(column_id.as_str()))
                .is_some_and(|definition| definition.editable);
            if editable && focus.row.is_some() {
                ui.edit = Some(String::new());
                ui.status = Some("editing: enter to save, esc to cancel".to_owned());
            } else {
                ui.status = Some("column is read-only".to_owned());
            }
            return Vec::new();
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('-') => {
            let Some(column_id) = focus.column else {
                return Vec::new();
            };
            let delta = if key.code == KeyCode::Char('-') { -1 } else { 1 };
            return resize_commands(column_id, delta)
                .into_iter()
                .flat_map(|command| table.dispatch(command))
                .collect();
        }
        _ => {}
    }

    match table_command_for_key(key, &focus, table.bulk().catalog()) {
        Some(command) => table.dispatch(command),
        None => Vec::new(),
    }
}

/// Folds controller events into terminal state.
pub fn apply_events(ui: &mut UiState, events: &[TableEvent]) {
    for event in events {
        match event {
            TableEvent::Status(status) => ui.status = Some(status.message()),
            TableEvent::ColumnStatesChanged(_) | TableEvent::SortChanged(_) => {
                ui.layout_dirty = true;
            }
            TableEvent::PageChanged(_) => ui.cursor_row = 0,
            TableEvent::CellEdited { .. } => ui.edit = None,
            TableEvent::EditRejected { message, .. } => {
                ui.status = Some(format!("edit rejected: {message}"));
            }
            TableEvent::Bulk(BulkEvent::Rejected(rejection)) => {
                ui.status = Some(rejection.to_string());
            }
            TableEvent::Bulk(BulkEvent::Started(request)) => {
                ui.status = Some(format!(
                    "running {} on {} rows",
                    request.action_id,
                    request.selected.len()
                ));
            }
            TableEvent::Bulk(BulkEvent::Succeeded { action_id, .. }) => {
                ui.status = Some(format!("{action_id} finished"));
            }
            TableEvent::Bulk(BulkEvent::Failed {
                action_id, error, ..
            }) => {
                ui.status = Some(format!("{action_id} failed: {error}"));
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
enum InternalEvent {
    BulkFinished(ExecutionReport),
}

/// Runs `restore` exactly once: on `finish`, or on drop when an early
/// return skips `finish`.
struct RestoreGuard<F: FnMut() -> Result<()>> {
    restore: Option<F>,
}

impl<F: FnMut() -> Result<()>> RestoreGuard<F> {
    fn new(restore: F) -> Self {
        Self {
            restore: Some(restore),
        }
    }

    fn finish(mut self) -> Result<()> {
        match self.restore.take() {
            Some(mut restore) => restore(),
            None => Ok(()),
        }
    }
}

impl<F: FnMut() -> Result<()>> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        if let Some(mut restore) = self.restore.take()
            && let Err(error) = restore()
        {
            warn!(error = %format!("{error:#}"), "terminal restore failed");
        }
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    Ok(())
}

/// Drives one table in the terminal until the user quits. Layout changes
/// are written to `store` as they happen.
pub fn run_app<R: TableRow + Clone>(
    table: &mut TableController<R>,
    store: Option<&dyn LayoutStore>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let guard = RestoreGuard::new(restore_terminal);
    execute!(io::stdout(), terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let result = event_loop(table, store);
    guard.finish()?;
    result
}

fn event_loop<R: TableRow + Clone>(
    table: &mut TableController<R>,
    store: Option<&dyn LayoutStore>,
) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut ui = UiState::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut in_flight: Option<ExecutionRequest> = None;

    loop {
        let events = drain_internal_events(table, &internal_rx);
        apply_events(&mut ui, &events);
        finish_bulk(table, &mut ui, &events, &mut in_flight);
        persist_layout(table, &mut ui, store);

        terminal
            .draw(|frame| render(frame, table, &ui))
            .context("draw frame")?;

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    let events = handle_key(table, &mut ui, key);
                    start_bulk(&events, &internal_tx, &mut in_flight);
                    persist_layout(table, &mut ui, store);
                    if ui.quit {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }
}

fn drain_internal_events<R: TableRow>(
    table: &mut TableController<R>,
    internal_rx: &Receiver<InternalEvent>,
) -> Vec<TableEvent> {
    let mut events = Vec::new();
    while let Ok(event) = internal_rx.try_recv() {
        match event {
            InternalEvent::BulkFinished(report) => {
                events.extend(table.dispatch(TableCommand::Bulk(report.into_command())));
            }
        }
    }
    events
}

fn start_bulk(
    events: &[TableEvent],
    internal_tx: &Sender<InternalEvent>,
    in_flight: &mut Option<ExecutionRequest>,
) {
    for event in events {
        let TableEvent::Bulk(BulkEvent::Started(request)) = event else {
            continue;
        };
        *in_flight = Some(request.clone());
        let (report_tx, report_rx) = mpsc::channel();
        spawn_execution(request.clone(), run_demo_action, report_tx);
        let internal_tx = internal_tx.clone();
        thread::spawn(move || {
            let Ok(report) = report_rx.recv() else {
                return;
            };
            if internal_tx.send(InternalEvent::BulkFinished(report)).is_err() {
                warn!("ui loop closed before bulk report arrived");
            }
        });
    }
}

fn run_demo_action(action_id: &str, selected: &[RowId], input: Option<&str>) -> Result<()> {
    info!(
        action = action_id,
        rows = selected.len(),
        input = input.unwrap_or_default(),
        "bulk action running"
    );
    thread::sleep(Duration::from_millis(300));
    if action_id == "print" && selected.len() > PRINT_QUEUE_LIMIT {
        return Err(anyhow!(
            "print queue holds at most {PRINT_QUEUE_LIMIT} rows, got {}",
            selected.len()
        ));
    }
    Ok(())
}

fn finish_bulk<R: TableRow + Clone>(
    table: &mut TableController<R>,
    ui: &mut UiState,
    events: &[TableEvent],
    in_flight: &mut Option<ExecutionRequest>,
) {
    for event in events {
        match event {
            TableEvent::Bulk(BulkEvent::Succeeded { action_id, .. }) if action_id == "delete" => {
                let Some(request) = in_flight.take() else {
                    continue;
                };
                let remaining = table
                    .rows()
                    .iter()
                    .filter(|row| !request.selected.contains(&row.row_id()))
                    .cloned()
                    .collect();
                let follow_up = table.set_rows(remaining);
                apply_events(ui, &follow_up);
                ui.status = Some(format!("deleted {} rows", request.selected.len()));
            }
            TableEvent::Bulk(BulkEvent::Succeeded { .. } | BulkEvent::Failed { .. }) => {
                *in_flight = None;
            }
            _ => {}
        }
    }
}

fn persist_layout<R: TableRow>(
    table: &TableController<R>,
    ui: &mut UiState,
    store: Option<&dyn LayoutStore>,
) {
    if !ui.layout_dirty {
        return;
    }
    ui.layout_dirty = false;
    let Some(store) = store else {
        return;
    };
    if let Err(error) = table.save_layout(store) {
        warn!(table = table.table_id(), error = %error, "layout save failed");
        ui.status = Some(format!("layout save failed: {error:#}"));
    }
}

pub fn render<R: TableRow>(
    frame: &mut ratatui::Frame<'_>,
    table: &TableController<R>,
    ui: &UiState,
) {
    let view = table.view();
    let banners = banner_lines(&view);
    let banner_height = u16::try_from(banners.len()).unwrap_or(u16::MAX);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let toolbar = Paragraph::new(toolbar_text(&view.selection, table.bulk().catalog())).block(
        Block::default()
            .title(format!("tabula: {}", table.table_id()))
            .borders(Borders::ALL),
    );
    frame.render_widget(toolbar, chunks[0]);

    if !banners.is_empty() {
        let banner = Paragraph::new(banners.join("\n")).style(Style::default().fg(Color::Red));
        frame.render_widget(banner, chunks[1]);
    }

    render_table(frame, chunks[2], &view, ui);

    let pages = Paragraph::new(format!(
        "{}  page {}/{}",
        pagination_text(&view.pages, view.page),
        view.page,
        view.total_pages
    ));
    frame.render_widget(pages, chunks[3]);

    let status = Paragraph::new(status_text(ui)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, chunks[4]);

    if let Some((title, body)) = dialog_text(table) {
        let area = centered_rect(60, 30, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(body).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(dialog, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view: &TableView, ui: &UiState) {
    let mut header_cells = vec![Cell::from(checkbox_glyph(view.selection.page))];
    for (index, header) in view.headers.iter().enumerate() {
        let mut label = header_label(header, view.sort_count);
        let indicator = view
            .drop_indicator
            .as_ref()
            .filter(|indicator| indicator.column_id == header.id);
        if let Some(indicator) = indicator {
            label = match indicator.side {
                DropSide::Left => format!("{DROP_MARK}{label}"),
                DropSide::Right => format!("{label}{DROP_MARK}"),
            };
        }
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == ui.focused_column {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        header_cells.push(Cell::from(label).style(style));
    }

    let rows = view
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = vec![Cell::from(if row.selected { "[x]" } else { "[ ]" })];
            for (column, (text, header)) in row.cells.iter().zip(&view.headers).enumerate() {
                let text = if index == ui.cursor_row && column == ui.focused_column {
                    ui.edit
                        .as_ref()
                        .map_or_else(|| text.clone(), |buffer| format!("{buffer}_"))
                } else {
                    text.clone()
                };
                cells.push(Cell::from(align_text(&text, header)));
            }
            let mut style = Style::default();
            if row.selected {
                style = style.fg(Color::Green);
            }
            if index == ui.cursor_row {
                style = style.bg(Color::DarkGray);
            }
            Row::new(cells).style(style)
        })
        .collect::<Vec<_>>();

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(
        view.headers
            .iter()
            .map(|header| Constraint::Length(column_cells(header.width))),
    );

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("{} rows", view.selection.total_count))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn align_text(text: &str, header: &HeaderView) -> String {
    let width = usize::from(column_cells(header.width));
    match header.align {
        Align::Left => text.to_owned(),
        Align::Right => format!("{text:>width$}"),
        Align::Center => format!("{text:^width$}"),
    }
}

fn status_text(ui: &UiState) -> String {
    let hint = if ui.edit.is_some() {
        "enter save | esc cancel"
    } else {
        "enter sort | shift+enter add sort | x select | a all | v page | [ ] pages | < > move | - + width | c hide | e edit | q quit"
    };
    match &ui.status {
        Some(status) => format!("{status}\n{hint}"),
        None => hint.to_owned(),
    }
}

fn dialog_text<R: TableRow>(table: &TableController<R>) -> Option<(String, String)> {
    let catalog = table.bulk().catalog();
    let label_of = |action_id: &str| {
        catalog
            .get(action_id)
            .map_or_else(|| action_id.to_owned(), |action| action.label.clone())
    };
    match table.bulk().state() {
        OrchestratorState::ConfirmPending { action_id } => {
            let message = catalog
                .get(action_id)
                .and_then(|action| action.confirmation.clone())
                .unwrap_or_else(|| "Are you sure?".to_owned());
            Some((
                label_of(action_id),
                format!("{message}\n\ny confirm | n cancel"),
            ))
        }
        OrchestratorState::InputPending { action_id, value } => {
            let input = catalog
                .get(action_id)
                .and_then(|action| action.input.as_ref());
            let shown = if value.is_empty() {
                input
                    .and_then(|input| input.placeholder.clone())
                    .unwrap_or_default()
            } else {
                value.clone()
            };
            let mut body = format!("{shown}_");
            if let Some(input) = input.filter(|input| !input.options.is_empty()) {
                body.push_str(&format!("\n\noptions: {}", input.options.join(", ")));
            }
            body.push_str("\n\nenter submit | esc cancel");
            Some((label_of(action_id), body))
        }
        OrchestratorState::Executing {
            request,
            from_dialog: true,
        } => Some((
            label_of(&request.action_id),
            format!("working on {} rows...", request.selected.len()),
        )),
        _ => None,
    }
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
