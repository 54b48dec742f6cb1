// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::rc::Rc;
use tracing::{debug, info};

use crate::{
    Accessor, ActionCatalog, Align, BulkActionHandler, BulkActionOrchestrator, BulkCommand,
    BulkEvent, CellValue, ColumnDefinition, ColumnId, ColumnReorderEngine, ColumnResizeEngine,
    ColumnState, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_WINDOW, DropIndicator, LARGE_SELECTION_THRESHOLD,
    LayoutStore, ListenerRegistry, PageItem, PageState, PointerPosition, RowId, RowIdSet,
    SelectionSummary, SelectionUniverse, SortClick, SortDirection, SortEntry, SortSpec, TableRow,
    commit_edit, derive_initial_state, deselect_all, deselect_current_page, hide_all,
    in_display_order, invert, layout_key, load_layout, move_by, prune, reset, save_layout,
    select_all, select_current_page, set_width, show_all, sorted_indices, summarize,
    toggle_one, toggle_visibility, validate_definitions, visible_pages,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub page_size: usize,
    pub page_window: u32,
    pub large_selection_threshold: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_window: DEFAULT_PAGE_WINDOW,
            large_selection_threshold: LARGE_SELECTION_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    ClickHeader {
        column_id: ColumnId,
        click: SortClick,
    },
    ClearSort,
    ToggleColumn(ColumnId),
    ShowAllColumns,
    HideAllColumns,
    ResetLayout,
    DragStart(ColumnId),
    DragOver {
        column_id: ColumnId,
        position: PointerPosition,
    },
    Drop(ColumnId),
    DragEnd,
    MoveColumn {
        column_id: ColumnId,
        delta: isize,
    },
    ResizePress {
        column_id: ColumnId,
        pointer_x: i32,
    },
    ResizeMove {
        pointer_x: i32,
    },
    ResizeRelease,
    SelectAll,
    DeselectAll,
    SelectPage,
    DeselectPage,
    InvertSelection,
    ToggleRow(RowId),
    GoToPage(u32),
    NextPage,
    PrevPage,
    SetPageSize(usize),
    EditCell {
        row_id: RowId,
        column_id: ColumnId,
        raw: String,
    },
    Bulk(BulkCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    SortAsc(String),
    SortDesc(String),
    SortRemoved(String),
    SortCleared,
    SortUnavailable(String),
    ColumnHidden(String),
    ColumnShown(String),
    KeepOneColumnVisible,
    ColumnsShown,
    ColumnsHidden,
    LayoutReset,
    ColumnMoved(String),
    ResizeUnavailable(String),
    UnknownColumn(String),
    RowNotFound(RowId),
    CellSaved(String),
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::SortAsc(header) => format!("sort: {header} asc"),
            Self::SortDesc(header) => format!("sort: {header} desc"),
            Self::SortRemoved(header) => format!("sort: {header} removed"),
            Self::SortCleared => "sort: cleared".to_owned(),
            Self::SortUnavailable(header) => format!("{header} is not sortable"),
            Self::ColumnHidden(header) => format!("column hidden: {header}"),
            Self::ColumnShown(header) => format!("column shown: {header}"),
            Self::KeepOneColumnVisible => "keep at least one column visible".to_owned(),
            Self::ColumnsShown => "all columns shown".to_owned(),
            Self::ColumnsHidden => "all but the first column hidden".to_owned(),
            Self::LayoutReset => "layout reset".to_owned(),
            Self::ColumnMoved(header) => format!("column moved: {header}"),
            Self::ResizeUnavailable(header) => format!("{header} has a fixed width"),
            Self::UnknownColumn(id) => format!("unknown column `{id}`"),
            Self::RowNotFound(id) => format!("row {id} no longer exists"),
            Self::CellSaved(header) => format!("{header} updated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    ColumnStatesChanged(Vec<ColumnState>),
    Resized {
        column_id: ColumnId,
        width: u32,
    },
    Reordered {
        from_index: usize,
        to_index: usize,
    },
    DropIndicatorChanged(Option<DropIndicator>),
    SortChanged(SortSpec),
    SelectionChanged(SelectionSummary),
    PageChanged(u32),
    PageSizeChanged(usize),
    CellEdited {
        row_id: RowId,
        column_id: ColumnId,
        value: CellValue,
    },
    EditRejected {
        row_id: RowId,
        column_id: ColumnId,
        message: String,
    },
    Bulk(BulkEvent),
    Status(TableStatus),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub id: ColumnId,
    pub header: String,
    pub width: u32,
    pub align: Align,
    pub sortable: bool,
    pub resizable: bool,
    pub sort: Option<SortEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: RowId,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Snapshot of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub sort_count: usize,
    pub selection: SelectionSummary,
    pub page: u32,
    pub total_pages: u32,
    pub pages: Vec<PageItem>,
    pub banner: Option<String>,
    pub drop_indicator: Option<DropIndicator>,
    pub last_error: Option<String>,
}

/// One table instance: owns its layout, sort, selection, paging and bulk
/// toolbar state and turns commands into events.
#[derive(Debug)]
pub struct TableController<R: TableRow> {
    table_id: String,
    definitions: Vec<ColumnDefinition>,
    rows: Vec<R>,
    order: Vec<usize>,
    columns: Vec<ColumnState>,
    sort: SortSpec,
    selected: RowIdSet,
    page: PageState,
    page_window: u32,
    reorder: ColumnReorderEngine,
    resize: ColumnResizeEngine,
    bulk: BulkActionOrchestrator,
}

impl<R: TableRow> TableController<R> {
    pub fn new(
        table_id: &str,
        definitions: Vec<ColumnDefinition>,
        rows: Vec<R>,
        registry: Rc<dyn ListenerRegistry>,
        config: TableConfig,
    ) -> Result<Self> {
        validate_definitions(&definitions)?;
        let columns = derive_initial_state(&definitions);
        let order = (0..rows.len()).collect();
        let page = PageState::new(config.page_size, rows.len());
        info!(
            table = table_id,
            columns = definitions.len(),
            rows = rows.len(),
            "table created"
        );
        Ok(Self {
            table_id: table_id.to_owned(),
            definitions,
            rows,
            order,
            columns,
            sort: SortSpec::new(),
            selected: RowIdSet::new(),
            page,
            page_window: config.page_window,
            reorder: ColumnReorderEngine::new(Rc::clone(&registry)),
            resize: ColumnResizeEngine::new(registry),
            bulk: BulkActionOrchestrator::new(ActionCatalog::with_builtins())
                .with_threshold(config.large_selection_threshold),
        })
    }

    pub fn with_actions(mut self, catalog: ActionCatalog) -> Self {
        let threshold = self.bulk.threshold();
        self.bulk = BulkActionOrchestrator::new(catalog).with_threshold(threshold);
        self
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn definitions(&self) -> &[ColumnDefinition] {
        &self.definitions
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn selected(&self) -> &RowIdSet {
        &self.selected
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn bulk(&self) -> &BulkActionOrchestrator {
        &self.bulk
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn definition(&self, column_id: &str) -> Option<&ColumnDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.id == column_id)
    }

    /// Every row in sort order.
    pub fn display_rows(&self) -> Vec<&R> {
        self.order.iter().map(|index| &self.rows[*index]).collect()
    }

    /// Rows on the current page, in sort order.
    pub fn page_rows(&self) -> Vec<&R> {
        let range = self.page.page_range();
        self.order[range]
            .iter()
            .map(|index| &self.rows[*index])
            .collect()
    }

    /// Selected ids in display order.
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.display_rows()
            .into_iter()
            .map(TableRow::row_id)
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    pub fn selected_rows(&self) -> Vec<&R> {
        self.rows_for(&self.selected_ids())
    }

    /// Resolves ids (for example a bulk request's) to rows, skipping ids that
    /// are gone.
    pub fn rows_for(&self, ids: &[RowId]) -> Vec<&R> {
        ids.iter()
            .filter_map(|id| self.rows.iter().find(|row| row.row_id() == *id))
            .collect()
    }

    pub fn universe(&self) -> SelectionUniverse {
        SelectionUniverse::new(
            self.rows.iter().map(TableRow::row_id),
            self.page_rows().into_iter().map(TableRow::row_id),
        )
    }

    pub fn selection_summary(&self) -> SelectionSummary {
        summarize(&self.selected, &self.universe())
    }

    /// Replaces the row set. Sort is reapplied, selection pruned and the page
    /// kept in range.
    pub fn set_rows(&mut self, rows: Vec<R>) -> Vec<TableEvent> {
        let page_before = self.page.page();
        self.rows = rows;
        self.page.set_total_rows(self.rows.len());
        self.resort();

        let mut events = Vec::new();
        let pruned = prune(&self.selected, &self.universe());
        if pruned != self.selected {
            self.selected = pruned;
            events.push(TableEvent::SelectionChanged(self.selection_summary()));
        }
        if self.page.page() != page_before {
            events.push(TableEvent::PageChanged(self.page.page()));
        }
        events
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        match command {
            TableCommand::ClickHeader { column_id, click } => self.click_header(&column_id, click),
            TableCommand::ClearSort => {
                self.sort = SortSpec::new();
                self.resort();
                vec![
                    TableEvent::SortChanged(self.sort.clone()),
                    TableEvent::Status(TableStatus::SortCleared),
                ]
            }
            TableCommand::ToggleColumn(column_id) => self.toggle_column(&column_id),
            TableCommand::ShowAllColumns => {
                self.columns = show_all(std::mem::take(&mut self.columns));
                self.columns_changed(TableStatus::ColumnsShown)
            }
            TableCommand::HideAllColumns => {
                self.columns = hide_all(std::mem::take(&mut self.columns));
                self.columns_changed(TableStatus::ColumnsHidden)
            }
            TableCommand::ResetLayout => {
                let was_dragging = self.reorder.cancel();
                self.resize.release();
                self.columns = reset(&self.definitions);
                self.sort = SortSpec::new();
                self.resort();
                info!(table = %self.table_id, "table layout reset");
                let mut events = Vec::new();
                if was_dragging {
                    events.push(TableEvent::DropIndicatorChanged(None));
                }
                events.push(TableEvent::ColumnStatesChanged(self.columns.clone()));
                events.push(TableEvent::SortChanged(self.sort.clone()));
                events.push(TableEvent::Status(TableStatus::LayoutReset));
                events
            }
            TableCommand::DragStart(column_id) => {
                if !self.reorder.start(&self.columns, column_id.as_str()) {
                    return vec![TableEvent::Status(TableStatus::UnknownColumn(
                        column_id.to_string(),
                    ))];
                }
                Vec::new()
            }
            TableCommand::DragOver {
                column_id,
                position,
            } => {
                let before = self.reorder.indicator();
                let after = self.reorder.over(&self.columns, column_id.as_str(), position);
                if before == after {
                    Vec::new()
                } else {
                    vec![TableEvent::DropIndicatorChanged(after)]
                }
            }
            TableCommand::Drop(target) => {
                let was_dragging = self.reorder.is_dragging();
                let Some(outcome) = self.reorder.drop_on(&self.columns, target.as_str()) else {
                    return if was_dragging {
                        vec![TableEvent::DropIndicatorChanged(None)]
                    } else {
                        Vec::new()
                    };
                };
                self.columns = outcome.states;
                vec![
                    TableEvent::DropIndicatorChanged(None),
                    TableEvent::Reordered {
                        from_index: outcome.from_index,
                        to_index: outcome.to_index,
                    },
                    TableEvent::ColumnStatesChanged(self.columns.clone()),
                ]
            }
            TableCommand::DragEnd => {
                if self.reorder.end() {
                    vec![TableEvent::DropIndicatorChanged(None)]
                } else {
                    Vec::new()
                }
            }
            TableCommand::MoveColumn { column_id, delta } => {
                let Some(outcome) = move_by(&self.columns, column_id.as_str(), delta) else {
                    return Vec::new();
                };
                self.columns = outcome.states;
                let header = self.header_of(column_id.as_str());
                vec![
                    TableEvent::Reordered {
                        from_index: outcome.from_index,
                        to_index: outcome.to_index,
                    },
                    TableEvent::ColumnStatesChanged(self.columns.clone()),
                    TableEvent::Status(TableStatus::ColumnMoved(header)),
                ]
            }
            TableCommand::ResizePress {
                column_id,
                pointer_x,
            } => self.resize_press(&column_id, pointer_x),
            TableCommand::ResizeMove { pointer_x } => {
                let Some(update) = self.resize.pointer_move(pointer_x) else {
                    return Vec::new();
                };
                self.columns = set_width(
                    std::mem::take(&mut self.columns),
                    update.column_id.as_str(),
                    update.width,
                );
                vec![TableEvent::Resized {
                    column_id: update.column_id,
                    width: update.width,
                }]
            }
            TableCommand::ResizeRelease => {
                let Some(update) = self.resize.release() else {
                    return Vec::new();
                };
                self.columns = set_width(
                    std::mem::take(&mut self.columns),
                    update.column_id.as_str(),
                    update.width,
                );
                vec![TableEvent::ColumnStatesChanged(self.columns.clone())]
            }
            TableCommand::SelectAll => self.select(|_, universe| select_all(universe)),
            TableCommand::DeselectAll => self.select(|_, _| deselect_all()),
            TableCommand::SelectPage => self.select(select_current_page),
            TableCommand::DeselectPage => self.select(deselect_current_page),
            TableCommand::InvertSelection => self.select(invert),
            TableCommand::ToggleRow(id) => {
                self.select(|selected, universe| toggle_one(selected, universe, id))
            }
            TableCommand::GoToPage(page) => self.go_to_page(page),
            TableCommand::NextPage => self.go_to_page(self.page.page().saturating_add(1)),
            TableCommand::PrevPage => self.go_to_page(self.page.page().saturating_sub(1)),
            TableCommand::SetPageSize(page_size) => {
                self.page.set_page_size(page_size);
                vec![
                    TableEvent::PageSizeChanged(self.page.page_size()),
                    TableEvent::PageChanged(self.page.page()),
                ]
            }
            TableCommand::EditCell {
                row_id,
                column_id,
                raw,
            } => self.edit_cell(row_id, column_id, &raw),
            TableCommand::Bulk(command) => {
                let selected = self.selected_ids();
                self.bulk
                    .dispatch(command, &selected)
                    .into_iter()
                    .map(TableEvent::Bulk)
                    .collect()
            }
        }
    }

    /// Runs the pending bulk request through `handler` on this thread.
    pub fn run_bulk_with<H>(&mut self, handler: &mut H) -> Vec<TableEvent>
    where
        H: BulkActionHandler + ?Sized,
    {
        self.bulk
            .run_with(handler)
            .into_iter()
            .map(TableEvent::Bulk)
            .collect()
    }

    pub fn view(&self) -> TableView {
        let visible = in_display_order(&self.columns)
            .into_iter()
            .filter(|state| state.visible)
            .filter_map(|state| {
                self.definition(state.id.as_str())
                    .map(|definition| (definition, state.width))
            })
            .collect::<Vec<_>>();

        let headers = visible
            .iter()
            .map(|(definition, width)| HeaderView {
                id: definition.id.clone(),
                header: definition.header.clone(),
                width: *width,
                align: definition.align(),
                sortable: definition.sortable,
                resizable: definition.resizable,
                sort: self.sort.get(definition.id.as_str()).cloned(),
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| RowView {
                id: row.row_id(),
                selected: self.selected.contains(&row.row_id()),
                cells: visible
                    .iter()
                    .map(|(definition, _)| definition.render_cell(row))
                    .collect(),
            })
            .collect();

        TableView {
            headers,
            rows,
            sort_count: self.sort.len(),
            selection: self.selection_summary(),
            page: self.page.page(),
            total_pages: self.page.total_pages(),
            pages: visible_pages(self.page.page(), self.page.total_pages(), self.page_window),
            banner: self.bulk.large_selection_warning(self.selected.len()),
            drop_indicator: self.reorder.indicator(),
            last_error: self.bulk.last_error().map(str::to_owned),
        }
    }

    pub fn save_layout(&self, store: &dyn LayoutStore) -> Result<()> {
        save_layout(
            store,
            &layout_key(&self.table_id),
            &self.columns,
            &self.sort,
        )
    }

    /// Applies a saved layout if one exists. Returns whether one was found.
    pub fn load_layout(&mut self, store: &dyn LayoutStore) -> Result<bool> {
        let Some(layout) = load_layout(store, &layout_key(&self.table_id), &self.definitions)?
        else {
            return Ok(false);
        };
        self.columns = layout.columns;
        self.sort = layout.sort;
        self.resort();
        Ok(true)
    }

    fn resort(&mut self) {
        self.order = sorted_indices(&self.definitions, &self.rows, &self.sort);
    }

    fn header_of(&self, column_id: &str) -> String {
        self.definition(column_id)
            .map_or_else(|| column_id.to_owned(), |definition| definition.header.clone())
    }

    fn columns_changed(&self, status: TableStatus) -> Vec<TableEvent> {
        vec![
            TableEvent::ColumnStatesChanged(self.columns.clone()),
            TableEvent::Status(status),
        ]
    }

    fn click_header(&mut self, column_id: &ColumnId, click: SortClick) -> Vec<TableEvent> {
        let Some(definition) = self.definition(column_id.as_str()) else {
            return vec![TableEvent::Status(TableStatus::UnknownColumn(
                column_id.to_string(),
            ))];
        };
        let header = definition.header.clone();
        if !definition.sortable {
            return vec![TableEvent::Status(TableStatus::SortUnavailable(header))];
        }
        self.sort = self.sort.click(column_id, click);
        self.resort();
        let status = match self.sort.direction_of(column_id.as_str()) {
            Some(SortDirection::Asc) => TableStatus::SortAsc(header),
            Some(SortDirection::Desc) => TableStatus::SortDesc(header),
            None => TableStatus::SortRemoved(header),
        };
        vec![
            TableEvent::SortChanged(self.sort.clone()),
            TableEvent::Status(status),
        ]
    }

    fn toggle_column(&mut self, column_id: &ColumnId) -> Vec<TableEvent> {
        let Some(state) = self.columns.iter().find(|state| state.id == *column_id) else {
            return vec![TableEvent::Status(TableStatus::UnknownColumn(
                column_id.to_string(),
            ))];
        };
        let hiding = state.visible;
        let visible_count = self.columns.iter().filter(|state| state.visible).count();
        if hiding && visible_count <= 1 {
            return vec![TableEvent::Status(TableStatus::KeepOneColumnVisible)];
        }
        self.columns = toggle_visibility(std::mem::take(&mut self.columns), column_id.as_str());
        let header = self.header_of(column_id.as_str());
        let status = if hiding {
            TableStatus::ColumnHidden(header)
        } else {
            TableStatus::ColumnShown(header)
        };
        self.columns_changed(status)
    }

    fn resize_press(&mut self, column_id: &ColumnId, pointer_x: i32) -> Vec<TableEvent> {
        let Some(definition) = self
            .definitions
            .iter()
            .find(|definition| definition.id == *column_id)
        else {
            return vec![TableEvent::Status(TableStatus::UnknownColumn(
                column_id.to_string(),
            ))];
        };
        let width = self
            .columns
            .iter()
            .find(|state| state.id == *column_id)
            .map_or_else(|| definition.initial_width(), |state| state.width);
        if !self.resize.press(definition, width, pointer_x) {
            return vec![TableEvent::Status(TableStatus::ResizeUnavailable(
                definition.header.clone(),
            ))];
        }
        Vec::new()
    }

    fn select<F>(&mut self, transform: F) -> Vec<TableEvent>
    where
        F: FnOnce(&RowIdSet, &SelectionUniverse) -> RowIdSet,
    {
        let universe = self.universe();
        let next = transform(&self.selected, &universe);
        if next == self.selected {
            return Vec::new();
        }
        self.selected = next;
        let summary = summarize(&self.selected, &universe);
        debug!(
            table = %self.table_id,
            selected = summary.selected_count,
            "selection changed"
        );
        vec![TableEvent::SelectionChanged(summary)]
    }

    fn go_to_page(&mut self, page: u32) -> Vec<TableEvent> {
        if self.page.set_page(page) {
            vec![
                TableEvent::PageChanged(self.page.page()),
                TableEvent::SelectionChanged(self.selection_summary()),
            ]
        } else {
            Vec::new()
        }
    }

    fn edit_cell(&mut self, row_id: RowId, column_id: ColumnId, raw: &str) -> Vec<TableEvent> {
        let Some(definition) = self.definition(column_id.as_str()) else {
            return vec![TableEvent::Status(TableStatus::UnknownColumn(
                column_id.to_string(),
            ))];
        };
        let Some(row_index) = self.rows.iter().position(|row| row.row_id() == row_id) else {
            return vec![TableEvent::Status(TableStatus::RowNotFound(row_id))];
        };
        let value = match commit_edit(definition, raw) {
            Ok(value) => value,
            Err(error) => {
                return vec![TableEvent::EditRejected {
                    row_id,
                    column_id,
                    message: error.to_string(),
                }];
            }
        };
        let header = definition.header.clone();
        let key = match &definition.accessor {
            Accessor::Key(key) => Some(key.clone()),
            Accessor::Computed(_) => None,
        };
        let applied = key.is_some_and(|key| self.rows[row_index].apply_edit(&key, &value));
        if applied && self.sort.get(column_id.as_str()).is_some() {
            self.resort();
        }
        vec![
            TableEvent::CellEdited {
                row_id,
                column_id,
                value,
            },
            TableEvent::Status(TableStatus::CellSaved(header)),
        ]
    }
}
