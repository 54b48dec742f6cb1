// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::{Align, CellRenderer, CellValue, ColumnId, ColumnType, RowId, builtin_renderer};

pub const DEFAULT_COLUMN_WIDTH: u32 = 150;
pub const DEFAULT_MIN_WIDTH: u32 = 80;
pub const DEFAULT_MAX_WIDTH: u32 = 1000;

/// Read access to a row's fields by accessor key. Keys may be dot paths
/// (`account.name`); resolving them is up to the row type.
pub trait RowValues {
    fn value(&self, key: &str) -> CellValue;
}

pub trait TableRow: RowValues {
    fn row_id(&self) -> RowId;

    /// Writes an accepted cell edit back into the row. Rows that are
    /// persisted elsewhere keep the default and return `false`.
    fn apply_edit(&mut self, _key: &str, _value: &CellValue) -> bool {
        false
    }
}

pub type ComputeFn = Arc<dyn Fn(&dyn RowValues) -> CellValue + Send + Sync>;
pub type ValidatorFn = Arc<dyn Fn(&CellValue) -> std::result::Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub enum Accessor {
    Key(String),
    Computed(ComputeFn),
}

impl Accessor {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&dyn RowValues) -> CellValue + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(compute))
    }

    pub fn resolve(&self, row: &dyn RowValues) -> CellValue {
        match self {
            Self::Key(key) => row.value(key),
            Self::Computed(compute) => compute(row),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Host-authored schema for one column. Immutable once handed to the table.
#[derive(Clone)]
pub struct ColumnDefinition {
    pub id: ColumnId,
    pub header: String,
    pub accessor: Accessor,
    pub column_type: ColumnType,
    pub sortable: bool,
    pub resizable: bool,
    pub editable: bool,
    pub width: Option<u32>,
    pub min_width: u32,
    pub max_width: u32,
    pub align: Option<Align>,
    pub render: Option<Arc<dyn CellRenderer>>,
    pub validator: Option<ValidatorFn>,
}

impl ColumnDefinition {
    pub fn new(id: &str, header: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: ColumnId::from(id),
            header: header.into(),
            accessor: Accessor::key(id),
            column_type,
            sortable: true,
            resizable: true,
            editable: false,
            width: None,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
            align: None,
            render: None,
            validator: None,
        }
    }

    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_bounds(mut self, min_width: u32, max_width: u32) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn CellRenderer>) -> Self {
        self.render = Some(renderer);
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&CellValue) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn align(&self) -> Align {
        self.align.unwrap_or(self.column_type.default_align())
    }

    pub fn initial_width(&self) -> u32 {
        self.clamp_width(i64::from(self.width.unwrap_or(DEFAULT_COLUMN_WIDTH)))
    }

    /// Clamps `width` into `[min_width, max_width]`. A misconfigured pair
    /// (`min > max`) collapses to `min_width`.
    pub fn clamp_width(&self, width: i64) -> u32 {
        let max = self.max_width.max(self.min_width);
        width.clamp(i64::from(self.min_width), i64::from(max)) as u32
    }

    pub fn cell_value(&self, row: &dyn RowValues) -> CellValue {
        self.accessor.resolve(row)
    }

    pub fn render_value(&self, value: &CellValue) -> String {
        match &self.render {
            Some(renderer) => renderer.render(value),
            None => builtin_renderer(self.column_type).render(value),
        }
    }

    pub fn render_cell(&self, row: &dyn RowValues) -> String {
        self.render_value(&self.cell_value(row))
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("column_type", &self.column_type)
            .field("sortable", &self.sortable)
            .field("resizable", &self.resizable)
            .field("editable", &self.editable)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("max_width", &self.max_width)
            .field("custom_render", &self.render.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Host-owned runtime attributes for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnState {
    pub id: ColumnId,
    pub visible: bool,
    pub width: u32,
    pub order: usize,
}

#[derive(Debug, Clone)]
pub struct ResolvedColumn<'a> {
    pub definition: &'a ColumnDefinition,
    pub state: ColumnState,
}

pub fn validate_definitions(definitions: &[ColumnDefinition]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for definition in definitions {
        let id = definition.id.as_str();
        if id.trim().is_empty() {
            bail!(
                "column with header {:?} has an empty id; give every column a unique id",
                definition.header
            );
        }
        if !seen.insert(id) {
            bail!("duplicate column id `{id}`; column ids must be unique within a table");
        }
        if definition.min_width > definition.max_width {
            bail!(
                "column `{id}` has min_width {} greater than max_width {}",
                definition.min_width,
                definition.max_width
            );
        }
    }
    Ok(())
}

pub fn derive_initial_state(definitions: &[ColumnDefinition]) -> Vec<ColumnState> {
    definitions
        .iter()
        .enumerate()
        .map(|(index, definition)| ColumnState {
            id: definition.id.clone(),
            visible: true,
            width: definition.initial_width(),
            order: index,
        })
        .collect()
}

/// Layout reset: back to the definition-derived defaults.
pub fn reset(definitions: &[ColumnDefinition]) -> Vec<ColumnState> {
    derive_initial_state(definitions)
}

/// Flips `visible` for `id`. Unknown ids return the input untouched.
pub fn toggle_visibility(mut states: Vec<ColumnState>, id: &str) -> Vec<ColumnState> {
    if let Some(state) = states.iter_mut().find(|state| state.id == id) {
        state.visible = !state.visible;
    }
    states
}

pub fn show_all(mut states: Vec<ColumnState>) -> Vec<ColumnState> {
    for state in &mut states {
        state.visible = true;
    }
    states
}

/// Hides every column except the one at display position 0.
pub fn hide_all(mut states: Vec<ColumnState>) -> Vec<ColumnState> {
    let first = states.iter().map(|state| state.order).min();
    for state in &mut states {
        state.visible = Some(state.order) == first;
    }
    states
}

/// Joins definitions to states by id, dropping orphan states, ordered by
/// `order`. Without states the derived defaults are used.
pub fn reconcile<'a>(
    definitions: &'a [ColumnDefinition],
    states: Option<&[ColumnState]>,
) -> Vec<ResolvedColumn<'a>> {
    let derived;
    let states = match states {
        Some(states) if !states.is_empty() => states,
        _ => {
            derived = derive_initial_state(definitions);
            derived.as_slice()
        }
    };

    let mut resolved = states
        .iter()
        .filter_map(|state| {
            definitions
                .iter()
                .find(|definition| definition.id == state.id)
                .map(|definition| ResolvedColumn {
                    definition,
                    state: state.clone(),
                })
        })
        .collect::<Vec<_>>();
    resolved.sort_by_key(|column| column.state.order);
    resolved
}

/// Repairs states read from outside: drops unknown and duplicate ids, appends
/// missing definitions, clamps widths and renumbers `order` densely.
pub fn normalize(definitions: &[ColumnDefinition], states: &[ColumnState]) -> Vec<ColumnState> {
    let mut seen = BTreeSet::new();
    let mut kept = states
        .iter()
        .filter_map(|state| {
            let definition = definitions
                .iter()
                .find(|definition| definition.id == state.id)?;
            if !seen.insert(state.id.clone()) {
                return None;
            }
            Some(ColumnState {
                id: state.id.clone(),
                visible: state.visible,
                width: definition.clamp_width(i64::from(state.width)),
                order: state.order,
            })
        })
        .collect::<Vec<_>>();
    kept.sort_by_key(|state| state.order);

    for definition in definitions {
        if !seen.contains(&definition.id) {
            kept.push(ColumnState {
                id: definition.id.clone(),
                visible: true,
                width: definition.initial_width(),
                order: usize::MAX,
            });
        }
    }

    renumber(&mut kept);
    kept
}

/// Assigns `order = position` for a slice already in display order.
pub fn renumber(states: &mut [ColumnState]) {
    for (index, state) in states.iter_mut().enumerate() {
        state.order = index;
    }
}

/// Returns the states sorted into display order.
pub fn in_display_order(states: &[ColumnState]) -> Vec<ColumnState> {
    let mut ordered = states.to_vec();
    ordered.sort_by_key(|state| state.order);
    ordered
}

pub fn has_dense_order(states: &[ColumnState]) -> bool {
    let mut orders = states.iter().map(|state| state.order).collect::<Vec<_>>();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(index, order)| index == *order)
}

pub fn set_width(mut states: Vec<ColumnState>, id: &str, width: u32) -> Vec<ColumnState> {
    if let Some(state) = states.iter_mut().find(|state| state.id == id) {
        state.width = width;
    }
    states
}

#[cfg(test)]
mod tests {
    use super::{
        ColumnDefinition, ColumnState, DEFAULT_COLUMN_WIDTH, derive_initial_state,
        has_dense_order, hide_all, normalize, reconcile, show_all, toggle_visibility,
        validate_definitions,
    };
    use crate::{CellValue, ColumnId, ColumnType, RowValues};

    fn definitions() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("name", "Name", ColumnType::Text).with_width(220),
            ColumnDefinition::new("amount", "Amount", ColumnType::Currency),
            ColumnDefinition::new("stage", "Stage", ColumnType::Badge).with_width(120),
            ColumnDefinition::new("close", "Close", ColumnType::Date),
        ]
    }

    fn state(id: &str, visible: bool, width: u32, order: usize) -> ColumnState {
        ColumnState {
            id: ColumnId::from(id),
            visible,
            width,
            order,
        }
    }

    #[test]
    fn derived_state_uses_definition_width_or_default() {
        let states = derive_initial_state(&definitions());
        assert_eq!(states.len(), 4);
        assert!(states.iter().all(|state| state.visible));
        assert_eq!(
            states.iter().map(|state| state.order).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            states.iter().map(|state| state.width).collect::<Vec<_>>(),
            vec![220, DEFAULT_COLUMN_WIDTH, 120, DEFAULT_COLUMN_WIDTH]
        );
    }

    #[test]
    fn derived_state_is_idempotent() {
        let defs = definitions();
        assert_eq!(derive_initial_state(&defs), derive_initial_state(&defs));
    }

    #[test]
    fn derived_width_is_clamped_into_bounds() {
        let defs = vec![
            ColumnDefinition::new("wide", "Wide", ColumnType::Text).with_bounds(200, 400),
            ColumnDefinition::new("huge", "Huge", ColumnType::Text).with_width(5000),
        ];
        let states = derive_initial_state(&defs);
        assert_eq!(states[0].width, 200);
        assert_eq!(states[1].width, 1000);
    }

    #[test]
    fn toggle_flips_only_matching_column() {
        let states = derive_initial_state(&definitions());
        let toggled = toggle_visibility(states.clone(), "amount");
        assert!(!toggled[1].visible);
        assert!(toggled[0].visible && toggled[2].visible && toggled[3].visible);

        let restored = toggle_visibility(toggled, "amount");
        assert_eq!(restored, states);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let states = derive_initial_state(&definitions());
        assert_eq!(toggle_visibility(states.clone(), "missing"), states);
    }

    #[test]
    fn toggle_allows_hiding_every_column() {
        let mut states = derive_initial_state(&definitions());
        for id in ["name", "amount", "stage", "close"] {
            states = toggle_visibility(states, id);
        }
        assert!(states.iter().all(|state| !state.visible));
    }

    #[test]
    fn hide_all_keeps_first_display_column() {
        let states = vec![
            state("name", true, 150, 2),
            state("amount", true, 150, 0),
            state("stage", false, 150, 1),
        ];
        let hidden = hide_all(states);
        assert_eq!(
            hidden
                .iter()
                .map(|state| (state.id.as_str(), state.visible))
                .collect::<Vec<_>>(),
            vec![("name", false), ("amount", true), ("stage", false)]
        );
        assert!(show_all(hidden).iter().all(|state| state.visible));
    }

    #[test]
    fn reconcile_sorts_by_order_and_drops_orphans() {
        let defs = definitions();
        let states = vec![
            state("close", true, 150, 0),
            state("ghost", true, 150, 1),
            state("name", false, 300, 2),
            state("stage", true, 100, 3),
            state("amount", true, 150, 4),
        ];
        let resolved = reconcile(&defs, Some(&states));
        assert_eq!(
            resolved
                .iter()
                .map(|column| column.definition.id.as_str())
                .collect::<Vec<_>>(),
            vec!["close", "name", "stage", "amount"]
        );
        assert!(!resolved[1].state.visible);
        assert_eq!(resolved[1].state.width, 300);
    }

    #[test]
    fn reconcile_without_states_derives_defaults() {
        let defs = definitions();
        let resolved = reconcile(&defs, None);
        assert_eq!(resolved.len(), defs.len());
        assert_eq!(resolved[0].state.order, 0);
        assert_eq!(reconcile(&defs, Some(&[])).len(), defs.len());
    }

    #[test]
    fn normalize_repairs_foreign_states() {
        let defs = definitions();
        let states = vec![
            state("stage", false, 10, 7),
            state("stage", true, 150, 8),
            state("ghost", true, 150, 1),
            state("name", true, 9000, 3),
        ];
        let repaired = normalize(&defs, &states);
        assert!(has_dense_order(&repaired));
        assert_eq!(
            repaired
                .iter()
                .map(|state| (state.id.as_str(), state.width, state.order))
                .collect::<Vec<_>>(),
            vec![
                ("name", 1000, 0),
                ("stage", 80, 1),
                ("amount", 150, 2),
                ("close", 150, 3),
            ]
        );
        assert!(!repaired[1].visible);
    }

    #[test]
    fn validate_rejects_duplicates_and_bad_bounds() {
        let mut defs = definitions();
        assert!(validate_definitions(&defs).is_ok());

        defs.push(ColumnDefinition::new("name", "Again", ColumnType::Text));
        let error = validate_definitions(&defs).expect_err("duplicate id should fail");
        assert!(error.to_string().contains("duplicate column id `name`"));

        let inverted =
            vec![ColumnDefinition::new("x", "X", ColumnType::Number).with_bounds(500, 100)];
        let error = validate_definitions(&inverted).expect_err("bad bounds should fail");
        assert!(error.to_string().contains("min_width 500"));
    }

    struct Deal;

    impl RowValues for Deal {
        fn value(&self, key: &str) -> CellValue {
            match key {
                "amount" => CellValue::Cents(2_500_00),
                _ => CellValue::Null,
            }
        }
    }

    #[test]
    fn accessor_and_renderer_produce_cell_text() {
        let plain = ColumnDefinition::new("amount", "Amount", ColumnType::Currency);
        assert_eq!(plain.render_cell(&Deal), "$2,500.00");

        let doubled = ColumnDefinition::new("double", "Double", ColumnType::Currency).with_accessor(
            crate::Accessor::computed(|row| match row.value("amount") {
                CellValue::Cents(cents) => CellValue::Cents(cents * 2),
                other => other,
            }),
        );
        assert_eq!(doubled.render_cell(&Deal), "$5,000.00");
    }
}
