// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::{CellValue, ColumnDefinition, ColumnId, TableRow, compare_cells};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// How a header click was made. `Additive` is the multi-sort gesture
/// (ctrl/shift-click in the pointer adapters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortClick {
    Plain,
    Additive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub column_id: ColumnId,
    pub direction: SortDirection,
    pub priority: usize,
}

/// Ordered list of active sorts. Entries are kept in priority order and
/// priorities are always `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SortEntry>", into = "Vec<SortEntry>")]
pub struct SortSpec {
    entries: Vec<SortEntry>,
}

impl From<Vec<SortEntry>> for SortSpec {
    fn from(entries: Vec<SortEntry>) -> Self {
        Self::normalized(entries)
    }
}

impl From<SortSpec> for Vec<SortEntry> {
    fn from(spec: SortSpec) -> Self {
        spec.entries
    }
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a spec from arbitrary entries: stable-sorted by priority, later
    /// duplicates of a column dropped, priorities compacted.
    pub fn normalized(mut entries: Vec<SortEntry>) -> Self {
        entries.sort_by_key(|entry| entry.priority);
        let mut kept: Vec<SortEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if kept.iter().all(|existing| existing.column_id != entry.column_id) {
                kept.push(entry);
            }
        }
        let mut spec = Self { entries: kept };
        spec.compact();
        spec
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, column_id: &str) -> Option<&SortEntry> {
        self.entries
            .iter()
            .find(|entry| entry.column_id == column_id)
    }

    pub fn direction_of(&self, column_id: &str) -> Option<SortDirection> {
        self.get(column_id).map(|entry| entry.direction)
    }

    /// Applies one header click and returns the next spec.
    ///
    /// Unsorted → ascending (plain clicks replace every other sort, additive
    /// clicks append at the lowest priority), ascending → descending,
    /// descending → removed with the remaining priorities compacted.
    pub fn click(&self, column_id: &ColumnId, click: SortClick) -> Self {
        let mut next = self.clone();
        match next
            .entries
            .iter()
            .position(|entry| entry.column_id == *column_id)
        {
            Some(index) => match next.entries[index].direction {
                SortDirection::Asc => next.entries[index].direction = SortDirection::Desc,
                SortDirection::Desc => {
                    next.entries.remove(index);
                    next.compact();
                }
            },
            None => {
                if click == SortClick::Plain {
                    next.entries.clear();
                }
                let priority = next.entries.len();
                next.entries.push(SortEntry {
                    column_id: column_id.clone(),
                    direction: SortDirection::Asc,
                    priority,
                });
            }
        }
        debug!(column = %column_id, ?click, sorts = next.len(), "sort clicked");
        next
    }

    /// Drops entries whose column is gone or no longer sortable.
    pub fn retain_sortable(&self, definitions: &[ColumnDefinition]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|entry| {
                definitions
                    .iter()
                    .any(|definition| definition.id == entry.column_id && definition.sortable)
            })
            .cloned()
            .collect();
        Self::normalized(entries)
    }

    fn compact(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.priority = index;
        }
    }
}

/// Row positions in display order under `spec`. Stable: rows that compare
/// equal under every active sort keep their input order. Nulls sort last in
/// either direction; sorts naming unknown columns are skipped.
pub fn sorted_indices<R: TableRow>(
    definitions: &[ColumnDefinition],
    rows: &[R],
    spec: &SortSpec,
) -> Vec<usize> {
    let mut indices = (0..rows.len()).collect::<Vec<_>>();
    let keys = spec
        .entries()
        .iter()
        .filter_map(|entry| {
            definitions
                .iter()
                .find(|definition| definition.id == entry.column_id)
                .map(|definition| (definition, entry.direction))
        })
        .collect::<Vec<_>>();
    if keys.is_empty() {
        return indices;
    }

    let values = rows
        .iter()
        .map(|row| {
            keys.iter()
                .map(|(definition, _)| definition.cell_value(row))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    indices.sort_by(|left, right| {
        for (key_index, (definition, direction)) in keys.iter().enumerate() {
            let order = compare_for_sort(
                definition,
                *direction,
                &values[*left][key_index],
                &values[*right][key_index],
            );
            if order != Ordering::Equal {
                return order;
            }
        }
        Ordering::Equal
    });
    indices
}

fn compare_for_sort(
    definition: &ColumnDefinition,
    direction: SortDirection,
    left: &CellValue,
    right: &CellValue,
) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let order = compare_cells(definition.column_type.comparison(), left, right);
            match direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            }
        }
    }
}
