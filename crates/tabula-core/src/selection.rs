// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::RowId;

pub type RowIdSet = BTreeSet<RowId>;

/// The ids a selection is evaluated against: every row in the result set and
/// the subset shown on the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionUniverse {
    all: RowIdSet,
    page: RowIdSet,
}

impl SelectionUniverse {
    /// Page ids outside `all` are ignored.
    pub fn new(
        all: impl IntoIterator<Item = RowId>,
        page: impl IntoIterator<Item = RowId>,
    ) -> Self {
        let all = all.into_iter().collect::<RowIdSet>();
        let page = page
            .into_iter()
            .filter(|id| all.contains(id))
            .collect::<RowIdSet>();
        Self { all, page }
    }

    pub fn all(&self) -> &RowIdSet {
        &self.all
    }

    pub fn page(&self) -> &RowIdSet {
        &self.page
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.all.contains(&id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl CheckState {
    fn from_counts(selected: usize, total: usize) -> Self {
        if total > 0 && selected == total {
            Self::Checked
        } else if selected > 0 {
            Self::Indeterminate
        } else {
            Self::Unchecked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSummary {
    pub selected_count: usize,
    pub total_count: usize,
    pub page_selected_count: usize,
    pub page_count: usize,
    pub all: CheckState,
    pub page: CheckState,
}

/// Drops ids that are no longer part of the universe.
pub fn prune(selected: &RowIdSet, universe: &SelectionUniverse) -> RowIdSet {
    selected.intersection(&universe.all).copied().collect()
}

pub fn select_all(universe: &SelectionUniverse) -> RowIdSet {
    universe.all.clone()
}

pub fn deselect_all() -> RowIdSet {
    RowIdSet::new()
}

pub fn select_current_page(selected: &RowIdSet, universe: &SelectionUniverse) -> RowIdSet {
    let mut next = prune(selected, universe);
    next.extend(universe.page.iter().copied());
    next
}

pub fn deselect_current_page(selected: &RowIdSet, universe: &SelectionUniverse) -> RowIdSet {
    prune(selected, universe)
        .difference(&universe.page)
        .copied()
        .collect()
}

/// Complement against the whole universe, not just the page.
pub fn invert(selected: &RowIdSet, universe: &SelectionUniverse) -> RowIdSet {
    universe.all.difference(selected).copied().collect()
}

/// Adds or removes one id. Ids outside the universe are ignored.
pub fn toggle_one(selected: &RowIdSet, universe: &SelectionUniverse, id: RowId) -> RowIdSet {
    let mut next = prune(selected, universe);
    if universe.contains(id) && !next.remove(&id) {
        next.insert(id);
    }
    next
}

pub fn is_all_selected(selected: &RowIdSet, universe: &SelectionUniverse) -> bool {
    let count = prune(selected, universe).len();
    count > 0 && count == universe.all.len()
}

pub fn is_partially_selected(selected: &RowIdSet, universe: &SelectionUniverse) -> bool {
    let count = prune(selected, universe).len();
    count > 0 && count < universe.all.len()
}

pub fn summarize(selected: &RowIdSet, universe: &SelectionUniverse) -> SelectionSummary {
    let selected_count = prune(selected, universe).len();
    let page_selected_count = universe
        .page
        .iter()
        .filter(|id| selected.contains(*id))
        .count();
    SelectionSummary {
        selected_count,
        total_count: universe.all.len(),
        page_selected_count,
        page_count: universe.page.len(),
        all: CheckState::from_counts(selected_count, universe.all.len()),
        page: CheckState::from_counts(page_selected_count, universe.page.len()),
    }
}
