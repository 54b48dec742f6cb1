// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{ColumnDefinition, ColumnState, SortSpec, normalize};

pub const LAYOUT_VERSION: u32 = 1;
const LAYOUT_KEY_PREFIX: &str = "layout.";

/// Key-value port for persisted table layouts.
pub trait LayoutStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLayout {
    pub version: u32,
    pub columns: Vec<ColumnState>,
    #[serde(default)]
    pub sort: SortSpec,
}

pub fn layout_key(table_id: &str) -> String {
    format!("{LAYOUT_KEY_PREFIX}{table_id}")
}

pub fn save_layout(
    store: &dyn LayoutStore,
    key: &str,
    columns: &[ColumnState],
    sort: &SortSpec,
) -> Result<()> {
    let layout = SavedLayout {
        version: LAYOUT_VERSION,
        columns: columns.to_vec(),
        sort: sort.clone(),
    };
    let encoded = serde_json::to_string(&layout).context("encode table layout")?;
    store
        .set(key, &encoded)
        .with_context(|| format!("save table layout `{key}`"))?;
    info!(key, columns = columns.len(), "table layout saved");
    Ok(())
}

/// Reads a saved layout and repairs it against the current definitions.
/// `None` when nothing was saved under `key`.
pub fn load_layout(
    store: &dyn LayoutStore,
    key: &str,
    definitions: &[ColumnDefinition],
) -> Result<Option<SavedLayout>> {
    let Some(encoded) = store
        .get(key)
        .with_context(|| format!("load table layout `{key}`"))?
    else {
        debug!(key, "no saved table layout");
        return Ok(None);
    };
    let layout: SavedLayout = serde_json::from_str(&encoded)
        .with_context(|| format!("decode table layout `{key}`; reset the layout to discard it"))?;
    if layout.version != LAYOUT_VERSION {
        bail!(
            "table layout `{key}` has version {}, expected {LAYOUT_VERSION}; reset the layout to discard it",
            layout.version
        );
    }
    let columns = normalize(definitions, &layout.columns);
    let sort = layout.sort.retain_sortable(definitions);
    info!(key, columns = columns.len(), "table layout loaded");
    Ok(Some(SavedLayout {
        version: layout.version,
        columns,
        sort,
    }))
}

#[cfg(test)]
mod tests {
    use super::{
        LayoutStore, MemoryLayoutStore, SavedLayout, layout_key, load_layout, save_layout,
    };
    use crate::{
        ColumnDefinition, ColumnId, ColumnType, SortClick, SortSpec, derive_initial_state,
        toggle_visibility,
    };
    use anyhow::Result;

    fn definitions() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("name", "Name", ColumnType::Text),
            ColumnDefinition::new("amount", "Amount", ColumnType::Currency),
            ColumnDefinition::new("notes", "Notes", ColumnType::Text).with_sortable(false),
        ]
    }

    #[test]
    fn save_then_load_restores_layout() -> Result<()> {
        let store = MemoryLayoutStore::new();
        let defs = definitions();
        let columns = toggle_visibility(derive_initial_state(&defs), "amount");
        let sort = SortSpec::new().click(&ColumnId::from("name"), SortClick::Plain);

        let key = layout_key("opportunities");
        save_layout(&store, &key, &columns, &sort)?;
        let loaded = load_layout(&store, &key, &defs)?.expect("saved layout");
        assert_eq!(loaded.columns, columns);
        assert_eq!(loaded.sort, sort);
        Ok(())
    }

    #[test]
    fn missing_layout_is_none() -> Result<()> {
        let store = MemoryLayoutStore::new();
        assert!(load_layout(&store, "layout.none", &definitions())?.is_none());
        Ok(())
    }

    #[test]
    fn loaded_layout_is_repaired_against_definitions() -> Result<()> {
        let store = MemoryLayoutStore::new();
        let stale = SavedLayout {
            version: 1,
            columns: derive_initial_state(&[ColumnDefinition::new(
                "retired",
                "Retired",
                ColumnType::Text,
            )]),
            sort: SortSpec::new()
                .click(&ColumnId::from("notes"), SortClick::Plain)
                .click(&ColumnId::from("name"), SortClick::Additive),
        };
        store.set("layout.t", &serde_json::to_string(&stale)?)?;

        let loaded = load_layout(&store, "layout.t", &definitions())?.expect("layout");
        assert_eq!(
            loaded
                .columns
                .iter()
                .map(|state| state.id.as_str())
                .collect::<Vec<_>>(),
            vec!["name", "amount", "notes"]
        );
        assert!(loaded.sort.get("notes").is_none());
        assert!(loaded.sort.get("name").is_some());
        Ok(())
    }

    #[test]
    fn other_version_is_rejected() -> Result<()> {
        let store = MemoryLayoutStore::new();
        store.set("layout.t", r#"{"version":2,"columns":[]}"#)?;
        let error = load_layout(&store, "layout.t", &definitions()).expect_err("version mismatch");
        assert!(error.to_string().contains("expected 1"));
        Ok(())
    }

    #[test]
    fn corrupt_layout_names_the_key() -> Result<()> {
        let store = MemoryLayoutStore::new();
        store.set("layout.t", "not json")?;
        let error = load_layout(&store, "layout.t", &definitions()).expect_err("corrupt");
        assert!(format!("{error:#}").contains("layout.t"));
        Ok(())
    }
}
