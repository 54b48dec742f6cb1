// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::rc::Rc;
use tracing::{debug, info};

use crate::{
    ColumnId, ColumnState, GestureKind, ListenerRegistry, ListenerSubscription, in_display_order,
    renumber,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    Left,
    Right,
}

/// Pointer x relative to the header cell currently under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPosition {
    pub x: i32,
    pub target_left: i32,
    pub target_width: u32,
}

impl PointerPosition {
    pub fn side(self) -> DropSide {
        let midpoint = i64::from(self.target_left) + i64::from(self.target_width) / 2;
        if i64::from(self.x) < midpoint {
            DropSide::Left
        } else {
            DropSide::Right
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndicator {
    pub column_id: ColumnId,
    pub side: DropSide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub dragged_id: ColumnId,
    pub dragged_index: usize,
    pub over_id: Option<ColumnId>,
    pub over_index: Option<usize>,
    pub side: Option<DropSide>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub states: Vec<ColumnState>,
    pub from_index: usize,
    pub to_index: usize,
}

/// Moves the column at display position `from_index` to `to_index` and
/// renumbers every state to its new position.
pub fn move_column(
    states: &[ColumnState],
    from_index: usize,
    to_index: usize,
) -> Vec<ColumnState> {
    let mut ordered = in_display_order(states);
    if from_index < ordered.len() && to_index < ordered.len() && from_index != to_index {
        let moved = ordered.remove(from_index);
        ordered.insert(to_index, moved);
    }
    renumber(&mut ordered);
    ordered
}

/// Drops `source_id` onto `target_id`'s position. `None` when either id is
/// unknown or both are the same column.
pub fn reorder(states: &[ColumnState], source_id: &str, target_id: &str) -> Option<ReorderOutcome> {
    if source_id == target_id {
        return None;
    }
    let ordered = in_display_order(states);
    let from_index = ordered.iter().position(|state| state.id == source_id)?;
    let to_index = ordered.iter().position(|state| state.id == target_id)?;
    Some(ReorderOutcome {
        states: move_column(states, from_index, to_index),
        from_index,
        to_index,
    })
}

/// Keyboard reorder: shifts a column `delta` slots, clamped to the ends.
pub fn move_by(states: &[ColumnState], id: &str, delta: isize) -> Option<ReorderOutcome> {
    let ordered = in_display_order(states);
    let from_index = ordered.iter().position(|state| state.id == id)?;
    let last = ordered.len().saturating_sub(1) as isize;
    let to_index = (from_index as isize + delta).clamp(0, last) as usize;
    if to_index == from_index {
        return None;
    }
    Some(ReorderOutcome {
        states: move_column(states, from_index, to_index),
        from_index,
        to_index,
    })
}

/// Drag-to-reorder gesture. Holds the session and the global pointer
/// listeners only between `start` and the end of the gesture.
pub struct ColumnReorderEngine {
    registry: Rc<dyn ListenerRegistry>,
    session: Option<DragSession>,
    listeners: Option<ListenerSubscription>,
}

impl ColumnReorderEngine {
    pub fn new(registry: Rc<dyn ListenerRegistry>) -> Self {
        Self {
            registry,
            session: None,
            listeners: None,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn indicator(&self) -> Option<DropIndicator> {
        let session = self.session.as_ref()?;
        Some(DropIndicator {
            column_id: session.over_id.clone()?,
            side: session.side?,
        })
    }

    /// Opens a session for `column_id`. A session left open by a previous
    /// gesture is ended first. Returns `false` for unknown columns.
    pub fn start(&mut self, states: &[ColumnState], column_id: &str) -> bool {
        self.end();
        let ordered = in_display_order(states);
        let Some(index) = ordered.iter().position(|state| state.id == column_id) else {
            return false;
        };
        self.listeners = Some(ListenerSubscription::acquire(
            &self.registry,
            GestureKind::Reorder,
        ));
        self.session = Some(DragSession {
            dragged_id: ordered[index].id.clone(),
            dragged_index: index,
            over_id: None,
            over_index: None,
            side: None,
        });
        debug!(column = column_id, index, "column drag started");
        true
    }

    /// Tracks the hovered column for the drop indicator. Never touches states.
    pub fn over(
        &mut self,
        states: &[ColumnState],
        column_id: &str,
        position: PointerPosition,
    ) -> Option<DropIndicator> {
        let session = self.session.as_mut()?;
        let ordered = in_display_order(states);
        let index = ordered.iter().position(|state| state.id == column_id)?;
        if session.dragged_id == column_id {
            session.over_id = None;
            session.over_index = None;
            session.side = None;
            return None;
        }
        session.over_id = Some(ordered[index].id.clone());
        session.over_index = Some(index);
        session.side = Some(position.side());
        self.indicator()
    }

    /// Completes the gesture on `target_id`, ending the session either way.
    pub fn drop_on(&mut self, states: &[ColumnState], target_id: &str) -> Option<ReorderOutcome> {
        let session = self.session.clone()?;
        self.end();
        let outcome = reorder(states, session.dragged_id.as_str(), target_id)?;
        info!(
            column = %session.dragged_id,
            from = outcome.from_index,
            to = outcome.to_index,
            "column reordered"
        );
        Some(outcome)
    }

    pub fn cancel(&mut self) -> bool {
        self.end()
    }

    /// Clears the session and detaches listeners. Returns whether anything was
    /// open, so repeated calls for one gesture are harmless.
    pub fn end(&mut self) -> bool {
        let had_session = self.session.take().is_some();
        if let Some(listeners) = self.listeners.take() {
            listeners.release();
        }
        if had_session {
            debug!("column drag ended");
        }
        had_session
    }
}

impl std::fmt::Debug for ColumnReorderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnReorderEngine")
            .field("session", &self.session)
            .field("listening", &self.listeners.is_some())
            .finish()
    }
}
