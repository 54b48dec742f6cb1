// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::rc::Rc;
use tracing::debug;

use crate::{ColumnDefinition, ColumnId, GestureKind, ListenerRegistry, ListenerSubscription};

/// `start_width + (pointer_x - start_x)` clamped into `[min_width, max_width]`.
/// A `min_width > max_width` pair collapses to `min_width`.
pub fn proposed_width(
    start_width: u32,
    start_x: i32,
    pointer_x: i32,
    min_width: u32,
    max_width: u32,
) -> u32 {
    let delta = i64::from(pointer_x) - i64::from(start_x);
    let max_width = max_width.max(min_width);
    (i64::from(start_width) + delta).clamp(i64::from(min_width), i64::from(max_width)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub column_id: ColumnId,
    pub start_x: i32,
    pub start_width: u32,
    pub min_width: u32,
    pub max_width: u32,
    pub last_width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeUpdate {
    pub column_id: ColumnId,
    pub width: u32,
}

pub struct ColumnResizeEngine {
    registry: Rc<dyn ListenerRegistry>,
    session: Option<ResizeSession>,
    listeners: Option<ListenerSubscription>,
}

impl ColumnResizeEngine {
    pub fn new(registry: Rc<dyn ListenerRegistry>) -> Self {
        Self {
            registry,
            session: None,
            listeners: None,
        }
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }

    /// Captures the pointer and current width. Non-resizable columns are
    /// ignored.
    pub fn press(
        &mut self,
        definition: &ColumnDefinition,
        current_width: u32,
        pointer_x: i32,
    ) -> bool {
        if !definition.resizable {
            return false;
        }
        self.finish();
        self.listeners = Some(ListenerSubscription::acquire(
            &self.registry,
            GestureKind::Resize,
        ));
        self.session = Some(ResizeSession {
            column_id: definition.id.clone(),
            start_x: pointer_x,
            start_width: current_width,
            min_width: definition.min_width,
            max_width: definition.max_width,
            last_width: current_width,
        });
        debug!(column = %definition.id, width = current_width, "column resize started");
        true
    }

    /// Reports the clamped width for every move while pressed.
    pub fn pointer_move(&mut self, pointer_x: i32) -> Option<ResizeUpdate> {
        let session = self.session.as_mut()?;
        let width = proposed_width(
            session.start_width,
            session.start_x,
            pointer_x,
            session.min_width,
            session.max_width,
        );
        session.last_width = width;
        Some(ResizeUpdate {
            column_id: session.column_id.clone(),
            width,
        })
    }

    /// Stops listening and returns the final width, if a resize was active.
    pub fn release(&mut self) -> Option<ResizeUpdate> {
        let session = self.finish()?;
        debug!(column = %session.column_id, width = session.last_width, "column resize finished");
        Some(ResizeUpdate {
            column_id: session.column_id,
            width: session.last_width,
        })
    }

    fn finish(&mut self) -> Option<ResizeSession> {
        if let Some(listeners) = self.listeners.take() {
            listeners.release();
        }
        self.session.take()
    }
}

impl std::fmt::Debug for ColumnResizeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnResizeEngine")
            .field("session", &self.session)
            .field("listening", &self.listeners.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnResizeEngine, proposed_width};
    use crate::{ColumnDefinition, ColumnType, GestureKind, ListenerRegistry, TrackingRegistry};
    use std::rc::Rc;

    fn amount_column() -> ColumnDefinition {
        ColumnDefinition::new("amount", "Amount", ColumnType::Currency).with_bounds(80, 800)
    }

    fn engine() -> (Rc<TrackingRegistry>, ColumnResizeEngine) {
        let tracker = TrackingRegistry::shared();
        let registry: Rc<dyn ListenerRegistry> = tracker.clone();
        (tracker, ColumnResizeEngine::new(registry))
    }

    #[test]
    fn extreme_deltas_clamp_to_bounds() {
        assert_eq!(proposed_width(150, 0, -1000, 80, 800), 80);
        assert_eq!(proposed_width(150, 0, 10_000, 80, 800), 800);
        assert_eq!(proposed_width(150, 500, 540, 80, 800), 190);
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        assert_eq!(proposed_width(150, 0, 0, 300, 200), 300);
        assert_eq!(proposed_width(150, 0, 9000, 300, 200), 300);
    }

    #[test]
    fn moves_report_width_relative_to_press() {
        let (_tracker, mut engine) = engine();
        assert!(engine.press(&amount_column(), 150, 400));
        let first = engine.pointer_move(-600).expect("update");
        assert_eq!(first.width, 80);
        assert_eq!(first.column_id.as_str(), "amount");
        assert_eq!(engine.pointer_move(10_400).map(|update| update.width), Some(800));
        assert_eq!(engine.pointer_move(430).map(|update| update.width), Some(180));

        let last = engine.release().expect("final width");
        assert_eq!(last.width, 180);
        assert!(engine.pointer_move(500).is_none());
    }

    #[test]
    fn non_resizable_column_ignores_press() {
        let (tracker, mut engine) = engine();
        let fixed = amount_column().with_resizable(false);
        assert!(!engine.press(&fixed, 150, 0));
        assert!(!engine.is_resizing());
        assert_eq!(tracker.attached_total(), 0);
    }

    #[test]
    fn press_release_cycles_do_not_leak() {
        let (tracker, mut engine) = engine();
        for cycle in 0..25 {
            engine.press(&amount_column(), 150, cycle);
            assert_eq!(tracker.active_for(GestureKind::Resize), 1);
            engine.release();
        }
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(tracker.detached_total(), 25);
        assert!(engine.release().is_none());
    }

    #[test]
    fn unmount_mid_drag_detaches() {
        let (tracker, mut engine) = engine();
        engine.press(&amount_column(), 150, 0);
        engine.pointer_move(30);
        drop(engine);
        assert_eq!(tracker.active_count(), 0);
    }
}
