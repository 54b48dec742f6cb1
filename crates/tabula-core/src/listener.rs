// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GestureKind {
    Reorder,
    Resize,
}

impl GestureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reorder => "reorder",
            Self::Resize => "resize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Global pointer move/release subscription, implemented by the platform
/// adapter. Engines attach on gesture start and detach on gesture end.
pub trait ListenerRegistry {
    fn attach(&self, gesture: GestureKind) -> ListenerId;
    fn detach(&self, id: ListenerId);
}

/// An attached listener set. Detaches when released or dropped, so an engine
/// dropped mid-gesture leaves nothing behind.
pub struct ListenerSubscription {
    registry: Rc<dyn ListenerRegistry>,
    id: Option<ListenerId>,
    gesture: GestureKind,
}

impl ListenerSubscription {
    pub fn acquire(registry: &Rc<dyn ListenerRegistry>, gesture: GestureKind) -> Self {
        let id = registry.attach(gesture);
        debug!(gesture = gesture.as_str(), listener = id.get(), "pointer listeners attached");
        Self {
            registry: Rc::clone(registry),
            id: Some(id),
            gesture,
        }
    }

    pub fn gesture(&self) -> GestureKind {
        self.gesture
    }

    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.detach(id);
            debug!(
                gesture = self.gesture.as_str(),
                listener = id.get(),
                "pointer listeners detached"
            );
        }
    }
}

impl Drop for ListenerSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for ListenerSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSubscription")
            .field("id", &self.id)
            .field("gesture", &self.gesture)
            .finish()
    }
}

/// In-process registry that only records attachments. Headless hosts use it
/// directly; tests use it to assert nothing leaks.
#[derive(Debug, Default)]
pub struct TrackingRegistry {
    next_id: Cell<u64>,
    active: RefCell<BTreeMap<ListenerId, GestureKind>>,
    attached_total: Cell<usize>,
    detached_total: Cell<usize>,
}

impl TrackingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn active_for(&self, gesture: GestureKind) -> usize {
        self.active
            .borrow()
            .values()
            .filter(|active| **active == gesture)
            .count()
    }

    pub fn attached_total(&self) -> usize {
        self.attached_total.get()
    }

    pub fn detached_total(&self) -> usize {
        self.detached_total.get()
    }
}

impl ListenerRegistry for TrackingRegistry {
    fn attach(&self, gesture: GestureKind) -> ListenerId {
        let id = ListenerId::new(self.next_id.get() + 1);
        self.next_id.set(id.get());
        self.active.borrow_mut().insert(id, gesture);
        self.attached_total.set(self.attached_total.get() + 1);
        id
    }

    fn detach(&self, id: ListenerId) {
        if self.active.borrow_mut().remove(&id).is_some() {
            self.detached_total.set(self.detached_total.get() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureKind, ListenerRegistry, ListenerSubscription, TrackingRegistry};
    use std::rc::Rc;

    #[test]
    fn release_detaches_once() {
        let tracker = TrackingRegistry::shared();
        let registry: Rc<dyn ListenerRegistry> = tracker.clone();

        let subscription = ListenerSubscription::acquire(&registry, GestureKind::Resize);
        assert_eq!(tracker.active_for(GestureKind::Resize), 1);
        subscription.release();
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(tracker.detached_total(), 1);
    }

    #[test]
    fn drop_detaches() {
        let tracker = TrackingRegistry::shared();
        let registry: Rc<dyn ListenerRegistry> = tracker.clone();
        {
            let _subscription = ListenerSubscription::acquire(&registry, GestureKind::Reorder);
            assert_eq!(tracker.active_count(), 1);
        }
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(tracker.attached_total(), 1);
    }

    #[test]
    fn detaching_unknown_id_is_ignored() {
        let tracker = TrackingRegistry::new();
        let id = tracker.attach(GestureKind::Resize);
        tracker.detach(id);
        tracker.detach(id);
        assert_eq!(tracker.detached_total(), 1);
    }
}
