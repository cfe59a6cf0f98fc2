//! Decoupled event edges between engine subsystems.
//!
//! Every cross-cutting notification in the engine - an entity's transform
//! changing, a scene node being destroyed, a frame boundary being crossed -
//! goes through a [`Signal`] rather than a direct call back into the
//! emitter's owner. A subscription is represented by a [`Connection`] guard:
//! dropping it removes the callback. This mirrors the engine's use of
//! scoped connections to avoid self-modifying iteration when, say, an
//! octree node disconnects a watcher while it is itself being walked.

use std::cell::RefCell;
use std::rc::Rc;

struct Slot<Args> {
    id: u64,
    callback: Box<dyn FnMut(&Args)>,
}

struct Inner<Args> {
    slots: Vec<Slot<Args>>,
    next_id: u64,
}

/// A broadcast channel for a single kind of event, parameterized over the
/// argument tuple passed to subscribers.
pub struct Signal<Args> {
    inner: Rc<RefCell<Inner<Args>>>,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                slots: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl<Args> Clone for Signal<Args> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Args> Signal<Args> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback`. The returned [`Connection`] must be kept
    /// alive for as long as the subscription should remain active;
    /// dropping it (or calling `disconnect` explicitly) removes the
    /// callback from the signal.
    pub fn connect<F: FnMut(&Args) + 'static>(&self, callback: F) -> Connection<Args> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            callback: Box::new(callback),
        });
        Connection {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Invokes every connected callback with `args`. Connections made or
    /// dropped from within a callback take effect only on the *next*
    /// emission, since the slot list is snapshotted by index before the
    /// loop starts.
    pub fn emit(&self, args: Args) {
        let count = self.inner.borrow().slots.len();
        for i in 0..count {
            // Re-borrow per-iteration: a callback might itself emit on this
            // same signal, or disconnect another slot.
            let mut inner = self.inner.borrow_mut();
            let Some(slot) = inner.slots.get_mut(i) else {
                continue;
            };
            // SAFETY-free workaround for re-entrancy: take the callback out
            // while invoking it so a nested `emit` can't alias it mutably.
            let mut taken = std::mem::replace(&mut slot.callback, Box::new(|_| {}));
            drop(inner);
            taken(&args);
            if let Some(slot) = self.inner.borrow_mut().slots.get_mut(i) {
                slot.callback = taken;
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

/// RAII guard for a [`Signal`] subscription. Disconnects on drop.
pub struct Connection<Args> {
    inner: std::rc::Weak<RefCell<Inner<Args>>>,
    id: u64,
}

impl<Args> Connection<Args> {
    pub fn disconnect(self) {
        // Drop impl does the work; this just gives callers an explicit name.
    }
}

impl<Args> Drop for Connection<Args> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().slots.retain(|slot| slot.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn emits_to_connected_listeners() {
        let signal: Signal<i32> = Signal::new();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        let _conn = signal.connect(move |v| seen_clone.set(seen_clone.get() + v));
        signal.emit(5);
        signal.emit(2);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn dropping_connection_stops_delivery() {
        let signal: Signal<i32> = Signal::new();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        let conn = signal.connect(move |v| seen_clone.set(seen_clone.get() + v));
        signal.emit(1);
        drop(conn);
        signal.emit(1);
        assert_eq!(seen.get(), 1);
        assert_eq!(signal.listener_count(), 0);
    }
}
