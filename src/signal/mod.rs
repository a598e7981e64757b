//! Synchronous observer lists.
//!
//! Polymers and polymerases notify their collaborators (the scheduler, a
//! nascent transcript) through explicit subscription lists stored on the
//! emitter. Emission is synchronous and single-threaded; a subscriber must
//! not re-enter the polymer that fired the signal.

use std::fmt;

/// Handle returned by [`Signal::connect`], used to disconnect a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(usize);

/// A signal with an arbitrary payload type.
///
/// Slots are invoked in connection order. Disconnecting a slot never
/// disturbs the ids of the remaining slots.
pub struct Signal<T> {
    slots: Vec<(usize, Box<dyn FnMut(&T)>)>,
    next_id: usize,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }

    /// Connect a slot; returns an id usable with [`Signal::disconnect`].
    pub fn connect<F>(&mut self, slot: F) -> SlotId
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push((id, Box::new(slot)));
        SlotId(id)
    }

    /// Remove a previously connected slot. Unknown ids are ignored.
    pub fn disconnect(&mut self, id: SlotId) {
        self.slots.retain(|(slot_id, _)| *slot_id != id.0);
    }

    /// Invoke every connected slot with the payload.
    pub fn emit(&mut self, payload: &T) {
        for (_, slot) in &mut self.slots {
            slot(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_slots() {
        let counter = Rc::new(RefCell::new(0));
        let mut signal: Signal<i32> = Signal::new();

        let a = counter.clone();
        signal.connect(move |v| *a.borrow_mut() += v);
        let b = counter.clone();
        signal.connect(move |v| *b.borrow_mut() += v * 10);

        signal.emit(&2);
        assert_eq!(*counter.borrow(), 22);
    }

    #[test]
    fn test_disconnect() {
        let counter = Rc::new(RefCell::new(0));
        let mut signal: Signal<()> = Signal::new();

        let a = counter.clone();
        let id = signal.connect(move |_| *a.borrow_mut() += 1);
        let b = counter.clone();
        signal.connect(move |_| *b.borrow_mut() += 100);

        signal.emit(&());
        signal.disconnect(id);
        signal.emit(&());

        assert_eq!(*counter.borrow(), 201);
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn test_weak_subscriber_degrades_to_noop() {
        // The pattern used for transcript mask pulling: the slot holds a
        // weak handle and upgrades on every emission.
        let target = Rc::new(RefCell::new(0));
        let weak = Rc::downgrade(&target);

        let mut signal: Signal<()> = Signal::new();
        signal.connect(move |_| {
            if let Some(t) = weak.upgrade() {
                *t.borrow_mut() += 1;
            }
        });

        signal.emit(&());
        assert_eq!(*target.borrow(), 1);

        drop(target);
        // Emission after the target is retired must not panic.
        signal.emit(&());
    }
}
