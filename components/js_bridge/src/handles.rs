//! Engine objects kept alive on behalf of host handles.
//!
//! A [`crate::GuestObject`] never stores an engine object itself, only a
//! slot number in its context's table. Handles can therefore be captured
//! by host callables without putting garbage-collected pointers inside
//! engine-owned closures.

use boa_engine::JsObject;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct Slots {
    objects: Vec<Option<JsObject>>,
    free: Vec<usize>,
}

/// Slot table owned by one [`crate::Context`].
#[derive(Debug, Default)]
pub(crate) struct HandleTable {
    slots: RefCell<Slots>,
}

impl HandleTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `object` and returns a handle that releases it on drop.
    pub(crate) fn insert(self: &Rc<Self>, object: JsObject) -> Handle {
        let mut slots = self.slots.borrow_mut();
        let slot = match slots.free.pop() {
            Some(slot) => {
                slots.objects[slot] = Some(object);
                slot
            }
            None => {
                slots.objects.push(Some(object));
                slots.objects.len() - 1
            }
        };
        Handle {
            slot,
            table: Rc::downgrade(self),
        }
    }

    fn get(&self, slot: usize) -> Option<JsObject> {
        self.slots.borrow().objects.get(slot).cloned().flatten()
    }

    fn release(&self, slot: usize) {
        let Ok(mut slots) = self.slots.try_borrow_mut() else {
            return;
        };
        if let Some(entry) = slots.objects.get_mut(slot) {
            if entry.take().is_some() {
                slots.free.push(slot);
            }
        }
    }

    /// Number of objects currently held.
    pub(crate) fn live(&self) -> usize {
        self.slots
            .borrow()
            .objects
            .iter()
            .filter(|entry| entry.is_some())
            .count()
    }

    /// Drops every held object. Outstanding handles resolve to nothing.
    pub(crate) fn clear(&self) {
        if let Ok(mut slots) = self.slots.try_borrow_mut() {
            slots.objects.clear();
            slots.free.clear();
        }
    }
}

/// One occupied slot; released when the last clone of the owning
/// [`crate::GuestObject`] goes away.
#[derive(Debug)]
pub(crate) struct Handle {
    slot: usize,
    table: Weak<HandleTable>,
}

impl Handle {
    /// The object behind this handle, or `None` once the table is gone or
    /// cleared.
    pub(crate) fn object(&self) -> Option<JsObject> {
        self.table.upgrade()?.get(self.slot)
    }

    /// The table this handle lives in.
    pub(crate) fn table(&self) -> Option<Rc<HandleTable>> {
        self.table.upgrade()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.release(self.slot);
        }
    }
}
