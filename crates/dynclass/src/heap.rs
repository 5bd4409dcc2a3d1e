//! Arena storage for class records and instances.
//!
//! Every class record and instance lives in the [`Heap`] owned by the
//! runtime and is addressed by a copyable [`HeapId`]. Identity is id
//! identity. Entries are never freed: the object graph of a class system is
//! process-wide state with no teardown path, so the arena only grows.

use crate::types::{ClassObject, Instance};

/// Index of an object in the runtime heap.
///
/// Ids are only meaningful for the runtime that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(usize);

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A heap entry: either a class record or an instance.
#[derive(Debug)]
pub(crate) enum HeapData {
    Class(ClassObject),
    Instance(Instance),
}

/// The arena of heap entries.
#[derive(Debug, Default)]
pub(crate) struct Heap {
    entries: Vec<HeapData>,
}

impl Heap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Stores `data` and returns its id.
    pub fn allocate(&mut self, data: HeapData) -> HeapId {
        let id = HeapId(self.entries.len());
        self.entries.push(data);
        id
    }

    /// Returns a reference to the entry at `id`.
    ///
    /// Panics if `id` was not allocated by this heap.
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.entries[id.0]
    }

    /// Returns a mutable reference to the entry at `id`.
    ///
    /// Panics if `id` was not allocated by this heap.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.entries[id.0]
    }
}
