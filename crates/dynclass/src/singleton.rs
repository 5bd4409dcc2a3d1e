//! Lazy at-most-once construction handles.

use crate::{
    args::ArgValues,
    exception::{RunError, RunResult},
    heap::{HeapData, HeapId},
    runtime::Runtime,
    value::Value,
};

/// Getter handle for a singleton class, returned by
/// [`Runtime::make_singleton`](crate::Runtime::make_singleton).
///
/// The cached instance lives in a write-once cell on the class record
/// itself, not in any external registry. Its lifecycle is: uninitialized ->
/// constructed on the first [`Singleton::get`] -> retained for the life of
/// the runtime. There is no reset operation.
#[derive(Debug, Clone, Copy)]
pub struct Singleton {
    class_id: HeapId,
}

impl Singleton {
    pub(crate) fn new(class_id: HeapId) -> Self {
        Self { class_id }
    }

    /// Returns the id of the underlying class record.
    #[must_use]
    pub fn class_id(self) -> HeapId {
        self.class_id
    }

    /// Returns the singleton instance, constructing it on the first call.
    ///
    /// Arguments are forwarded to the constructor on the first call only;
    /// on every later call they are ignored and the cached instance is
    /// returned unchanged. This is a documented simplification, not a
    /// reconfiguration mechanism.
    pub fn get(self, rt: &mut Runtime, args: ArgValues) -> RunResult<Value> {
        if let HeapData::Class(cls) = rt.heap.get(self.class_id)
            && let Some(cached) = cls.singleton()
        {
            return Ok(cached.clone());
        }
        let instance = rt.construct(self.class_id, args)?;
        match rt.heap.get(self.class_id) {
            HeapData::Class(cls) => {
                cls.init_singleton(instance.clone());
                Ok(instance)
            }
            HeapData::Instance(_) => Err(RunError::internal("singleton id does not point at a class")),
        }
    }
}
