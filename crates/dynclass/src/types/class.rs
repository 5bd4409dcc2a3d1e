//! Class records and instances.
//!
//! `ClassObject` is the frozen per-class record produced by
//! [`Runtime::make_class`](crate::Runtime::make_class). `Instance` is the
//! per-construction object holding instance fields.
//!
//! # Attribute Access
//!
//! - Property descriptors on the class win over instance storage
//! - Instance fields (slots, then the open attribute map) are checked next
//! - Plain class members (methods, class attributes) are checked last
//! - Own members always shadow inherited ones: lookup walks the frozen MRO,
//!   which starts with the class itself

use std::{cell::OnceCell, fmt::Write};

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, HeapData, HeapId},
    value::{MethodFn, Value},
};

/// Longest permitted MRO; guards runaway hierarchies.
pub(crate) const MAX_MRO_LENGTH: usize = 2600;

/// Deepest permitted inheritance chain.
pub(crate) const MAX_INHERITANCE_DEPTH: usize = 1000;

/// A class record, created once per definition by the class factory.
///
/// Owns the class name, the own-member namespace (not inherited members),
/// the direct bases, and the frozen MRO. Subclass resolution and super
/// dispatch read this data; nothing mutates it after finalization except
/// explicit class-attribute assignment on the record itself.
#[derive(Debug)]
pub(crate) struct ClassObject {
    /// The class name (e.g., "Point").
    name: String,
    /// Own members in declaration order. Keys are attribute names.
    namespace: IndexMap<String, Value>,
    /// Direct bases as declared, left to right.
    bases: Vec<HeapId>,
    /// C3-linearized MRO, self first. Frozen once set.
    mro: Vec<HeapId>,
    /// Slot names declared directly on this class, if any.
    slots: Option<Vec<String>>,
    /// Full slot layout: inherited slots first (MRO order), then own.
    slot_layout: Vec<String>,
    /// Slot name -> index in `slot_layout`.
    slot_indices: AHashMap<String, usize>,
    /// Whether instances carry an open attribute map.
    instance_has_dict: bool,
    /// At-most-once instance cell used by singleton classes.
    singleton: OnceCell<Value>,
}

impl ClassObject {
    /// Creates a new class record with an empty MRO.
    ///
    /// The MRO includes the class itself as the first entry, so it can only
    /// be computed once the record's heap id is known; the factory calls
    /// [`ClassObject::set_mro`] right after allocation.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: IndexMap<String, Value>, bases: Vec<HeapId>) -> Self {
        Self {
            name: name.into(),
            namespace,
            bases,
            mro: Vec::new(),
            slots: None,
            slot_layout: Vec::new(),
            slot_indices: AHashMap::new(),
            instance_has_dict: true,
            singleton: OnceCell::new(),
        }
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the direct base class ids.
    #[must_use]
    pub fn bases(&self) -> &[HeapId] {
        &self.bases
    }

    /// Returns the MRO as a slice of ids. The first element is this class.
    #[must_use]
    pub fn mro(&self) -> &[HeapId] {
        &self.mro
    }

    /// Sets the MRO after initial allocation.
    pub fn set_mro(&mut self, mro: Vec<HeapId>) {
        self.mro = mro;
    }

    /// Returns a member defined directly on this class (not inherited).
    #[must_use]
    pub fn own_member(&self, name: &str) -> Option<&Value> {
        self.namespace.get(name)
    }

    /// Sets an attribute on the class record itself.
    pub fn set_attr(&mut self, name: String, value: Value) {
        self.namespace.insert(name, value);
    }

    /// Removes an attribute from the class record, returning the old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<Value> {
        self.namespace.shift_remove(name)
    }

    /// Records the slot names declared directly on this class.
    pub fn set_slots(&mut self, slots: Vec<String>) {
        self.slots = Some(slots);
    }

    /// Returns the slot names declared directly on this class, if any.
    #[must_use]
    pub fn slots(&self) -> Option<&[String]> {
        self.slots.as_deref()
    }

    /// Returns the full slot layout for instances (including inherited slots).
    #[must_use]
    pub fn slot_layout(&self) -> &[String] {
        &self.slot_layout
    }

    /// Returns the slot index for a name, if it is a slot on this class.
    #[must_use]
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slot_indices.get(name).copied()
    }

    /// Returns whether instances of this class have an open attribute map.
    #[must_use]
    pub fn instance_has_dict(&self) -> bool {
        self.instance_has_dict
    }

    /// Sets the finalized slot layout and the instance attribute-map flag.
    pub fn set_slot_layout(
        &mut self,
        slot_layout: Vec<String>,
        slot_indices: AHashMap<String, usize>,
        instance_has_dict: bool,
    ) {
        self.slot_layout = slot_layout;
        self.slot_indices = slot_indices;
        self.instance_has_dict = instance_has_dict;
    }

    /// Returns the cached singleton instance, if one has been constructed.
    #[must_use]
    pub fn singleton(&self) -> Option<&Value> {
        self.singleton.get()
    }

    /// Caches the singleton instance. A second initialization is a no-op:
    /// the cell keeps the first value, which is exactly the at-most-once
    /// guarantee the singleton factory relies on.
    pub fn init_singleton(&self, instance: Value) {
        let _ = self.singleton.set(instance);
    }

    /// Checks if this class (identified by `self_id`) is a subclass of `other_id`.
    ///
    /// A class is considered a subclass of itself.
    #[must_use]
    pub fn is_subclass_of(&self, self_id: HeapId, other_id: HeapId) -> bool {
        if self_id == other_id {
            return true;
        }
        self.mro.contains(&other_id)
    }
}

/// A class instance, created by constructing a `ClassObject`.
///
/// Holds the class id (the instance's class tag), the open attribute map
/// (absent when the slot layout closes the instance), and slot storage
/// indexed by the class's slot layout.
#[derive(Debug)]
pub(crate) struct Instance {
    /// Id of the class record this instance belongs to.
    class_id: HeapId,
    /// Open attribute storage in assignment order; `None` when slot-closed.
    attrs: Option<IndexMap<String, Value>>,
    /// Slot storage; `Value::Undefined` marks a never-written slot.
    slot_values: Vec<Value>,
}

impl Instance {
    /// Creates a new instance with the provided attribute map and slot storage.
    #[must_use]
    pub fn new(class_id: HeapId, attrs: Option<IndexMap<String, Value>>, slot_values: Vec<Value>) -> Self {
        Self {
            class_id,
            attrs,
            slot_values,
        }
    }

    /// Returns the id of the class this instance belongs to.
    #[must_use]
    pub fn class_id(&self) -> HeapId {
        self.class_id
    }

    /// Returns the open attribute map, if this instance has one.
    #[must_use]
    pub fn attrs(&self) -> Option<&IndexMap<String, Value>> {
        self.attrs.as_ref()
    }

    /// Returns the open attribute map mutably, if this instance has one.
    #[must_use]
    pub fn attrs_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        self.attrs.as_mut()
    }

    /// Returns the slot value at `idx` if it has been written.
    #[must_use]
    pub fn slot_value(&self, idx: usize) -> Option<&Value> {
        match self.slot_values.get(idx) {
            Some(Value::Undefined) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Writes the slot at `idx`, returning the previous value if one was set.
    pub fn set_slot(&mut self, idx: usize, value: Value) -> Option<Value> {
        let old = std::mem::replace(&mut self.slot_values[idx], value);
        match old {
            Value::Undefined => None,
            other => Some(other),
        }
    }

    /// Clears the slot at `idx`, returning the previous value if one was set.
    pub fn take_slot(&mut self, idx: usize) -> Option<Value> {
        let old = std::mem::replace(&mut self.slot_values[idx], Value::Undefined);
        match old {
            Value::Undefined => None,
            other => Some(other),
        }
    }
}

/// Formats the default instance representation: `Name({ x: 1, y: "a" })`.
///
/// Fields are the instance's own non-function fields: slot values in layout
/// order first, then open attributes in assignment order. An empty field set
/// renders as `Name({})`. `heap_ids` carries the cycle guard for nested
/// instance fields.
pub(crate) fn instance_repr_fmt(
    instance: &Instance,
    f: &mut impl Write,
    heap: &Heap,
    heap_ids: &mut AHashSet<HeapId>,
) -> std::fmt::Result {
    let HeapData::Class(cls) = heap.get(instance.class_id()) else {
        return f.write_str("<instance>");
    };

    let mut fields: Vec<(&str, &Value)> = Vec::new();
    for (idx, name) in cls.slot_layout().iter().enumerate() {
        if let Some(value) = instance.slot_value(idx)
            && !value.is_member_fn()
        {
            fields.push((name, value));
        }
    }
    if let Some(attrs) = instance.attrs() {
        for (name, value) in attrs {
            if !value.is_member_fn() {
                fields.push((name, value));
            }
        }
    }

    write!(f, "{}(", cls.name())?;
    if fields.is_empty() {
        return f.write_str("{})");
    }
    f.write_str("{ ")?;
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: ")?;
        value.repr_fmt(f, heap, heap_ids)?;
    }
    f.write_str(" })")
}

/// A property descriptor with optional getter and setter.
///
/// Properties are data descriptors: when present on a class, attribute
/// access on instances is intercepted:
/// - reading the attribute calls the getter
/// - assigning the attribute calls the setter (if declared)
///
/// A property without a setter is read-only and raises `AttributeError` on
/// write.
#[derive(Debug, Clone, Copy)]
pub struct UserProperty {
    /// The getter function (called on attribute access).
    fget: Option<MethodFn>,
    /// The setter function (called on attribute assignment).
    fset: Option<MethodFn>,
}

impl UserProperty {
    /// Creates a property from optional getter and setter accessors.
    #[must_use]
    pub fn new(fget: Option<MethodFn>, fset: Option<MethodFn>) -> Self {
        Self { fget, fset }
    }

    /// Creates a read-only property.
    #[must_use]
    pub fn readonly(fget: MethodFn) -> Self {
        Self::new(Some(fget), None)
    }

    /// Returns the getter function, if any.
    #[must_use]
    pub fn fget(&self) -> Option<MethodFn> {
        self.fget
    }

    /// Returns the setter function, if any.
    #[must_use]
    pub fn fset(&self) -> Option<MethodFn> {
        self.fset
    }
}

impl PartialEq for UserProperty {
    fn eq(&self, other: &Self) -> bool {
        accessor_eq(self.fget, other.fget) && accessor_eq(self.fset, other.fset)
    }
}

fn accessor_eq(a: Option<MethodFn>, b: Option<MethodFn>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(f), Some(g)) => std::ptr::fn_addr_eq(f, g),
        _ => false,
    }
}

// ============================================================================
// C3 Linearization
// ============================================================================

/// Computes the C3 linearization (MRO) for a class with the given base classes.
///
/// The C3 algorithm merges the MROs of all base classes with the list of
/// bases to produce a consistent method resolution order: a class precedes
/// its ancestors, the declared order of direct bases is preserved, and no
/// class appears before one that must precede it in any input sequence.
///
/// # Arguments
/// * `self_id` - Id of the class being defined
/// * `bases` - Direct base class ids
/// * `heap` - Heap to look up base class MROs
///
/// # Returns
/// The full MRO starting with `self_id`, or a `TypeError` if the hierarchy is
/// inconsistent (would produce an ambiguous ordering). A class with no bases
/// linearizes to itself alone.
pub(crate) fn compute_c3_mro(self_id: HeapId, bases: &[HeapId], heap: &Heap) -> RunResult<Vec<HeapId>> {
    if bases.is_empty() {
        return Ok(vec![self_id]);
    }

    if bases.contains(&self_id) {
        return Err(ExcType::type_error("a class cannot inherit from itself"));
    }

    // Collect the MROs of all base classes
    let mut linearizations: Vec<Vec<HeapId>> = Vec::with_capacity(bases.len() + 1);
    for &base_id in bases {
        match heap.get(base_id) {
            HeapData::Class(cls) => linearizations.push(cls.mro().to_vec()),
            HeapData::Instance(_) => return Err(ExcType::type_error("bases must be classes")),
        }
    }
    for lin in &linearizations {
        if lin.len() > MAX_INHERITANCE_DEPTH {
            return Err(ExcType::type_error(format!(
                "inheritance chain too deep (maximum depth {MAX_INHERITANCE_DEPTH})"
            )));
        }
    }

    // Add the list of bases itself as the last sequence to merge
    linearizations.push(bases.to_vec());

    // C3 merge
    let mut result = vec![self_id];
    loop {
        linearizations.retain(|l| !l.is_empty());
        if linearizations.is_empty() {
            break;
        }

        // Find a good head: a class that does not appear in the tail of any list
        let mut found = None;
        for lin in &linearizations {
            let candidate = lin[0];
            let in_tail = linearizations.iter().any(|other| other[1..].contains(&candidate));
            if !in_tail {
                found = Some(candidate);
                break;
            }
        }

        if let Some(next) = found {
            result.push(next);
            // Remove `next` from the head of all lists where it appears
            for lin in &mut linearizations {
                if lin.first() == Some(&next) {
                    lin.remove(0);
                }
            }
        } else {
            let base_names: Vec<&str> = bases
                .iter()
                .map(|&id| match heap.get(id) {
                    HeapData::Class(cls) => cls.name(),
                    HeapData::Instance(_) => "?",
                })
                .collect();
            return Err(ExcType::type_error(format!(
                "Cannot create a consistent method resolution order (MRO) for bases {}",
                base_names.join(", ")
            )));
        }

        if result.len() > MAX_MRO_LENGTH {
            return Err(ExcType::type_error("MRO exceeds maximum length"));
        }
    }

    Ok(result)
}
