//! The embedding surface: class factory, instance construction, member
//! dispatch, super dispatch, and coercion.
//!
//! A `Runtime` owns the heap of class records and instances. Every operation
//! is synchronous and takes `&mut self`; there are no suspension points and
//! no internal locking. Method calls resolve by walking the frozen MRO of
//! the receiver's class - nothing is copied onto instances at construction
//! time, so member precedence is purely a property of the linearized order.

use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;

use crate::{
    args::ArgValues,
    definition::{ClassDef, DUNDER_INIT, DUNDER_INT, DUNDER_NEW, DUNDER_STR},
    exception::{ExcType, RunError, RunResult},
    heap::{Heap, HeapData, HeapId},
    singleton::Singleton,
    types::{ClassObject, Instance, Type, compute_c3_mro},
    value::Value,
};

/// Call frame handed to every instance-bound member.
///
/// `this` is the receiver; `class` is the class whose namespace defines the
/// running member. Super dispatch resumes the MRO scan strictly after
/// `class`, which is what makes cooperative chains work at any depth: the
/// frame of an ancestor's method carries that ancestor, not the class the
/// original call started from.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The receiver of the call.
    pub this: Value,
    /// The class defining the running member; the super-dispatch resume point.
    pub class: HeapId,
}

/// The object-model runtime.
///
/// Produces class records from definitions, constructs instances, and
/// dispatches member access on both. Dropping the runtime drops every class
/// and instance it created.
#[derive(Debug, Default)]
pub struct Runtime {
    pub(crate) heap: Heap,
}

impl Runtime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self { heap: Heap::new() }
    }

    // ========================================================================
    // Class factory
    // ========================================================================

    /// Creates a class record from a definition and zero or more bases.
    ///
    /// The MRO is computed and frozen here, at definition time; an
    /// inconsistent parent graph fails now and no class record is returned.
    pub fn make_class(&mut self, name: &str, def: ClassDef, bases: &[HeapId]) -> RunResult<HeapId> {
        let (namespace, slots) = def.into_parts();
        let class_id = self
            .heap
            .allocate(HeapData::Class(ClassObject::new(name, namespace, bases.to_vec())));
        let mro = compute_c3_mro(class_id, bases, &self.heap)?;
        match self.heap.get_mut(class_id) {
            HeapData::Class(cls) => cls.set_mro(mro),
            HeapData::Instance(_) => return Err(RunError::internal("make_class: allocated id is not a class")),
        }
        self.finalize_slots(class_id, slots)?;
        Ok(class_id)
    }

    /// Creates a singleton class and returns its getter handle.
    ///
    /// The definition must not declare `__new__`: the singleton supplies its
    /// own allocation gate.
    pub fn make_singleton(&mut self, name: &str, def: ClassDef, bases: &[HeapId]) -> RunResult<Singleton> {
        if def.declares_allocator() {
            return Err(ExcType::type_error(format!(
                "singleton class '{name}' cannot declare '{DUNDER_NEW}'"
            )));
        }
        let class_id = self.make_class(name, def, bases)?;
        Ok(Singleton::new(class_id))
    }

    /// Finalizes the slot declaration for a freshly created class.
    ///
    /// Computes the full layout (inherited slots first, then own), rejects
    /// slot names that collide with class variables, and decides whether
    /// instances keep an open attribute map: a slotted class closes its
    /// instances unless some ancestor still provides one.
    fn finalize_slots(&mut self, class_id: HeapId, slots: Option<Vec<String>>) -> RunResult<()> {
        let class_defines_slots = slots.is_some();

        let mut direct_slots: Vec<String> = Vec::new();
        let mut seen_direct = AHashSet::new();
        for raw in slots.unwrap_or_default() {
            if seen_direct.insert(raw.clone()) {
                direct_slots.push(raw);
            }
        }

        let mro = match self.heap.get(class_id) {
            HeapData::Class(cls) => {
                for name in &direct_slots {
                    if cls.own_member(name).is_some() {
                        return Err(ExcType::value_error(format!(
                            "'{name}' in slots conflicts with class variable"
                        )));
                    }
                }
                cls.mro().to_vec()
            }
            HeapData::Instance(_) => return Err(RunError::internal("finalize_slots: not a class")),
        };

        let mut slot_layout: Vec<String> = Vec::new();
        let mut seen_layout = AHashSet::new();
        let mut base_has_dict = false;
        for &base_id in mro.iter().skip(1) {
            if let HeapData::Class(base) = self.heap.get(base_id) {
                if base.instance_has_dict() {
                    base_has_dict = true;
                }
                for name in base.slot_layout() {
                    if seen_layout.insert(name.clone()) {
                        slot_layout.push(name.clone());
                    }
                }
            }
        }
        for name in &direct_slots {
            if seen_layout.insert(name.clone()) {
                slot_layout.push(name.clone());
            }
        }

        let mut slot_indices = AHashMap::new();
        for (idx, name) in slot_layout.iter().enumerate() {
            slot_indices.insert(name.clone(), idx);
        }

        let instance_has_dict = if class_defines_slots { base_has_dict } else { true };

        match self.heap.get_mut(class_id) {
            HeapData::Class(cls) => {
                if class_defines_slots {
                    cls.set_slots(direct_slots);
                }
                cls.set_slot_layout(slot_layout, slot_indices, instance_has_dict);
                Ok(())
            }
            HeapData::Instance(_) => Err(RunError::internal("finalize_slots: not a class")),
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Allocates a bare instance of `class_id` without running any
    /// initializer. This is the default allocation path; custom `__new__`
    /// implementations call it to obtain the instance they return.
    pub fn alloc_instance(&mut self, class_id: HeapId) -> RunResult<Value> {
        let (has_dict, layout_len) = match self.heap.get(class_id) {
            HeapData::Class(cls) => (cls.instance_has_dict(), cls.slot_layout().len()),
            HeapData::Instance(_) => return Err(ExcType::type_error("only a class can be instantiated")),
        };
        let attrs = has_dict.then(IndexMap::new);
        let slot_values = vec![Value::Undefined; layout_len];
        let id = self.heap.allocate(HeapData::Instance(Instance::new(class_id, attrs, slot_values)));
        Ok(Value::Ref(id))
    }

    /// Constructs an instance of a class.
    ///
    /// Runs the custom allocator if one is declared anywhere on the MRO
    /// (its result must be an instance of the constructed class), then the
    /// MRO-resolved `__init__` with the original arguments. Errors from
    /// either propagate untouched and no instance reference escapes.
    pub fn construct(&mut self, class_id: HeapId, args: ArgValues) -> RunResult<Value> {
        let class_name = self.class_name(class_id)?.to_string();

        let allocator = self.lookup_member(class_id, DUNDER_NEW);
        let has_allocator = allocator.is_some();
        let instance = if let Some((member, _)) = allocator {
            let Value::ClassFunction(alloc) = member else {
                return Err(ExcType::type_error(format!(
                    "'{DUNDER_NEW}' of '{class_name}' must be a class-bound function"
                )));
            };
            // Arguments are cloned for the allocator; the originals go to __init__.
            let result = alloc(self, class_id, args.clone())?;
            let is_own_instance = match &result {
                Value::Ref(id) => match self.heap.get(*id) {
                    HeapData::Instance(inst) => {
                        let instance_class = inst.class_id();
                        self.is_subclass_of(instance_class, class_id)
                    }
                    HeapData::Class(_) => false,
                },
                _ => false,
            };
            if !is_own_instance {
                return Err(ExcType::type_error(format!(
                    "'{DUNDER_NEW}' of '{class_name}' returned a value that is not a '{class_name}' instance (type '{}')",
                    self.type_name(&result)
                )));
            }
            result
        } else {
            self.alloc_instance(class_id)?
        };

        match self.lookup_member(class_id, DUNDER_INIT) {
            Some((Value::Function(init), defining)) => {
                init(
                    self,
                    Frame {
                        this: instance.clone(),
                        class: defining,
                    },
                    args,
                )?;
            }
            Some(_) => {
                return Err(ExcType::type_error(format!(
                    "'{DUNDER_INIT}' of '{class_name}' must be an instance method"
                )));
            }
            None => {
                if !has_allocator && args.count() > 0 {
                    return Err(ExcType::type_error_no_args(&class_name, args.count()));
                }
            }
        }

        Ok(instance)
    }

    // ========================================================================
    // Member resolution and dispatch
    // ========================================================================

    /// Resolves `name` along the frozen MRO of `class_id`, returning the
    /// member and the class that defines it. Own members come first because
    /// the MRO starts with the class itself.
    fn lookup_member(&self, class_id: HeapId, name: &str) -> Option<(Value, HeapId)> {
        let HeapData::Class(cls) = self.heap.get(class_id) else {
            return None;
        };
        for &cid in cls.mro() {
            if let HeapData::Class(c) = self.heap.get(cid)
                && let Some(member) = c.own_member(name)
            {
                return Some((member.clone(), cid));
            }
        }
        None
    }

    /// Calls a member on an instance (or, for a class target, forwards to
    /// [`Runtime::call_static`]). Instance methods receive the receiver in
    /// their frame; static and class-bound members dispatch accordingly.
    pub fn call_method(&mut self, target: &Value, name: &str, args: ArgValues) -> RunResult<Value> {
        let Value::Ref(id) = target else {
            return Err(ExcType::attribute_error(
                format!("'{}' object", self.type_of(target)),
                name,
            ));
        };
        let class_id = match self.heap.get(*id) {
            HeapData::Instance(inst) => inst.class_id(),
            HeapData::Class(_) => return self.call_static(*id, name, args),
        };
        match self.lookup_member(class_id, name) {
            Some((Value::Function(f), defining)) => f(
                self,
                Frame {
                    this: target.clone(),
                    class: defining,
                },
                args,
            ),
            Some((Value::StaticFunction(f), _)) => f(self, args),
            Some((Value::ClassFunction(f), _)) => f(self, class_id, args),
            Some((other, _)) => Err(ExcType::type_error_not_callable(self.type_of(&other))),
            None => Err(ExcType::attribute_error(
                format!("'{}' object", self.class_name(class_id)?),
                name,
            )),
        }
    }

    /// Calls a static or class-bound member on a class record.
    pub fn call_static(&mut self, class_id: HeapId, name: &str, args: ArgValues) -> RunResult<Value> {
        let class_name = self.class_name(class_id)?.to_string();
        match self.lookup_member(class_id, name) {
            Some((Value::StaticFunction(f), _)) => f(self, args),
            // Class methods receive the class they were called on, not the
            // class that defines them, so subclasses flow through factories.
            Some((Value::ClassFunction(f), _)) => f(self, class_id, args),
            Some((Value::Function(_), _)) => Err(ExcType::type_error(format!(
                "'{name}' requires an instance of '{class_name}'"
            ))),
            Some((other, _)) => Err(ExcType::type_error_not_callable(self.type_of(&other))),
            None => Err(ExcType::attribute_error(format!("type object '{class_name}'"), name)),
        }
    }

    /// Invokes the nearest implementation of `name` strictly after
    /// `frame.class` in the receiver's MRO.
    ///
    /// The frame's defining class is the explicit resume point: a super call
    /// made inside an ancestor's method scans after that ancestor, so
    /// cooperative chains of any depth visit each implementation exactly
    /// once. Fails with `AttributeError` when no ancestor defines the
    /// member.
    pub fn call_super(&mut self, frame: &Frame, name: &str, args: ArgValues) -> RunResult<Value> {
        let Value::Ref(instance_id) = &frame.this else {
            return Err(ExcType::type_error("super dispatch requires an instance receiver"));
        };
        let class_id = match self.heap.get(*instance_id) {
            HeapData::Instance(inst) => inst.class_id(),
            HeapData::Class(_) => {
                return Err(ExcType::type_error("super dispatch requires an instance receiver"));
            }
        };
        let mro = match self.heap.get(class_id) {
            HeapData::Class(cls) => cls.mro().to_vec(),
            HeapData::Instance(_) => return Err(RunError::internal("call_super: instance class is not a class")),
        };

        let start = mro.iter().position(|&id| id == frame.class).map_or(0, |i| i + 1);
        for &cid in &mro[start..] {
            let found = match self.heap.get(cid) {
                HeapData::Class(c) => c.own_member(name).cloned(),
                HeapData::Instance(_) => None,
            };
            let Some(member) = found else { continue };
            return match member {
                Value::Function(f) => f(
                    self,
                    Frame {
                        this: frame.this.clone(),
                        class: cid,
                    },
                    args,
                ),
                Value::Property(prop) => match prop.fget() {
                    Some(fget) => fget(
                        self,
                        Frame {
                            this: frame.this.clone(),
                            class: cid,
                        },
                        args,
                    ),
                    None => Err(ExcType::attribute_error_unreadable(self.class_name(cid)?, name)),
                },
                Value::StaticFunction(f) => f(self, args),
                Value::ClassFunction(f) => f(self, class_id, args),
                other => Err(ExcType::type_error_not_callable(self.type_of(&other))),
            };
        }

        let origin = self.class_name(frame.class)?.to_string();
        Err(ExcType::attribute_error_super(&origin, name))
    }

    // ========================================================================
    // Attribute access
    // ========================================================================

    /// Reads an attribute.
    ///
    /// On instances the lookup order is: property descriptors on the class
    /// (data descriptors win over instance storage), then slots and the open
    /// attribute map, then plain class members. On class records the class
    /// namespace and MRO are consulted directly; properties are returned as
    /// descriptor values rather than invoked.
    pub fn get_attr(&mut self, target: &Value, name: &str) -> RunResult<Value> {
        let Value::Ref(id) = target else {
            return Err(ExcType::attribute_error(
                format!("'{}' object", self.type_of(target)),
                name,
            ));
        };
        let instance_class = match self.heap.get(*id) {
            HeapData::Instance(inst) => Some(inst.class_id()),
            HeapData::Class(_) => None,
        };
        let Some(class_id) = instance_class else {
            // Class-record attribute access.
            return match self.lookup_member(*id, name) {
                Some((value, _)) => Ok(value),
                None => Err(ExcType::attribute_error(
                    format!("type object '{}'", self.class_name(*id)?),
                    name,
                )),
            };
        };

        let class_attr = self.lookup_member(class_id, name);

        // Phase 1: property descriptors intercept instance reads.
        if let Some((Value::Property(prop), defining)) = &class_attr {
            let (prop, defining) = (*prop, *defining);
            return match prop.fget() {
                Some(fget) => fget(
                    self,
                    Frame {
                        this: target.clone(),
                        class: defining,
                    },
                    ArgValues::Empty,
                ),
                None => Err(ExcType::attribute_error_unreadable(self.class_name(class_id)?, name)),
            };
        }

        // Phase 2: instance storage - slots, then the open attribute map.
        let slot = match self.heap.get(class_id) {
            HeapData::Class(cls) => cls.slot_index(name),
            HeapData::Instance(_) => None,
        };
        if let Some(idx) = slot {
            let value = match self.heap.get(*id) {
                HeapData::Instance(inst) => inst.slot_value(idx).cloned(),
                HeapData::Class(_) => None,
            };
            return match value {
                Some(value) => Ok(value),
                None => Err(ExcType::attribute_error(
                    format!("'{}' object", self.class_name(class_id)?),
                    name,
                )),
            };
        }
        let attr_value = match self.heap.get(*id) {
            HeapData::Instance(inst) => inst.attrs().and_then(|attrs| attrs.get(name)).cloned(),
            HeapData::Class(_) => None,
        };
        if let Some(value) = attr_value {
            return Ok(value);
        }

        // Phase 3: plain class members (methods, class attributes).
        if let Some((value, _)) = class_attr {
            return Ok(value);
        }

        Err(ExcType::attribute_error(
            format!("'{}' object", self.class_name(class_id)?),
            name,
        ))
    }

    /// Writes an attribute.
    ///
    /// On instances, property setters intercept the write; slot writes go to
    /// slot storage; anything else lands in the open attribute map. Writes
    /// to undeclared fields on a slot-closed instance fail. On class
    /// records, the write updates the class namespace.
    pub fn set_attr(&mut self, target: &Value, name: &str, value: Value) -> RunResult<()> {
        let Value::Ref(id) = target else {
            return Err(ExcType::attribute_error(
                format!("'{}' object", self.type_of(target)),
                name,
            ));
        };
        let instance_class = match self.heap.get(*id) {
            HeapData::Instance(inst) => Some(inst.class_id()),
            HeapData::Class(_) => None,
        };
        let Some(class_id) = instance_class else {
            match self.heap.get_mut(*id) {
                HeapData::Class(cls) => {
                    cls.set_attr(name.to_string(), value);
                    return Ok(());
                }
                HeapData::Instance(_) => return Err(RunError::internal("set_attr: class target vanished")),
            }
        };

        // Property setters intercept instance writes.
        if let Some((Value::Property(prop), defining)) = &self.lookup_member(class_id, name) {
            let (prop, defining) = (*prop, *defining);
            return match prop.fset() {
                Some(fset) => {
                    fset(
                        self,
                        Frame {
                            this: target.clone(),
                            class: defining,
                        },
                        ArgValues::One(value),
                    )?;
                    Ok(())
                }
                None => Err(ExcType::attribute_error_read_only(self.class_name(class_id)?, name)),
            };
        }

        let slot = match self.heap.get(class_id) {
            HeapData::Class(cls) => cls.slot_index(name),
            HeapData::Instance(_) => None,
        };
        if let Some(idx) = slot {
            if let HeapData::Instance(inst) = self.heap.get_mut(*id) {
                inst.set_slot(idx, value);
            }
            return Ok(());
        }

        let has_attrs = match self.heap.get(*id) {
            HeapData::Instance(inst) => inst.attrs().is_some(),
            HeapData::Class(_) => false,
        };
        if has_attrs {
            if let HeapData::Instance(inst) = self.heap.get_mut(*id)
                && let Some(attrs) = inst.attrs_mut()
            {
                attrs.insert(name.to_string(), value);
            }
            return Ok(());
        }

        Err(ExcType::attribute_error_slots(self.class_name(class_id)?, name))
    }

    /// Deletes an attribute from an instance or a class record.
    pub fn del_attr(&mut self, target: &Value, name: &str) -> RunResult<()> {
        let Value::Ref(id) = target else {
            return Err(ExcType::attribute_error(
                format!("'{}' object", self.type_of(target)),
                name,
            ));
        };
        let instance_class = match self.heap.get(*id) {
            HeapData::Instance(inst) => Some(inst.class_id()),
            HeapData::Class(_) => None,
        };
        let Some(class_id) = instance_class else {
            let removed = match self.heap.get_mut(*id) {
                HeapData::Class(cls) => cls.remove_attr(name),
                HeapData::Instance(_) => None,
            };
            return match removed {
                Some(_) => Ok(()),
                None => Err(ExcType::attribute_error(
                    format!("type object '{}'", self.class_name(*id)?),
                    name,
                )),
            };
        };

        if let Some((Value::Property(_), _)) = self.lookup_member(class_id, name) {
            return Err(ExcType::attribute_error_no_deleter(self.class_name(class_id)?, name));
        }

        let slot = match self.heap.get(class_id) {
            HeapData::Class(cls) => cls.slot_index(name),
            HeapData::Instance(_) => None,
        };
        let removed = if let Some(idx) = slot {
            match self.heap.get_mut(*id) {
                HeapData::Instance(inst) => inst.take_slot(idx),
                HeapData::Class(_) => None,
            }
        } else {
            match self.heap.get_mut(*id) {
                HeapData::Instance(inst) => inst.attrs_mut().and_then(|attrs| attrs.shift_remove(name)),
                HeapData::Class(_) => None,
            }
        };
        match removed {
            Some(_) => Ok(()),
            None => Err(ExcType::attribute_error(
                format!("'{}' object", self.class_name(class_id)?),
                name,
            )),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the name of a class record.
    pub fn class_name(&self, class_id: HeapId) -> RunResult<&str> {
        match self.heap.get(class_id) {
            HeapData::Class(cls) => Ok(cls.name()),
            HeapData::Instance(_) => Err(ExcType::type_error("expected a class record")),
        }
    }

    /// Returns the direct bases of a class record.
    pub fn bases(&self, class_id: HeapId) -> RunResult<Vec<HeapId>> {
        match self.heap.get(class_id) {
            HeapData::Class(cls) => Ok(cls.bases().to_vec()),
            HeapData::Instance(_) => Err(ExcType::type_error("expected a class record")),
        }
    }

    /// Returns the frozen MRO of a class record, the class itself first.
    pub fn mro(&self, class_id: HeapId) -> RunResult<Vec<HeapId>> {
        match self.heap.get(class_id) {
            HeapData::Class(cls) => Ok(cls.mro().to_vec()),
            HeapData::Instance(_) => Err(ExcType::type_error("expected a class record")),
        }
    }

    /// Returns the slot names declared directly on a class record, if any.
    ///
    /// Only this class's own declaration is reported; inherited slots are
    /// part of the instance layout but belong to their declaring class.
    pub fn slots(&self, class_id: HeapId) -> RunResult<Option<Vec<String>>> {
        match self.heap.get(class_id) {
            HeapData::Class(cls) => Ok(cls.slots().map(<[String]>::to_vec)),
            HeapData::Instance(_) => Err(ExcType::type_error("expected a class record")),
        }
    }

    /// Returns the class record backing an instance value, if any.
    #[must_use]
    pub fn class_of(&self, value: &Value) -> Option<HeapId> {
        let Value::Ref(id) = value else { return None };
        match self.heap.get(*id) {
            HeapData::Instance(inst) => Some(inst.class_id()),
            HeapData::Class(_) => None,
        }
    }

    /// Checks whether `class_id` is `other` or lists it in its MRO.
    #[must_use]
    pub fn is_subclass_of(&self, class_id: HeapId, other: HeapId) -> bool {
        if class_id == other {
            return true;
        }
        match self.heap.get(class_id) {
            HeapData::Class(cls) => cls.is_subclass_of(class_id, other),
            HeapData::Instance(_) => false,
        }
    }

    /// Checks whether `value` is an instance of `class_id` or of a subclass.
    #[must_use]
    pub fn is_instance_of(&self, value: &Value, class_id: HeapId) -> bool {
        self.class_of(value)
            .is_some_and(|instance_class| self.is_subclass_of(instance_class, class_id))
    }

    /// Returns the kind of a value.
    #[must_use]
    pub fn type_of(&self, value: &Value) -> Type {
        value.py_type(&self.heap)
    }

    /// Returns the display name for a value's type: the class name for
    /// instances, the lowercase kind name otherwise.
    fn type_name(&self, value: &Value) -> String {
        if let Value::Ref(id) = value
            && let HeapData::Instance(inst) = self.heap.get(*id)
            && let HeapData::Class(cls) = self.heap.get(inst.class_id())
        {
            return cls.name().to_string();
        }
        self.type_of(value).to_string()
    }

    // ========================================================================
    // Coercion
    // ========================================================================

    /// Converts a value to its string form.
    ///
    /// Instances consult the MRO-resolved `__str__` hook, which must return
    /// a `Str`; without one, the default representation
    /// `ClassName({ field: value, ... })` is used. Plain strings convert to
    /// themselves unquoted; every other value uses its structural
    /// representation.
    pub fn str_of(&mut self, value: &Value) -> RunResult<String> {
        if let Value::Ref(id) = value
            && let HeapData::Instance(inst) = self.heap.get(*id)
        {
            let class_id = inst.class_id();
            if let Some((member, defining)) = self.lookup_member(class_id, DUNDER_STR) {
                let Value::Function(f) = member else {
                    return Err(ExcType::type_error(format!(
                        "'{DUNDER_STR}' of '{}' must be an instance method",
                        self.class_name(class_id)?
                    )));
                };
                let result = f(
                    self,
                    Frame {
                        this: value.clone(),
                        class: defining,
                    },
                    ArgValues::Empty,
                )?;
                return match result {
                    Value::Str(s) => Ok(s),
                    other => Err(ExcType::type_error(format!(
                        "'{DUNDER_STR}' returned non-string (type '{}')",
                        self.type_of(&other)
                    ))),
                };
            }
        }
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Ok(self.repr_of(other)),
        }
    }

    /// Converts a value to an integer.
    ///
    /// Instances consult the MRO-resolved `__int__` hook, which must return
    /// an `Int`. Bools, ints, finite floats (truncating), and integer
    /// strings convert natively; everything else is a `TypeError`.
    pub fn int_of(&mut self, value: &Value) -> RunResult<i64> {
        match value {
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Int(i) => Ok(*i),
            Value::Float(x) => {
                if x.is_nan() {
                    Err(ExcType::value_error("cannot convert float NaN to integer"))
                } else if x.is_infinite() {
                    Err(ExcType::overflow_error("cannot convert float infinity to integer"))
                } else {
                    Ok(*x as i64)
                }
            }
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ExcType::value_error(format!("invalid literal for an integer: '{s}'"))),
            Value::Ref(id) => {
                if let HeapData::Instance(inst) = self.heap.get(*id) {
                    let class_id = inst.class_id();
                    if let Some((member, defining)) = self.lookup_member(class_id, DUNDER_INT) {
                        let Value::Function(f) = member else {
                            return Err(ExcType::type_error(format!(
                                "'{DUNDER_INT}' of '{}' must be an instance method",
                                self.class_name(class_id)?
                            )));
                        };
                        let result = f(
                            self,
                            Frame {
                                this: value.clone(),
                                class: defining,
                            },
                            ArgValues::Empty,
                        )?;
                        return match result {
                            Value::Int(i) => Ok(i),
                            other => Err(ExcType::type_error(format!(
                                "'{DUNDER_INT}' returned non-int (type '{}')",
                                self.type_of(&other)
                            ))),
                        };
                    }
                }
                Err(ExcType::type_error_int_conversion(self.type_name(value)))
            }
            other => Err(ExcType::type_error_int_conversion(self.type_name(other))),
        }
    }

    /// Returns the structural representation of a value.
    ///
    /// Unlike [`Runtime::str_of`] this never invokes coercion hooks, so it
    /// needs no mutable access and cannot fail.
    #[must_use]
    pub fn repr_of(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut heap_ids = AHashSet::new();
        let _ = value.repr_fmt(&mut out, &self.heap, &mut heap_ids);
        out
    }
}
