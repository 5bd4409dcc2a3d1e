//! Runtime values and member-function signatures.

use std::fmt::Write;

use ahash::AHashSet;

use crate::{
    args::ArgValues,
    exception::RunResult,
    heap::{Heap, HeapData, HeapId},
    runtime::{Frame, Runtime},
    types::{Type, UserProperty, instance_repr_fmt},
};

/// Signature of instance-bound members: methods, `__init__`, and the
/// `__str__`/`__int__` coercion hooks. The [`Frame`] carries the receiver
/// and the class whose namespace defines the running member.
pub type MethodFn = fn(&mut Runtime, Frame, ArgValues) -> RunResult<Value>;

/// Signature of class-bound members: class methods and `__new__` allocators.
/// Receives the class id as its receiver.
pub type ClassFn = fn(&mut Runtime, HeapId, ArgValues) -> RunResult<Value>;

/// Signature of static members: bound to the class record, no implicit
/// receiver.
pub type StaticFn = fn(&mut Runtime, ArgValues) -> RunResult<Value>;

/// A runtime value.
///
/// Immediates are stored inline; class records and instances live in the
/// runtime heap behind [`Value::Ref`]. Member functions are host function
/// pointers, so values are cheap to clone and compare by function address.
#[derive(Debug, Clone)]
pub enum Value {
    /// Unset slot storage. Never escapes attribute reads.
    Undefined,
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An instance method; invoked with the receiver bound in a [`Frame`].
    Function(MethodFn),
    /// A static member; invoked without a receiver.
    StaticFunction(StaticFn),
    /// A class-bound member; invoked with the class id as receiver.
    ClassFunction(ClassFn),
    /// A property descriptor; reads and writes flow through its accessors.
    Property(UserProperty),
    /// Reference to a heap object (class record or instance).
    Ref(HeapId),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub(crate) fn py_type(&self, heap: &Heap) -> Type {
        match self {
            Self::Undefined => Type::Undefined,
            Self::None => Type::None,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::Str(_) => Type::Str,
            Self::Function(_) => Type::Function,
            Self::StaticFunction(_) => Type::StaticMethod,
            Self::ClassFunction(_) => Type::ClassMethod,
            Self::Property(_) => Type::Property,
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Class(_) => Type::Type,
                HeapData::Instance(_) => Type::Instance,
            },
        }
    }

    /// Returns whether this value is a member function or property
    /// descriptor. Such values are skipped by the default instance
    /// representation.
    #[must_use]
    pub(crate) fn is_member_fn(&self) -> bool {
        matches!(
            self,
            Self::Function(_) | Self::StaticFunction(_) | Self::ClassFunction(_) | Self::Property(_)
        )
    }

    /// Writes the structural representation of this value.
    ///
    /// Strings are double-quoted with minimal escaping; classes render as
    /// `<class 'Name'>`; instances use the default field listing (coercion
    /// hooks are the runtime's concern, not this formatter's). `heap_ids`
    /// tracks the instances currently being rendered so self-referential
    /// field graphs print `...` instead of recursing.
    pub(crate) fn repr_fmt(&self, f: &mut impl Write, heap: &Heap, heap_ids: &mut AHashSet<HeapId>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("<undefined>"),
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => {
                f.write_char('"')?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        other => f.write_char(other)?,
                    }
                }
                f.write_char('"')
            }
            Self::Function(_) => f.write_str("<function>"),
            Self::StaticFunction(_) => f.write_str("<staticmethod>"),
            Self::ClassFunction(_) => f.write_str("<classmethod>"),
            Self::Property(_) => f.write_str("<property>"),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Class(cls) => write!(f, "<class '{}'>", cls.name()),
                HeapData::Instance(inst) => {
                    if !heap_ids.insert(*id) {
                        return f.write_str("...");
                    }
                    let result = instance_repr_fmt(inst, f, heap, heap_ids);
                    heap_ids.remove(id);
                    result
                }
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Self::StaticFunction(a), Self::StaticFunction(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Self::ClassFunction(a), Self::ClassFunction(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Self::Property(a), Self::Property(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a == b,
            _ => false,
        }
    }
}
