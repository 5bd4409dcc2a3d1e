//! Class definition values consumed by the class factory.

use indexmap::IndexMap;

use crate::{
    types::UserProperty,
    value::{ClassFn, MethodFn, StaticFn, Value},
};

/// Name of the cooperative initializer member.
pub(crate) const DUNDER_INIT: &str = "__init__";
/// Name of the custom allocator member.
pub(crate) const DUNDER_NEW: &str = "__new__";
/// Name of the string-coercion hook.
pub(crate) const DUNDER_STR: &str = "__str__";
/// Name of the integer-coercion hook.
pub(crate) const DUNDER_INT: &str = "__int__";

/// A class definition: plain data describing the members of a class.
///
/// Built with chained calls and handed to
/// [`Runtime::make_class`](crate::Runtime::make_class). Members are recorded
/// in declaration order; declaring the same name twice keeps the later
/// member. The well-known members `__init__`, `__new__`, `__str__` and
/// `__int__` are ordinary namespace entries declared through their dedicated
/// builder calls.
#[derive(Debug, Default)]
pub struct ClassDef {
    namespace: IndexMap<String, Value>,
    slots: Option<Vec<String>>,
}

impl ClassDef {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an instance method.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>, f: MethodFn) -> Self {
        self.namespace.insert(name.into(), Value::Function(f));
        self
    }

    /// Declares a plain class attribute, visible from instances and the class.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.namespace.insert(name.into(), value);
        self
    }

    /// Declares the initializer, run after allocation on every construction.
    #[must_use]
    pub fn init(self, f: MethodFn) -> Self {
        self.method(DUNDER_INIT, f)
    }

    /// Declares a custom allocator, replacing the default bare-instance
    /// allocation. The allocator receives the class id and the constructor
    /// arguments and must return an instance of that class.
    #[must_use]
    pub fn alloc(mut self, f: ClassFn) -> Self {
        self.namespace.insert(DUNDER_NEW.to_string(), Value::ClassFunction(f));
        self
    }

    /// Declares the string-coercion hook consulted by
    /// [`Runtime::str_of`](crate::Runtime::str_of).
    #[must_use]
    pub fn str_hook(self, f: MethodFn) -> Self {
        self.method(DUNDER_STR, f)
    }

    /// Declares the integer-coercion hook consulted by
    /// [`Runtime::int_of`](crate::Runtime::int_of).
    #[must_use]
    pub fn int_hook(self, f: MethodFn) -> Self {
        self.method(DUNDER_INT, f)
    }

    /// Declares a computed property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: UserProperty) -> Self {
        self.namespace.insert(name.into(), Value::Property(property));
        self
    }

    /// Declares a static member, callable on the class without an instance.
    #[must_use]
    pub fn static_method(mut self, name: impl Into<String>, f: StaticFn) -> Self {
        self.namespace.insert(name.into(), Value::StaticFunction(f));
        self
    }

    /// Declares a class method: callable on the class, receiving the class
    /// id as its receiver. Commonly used for alternate constructors.
    #[must_use]
    pub fn class_method(mut self, name: impl Into<String>, f: ClassFn) -> Self {
        self.namespace.insert(name.into(), Value::ClassFunction(f));
        self
    }

    /// Declares the ordered list of permitted instance field names. With
    /// slots declared, instances reject writes to undeclared fields.
    #[must_use]
    pub fn slots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Returns whether the definition declares a custom allocator.
    pub(crate) fn declares_allocator(&self) -> bool {
        self.namespace.contains_key(DUNDER_NEW)
    }

    /// Splits the definition into its namespace and slot declaration.
    pub(crate) fn into_parts(self) -> (IndexMap<String, Value>, Option<Vec<String>>) {
        (self.namespace, self.slots)
    }
}
