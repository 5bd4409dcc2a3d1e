//! Value kinds used in diagnostics.

use strum::Display;

/// The kind of a runtime [`Value`](crate::Value).
///
/// The `Display` form is the lowercase kind name used in error messages
/// (e.g., `'int' object is not callable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    /// Unset slot storage; never escapes attribute reads.
    Undefined,
    None,
    Bool,
    Int,
    Float,
    Str,
    /// An instance-bound member function.
    Function,
    /// A static member function.
    StaticMethod,
    /// A class-bound member function.
    ClassMethod,
    /// A property descriptor.
    Property,
    /// A class record.
    Type,
    /// A user-class instance.
    Instance,
}
