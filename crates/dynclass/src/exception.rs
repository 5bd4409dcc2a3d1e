//! Runtime error types.
//!
//! All failures surface as [`RunError`] values: either an `Internal` error
//! (a bug in dynclass itself) or a user-visible exception built from an
//! [`ExcType`] and a message. Nothing is caught or retried inside the core;
//! errors propagate synchronously to the embedding caller.

use std::{
    borrow::Cow,
    fmt::{self, Display},
};

use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Exception kinds raised by the object model.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations. The string representation matches the variant name exactly
/// (e.g., `ValueError` -> "ValueError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[expect(clippy::enum_variant_names, reason = "variant names are the user-visible exception names")]
pub enum ExcType {
    /// Missing members, exhausted super chains, closed instances.
    AttributeError,
    /// Numeric conversions that exceed the representable range.
    OverflowError,
    /// Misuse of the runtime surface itself.
    RuntimeError,
    /// Linearization conflicts, bad allocator results, arity mismatches.
    TypeError,
    /// Invalid values; raised by user property setters by convention.
    ValueError,
}

impl ExcType {
    /// Creates a simple TypeError with a custom message.
    #[must_use]
    pub(crate) fn type_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates a TypeError for an exact-arity mismatch.
    ///
    /// * `name` - The member name (e.g., "__init__", "translate")
    /// * `expected` - Number of expected arguments
    /// * `actual` - Number of arguments actually provided
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        if expected == 1 {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name}() takes exactly one argument ({actual} given)"),
            )
            .into()
        } else {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name} expected {expected} arguments, got {actual}"),
            )
            .into()
        }
    }

    /// Creates a TypeError for a member that takes no arguments but received some.
    #[must_use]
    pub(crate) fn type_error_no_args(name: &str, actual: usize) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("{name}() takes no arguments ({actual} given)")).into()
    }

    /// Creates a TypeError for a member that allows at most one argument.
    #[must_use]
    pub(crate) fn type_error_at_most(name: &str, max: usize, actual: usize) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name} expected at most {max} arguments, got {actual}"),
        )
        .into()
    }

    /// Creates a TypeError for invoking a non-callable member.
    #[must_use]
    pub(crate) fn type_error_not_callable(type_: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not callable")).into()
    }

    /// Creates a TypeError for a value with no integer conversion.
    #[must_use]
    pub(crate) fn type_error_int_conversion(type_: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("cannot convert '{type_}' to int")).into()
    }

    /// Creates an AttributeError for a missing attribute.
    ///
    /// `owner` is the already-formatted owner description, e.g. `'Point' object`
    /// or `type object 'Point'`.
    #[must_use]
    pub(crate) fn attribute_error(owner: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(Self::AttributeError, format!("{owner} has no attribute '{attr}'")).into()
    }

    /// Creates an AttributeError for writes outside a slot-closed instance.
    #[must_use]
    pub(crate) fn attribute_error_slots(class_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{class_name}' object has no slot '{attr}' and cannot add new attributes"),
        )
        .into()
    }

    /// Creates an AttributeError for an exhausted super chain.
    #[must_use]
    pub(crate) fn attribute_error_super(class_name: &str, method: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{method}' not found in the ancestor chain of '{class_name}'"),
        )
        .into()
    }

    /// Creates an AttributeError for assigning through a getter-only property.
    #[must_use]
    pub(crate) fn attribute_error_read_only(class_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("property '{attr}' of '{class_name}' object has no setter"),
        )
        .into()
    }

    /// Creates an AttributeError for reading through a setter-only property.
    #[must_use]
    pub(crate) fn attribute_error_unreadable(class_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("property '{attr}' of '{class_name}' object has no getter"),
        )
        .into()
    }

    /// Creates an AttributeError for deleting through a property.
    #[must_use]
    pub(crate) fn attribute_error_no_deleter(class_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("property '{attr}' of '{class_name}' object has no deleter"),
        )
        .into()
    }

    /// Creates a simple ValueError with a custom message.
    #[must_use]
    pub(crate) fn value_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::ValueError, msg).into()
    }

    /// Creates a simple OverflowError with a custom message.
    #[must_use]
    pub(crate) fn overflow_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::OverflowError, msg).into()
    }
}

/// Lightweight representation of an exception: a kind plus an optional message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleException {
    exc_type: ExcType,
    msg: Option<String>,
}

impl SimpleException {
    /// Creates a new exception with the given type and optional message.
    #[must_use]
    pub fn new(exc_type: ExcType, msg: Option<String>) -> Self {
        Self { exc_type, msg }
    }

    /// Creates a new exception with a message built from any displayable value.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, msg: impl Display) -> Self {
        Self::new(exc_type, Some(msg.to_string()))
    }

    /// Returns the exception kind.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    /// Returns the exception message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msg {
            Some(msg) => write!(f, "{}: {msg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

/// Runtime error raised while defining classes or operating on instances.
///
/// Two variants:
/// - `Internal`: a bug in dynclass itself, not in the embedding's definitions
/// - `Exc`: a user-visible exception (TypeError, AttributeError, ...)
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// Internal runtime error - indicates a bug in dynclass, not user definitions.
    Internal(Cow<'static, str>),
    /// A user-visible exception.
    Exc(Box<SimpleException>),
}

impl RunError {
    /// Creates an internal error from a static or owned message.
    pub(crate) fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the exception kind, if this error is a user-visible exception.
    #[must_use]
    pub fn exc_type(&self) -> Option<ExcType> {
        match self {
            Self::Exc(exc) => Some(exc.exc_type()),
            Self::Internal(_) => None,
        }
    }

    /// Returns true if this error is an exception of the given kind.
    #[must_use]
    pub fn is_exception_type(&self, exc_type: ExcType) -> bool {
        self.exc_type() == Some(exc_type)
    }
}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(Box::new(exc))
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
            Self::Exc(exc) => write!(f, "{exc}"),
        }
    }
}

impl std::error::Error for RunError {}
