//! Member-call argument packaging.

use smallvec::SmallVec;

use crate::{
    exception::{ExcType, RunError, RunResult},
    value::Value,
};

/// Positional arguments for a member call.
///
/// Dedicated variants for the common arities avoid a heap allocation for
/// most calls; arbitrary arities use the `Many` variant. Consuming helpers
/// check arity and name the callable in their errors.
#[derive(Debug, Clone, Default)]
pub enum ArgValues {
    #[default]
    Empty,
    One(Value),
    Two(Value, Value),
    Many(SmallVec<[Value; 4]>),
}

impl ArgValues {
    /// Packs an iterator of values into the smallest fitting variant.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut collected: SmallVec<[Value; 4]> = values.into_iter().collect();
        match collected.len() {
            0 => Self::Empty,
            1 => Self::One(collected.remove(0)),
            2 => {
                let second = collected.remove(1);
                Self::Two(collected.remove(0), second)
            }
            _ => Self::Many(collected),
        }
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::Many(values) => values.len(),
        }
    }

    /// Checks that zero arguments were passed.
    pub fn check_zero_args(self, name: &str) -> RunResult<()> {
        match self {
            Self::Empty => Ok(()),
            other => Err(ExcType::type_error_no_args(name, other.count())),
        }
    }

    /// Checks that exactly one argument was passed, returning it.
    pub fn get_one_arg(self, name: &str) -> RunResult<Value> {
        match self {
            Self::One(a) => Ok(a),
            other => Err(ExcType::type_error_arg_count(name, 1, other.count())),
        }
    }

    /// Checks that exactly two arguments were passed, returning them.
    pub fn get_two_args(self, name: &str) -> RunResult<(Value, Value)> {
        match self {
            Self::Two(a, b) => Ok((a, b)),
            other => Err(ExcType::type_error_arg_count(name, 2, other.count())),
        }
    }

    /// Checks that exactly three arguments were passed, returning them.
    pub fn get_three_args(self, name: &str) -> RunResult<(Value, Value, Value)> {
        match self {
            Self::Many(values) if values.len() == 3 => {
                let mut iter = values.into_iter();
                let (Some(a), Some(b), Some(c)) = (iter.next(), iter.next(), iter.next()) else {
                    return Err(RunError::internal("get_three_args: length checked above"));
                };
                Ok((a, b, c))
            }
            other => Err(ExcType::type_error_arg_count(name, 3, other.count())),
        }
    }

    /// Checks that zero or one argument was passed.
    pub fn get_zero_one_arg(self, name: &str) -> RunResult<Option<Value>> {
        match self {
            Self::Empty => Ok(None),
            Self::One(a) => Ok(Some(a)),
            other => Err(ExcType::type_error_at_most(name, 1, other.count())),
        }
    }

    /// Unpacks the arguments into a flat vector.
    #[must_use]
    pub fn into_values(self) -> SmallVec<[Value; 4]> {
        match self {
            Self::Empty => SmallVec::new(),
            Self::One(a) => smallvec::smallvec![a],
            Self::Two(a, b) => smallvec::smallvec![a, b],
            Self::Many(values) => values,
        }
    }
}
