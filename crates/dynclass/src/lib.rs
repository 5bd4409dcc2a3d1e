#![doc = include_str!("../../../README.md")]

mod args;
mod definition;
mod exception;
mod heap;
mod runtime;
mod singleton;
mod types;
mod value;

pub use crate::{
    args::ArgValues,
    definition::ClassDef,
    exception::{ExcType, RunError, RunResult, SimpleException},
    heap::HeapId,
    runtime::{Frame, Runtime},
    singleton::Singleton,
    types::{Type, UserProperty},
    value::{ClassFn, MethodFn, StaticFn, Value},
};
