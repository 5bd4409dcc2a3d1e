use dynclass::{ArgValues, ClassDef, ExcType, Runtime, Value};
use pretty_assertions::assert_eq;

/// Tests for lazy at-most-once singleton construction.

#[test]
fn repeated_gets_return_the_same_instance() {
    let mut rt = Runtime::new();
    let config = rt
        .make_singleton(
            "Config",
            ClassDef::new().init(|rt, frame, args| {
                let level = args.get_zero_one_arg("__init__")?.unwrap_or(Value::Int(0));
                rt.set_attr(&frame.this, "level", level)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    let first = config.get(&mut rt, ArgValues::One(Value::Int(1))).unwrap();
    let second = config.get(&mut rt, ArgValues::Empty).unwrap();
    assert_eq!(first, second);
    assert_eq!(rt.get_attr(&first, "level").unwrap(), Value::Int(1));
}

#[test]
fn arguments_after_the_first_call_are_ignored() {
    let mut rt = Runtime::new();
    let config = rt
        .make_singleton(
            "Config",
            ClassDef::new().init(|rt, frame, args| {
                let level = args.get_one_arg("__init__")?;
                rt.set_attr(&frame.this, "level", level)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    let first = config.get(&mut rt, ArgValues::One(Value::Int(1))).unwrap();
    let second = config.get(&mut rt, ArgValues::One(Value::Int(99))).unwrap();
    assert_eq!(first, second);
    assert_eq!(rt.get_attr(&second, "level").unwrap(), Value::Int(1));
}

#[test]
fn mutation_through_one_handle_is_visible_through_the_other() {
    let mut rt = Runtime::new();
    let state = rt.make_singleton("State", ClassDef::new(), &[]).unwrap();
    let first = state.get(&mut rt, ArgValues::Empty).unwrap();
    let second = state.get(&mut rt, ArgValues::Empty).unwrap();
    rt.set_attr(&first, "flag", Value::Bool(true)).unwrap();
    assert_eq!(rt.get_attr(&second, "flag").unwrap(), Value::Bool(true));
}

#[test]
fn construction_is_lazy_until_the_first_get() {
    let mut rt = Runtime::new();
    // The initializer requires an argument, so eager construction at
    // definition time would fail; only the first get constructs.
    let config = rt
        .make_singleton(
            "Config",
            ClassDef::new().init(|rt, frame, args| {
                let level = args.get_one_arg("__init__")?;
                rt.set_attr(&frame.this, "level", level)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    let first = config.get(&mut rt, ArgValues::One(Value::Int(3))).unwrap();
    assert_eq!(rt.get_attr(&first, "level").unwrap(), Value::Int(3));
}

#[test]
fn failed_first_construction_leaves_the_singleton_unset() {
    let mut rt = Runtime::new();
    let config = rt
        .make_singleton(
            "Config",
            ClassDef::new().init(|rt, frame, args| {
                let level = args.get_one_arg("__init__")?;
                rt.set_attr(&frame.this, "level", level)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    // Missing argument: construction fails and nothing is cached.
    assert!(config.get(&mut rt, ArgValues::Empty).is_err());
    let first = config.get(&mut rt, ArgValues::One(Value::Int(5))).unwrap();
    assert_eq!(rt.get_attr(&first, "level").unwrap(), Value::Int(5));
}

#[test]
fn singleton_definitions_cannot_declare_an_allocator() {
    let mut rt = Runtime::new();
    let err = rt
        .make_singleton(
            "Config",
            ClassDef::new().alloc(|rt, cls, _args| rt.alloc_instance(cls)),
            &[],
        )
        .unwrap_err();
    assert!(err.is_exception_type(ExcType::TypeError));
    assert!(err.to_string().contains("__new__"));
}

#[test]
fn singletons_inherit_members_from_bases() {
    let mut rt = Runtime::new();
    let base = rt
        .make_class(
            "Base",
            ClassDef::new().method("describe", |_rt, _frame, args| {
                args.check_zero_args("describe")?;
                Ok(Value::Str("base".to_string()))
            }),
            &[],
        )
        .unwrap();
    let app = rt.make_singleton("App", ClassDef::new(), &[base]).unwrap();
    let instance = app.get(&mut rt, ArgValues::Empty).unwrap();
    assert_eq!(
        rt.call_method(&instance, "describe", ArgValues::Empty).unwrap(),
        Value::Str("base".to_string())
    );
}
