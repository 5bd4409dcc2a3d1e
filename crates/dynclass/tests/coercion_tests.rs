use dynclass::{ArgValues, ClassDef, ExcType, Frame, MethodFn, Runtime, RunResult, Value};
use pretty_assertions::assert_eq;

/// Tests for explicit string/integer coercion and the default representation.

fn noop(_rt: &mut Runtime, _frame: Frame, _args: ArgValues) -> RunResult<Value> {
    Ok(Value::None)
}

#[test]
fn default_representation_lists_fields_in_assignment_order() {
    let mut rt = Runtime::new();
    let point = rt
        .make_class(
            "Point",
            ClassDef::new().init(|rt, frame, args| {
                let (x, y) = args.get_two_args("__init__")?;
                rt.set_attr(&frame.this, "x", x)?;
                rt.set_attr(&frame.this, "y", y)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    let p = rt
        .construct(point, ArgValues::Two(Value::Int(1), Value::Str("a".to_string())))
        .unwrap();
    assert_eq!(rt.str_of(&p).unwrap(), "Point({ x: 1, y: \"a\" })");
}

#[test]
fn default_representation_of_a_fieldless_instance_is_empty_braces() {
    let mut rt = Runtime::new();
    let empty = rt.make_class("Empty", ClassDef::new(), &[]).unwrap();
    let e = rt.construct(empty, ArgValues::Empty).unwrap();
    assert_eq!(rt.str_of(&e).unwrap(), "Empty({})");
}

#[test]
fn default_representation_skips_function_valued_fields() {
    let mut rt = Runtime::new();
    let holder = rt.make_class("Holder", ClassDef::new(), &[]).unwrap();
    let h = rt.construct(holder, ArgValues::Empty).unwrap();
    rt.set_attr(&h, "x", Value::Int(1)).unwrap();
    let f: MethodFn = noop;
    rt.set_attr(&h, "callback", Value::Function(f)).unwrap();
    assert_eq!(rt.str_of(&h).unwrap(), "Holder({ x: 1 })");
}

#[test]
fn str_hook_overrides_the_default_representation() {
    let mut rt = Runtime::new();
    let point = rt
        .make_class(
            "Point",
            ClassDef::new()
                .init(|rt, frame, args| {
                    let (x, y) = args.get_two_args("__init__")?;
                    rt.set_attr(&frame.this, "x", x)?;
                    rt.set_attr(&frame.this, "y", y)?;
                    Ok(Value::None)
                })
                .str_hook(|rt, frame, args| {
                    args.check_zero_args("__str__")?;
                    let x = rt.get_attr(&frame.this, "x")?;
                    let y = rt.get_attr(&frame.this, "y")?;
                    let x = rt.int_of(&x)?;
                    let y = rt.int_of(&y)?;
                    Ok(Value::Str(format!("({x}, {y})")))
                }),
            &[],
        )
        .unwrap();
    let p = rt
        .construct(point, ArgValues::Two(Value::Int(3), Value::Int(4)))
        .unwrap();
    assert_eq!(rt.str_of(&p).unwrap(), "(3, 4)");
}

#[test]
fn str_hook_is_inherited_through_the_mro() {
    let mut rt = Runtime::new();
    let base = rt
        .make_class(
            "Base",
            ClassDef::new().str_hook(|_rt, _frame, args| {
                args.check_zero_args("__str__")?;
                Ok(Value::Str("from base".to_string()))
            }),
            &[],
        )
        .unwrap();
    let derived = rt.make_class("Derived", ClassDef::new(), &[base]).unwrap();
    let d = rt.construct(derived, ArgValues::Empty).unwrap();
    assert_eq!(rt.str_of(&d).unwrap(), "from base");
}

#[test]
fn str_hook_returning_non_string_is_a_type_error() {
    let mut rt = Runtime::new();
    let broken = rt
        .make_class(
            "Broken",
            ClassDef::new().str_hook(|_rt, _frame, args| {
                args.check_zero_args("__str__")?;
                Ok(Value::Int(1))
            }),
            &[],
        )
        .unwrap();
    let b = rt.construct(broken, ArgValues::Empty).unwrap();
    let err = rt.str_of(&b).unwrap_err();
    assert!(err.is_exception_type(ExcType::TypeError));
    assert!(err.to_string().contains("__str__"));
}

#[test]
fn int_hook_drives_integer_coercion() {
    let mut rt = Runtime::new();
    let answer = rt
        .make_class(
            "Answer",
            ClassDef::new().int_hook(|_rt, _frame, args| {
                args.check_zero_args("__int__")?;
                Ok(Value::Int(42))
            }),
            &[],
        )
        .unwrap();
    let a = rt.construct(answer, ArgValues::Empty).unwrap();
    assert_eq!(rt.int_of(&a).unwrap(), 42);
}

#[test]
fn int_hook_returning_non_int_is_a_type_error() {
    let mut rt = Runtime::new();
    let broken = rt
        .make_class(
            "Broken",
            ClassDef::new().int_hook(|_rt, _frame, args| {
                args.check_zero_args("__int__")?;
                Ok(Value::Str("42".to_string()))
            }),
            &[],
        )
        .unwrap();
    let b = rt.construct(broken, ArgValues::Empty).unwrap();
    let err = rt.int_of(&b).unwrap_err();
    assert!(err.is_exception_type(ExcType::TypeError));
}

#[test]
fn instance_without_int_hook_has_no_integer_coercion() {
    let mut rt = Runtime::new();
    let empty = rt.make_class("Empty", ClassDef::new(), &[]).unwrap();
    let e = rt.construct(empty, ArgValues::Empty).unwrap();
    let err = rt.int_of(&e).unwrap_err();
    assert!(err.is_exception_type(ExcType::TypeError));
    assert!(err.to_string().contains("'Empty'"));
}

#[test]
fn immediates_convert_to_integers_natively() {
    let mut rt = Runtime::new();
    assert_eq!(rt.int_of(&Value::Bool(true)).unwrap(), 1);
    assert_eq!(rt.int_of(&Value::Int(-5)).unwrap(), -5);
    assert_eq!(rt.int_of(&Value::Float(3.9)).unwrap(), 3);
    assert_eq!(rt.int_of(&Value::Str(" 17 ".to_string())).unwrap(), 17);
}

#[test]
fn bad_integer_literals_are_value_errors() {
    let mut rt = Runtime::new();
    let err = rt.int_of(&Value::Str("seventeen".to_string())).unwrap_err();
    assert!(err.is_exception_type(ExcType::ValueError));
    let err = rt.int_of(&Value::Float(f64::NAN)).unwrap_err();
    assert!(err.is_exception_type(ExcType::ValueError));
    let err = rt.int_of(&Value::Float(f64::INFINITY)).unwrap_err();
    assert!(err.is_exception_type(ExcType::OverflowError));
}

#[test]
fn plain_values_stringify_without_quotes_and_repr_with_them() {
    let mut rt = Runtime::new();
    assert_eq!(rt.str_of(&Value::Str("a\"b".to_string())).unwrap(), "a\"b");
    assert_eq!(rt.repr_of(&Value::Str("a\"b".to_string())), "\"a\\\"b\"");
    assert_eq!(rt.str_of(&Value::Int(7)).unwrap(), "7");
    assert_eq!(rt.str_of(&Value::None).unwrap(), "None");
    assert_eq!(rt.str_of(&Value::Bool(true)).unwrap(), "true");
}

#[test]
fn self_referential_fields_render_as_ellipsis() {
    let mut rt = Runtime::new();
    let holder = rt.make_class("Holder", ClassDef::new(), &[]).unwrap();
    let h = rt.construct(holder, ArgValues::Empty).unwrap();
    rt.set_attr(&h, "me", h.clone()).unwrap();
    assert_eq!(rt.str_of(&h).unwrap(), "Holder({ me: ... })");
}

#[test]
fn class_records_render_as_class_markers() {
    let mut rt = Runtime::new();
    let point = rt.make_class("Point", ClassDef::new(), &[]).unwrap();
    assert_eq!(rt.repr_of(&Value::Ref(point)), "<class 'Point'>");
}

#[test]
fn coercion_does_not_disturb_identity_or_fields() {
    let mut rt = Runtime::new();
    let point = rt
        .make_class(
            "Point",
            ClassDef::new().init(|rt, frame, args| {
                let x = args.get_one_arg("__init__")?;
                rt.set_attr(&frame.this, "x", x)?;
                Ok(Value::None)
            }),
            &[],
        )
        .unwrap();
    let p = rt.construct(point, ArgValues::One(Value::Int(9))).unwrap();
    let before = p.clone();
    let _ = rt.str_of(&p).unwrap();
    assert_eq!(p, before);
    assert_eq!(rt.get_attr(&p, "x").unwrap(), Value::Int(9));
}
