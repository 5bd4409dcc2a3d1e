use dynclass::{ArgValues, ClassDef, ExcType, Runtime, SimpleException, UserProperty, Value};
use pretty_assertions::assert_eq;

/// Tests for computed properties: reads through getters, writes through setters.

/// Builds a Temperature class whose `celsius` property stores its backing
/// value doubled, to make the setter's transformation observable.
fn make_temperature(rt: &mut Runtime) -> dynclass::HeapId {
    rt.make_class(
        "Temperature",
        ClassDef::new()
            .init(|rt, frame, args| {
                args.check_zero_args("__init__")?;
                rt.set_attr(&frame.this, "stored", Value::Int(0))?;
                Ok(Value::None)
            })
            .property(
                "celsius",
                UserProperty::new(
                    Some(|rt, frame, args| {
                        args.check_zero_args("celsius")?;
                        rt.get_attr(&frame.this, "stored")
                    }),
                    Some(|rt, frame, args| {
                        let value = args.get_one_arg("celsius")?;
                        let n = rt.int_of(&value)?;
                        if n < -273 {
                            return Err(SimpleException::new_msg(
                                ExcType::ValueError,
                                "temperature below absolute zero",
                            )
                            .into());
                        }
                        rt.set_attr(&frame.this, "stored", Value::Int(n * 2))?;
                        Ok(Value::None)
                    }),
                ),
            ),
        &[],
    )
    .unwrap()
}

#[test]
fn assignment_flows_through_the_setter_and_reads_through_the_getter() {
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let t = rt.construct(temperature, ArgValues::Empty).unwrap();
    rt.set_attr(&t, "celsius", Value::Int(21)).unwrap();
    // The setter doubles the backing value; the getter reports what is stored.
    assert_eq!(rt.get_attr(&t, "celsius").unwrap(), Value::Int(42));
    assert_eq!(rt.get_attr(&t, "stored").unwrap(), Value::Int(42));
}

#[test]
fn setter_validation_errors_propagate() {
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let t = rt.construct(temperature, ArgValues::Empty).unwrap();
    let err = rt.set_attr(&t, "celsius", Value::Int(-300)).unwrap_err();
    assert!(err.is_exception_type(ExcType::ValueError));
    assert!(err.to_string().contains("absolute zero"));
}

#[test]
fn read_only_property_rejects_writes() {
    let mut rt = Runtime::new();
    let circle = rt
        .make_class(
            "Circle",
            ClassDef::new()
                .init(|rt, frame, args| {
                    let r = args.get_one_arg("__init__")?;
                    rt.set_attr(&frame.this, "r", r)?;
                    Ok(Value::None)
                })
                .property(
                    "diameter",
                    UserProperty::readonly(|rt, frame, args| {
                        args.check_zero_args("diameter")?;
                        let r = rt.get_attr(&frame.this, "r")?;
                        let r = rt.int_of(&r)?;
                        Ok(Value::Int(r * 2))
                    }),
                ),
            &[],
        )
        .unwrap();
    let c = rt.construct(circle, ArgValues::One(Value::Int(5))).unwrap();
    assert_eq!(rt.get_attr(&c, "diameter").unwrap(), Value::Int(10));
    let err = rt.set_attr(&c, "diameter", Value::Int(3)).unwrap_err();
    assert!(err.is_exception_type(ExcType::AttributeError));
    assert!(err.to_string().contains("has no setter"));
}

#[test]
fn setter_only_property_rejects_reads() {
    let mut rt = Runtime::new();
    let sink = rt
        .make_class(
            "Sink",
            ClassDef::new().property(
                "input",
                UserProperty::new(
                    None,
                    Some(|rt, frame, args| {
                        let value = args.get_one_arg("input")?;
                        rt.set_attr(&frame.this, "last", value)?;
                        Ok(Value::None)
                    }),
                ),
            ),
            &[],
        )
        .unwrap();
    let s = rt.construct(sink, ArgValues::Empty).unwrap();
    rt.set_attr(&s, "input", Value::Int(9)).unwrap();
    assert_eq!(rt.get_attr(&s, "last").unwrap(), Value::Int(9));
    let err = rt.get_attr(&s, "input").unwrap_err();
    assert!(err.is_exception_type(ExcType::AttributeError));
    assert!(err.to_string().contains("has no getter"));
}

#[test]
fn property_wins_over_instance_fields_with_the_same_name() {
    // Properties are data descriptors: even after the setter stores a field
    // under a different name, reads of the property name keep going through
    // the getter rather than any instance storage.
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let t = rt.construct(temperature, ArgValues::Empty).unwrap();
    rt.set_attr(&t, "celsius", Value::Int(1)).unwrap();
    rt.set_attr(&t, "celsius", Value::Int(2)).unwrap();
    assert_eq!(rt.get_attr(&t, "celsius").unwrap(), Value::Int(4));
}

#[test]
fn properties_are_inherited_through_the_mro() {
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let derived = rt.make_class("Freezer", ClassDef::new(), &[temperature]).unwrap();
    let f = rt.construct(derived, ArgValues::Empty).unwrap();
    rt.set_attr(&f, "celsius", Value::Int(-18)).unwrap();
    assert_eq!(rt.get_attr(&f, "celsius").unwrap(), Value::Int(-36));
}

#[test]
fn class_level_access_returns_the_descriptor() {
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let descriptor = rt.get_attr(&Value::Ref(temperature), "celsius").unwrap();
    assert!(matches!(descriptor, Value::Property(_)));
}

#[test]
fn deleting_a_property_is_an_attribute_error() {
    let mut rt = Runtime::new();
    let temperature = make_temperature(&mut rt);
    let t = rt.construct(temperature, ArgValues::Empty).unwrap();
    let err = rt.del_attr(&t, "celsius").unwrap_err();
    assert!(err.is_exception_type(ExcType::AttributeError));
    assert!(err.to_string().contains("has no deleter"));
}
