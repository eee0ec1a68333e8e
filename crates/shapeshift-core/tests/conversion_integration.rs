//! Integration tests for registry resolution and value conversion
//!
//! Covers the documented behaviors end to end:
//! - Numeric range, precision and literal grammar
//! - Enum fuzzy matching
//! - Structural conversion of collections and maps
//! - Registration order and parent fallback


use shapeshift_core::convert::{DoubleConverter, NumberConverter};
use shapeshift_core::{
    ConversionBus, Converter, EnumConstant, Error, Result, TypeDescriptor, Value,
};
use std::sync::Arc;
use test_support::{bus, json, ordinal_enum, ty};

// ============================================================================
// NUMERIC TESTS
// ============================================================================

#[test]
fn test_int_range_boundary() {
    let bus = bus();
    assert_eq!(
        bus.convert(&Value::I64(2147483647), &ty("int")).unwrap(),
        Value::I32(i32::MAX)
    );

    let err = bus.convert(&Value::I64(2147483648), &ty("int")).unwrap_err();
    assert!(err.is_conversion_failure());
    assert!(
        err.to_string().contains("[-2147483648,2147483647]"),
        "{}",
        err
    );
}

#[test]
fn test_float_precision() {
    let bus = bus();
    assert!(bus.convert(&Value::F64(13.4e129), &ty("float")).is_err());
    assert_eq!(
        bus.convert(&Value::I32(448), &ty("float")).unwrap(),
        Value::F32(448.0)
    );
}

#[test]
fn test_radix_literals_agree() {
    let bus = bus();
    for literal in ["0x2E9FA0D", "0b10111010011111101000001101", "#2e9fa0d", "48888333i"] {
        assert_eq!(
            bus.convert(&Value::from(literal), &ty("int")).unwrap(),
            Value::I32(48888333),
            "{}",
            literal
        );
    }
}

#[test]
fn test_unsigned_literals_wrap_into_signed_kinds() {
    let bus = bus();
    assert_eq!(bus.convert(&Value::from("255u"), &ty("byte")).unwrap(), Value::I8(-1));
    // only the suffix of the target kind is recognized
    assert!(bus.convert(&Value::from("0xFFFFub"), &ty("short")).is_err());
    assert_eq!(bus.convert(&Value::from("0xFFFFus"), &ty("short")).unwrap(), Value::I16(-1));
    assert!(bus.convert(&Value::from("-1u"), &ty("int")).is_err());
}

#[test]
fn test_float_to_integer_requires_integral_values() {
    let bus = bus();
    assert_eq!(bus.convert(&Value::F64(-3.0), &ty("long")).unwrap(), Value::I64(-3));
    let err = bus.convert(&Value::F64(2.5), &ty("long")).unwrap_err();
    assert!(err.to_string().contains("loss of precision"), "{}", err);
}

#[test]
fn test_big_integers() {
    let bus = bus();
    let huge = "170141183460469231731687303715884105727";
    assert_eq!(
        bus.convert(&Value::from(huge), &ty("biginteger")).unwrap(),
        Value::BigInt(i128::MAX)
    );
    assert!(bus.convert(&Value::BigInt(1 << 70), &ty("long")).is_err());
    assert_eq!(
        bus.convert(&Value::from("99999999999"), &ty("number")).unwrap(),
        Value::I64(99_999_999_999)
    );
}

// ============================================================================
// ENUM TESTS
// ============================================================================

#[test]
fn test_enum_fuzzy_matching() {
    let bus = bus();
    let ordinal = ordinal_enum();
    let target = TypeDescriptor::enumeration(ordinal.clone());
    let constant = |name: &str| Value::Enum(EnumConstant::by_name(&ordinal, name).unwrap());

    assert_eq!(bus.convert(&Value::from("sEcOnD"), &target).unwrap(), constant("SECOND"));
    assert_eq!(bus.convert(&Value::from("third"), &target).unwrap(), constant("third"));
    assert_eq!(bus.convert(&Value::from("THIRD"), &target).unwrap(), constant("third"));
    assert_eq!(bus.convert(&Value::from("fourth"), &target).unwrap(), constant("fourth"));
    assert_eq!(bus.convert(&Value::from("FOURTH"), &target).unwrap(), constant("FOURTH"));

    let err = bus.convert(&Value::from("3rd"), &target).unwrap_err();
    assert!(matches!(err, Error::CoercionFailed { .. }));
}

// ============================================================================
// STRUCTURAL TESTS
// ============================================================================

#[test]
fn test_recursive_map_conversion() {
    let bus = bus();
    let source = json(r#"{"fish": 5, "bugs": "124880", "time": "-1"}"#);
    let converted = bus.convert(&source, &ty("Map<String, Integer>")).unwrap();

    assert_eq!(converted.to_string(), "{fish=5, bugs=124880, time=-1}");
    assert_eq!(
        converted.to_json().unwrap(),
        serde_json::json!({"fish": 5, "bugs": 124880, "time": -1})
    );
}

#[test]
fn test_deeply_nested_structures() {
    let bus = bus();
    let target = ty("Map<string, List<Set<short>>>");
    let source = json(r#"{"a": [["1", 1, "0x1"], "2"], "b": []}"#);

    let converted = bus.convert(&source, &target).unwrap();
    assert_eq!(converted.to_string(), "{a=[[1], [2]], b=[]}");
}

#[test]
fn test_first_failure_aborts_the_whole_conversion() {
    let bus = bus();
    let source = json(r#"{"ok": ["1"], "bad": ["2", "two"]}"#);
    let err = bus.convert(&source, &ty("Map<string, List<int>>")).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("value of key bad could not be converted"), "{}", message);
}

#[test]
fn test_raw_types_are_rejected_at_construction() {
    let bus = bus();
    for raw in ["List", "Set", "Map", "Array"] {
        let err = bus.get_for(&ty(raw)).unwrap_err();
        assert!(err.to_string().contains("Raw types"), "{}: {}", raw, err);
    }
}

// ============================================================================
// REGISTRY TESTS
// ============================================================================

/// Marks which registration produced a converter
#[derive(Debug)]
struct Tagged(&'static str);

impl Converter for Tagged {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        Ok(value.clone())
    }

    fn name(&self) -> &str {
        self.0
    }
}

#[test]
fn test_first_registration_wins() {
    let bus = ConversionBus::builder()
        .register_exact(TypeDescriptor::number(), |_, _, _| Ok(Arc::new(Tagged("first"))))
        .register_assignable(TypeDescriptor::number(), |_, _, _| Ok(Arc::new(Tagged("second"))))
        .build();

    let converter = bus
        .get(&TypeDescriptor::string(), &TypeDescriptor::number())
        .unwrap();
    assert_eq!(converter.name(), "first");
}

#[test]
fn test_parent_fallback_and_child_precedence() {
    let parent = ConversionBus::builder()
        .register_converter(TypeDescriptor::number(), NumberConverter)
        .register_converter(TypeDescriptor::f64(), DoubleConverter)
        .build();
    let child = ConversionBus::child_builder(&parent)
        .register_exact(TypeDescriptor::f64(), |_, _, _| Ok(Arc::new(Tagged("child"))))
        .build();

    let from_parent = child.get_for(&TypeDescriptor::number()).unwrap();
    assert!(Arc::ptr_eq(&from_parent, &parent.get_for(&TypeDescriptor::number()).unwrap()));
    assert_eq!(child.get_for(&TypeDescriptor::f64()).unwrap().name(), "child");
    assert_eq!(parent.get_for(&TypeDescriptor::f64()).unwrap().name(), "double");
}

#[test]
fn test_try_convert_at_the_outermost_call() {
    let bus = bus();
    let parsed = bus
        .try_convert(&json(r#"["1", "x"]"#), &ty("List<int>"))
        .unwrap_or(Value::List(Vec::new()));
    assert_eq!(parsed, Value::List(Vec::new()));
}
