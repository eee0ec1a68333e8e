//! Integration tests for the object mapper
//!
//! Schema-described Rust structs and catalog-described records are loaded
//! from JSON documents and saved back.


use shapeshift_core::{ConversionBus, Error, Instance, Record, TypeDescriptor, Value};
use test_support::{contacts_bus, json, json_map, vehicle_catalog, Address, Contact};

// ============================================================================
// SCHEMA TESTS
// ============================================================================

#[test]
fn test_contact_round_trip() {
    let bus = contacts_bus();
    let mapper = bus
        .mappers()
        .typed::<Contact>(&TypeDescriptor::object("Contact"))
        .unwrap();

    let source = json_map(
        r#"{
            "name": "Grace",
            "age": "85",
            "address": {"street": "1 Main St", "zip": 12345},
            "emails": ["g@example.com"]
        }"#,
    );
    let contact = mapper.load(&source, &bus).unwrap();
    assert_eq!(
        contact,
        Contact {
            name: "Grace".to_string(),
            age: 85,
            address: Address {
                street: "1 Main St".to_string(),
                zip: Some("12345".to_string()),
            },
            emails: vec!["g@example.com".to_string()],
        }
    );

    let saved = mapper.save(contact, &bus).unwrap();
    assert_eq!(
        Value::Map(saved).to_json().unwrap(),
        serde_json::json!({
            "name": "Grace",
            "age": 85,
            "address": {"street": "1 Main St", "zip": "12345"},
            "emails": ["g@example.com"]
        })
    );
}

#[test]
fn test_list_of_objects_through_the_registry() {
    let bus = contacts_bus();
    let target: TypeDescriptor = "List<Contact>".parse().unwrap();
    let source = json(r#"[{"name": "A"}, {"name": "B", "age": 3.0}]"#);

    let converted = bus.convert(&source, &target).unwrap();
    let names: Vec<_> = converted
        .as_slice()
        .unwrap()
        .iter()
        .map(|v| v.as_instance().unwrap().downcast_ref::<Contact>().unwrap().clone())
        .map(|c| (c.name, c.age))
        .collect();
    assert_eq!(names, [("A".to_string(), 0), ("B".to_string(), 3)]);
}

#[test]
fn test_nested_field_failure_is_fatal() {
    let bus = contacts_bus();
    let source = json(r#"{"name": "Z", "address": {"street": ["not", "text"]}}"#);

    let err = bus
        .convert(&source, &TypeDescriptor::object("Contact"))
        .unwrap_err();
    assert!(err.is_conversion_failure());
    assert!(err.to_string().contains("field 'address' could not be converted"), "{}", err);
}

#[test]
fn test_validation_failure_is_fatal() {
    let bus = contacts_bus();
    let err = bus
        .convert(&json(r#"{"age": 300}"#), &TypeDescriptor::object("Contact"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "age"));
}

#[test]
fn test_field_type_without_converter() {
    let bus = ConversionBus::builder()
        .discoverer(
            shapeshift_core::SchemaDiscoverer::new()
                .with(test_support::address_schema())
                .unwrap(),
        )
        .build();

    let mapper = bus.mappers().get(&TypeDescriptor::object("Address")).unwrap();
    let err = mapper
        .load(&json_map(r#"{"street": "x"}"#), &bus)
        .unwrap_err();
    assert!(err.to_string().contains("No converter found for field street"), "{}", err);
}

// ============================================================================
// CATALOG TESTS
// ============================================================================

fn fleet_bus() -> (ConversionBus, TypeDescriptor) {
    let catalog = vehicle_catalog();
    let bus = catalog
        .install(ConversionBus::builder().with_defaults())
        .unwrap()
        .build();
    let fleet = catalog.parse_type("Fleet").unwrap();
    (bus, fleet)
}

fn record(value: &Value) -> &Record {
    value
        .as_instance()
        .and_then(Instance::downcast_ref::<Record>)
        .expect("record instance")
}

#[test]
fn test_polymorphic_map_values() {
    let (bus, fleet) = fleet_bus();
    let source = json(
        r#"{
            "owner": "ACME",
            "vehicles": {
                "van": {"__class__": "Car", "seats": "0x8", "fuel": "diesel"},
                "rig": {"__class__": "Truck", "payload": 40000, "axles": ["2", 3]}
            }
        }"#,
    );

    let converted = bus.convert(&source, &fleet).unwrap();
    let fleet_record = record(&converted);
    assert_eq!(fleet_record.get("owner"), Some(&Value::from("ACME")));

    let vehicles = fleet_record.get("vehicles").unwrap().as_map().unwrap();
    let van = record(vehicles.get_str("van").unwrap());
    assert_eq!(van.type_name(), "Car");
    assert_eq!(van.get("seats"), Some(&Value::I8(8)));
    let rig = record(vehicles.get_str("rig").unwrap());
    assert_eq!(rig.get("axles"), Some(&Value::list([Value::I16(2), Value::I16(3)])));

    let written = bus.serialize(&converted, &fleet).unwrap();
    assert_eq!(
        written.to_json().unwrap(),
        serde_json::json!({
            "owner": "ACME",
            "vehicles": {
                "van": {"__class__": "Car", "seats": 8, "fuel": "DIESEL"},
                "rig": {"__class__": "Truck", "payload": 40000, "axles": [2, 3]}
            }
        })
    );
}

#[test]
fn test_discriminator_must_name_an_implementation() {
    let (bus, fleet) = fleet_bus();
    let source = json(r#"{"vehicles": {"x": {"__class__": "Fleet"}}}"#);

    let err = bus.convert(&source, &fleet).unwrap_err();
    let mut chain = Vec::new();
    let mut current: Option<&dyn std::error::Error> = Some(&err);
    while let Some(e) = current {
        chain.push(e.to_string());
        current = e.source();
    }
    assert!(
        chain.iter().any(|m| m.contains("Configured type Fleet does not extend Vehicle")),
        "{:?}",
        chain
    );
}

#[test]
fn test_records_missing_fields_are_absent() {
    let (bus, fleet) = fleet_bus();
    let converted = bus.convert(&json(r#"{"owner": null}"#), &fleet).unwrap();
    let fleet_record = record(&converted);
    assert!(fleet_record.fields().is_empty());

    // absent fields are written as null
    let written = bus.serialize(&converted, &fleet).unwrap();
    assert_eq!(
        written.to_json().unwrap(),
        serde_json::json!({"owner": null, "vehicles": null})
    );
}

#[test]
fn test_interface_write_needs_known_runtime_type() {
    let (bus, _) = fleet_bus();
    let stray = Value::Object(Instance::new(TypeDescriptor::object("Boat"), Record::new("Boat")));

    let err = bus
        .serialize(&stray, &TypeDescriptor::interface("Vehicle"))
        .unwrap_err();
    assert!(err.to_string().contains("Could not find factory for type Boat"));
}
