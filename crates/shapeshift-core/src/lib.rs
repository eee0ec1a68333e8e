//! Shapeshift Core - Type-directed conversion of dynamic values
//!
//! This crate converts already-decoded values (numbers, text, lists, maps and
//! so on) into the shape a declared target type asks for, and writes typed
//! values back to their raw representation.
//!
//! # Main Components
//!
//! - **Type descriptors**: structural, hashable descriptions of target types
//!   with a small parser for type expressions such as `Map<string, int[]>`
//! - **Converters**: numeric coercion with range and precision checks, fuzzy
//!   enum matching, and list/set/map converters built on element converters
//! - **Conversion bus**: an ordered, cached registry mapping type pairs to
//!   converters, with parent fallback for layered registries
//! - **Object mapping**: loads objects from maps of raw field values through
//!   pluggable field discoverers, with validation and polymorphic interfaces
//!
//! # Example
//!
//! ```
//! use shapeshift_core::{default_registry, Result, TypeDescriptor, Value};
//!
//! fn example() -> Result<()> {
//!     let bus = default_registry();
//!     let target: TypeDescriptor = "Map<string, List<int>>".parse()?;
//!     let raw = Value::from_json_str(r#"{"a": ["1", 2.0], "b": "0x10"}"#)?;
//!     let converted = bus.convert(&raw, &target)?;
//!     assert_eq!(converted.to_string(), "{a=[1, 2], b=[16]}");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

pub mod bus;
pub mod convert;
pub mod error;
pub mod mapping;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use types::{EnumDescriptor, TypeDescriptor, TypeKind, TypeResolver};
pub use value::{EnumConstant, FromValue, Instance, IntoValue, Value, ValueMap};

pub use bus::{default_registry, ConversionBus, ConversionBusBuilder, MatchOutcome};
pub use convert::{Converter, CLASS_KEY};

pub use mapping::{
    // Discovery
    Discovery, FieldDiscoverer, InstanceFactory, Intermediate,

    // Schemas
    ObjectSchema, ObjectSchemaBuilder, SchemaDiscoverer,
    Record, RecordDiscoverer, RecordField, RecordSchema,
    TypeCatalog, EnumDefinition,

    // Fields and validation
    FieldInfo, FieldValidator,

    // Mappers
    ObjectMapper, ObjectMapperFactory, TypedObjectMapper,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
