//! Converters
//!
//! A [`Converter`] reads a raw value into the shape of its target type and
//! writes a typed value back to a raw representation. Scalar converters are
//! stateless; structural converters hold the element converters they
//! resolved at construction.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod collection;
mod enums;
mod map;
mod numeric;
mod object;
mod scalar;


pub use collection::CollectionConverter;
pub use enums::{EnumConverter, EnumLookup};
pub use map::MapConverter;
pub use numeric::{
    fits_f32, parse_integer_literal, to_f32, to_f64, to_integer, to_number, DoubleConverter,
    FloatConverter, IntKind, IntegerConverter, NumberConverter, EPSILON,
};
pub use object::{ObjectConverter, CLASS_KEY};
pub use scalar::{
    BooleanConverter, CharConverter, IdentityConverter, PathConverter, StringConverter,
    UrlConverter, UuidConverter,
};

use crate::bus::ConversionBus;
use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// Reads raw values into a target shape and writes them back
///
/// `bus` is the registry the conversion runs under. Converters that need
/// further converters at call time (object fields) resolve them through it,
/// and every converter passes it on to the converters it delegates to.
pub trait Converter: Send + Sync + fmt::Debug {
    fn read(&self, value: &Value, bus: &ConversionBus) -> Result<Value>;

    fn write(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        let _ = bus;
        Ok(value.clone())
    }

    /// Short name used in diagnostics
    fn name(&self) -> &str;
}
