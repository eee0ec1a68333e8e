//! Default registrations
//!
//! Narrow predicates come first: exact scalar targets, then the assignable
//! abstract and structural kinds, then the catch-all identity for `any`.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::{ConversionBus, ConversionBusBuilder};
use crate::convert::{
    BooleanConverter, CharConverter, CollectionConverter, Converter, DoubleConverter,
    EnumConverter, FloatConverter, IdentityConverter, IntKind, IntegerConverter, MapConverter,
    NumberConverter, ObjectConverter, PathConverter, StringConverter, UrlConverter, UuidConverter,
};
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use std::sync::Arc;

fn collection(_: &TypeDescriptor, target: &TypeDescriptor, bus: &ConversionBus) -> Result<Arc<dyn Converter>> {
    Ok(Arc::new(CollectionConverter::new(target, bus)?))
}

pub(super) fn register_defaults(builder: ConversionBusBuilder) -> ConversionBusBuilder {
    builder
        // a scalar value already of its target type is returned as-is
        .register_conditional(
            |_, target| target.is_scalar(),
            |source, target| source == target,
            |_, _, _| Ok(Arc::new(IdentityConverter)),
        )
        .register_converter(TypeDescriptor::bool(), BooleanConverter)
        .register_converter(TypeDescriptor::char(), CharConverter)
        .register_converter(TypeDescriptor::string(), StringConverter)
        .register_converter(TypeDescriptor::uuid(), UuidConverter)
        .register_converter(TypeDescriptor::url(), UrlConverter)
        .register_converter(TypeDescriptor::path(), PathConverter)
        .register_converter(TypeDescriptor::i8(), IntegerConverter::new(IntKind::I8))
        .register_converter(TypeDescriptor::i16(), IntegerConverter::new(IntKind::I16))
        .register_converter(TypeDescriptor::i32(), IntegerConverter::new(IntKind::I32))
        .register_converter(TypeDescriptor::i64(), IntegerConverter::new(IntKind::I64))
        .register_converter(TypeDescriptor::big_int(), IntegerConverter::new(IntKind::BigInt))
        .register_converter(TypeDescriptor::f32(), FloatConverter)
        .register_converter(TypeDescriptor::f64(), DoubleConverter)
        .register_assignable(TypeDescriptor::number(), |_, _, _| Ok(Arc::new(NumberConverter)))
        .register_assignable(TypeDescriptor::any_enum(), |_, target, _| {
            match target.resolve_wildcard().kind() {
                TypeKind::Enum(Some(descriptor)) => Ok(Arc::new(EnumConverter::new(descriptor))),
                _ => Err(Error::conversion_failed(
                    target,
                    target,
                    "a concrete enum type is required",
                )),
            }
        })
        .register_assignable(TypeDescriptor::of(TypeKind::Map), |_, target, bus| {
            Ok(Arc::new(MapConverter::new(target, bus)?))
        })
        .register_assignable(TypeDescriptor::of(TypeKind::Set), collection)
        .register_assignable(TypeDescriptor::of(TypeKind::Array), collection)
        .register_assignable(TypeDescriptor::of(TypeKind::List), collection)
        .register_assignable(TypeDescriptor::any_object(), |_, target, _| {
            Ok(Arc::new(ObjectConverter::new(target.resolve_wildcard())))
        })
        .register_converter(TypeDescriptor::any(), IdentityConverter)
}
