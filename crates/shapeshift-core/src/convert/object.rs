//! Object converter
//!
//! Reads maps into object instances through the bus's object mapper factory
//! and writes instances back to maps. Abstract targets (interfaces and the
//! generic object type) need a [`CLASS_KEY`] entry naming the concrete type.
//! A concrete target honors the entry too when it names a subtype, which is
//! what writing a subtype instance under its supertype produces.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{Value, ValueMap};

/// Discriminator key naming the concrete type of an abstract-declared value
pub const CLASS_KEY: &str = "__class__";

#[derive(Debug)]
pub struct ObjectConverter {
    target: TypeDescriptor,
    name: String,
}

impl ObjectConverter {
    pub fn new(target: TypeDescriptor) -> Self {
        Self {
            name: format!("object {}", target),
            target,
        }
    }

    fn is_abstract(&self) -> bool {
        matches!(
            self.target.kind(),
            TypeKind::Interface(_) | TypeKind::Object(None)
        )
    }

    /// Concrete type to instantiate for `source`
    fn instantiable_type(&self, source: &ValueMap, bus: &ConversionBus) -> Result<TypeDescriptor> {
        match source.get_str(CLASS_KEY) {
            None | Some(Value::Null) if !self.is_abstract() => Ok(self.target.clone()),
            None | Some(Value::Null) => Err(Error::conversion_failed(
                &self.target,
                &self.target,
                "No available configured type for instances of this type",
            )),
            Some(Value::String(name)) => bus.mappers().resolve_concrete(&self.target, name),
            Some(other) => Err(Error::conversion_failed(
                other,
                &self.target,
                format!("{} must name a type, found {}", CLASS_KEY, other.kind_name()),
            )),
        }
    }
}

impl Converter for ObjectConverter {
    fn read(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Object(instance) => {
                if bus.mappers().is_subtype(instance.type_descriptor(), &self.target) {
                    Ok(value.clone())
                } else {
                    Err(Error::conversion_failed(
                        value,
                        &self.target,
                        format!("{} is not a {}", instance.type_descriptor(), self.target),
                    ))
                }
            }
            Value::Map(source) => {
                let concrete = self.instantiable_type(source, bus)?;
                let mapper = bus.mappers().get(&concrete)?;
                mapper.load(source, bus).map(Value::Object)
            }
            other => Err(Error::conversion_failed(
                other,
                &self.target,
                "Only map types are supported",
            )),
        }
    }

    fn write(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        let instance = match value {
            Value::Object(instance) => instance,
            Value::Map(_) => return Ok(value.clone()),
            other => {
                return Err(Error::conversion_failed(
                    other,
                    &self.target,
                    format!("expected an object instance, found {}", other.kind_name()),
                ))
            }
        };

        let runtime = instance.type_descriptor();
        if !self.is_abstract() && *runtime == self.target {
            let mapper = bus.mappers().get(&self.target)?;
            return mapper.save(instance, bus).map(Value::Map);
        }

        if !bus.mappers().is_subtype(runtime, &self.target) {
            return Err(Error::conversion_failed(
                value,
                &self.target,
                format!("{} is not a {}", runtime, self.target),
            ));
        }

        // the runtime type decides both the discriminator and the fields
        let class_name = runtime.name().ok_or_else(|| {
            Error::conversion_failed(value, &self.target, "instance type has no name")
        })?;
        let mapper = bus.mappers().get(runtime)?;
        let mut map = ValueMap::with_capacity(mapper.fields().len() + 1);
        map.insert(CLASS_KEY, class_name);
        for (k, v) in mapper.save(instance, bus)? {
            map.insert(k, v);
        }
        Ok(Value::Map(map))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
