//! Map converter
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{Value, ValueMap};
use std::sync::Arc;

/// Converts keys and values of a map, preserving insertion order
#[derive(Debug)]
pub struct MapConverter {
    target: TypeDescriptor,
    key: Arc<dyn Converter>,
    value: Arc<dyn Converter>,
    name: String,
}

impl MapConverter {
    /// Resolve the key and value converters once for `target`
    pub fn new(target: &TypeDescriptor, bus: &ConversionBus) -> Result<Self> {
        let target = target.resolve_wildcard();
        if *target.kind() != TypeKind::Map {
            return Err(Error::conversion_failed(&target, &target, "not a map type"));
        }
        let [key_type, value_type] = target.type_args() else {
            return Err(Error::conversion_failed(
                &target,
                &target,
                "Raw types are not supported for maps",
            ));
        };

        let key = bus.get_for(&key_type.resolve_wildcard())?;
        let value = bus.get_for(&value_type.resolve_wildcard())?;
        Ok(Self {
            name: target.to_string(),
            target,
            key,
            value,
        })
    }

    fn each<K, V>(&self, source: &Value, map: &ValueMap, key_op: K, value_op: V) -> Result<Value>
    where
        K: Fn(&Value) -> Result<Value>,
        V: Fn(&Value) -> Result<Value>,
    {
        let mut converted = ValueMap::with_capacity(map.len());
        for (k, v) in map.iter() {
            let key = key_op(k).map_err(|cause| {
                Error::conversion_failed_with(
                    source,
                    &self.target,
                    format!("key {} could not be converted", k),
                    cause,
                )
            })?;
            let value = if v.is_null() {
                Value::Null
            } else {
                value_op(v).map_err(|cause| {
                    Error::conversion_failed_with(
                        source,
                        &self.target,
                        format!("value of key {} could not be converted", k),
                        cause,
                    )
                })?
            };
            converted.insert(key, value);
        }
        Ok(Value::Map(converted))
    }
}

impl Converter for MapConverter {
    fn read(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Map(map) => self.each(
                value,
                map,
                |k| self.key.read(k, bus),
                |v| self.value.read(v, bus),
            ),
            other => Err(Error::conversion_failed(
                other,
                &self.target,
                format!("expected a map, found {}", other.kind_name()),
            )),
        }
    }

    fn write(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Map(map) => self.each(
                value,
                map,
                |k| self.key.write(k, bus),
                |v| self.value.write(v, bus),
            ),
            other => Err(Error::conversion_failed(
                other,
                &self.target,
                format!("expected a map, found {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
