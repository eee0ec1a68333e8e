//! List, set and array converters
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{self, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    List,
    Set,
    Array,
}

/// Converts sequences element-wise through one element converter
#[derive(Debug)]
pub struct CollectionConverter {
    target: TypeDescriptor,
    shape: Shape,
    element: Arc<dyn Converter>,
    name: String,
}

impl CollectionConverter {
    /// Resolve the element converter once for `target`
    pub fn new(target: &TypeDescriptor, bus: &ConversionBus) -> Result<Self> {
        let target = target.resolve_wildcard();
        let shape = match target.kind() {
            TypeKind::List => Shape::List,
            TypeKind::Set => Shape::Set,
            TypeKind::Array => Shape::Array,
            _ => {
                return Err(Error::conversion_failed(
                    &target,
                    &target,
                    "not a list, set or array type",
                ))
            }
        };
        let [element_type] = target.type_args() else {
            return Err(Error::conversion_failed(
                &target,
                &target,
                "Raw types are not supported for collections",
            ));
        };

        let element = bus.get_for(&element_type.resolve_wildcard())?;
        Ok(Self {
            name: target.to_string(),
            target,
            shape,
            element,
        })
    }

    fn wrap(&self, items: Vec<Value>) -> Value {
        match self.shape {
            Shape::Set => Value::Set(value::dedupe(items)),
            Shape::List | Shape::Array => Value::List(items),
        }
    }

    fn each<F>(&self, value: &Value, items: &[Value], op: F) -> Result<Value>
    where
        F: Fn(&Value) -> Result<Value>,
    {
        let converted = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if item.is_null() {
                    return Ok(Value::Null);
                }
                op(item).map_err(|cause| {
                    Error::conversion_failed_with(
                        value,
                        &self.target,
                        format!("element {} could not be converted", index),
                        cause,
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.wrap(converted))
    }
}

impl Converter for CollectionConverter {
    fn read(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::List(items) | Value::Set(items) => {
                self.each(value, items, |item| self.element.read(item, bus))
            }
            Value::Map(_) | Value::Object(_) | Value::Null => Err(Error::conversion_failed(
                value,
                &self.target,
                format!("expected a sequence, found {}", value.kind_name()),
            )),
            // a lone scalar becomes a one-element collection
            scalar => self.each(value, std::slice::from_ref(scalar), |item| {
                self.element.read(item, bus)
            }),
        }
    }

    fn write(&self, value: &Value, bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::List(items) | Value::Set(items) => {
                self.each(value, items, |item| self.element.write(item, bus))
            }
            other => Err(Error::conversion_failed(
                other,
                &self.target,
                format!("expected a sequence, found {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
