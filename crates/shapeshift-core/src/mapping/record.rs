//! Runtime-described record types
//!
//! Records are objects whose layout is only known at runtime (loaded from a
//! [`TypeCatalog`](super::TypeCatalog) for example). Their instances are
//! [`Record`]s: the type name plus an ordered map of field values.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::discovery::{Discovery, FieldDiscoverer, InstanceFactory, Intermediate};
use super::field::FieldInfo;
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind, TypeResolver};
use crate::value::{Instance, Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Instance payload of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: ValueMap,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: ValueMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get_str(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field, value);
    }

    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }
}

/// Declared field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    /// Type expression, e.g. `List<Address>`
    #[serde(rename = "type")]
    pub type_expr: String,
}

/// Serializable description of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<RecordField>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            type_expr: type_expr.into(),
        });
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }
}

#[derive(Debug)]
struct RecordType {
    type_descriptor: TypeDescriptor,
    fields: Vec<FieldInfo>,
    interfaces: Vec<TypeDescriptor>,
}

impl RecordType {
    fn name(&self) -> &str {
        self.type_descriptor.name().unwrap_or_default()
    }

    fn apply(&self, record: &mut Record, intermediate: Intermediate) -> Result<()> {
        for (index, value) in intermediate.into_assignments() {
            let field = self.fields.get(index).ok_or_else(|| {
                Error::configuration(format!("{} has no field #{}", self.type_descriptor, index))
            })?;
            field.set(record, value)?;
        }
        Ok(())
    }
}

impl InstanceFactory for RecordType {
    fn complete(&self, intermediate: Intermediate) -> Result<Instance> {
        let mut record = Record::new(self.name());
        self.apply(&mut record, intermediate)?;
        Ok(Instance::new(self.type_descriptor.clone(), record))
    }

    fn complete_into(&self, instance: &mut Instance, intermediate: Intermediate) -> Result<()> {
        let actual = instance.type_descriptor().clone();
        let record = instance
            .data_mut()
            .and_then(|data| data.downcast_mut::<Record>())
            .ok_or_else(|| {
                Error::conversion_failed(
                    &actual,
                    &self.type_descriptor,
                    "instance is not an unshared record",
                )
            })?;
        self.apply(record, intermediate)
    }
}

fn record_field(name: &str, field_type: TypeDescriptor) -> FieldInfo {
    let read_name = name.to_string();
    let write_name = name.to_string();
    FieldInfo::new(
        name,
        field_type,
        Arc::new(move |instance: &dyn Any| -> Result<Value> {
            let record = instance
                .downcast_ref::<Record>()
                .ok_or_else(|| Error::configuration("instance is not a record"))?;
            Ok(record.get(&read_name).cloned().unwrap_or(Value::Null))
        }),
        Arc::new(move |target: &mut dyn Any, value: Value| -> Result<()> {
            let record = target
                .downcast_mut::<Record>()
                .ok_or_else(|| Error::configuration("instance is not a record"))?;
            record.set(&write_name, value);
            Ok(())
        }),
    )
}

/// Discoverer serving [`RecordSchema`]s
#[derive(Debug, Clone, Default)]
pub struct RecordDiscoverer {
    types: HashMap<String, Arc<RecordType>>,
}

impl RecordDiscoverer {
    /// Compile `schemas`, resolving field type names through `resolver`
    pub fn new<I>(schemas: I, resolver: &dyn TypeResolver) -> Result<Self>
    where
        I: IntoIterator<Item = RecordSchema>,
    {
        let mut types = HashMap::new();
        for schema in schemas {
            if types.contains_key(&schema.name) {
                return Err(Error::configuration(format!(
                    "record {} is declared twice",
                    schema.name
                )));
            }

            let mut fields: Vec<FieldInfo> = Vec::with_capacity(schema.fields.len());
            for field in &schema.fields {
                if fields.iter().any(|f| f.name() == field.name) {
                    return Err(Error::configuration(format!(
                        "field '{}' is declared twice on record {}",
                        field.name, schema.name
                    )));
                }
                let field_type = TypeDescriptor::parse_with(&field.type_expr, resolver)?;
                fields.push(record_field(&field.name, field_type));
            }

            let record = RecordType {
                type_descriptor: TypeDescriptor::object(schema.name.clone()),
                fields,
                interfaces: schema
                    .implements
                    .iter()
                    .map(TypeDescriptor::interface)
                    .collect(),
            };
            types.insert(schema.name, Arc::new(record));
        }
        Ok(Self { types })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FieldDiscoverer for RecordDiscoverer {
    fn discover(&self, ty: &TypeDescriptor) -> Result<Option<Discovery>> {
        let TypeKind::Object(Some(name)) = ty.kind() else {
            return Ok(None);
        };
        Ok(self.types.get(&**name).map(|record| Discovery {
            fields: record.fields.clone(),
            factory: record.clone(),
        }))
    }

    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.types
            .get(name)
            .map(|record| record.type_descriptor.clone())
    }

    fn is_subtype(&self, concrete: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
        concrete
            .name()
            .and_then(|name| self.types.get(name))
            .is_some_and(|record| record.interfaces.contains(declared))
    }
}
