//! Type catalog documents
//!
//! A [`TypeCatalog`] declares enums, interfaces and record types in a
//! serde-friendly shape so they can be shipped as configuration. Catalog
//! names resolve in type expressions, and installing a catalog on a bus
//! builder makes its records mappable.
//!
//! ```json
//! {
//!   "enums": [{ "name": "Color", "constants": ["RED", "GREEN"] }],
//!   "interfaces": ["Shape"],
//!   "records": [
//!     { "name": "Circle", "implements": ["Shape"],
//!       "fields": [{ "name": "radius", "type": "double" },
//!                  { "name": "color", "type": "Color" }] }
//!   ]
//! }
//! ```
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::record::{RecordDiscoverer, RecordSchema};
use crate::bus::ConversionBusBuilder;
use crate::error::{Error, Result};
use crate::types::{EnumDescriptor, TypeDescriptor, TypeResolver};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Enum declared in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub constants: Vec<String>,
}

impl EnumDefinition {
    pub fn descriptor(&self) -> EnumDescriptor {
        EnumDescriptor::new(self.name.clone(), self.constants.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCatalog {
    pub enums: Vec<EnumDefinition>,
    pub interfaces: Vec<String>,
    pub records: Vec<RecordSchema>,
}

impl TypeCatalog {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let catalog: TypeCatalog = serde_json::from_str(input)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check names are unique and every implemented interface is declared
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let declared = self
            .enums
            .iter()
            .map(|e| &e.name)
            .chain(&self.interfaces)
            .chain(self.records.iter().map(|r| &r.name));
        for name in declared {
            if !names.insert(name.as_str()) {
                return Err(Error::configuration(format!(
                    "type {} is declared more than once in the catalog",
                    name
                )));
            }
        }

        for definition in &self.enums {
            let mut constants = HashSet::new();
            if let Some(duplicate) = definition.constants.iter().find(|c| !constants.insert(c.as_str())) {
                return Err(Error::configuration(format!(
                    "enum {} declares {} twice",
                    definition.name, duplicate
                )));
            }
        }

        for record in &self.records {
            if let Some(unknown) = record.implements.iter().find(|i| !self.interfaces.contains(i)) {
                return Err(Error::configuration(format!(
                    "record {} implements undeclared interface {}",
                    record.name, unknown
                )));
            }
        }
        Ok(())
    }

    /// Descriptor for a catalog type name
    pub fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        if let Some(definition) = self.enums.iter().find(|e| e.name == name) {
            return Some(TypeDescriptor::enumeration(definition.descriptor()));
        }
        if self.interfaces.iter().any(|i| i == name) {
            return Some(TypeDescriptor::interface(name));
        }
        self.records
            .iter()
            .any(|r| r.name == name)
            .then(|| TypeDescriptor::object(name))
    }

    /// Parse a type expression that may name catalog types
    pub fn parse_type(&self, expr: &str) -> Result<TypeDescriptor> {
        TypeDescriptor::parse_with(expr, self)
    }

    pub fn discoverer(&self) -> Result<RecordDiscoverer> {
        self.validate()?;
        RecordDiscoverer::new(self.records.iter().cloned(), self)
    }

    /// Make the catalog's records mappable by buses built from `builder`
    pub fn install(&self, builder: ConversionBusBuilder) -> Result<ConversionBusBuilder> {
        let discoverer = self.discoverer()?;
        log::debug!(
            "Installing type catalog with {} record(s) and {} enum(s)",
            discoverer.len(),
            self.enums.len()
        );
        Ok(builder.discoverer(discoverer))
    }
}

impl TypeResolver for TypeCatalog {
    fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        TypeCatalog::resolve(self, name)
    }
}
