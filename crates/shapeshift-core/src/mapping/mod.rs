//! Object mapping
//!
//! An [`ObjectMapper`] loads object instances from maps of raw field values
//! and saves them back. How fields are found and instances are built is
//! delegated to [`FieldDiscoverer`]s; the [`ObjectMapperFactory`] asks its
//! discoverers in turn and caches one mapper per concrete type.
//!
//! Loading follows a two-phase protocol: the instance factory hands out an
//! [`Intermediate`], every present source field is converted, validated and
//! recorded on it, and the factory then completes it into the real instance.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod catalog;
mod discovery;
mod field;
mod record;


pub use catalog::{EnumDefinition, TypeCatalog};
pub use discovery::{
    Discovery, FieldDiscoverer, InstanceFactory, Intermediate, ObjectSchema, ObjectSchemaBuilder,
    SchemaDiscoverer,
};
pub use field::{custom, Custom, FieldInfo, FieldValidator, Getter, NotEmpty, Pattern, Range, Setter};
pub use record::{Record, RecordDiscoverer, RecordField, RecordSchema};

use crate::bus::ConversionBus;
use crate::convert::Converter;
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{Instance, Value, ValueMap};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Produces and caches [`ObjectMapper`]s
#[derive(Default)]
pub struct ObjectMapperFactory {
    /// Consulted in order; the most recently added discoverer comes first
    discoverers: Vec<Arc<dyn FieldDiscoverer>>,
    mappers: Mutex<HashMap<TypeDescriptor, Arc<ObjectMapper>>>,
}

impl ObjectMapperFactory {
    pub fn builder() -> ObjectMapperFactoryBuilder {
        ObjectMapperFactoryBuilder::default()
    }

    /// A factory consulting `extra` before this factory's discoverers, with
    /// empty caches
    pub fn extended(&self, extra: Vec<Arc<dyn FieldDiscoverer>>) -> ObjectMapperFactory {
        let mut discoverers: Vec<_> = extra.into_iter().rev().collect();
        discoverers.extend(self.discoverers.iter().cloned());
        ObjectMapperFactory {
            discoverers,
            mappers: Mutex::new(HashMap::new()),
        }
    }

    /// Mapper for a concrete object type
    pub fn get(&self, ty: &TypeDescriptor) -> Result<Arc<ObjectMapper>> {
        if !matches!(ty.kind(), TypeKind::Object(Some(_))) {
            return Err(Error::conversion_failed(
                ty,
                ty,
                "ObjectMapper can only work with concrete types",
            ));
        }

        if let Some(mapper) = self.lock().get(ty) {
            return Ok(mapper.clone());
        }

        for discoverer in &self.discoverers {
            if let Some(discovery) = discoverer.discover(ty)? {
                log::debug!(
                    "Discovered {} field(s) for {}",
                    discovery.fields.len(),
                    ty
                );
                let mapper = Arc::new(ObjectMapper::new(ty.clone(), discovery));
                return Ok(self.lock().entry(ty.clone()).or_insert(mapper).clone());
            }
        }

        Err(Error::conversion_failed(
            ty,
            ty,
            format!("Could not find factory for type {}", ty),
        ))
    }

    /// Typed view over the mapper for `ty`
    pub fn typed<T: Any + Send + Sync + Clone>(&self, ty: &TypeDescriptor) -> Result<TypedObjectMapper<T>> {
        Ok(TypedObjectMapper {
            mapper: self.get(ty)?,
            _marker: PhantomData,
        })
    }

    /// Whether values of `concrete` may stand where `declared` is expected
    pub fn is_subtype(&self, concrete: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
        declared.is_supertype_of(concrete)
            || self
                .discoverers
                .iter()
                .any(|d| d.is_subtype(concrete, declared))
    }

    /// Resolve a discriminator name to a concrete subtype of `declared`
    pub fn resolve_concrete(&self, declared: &TypeDescriptor, name: &str) -> Result<TypeDescriptor> {
        let concrete = self
            .discoverers
            .iter()
            .find_map(|d| d.lookup(name))
            .ok_or_else(|| {
                Error::conversion_failed(
                    name,
                    declared,
                    format!("Unknown class of object {}", name),
                )
            })?;

        if !matches!(concrete.kind(), TypeKind::Object(Some(_))) || !self.is_subtype(&concrete, declared) {
            return Err(Error::conversion_failed(
                name,
                declared,
                format!("Configured type {} does not extend {}", name, declared),
            ));
        }
        Ok(concrete)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TypeDescriptor, Arc<ObjectMapper>>> {
        self.mappers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ObjectMapperFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMapperFactory")
            .field("discoverers", &self.discoverers.len())
            .field("mappers", &self.lock().len())
            .finish()
    }
}

#[derive(Default)]
pub struct ObjectMapperFactoryBuilder {
    discoverers: Vec<Arc<dyn FieldDiscoverer>>,
}

impl ObjectMapperFactoryBuilder {
    /// Add a discoverer; later discoverers take precedence
    pub fn discoverer(mut self, discoverer: impl FieldDiscoverer + 'static) -> Self {
        self.discoverers.push(Arc::new(discoverer));
        self
    }

    pub fn build(self) -> ObjectMapperFactory {
        ObjectMapperFactory::default().extended(self.discoverers)
    }
}

/// Loads and saves instances of one concrete object type
pub struct ObjectMapper {
    type_descriptor: TypeDescriptor,
    fields: Vec<FieldInfo>,
    converters: Vec<OnceLock<Arc<dyn Converter>>>,
    factory: Arc<dyn InstanceFactory>,
}

impl ObjectMapper {
    fn new(type_descriptor: TypeDescriptor, discovery: Discovery) -> Self {
        let converters = discovery.fields.iter().map(|_| OnceLock::new()).collect();
        Self {
            type_descriptor,
            fields: discovery.fields,
            converters,
            factory: discovery.factory,
        }
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Converter for field `index`, resolved on first use
    fn converter(&self, index: usize, bus: &ConversionBus) -> Result<Arc<dyn Converter>> {
        if let Some(converter) = self.converters[index].get() {
            return Ok(converter.clone());
        }
        let field = &self.fields[index];
        let resolved = bus.get_for(field.field_type()).map_err(|cause| {
            Error::conversion_failed_with(
                &self.type_descriptor,
                &self.type_descriptor,
                format!(
                    "No converter found for field {} of type {}",
                    field.name(),
                    field.field_type()
                ),
                cause,
            )
        })?;
        Ok(self.converters[index].get_or_init(|| resolved).clone())
    }

    fn populate(&self, source: &ValueMap, bus: &ConversionBus) -> Result<Intermediate> {
        let mut intermediate = self.factory.begin();
        for (index, field) in self.fields.iter().enumerate() {
            let raw = match source.get_str(field.name()) {
                None | Some(Value::Null) => continue,
                Some(raw) => raw,
            };
            let converted = self.converter(index, bus)?.read(raw, bus).map_err(|cause| {
                Error::conversion_failed_with(
                    raw,
                    format!("{}.{}", self.type_descriptor, field.name()),
                    format!("field '{}' could not be converted", field.name()),
                    cause,
                )
            })?;
            field.validate(&converted)?;
            intermediate.assign(index, converted);
        }
        Ok(intermediate)
    }

    /// Build a new instance from raw field values
    pub fn load(&self, source: &ValueMap, bus: &ConversionBus) -> Result<Instance> {
        let intermediate = self.populate(source, bus)?;
        self.factory.complete(intermediate)
    }

    /// Assign raw field values onto an existing instance
    pub fn load_into(&self, instance: &mut Instance, source: &ValueMap, bus: &ConversionBus) -> Result<()> {
        let intermediate = self.populate(source, bus)?;
        self.factory.complete_into(instance, intermediate)
    }

    /// Write every field of `instance` to its raw representation
    pub fn save(&self, instance: &Instance, bus: &ConversionBus) -> Result<ValueMap> {
        let mut target = ValueMap::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            let value = field.get(instance.data())?;
            if value.is_null() {
                target.insert(field.name(), Value::Null);
                continue;
            }
            let written = self.converter(index, bus)?.write(&value, bus).map_err(|cause| {
                Error::conversion_failed_with(
                    &value,
                    format!("{}.{}", self.type_descriptor, field.name()),
                    format!("field '{}' could not be written", field.name()),
                    cause,
                )
            })?;
            target.insert(field.name(), written);
        }
        Ok(target)
    }
}

impl fmt::Debug for ObjectMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMapper")
            .field("type", &self.type_descriptor)
            .field("fields", &self.fields)
            .finish()
    }
}

/// [`ObjectMapper`] view that hands out `T` instead of [`Instance`]
pub struct TypedObjectMapper<T> {
    mapper: Arc<ObjectMapper>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync + Clone> TypedObjectMapper<T> {
    pub fn mapper(&self) -> &Arc<ObjectMapper> {
        &self.mapper
    }

    pub fn load(&self, source: &ValueMap, bus: &ConversionBus) -> Result<T> {
        let instance = self.mapper.load(source, bus)?;
        instance.take::<T>().ok_or_else(|| {
            Error::configuration(format!(
                "instances of {} are not of the requested Rust type",
                self.mapper.type_descriptor()
            ))
        })
    }

    pub fn save(&self, value: T, bus: &ConversionBus) -> Result<ValueMap> {
        let instance = Instance::new(self.mapper.type_descriptor().clone(), value);
        self.mapper.save(&instance, bus)
    }
}
