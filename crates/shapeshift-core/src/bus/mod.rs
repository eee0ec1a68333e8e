//! Converter registry (conversion bus)
//!
//! A [`ConversionBus`] resolves a `(source, target)` type pair to a
//! [`Converter`] by scanning its registrations in registration order; the
//! first match wins. Results, including "not found", are memoized in a
//! concurrent cache for the lifetime of the bus. A bus built from a parent
//! delegates to it when none of its own registrations match.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod defaults;
mod registration;


pub use registration::{assignable, exact, ConverterFactory, MatchOutcome, Predicate};

use crate::convert::Converter;
use crate::error::{Error, Result};
use crate::mapping::{FieldDiscoverer, ObjectMapperFactory};
use crate::types::TypeDescriptor;
use crate::value::Value;
use dashmap::DashMap;
use registration::{Registration, SharedConverter};
use std::fmt;
use std::sync::Arc;

type CacheKey = (TypeDescriptor, TypeDescriptor);

struct BusInner {
    registrations: Vec<Registration>,
    cache: DashMap<CacheKey, Option<Arc<dyn Converter>>>,
    parent: Option<ConversionBus>,
    mappers: Arc<ObjectMapperFactory>,
}

/// Immutable converter registry; cloning yields another handle to the same bus
#[derive(Clone)]
pub struct ConversionBus {
    inner: Arc<BusInner>,
}

impl ConversionBus {
    /// Start an empty registry
    pub fn builder() -> ConversionBusBuilder {
        ConversionBusBuilder::new(None)
    }

    /// Start a registry that falls back to `parent`
    pub fn child_builder(parent: &ConversionBus) -> ConversionBusBuilder {
        ConversionBusBuilder::new(Some(parent.clone()))
    }

    /// Resolve the converter for a type pair
    pub fn get(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> Result<Arc<dyn Converter>> {
        let key = (source.clone(), target.clone());
        if let Some(cached) = self.inner.cache.get(&key) {
            return cached
                .value()
                .clone()
                .ok_or_else(|| Error::not_found(source, target));
        }

        log::debug!("Converter cache miss for {} -> {}", source, target);
        let resolved = self.resolve(source, target)?;
        let entry = self.inner.cache.entry(key).or_insert(resolved).value().clone();
        entry.ok_or_else(|| Error::not_found(source, target))
    }

    /// Resolve the converter for `target` from an unknown source type
    pub fn get_for(&self, target: &TypeDescriptor) -> Result<Arc<dyn Converter>> {
        self.get(&TypeDescriptor::any(), target)
    }

    /// Convert `value` into `target`; `Null` passes through unchanged
    pub fn convert(&self, value: &Value, target: &TypeDescriptor) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.get(&value.type_descriptor(), target)?.read(value, self)
    }

    /// Write `value` back to its raw representation as seen through `declared`
    pub fn serialize(&self, value: &Value, declared: &TypeDescriptor) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.get_for(declared)?.write(value, self)
    }

    /// Like [`convert`](Self::convert) but logs and swallows failures
    pub fn try_convert(&self, value: &Value, target: &TypeDescriptor) -> Option<Value> {
        match self.convert(value, target) {
            Ok(converted) => Some(converted),
            Err(e) => {
                log::debug!("Conversion of {} to {} failed: {}", value, target, e);
                None
            }
        }
    }

    pub fn parent(&self) -> Option<&ConversionBus> {
        self.inner.parent.as_ref()
    }

    /// Object mapper factory used by object converters resolved through this bus
    pub fn mappers(&self) -> &Arc<ObjectMapperFactory> {
        &self.inner.mappers
    }

    /// Number of memoized pairs, including cached misses
    pub fn cached_pairs(&self) -> usize {
        self.inner.cache.len()
    }

    /// Scan registrations, then the parent chain
    ///
    /// `Ok(None)` means no match anywhere; construction failures are returned
    /// as errors and never cached.
    fn resolve(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> Result<Option<Arc<dyn Converter>>> {
        for registration in &self.inner.registrations {
            match registration.evaluate(source, target) {
                MatchOutcome::Matched => {
                    log::trace!(
                        "Resolved {} -> {} with registration '{}'",
                        source,
                        target,
                        registration.description
                    );
                    return registration.factory.create(source, target, self).map(Some);
                }
                MatchOutcome::Vetoed => {
                    log::trace!(
                        "Registration '{}' vetoed {} -> {}",
                        registration.description,
                        source,
                        target
                    );
                }
                MatchOutcome::NoMatch => {}
            }
        }

        let Some(parent) = &self.inner.parent else {
            return Ok(None);
        };
        log::debug!("Delegating {} -> {} to parent registry", source, target);
        match parent.get(source, target) {
            Ok(converter) => Ok(Some(converter)),
            Err(Error::ConverterNotFound {
                source_type,
                target_type,
            }) if &source_type == source && &target_type == target => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for ConversionBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionBus")
            .field("registrations", &self.inner.registrations)
            .field("cached_pairs", &self.inner.cache.len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

/// Registry with the default registrations
pub fn default_registry() -> ConversionBus {
    ConversionBus::builder().with_defaults().build()
}

/// Builder for [`ConversionBus`]; registrations are append-only
pub struct ConversionBusBuilder {
    parent: Option<ConversionBus>,
    registrations: Vec<Registration>,
    mappers: Option<Arc<ObjectMapperFactory>>,
    discoverers: Vec<Arc<dyn FieldDiscoverer>>,
}

impl ConversionBusBuilder {
    fn new(parent: Option<ConversionBus>) -> Self {
        Self {
            parent,
            registrations: Vec::new(),
            mappers: None,
            discoverers: Vec::new(),
        }
    }

    fn push(
        mut self,
        description: String,
        predicate: Predicate,
        condition: Option<Predicate>,
        factory: Arc<dyn ConverterFactory>,
    ) -> Self {
        self.registrations.push(Registration {
            description,
            predicate,
            condition,
            factory,
        });
        self
    }

    /// Register a factory behind an arbitrary predicate
    pub fn register<P, F>(self, predicate: P, factory: F) -> Self
    where
        P: Fn(&TypeDescriptor, &TypeDescriptor) -> bool + Send + Sync + 'static,
        F: Fn(&TypeDescriptor, &TypeDescriptor, &ConversionBus) -> Result<Arc<dyn Converter>>
            + Send
            + Sync
            + 'static,
    {
        let description = format!("custom #{}", self.registrations.len());
        self.push(description, Arc::new(predicate), None, Arc::new(factory))
    }

    /// Register a factory whose match can be vetoed by a pair condition
    pub fn register_conditional<P, C, F>(self, predicate: P, condition: C, factory: F) -> Self
    where
        P: Fn(&TypeDescriptor, &TypeDescriptor) -> bool + Send + Sync + 'static,
        C: Fn(&TypeDescriptor, &TypeDescriptor) -> bool + Send + Sync + 'static,
        F: Fn(&TypeDescriptor, &TypeDescriptor, &ConversionBus) -> Result<Arc<dyn Converter>>
            + Send
            + Sync
            + 'static,
    {
        let description = format!("conditional #{}", self.registrations.len());
        self.push(
            description,
            Arc::new(predicate),
            Some(Arc::new(condition)),
            Arc::new(factory),
        )
    }

    /// Register a factory for targets equal to `ty`
    pub fn register_exact<F>(self, ty: TypeDescriptor, factory: F) -> Self
    where
        F: Fn(&TypeDescriptor, &TypeDescriptor, &ConversionBus) -> Result<Arc<dyn Converter>>
            + Send
            + Sync
            + 'static,
    {
        let description = format!("exact {}", ty);
        self.push(description, exact(ty), None, Arc::new(factory))
    }

    /// Register a factory for every target `ty` is a supertype of
    pub fn register_assignable<F>(self, ty: TypeDescriptor, factory: F) -> Self
    where
        F: Fn(&TypeDescriptor, &TypeDescriptor, &ConversionBus) -> Result<Arc<dyn Converter>>
            + Send
            + Sync
            + 'static,
    {
        let description = format!("assignable {}", ty);
        self.push(description, assignable(ty), None, Arc::new(factory))
    }

    /// Register one shared converter instance for targets equal to `ty`
    pub fn register_converter(self, ty: TypeDescriptor, converter: impl Converter + 'static) -> Self {
        let description = format!("exact {} ({})", ty, converter.name());
        self.push(
            description,
            exact(ty),
            None,
            Arc::new(SharedConverter(Arc::new(converter))),
        )
    }

    /// Register a factory object behind an arbitrary predicate
    pub fn register_factory<P>(self, predicate: P, factory: Arc<dyn ConverterFactory>) -> Self
    where
        P: Fn(&TypeDescriptor, &TypeDescriptor) -> bool + Send + Sync + 'static,
    {
        let description = format!("factory #{}", self.registrations.len());
        self.push(description, Arc::new(predicate), None, factory)
    }

    /// Use `mappers` for object conversions instead of the inherited factory
    pub fn object_mappers(mut self, mappers: Arc<ObjectMapperFactory>) -> Self {
        self.mappers = Some(mappers);
        self
    }

    /// Add a field discoverer on top of the object mapper factory in use
    pub fn discoverer(mut self, discoverer: impl FieldDiscoverer + 'static) -> Self {
        self.discoverers.push(Arc::new(discoverer));
        self
    }

    /// Append the default registrations
    pub fn with_defaults(self) -> Self {
        defaults::register_defaults(self)
    }

    pub fn build(self) -> ConversionBus {
        // a child gets its own mapper caches so field converters resolve
        // through the child
        let base = match (self.mappers, &self.parent) {
            (Some(mappers), _) => mappers,
            (None, Some(parent)) => Arc::new(parent.mappers().extended(Vec::new())),
            (None, None) => Arc::new(ObjectMapperFactory::default()),
        };
        let mappers = if self.discoverers.is_empty() {
            base
        } else {
            Arc::new(base.extended(self.discoverers))
        };

        ConversionBus {
            inner: Arc::new(BusInner {
                registrations: self.registrations,
                cache: DashMap::new(),
                parent: self.parent,
                mappers,
            }),
        }
    }
}
