//! Registrations: predicate, optional pair condition, converter factory
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::ConversionBus;
use crate::convert::Converter;
use crate::error::Result;
use crate::types::TypeDescriptor;
use std::fmt;
use std::sync::Arc;

/// Pure test over a `(source, target)` pair
pub type Predicate = Arc<dyn Fn(&TypeDescriptor, &TypeDescriptor) -> bool + Send + Sync>;

/// Outcome of testing one registration against a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NoMatch,
    /// The predicate matched but the pair condition rejected it; scanning
    /// continues with the next registration
    Vetoed,
}

/// Produces a converter for a concrete pair
///
/// `bus` is the registry the converter is being built for; structural
/// factories use it to resolve element converters.
pub trait ConverterFactory: Send + Sync {
    fn create(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        bus: &ConversionBus,
    ) -> Result<Arc<dyn Converter>>;
}

impl<F> ConverterFactory for F
where
    F: Fn(&TypeDescriptor, &TypeDescriptor, &ConversionBus) -> Result<Arc<dyn Converter>>
        + Send
        + Sync,
{
    fn create(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        bus: &ConversionBus,
    ) -> Result<Arc<dyn Converter>> {
        self(source, target, bus)
    }
}

/// Factory handing out one shared converter instance
pub(crate) struct SharedConverter(pub(crate) Arc<dyn Converter>);

impl ConverterFactory for SharedConverter {
    fn create(&self, _: &TypeDescriptor, _: &TypeDescriptor, _: &ConversionBus) -> Result<Arc<dyn Converter>> {
        Ok(self.0.clone())
    }
}

pub(crate) struct Registration {
    pub(crate) description: String,
    pub(crate) predicate: Predicate,
    pub(crate) condition: Option<Predicate>,
    pub(crate) factory: Arc<dyn ConverterFactory>,
}

impl Registration {
    pub(crate) fn evaluate(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> MatchOutcome {
        if !(self.predicate)(source, target) {
            return MatchOutcome::NoMatch;
        }
        match &self.condition {
            Some(condition) if !condition(source, target) => MatchOutcome::Vetoed,
            _ => MatchOutcome::Matched,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("description", &self.description)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// Matches targets equal to `ty`, seeing through wildcard bounds
pub fn exact(ty: TypeDescriptor) -> Predicate {
    Arc::new(move |_: &TypeDescriptor, target: &TypeDescriptor| target.resolve_wildcard() == ty)
}

/// Matches targets `ty` is a supertype of
pub fn assignable(ty: TypeDescriptor) -> Predicate {
    Arc::new(move |_: &TypeDescriptor, target: &TypeDescriptor| ty.is_supertype_of(target))
}
