//! Enum matcher
//!
//! Each enum type gets one lookup table holding every constant's exact name
//! and a normalized key (lowercase, underscores removed) stored behind a
//! reserved prefix. Tables live in a process-wide cache of weak references,
//! so a table is dropped once no converter holds it.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::types::EnumDescriptor;
use crate::value::{EnumConstant, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

/// Cannot occur in a constant name; inputs containing it never match
const NORMALIZED_PREFIX: char = '\0';

type LookupCache = Mutex<HashMap<EnumDescriptor, Weak<EnumLookup>>>;

fn cache() -> &'static LookupCache {
    static CACHE: OnceLock<LookupCache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn normalize(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 1);
    normalized.push(NORMALIZED_PREFIX);
    normalized.extend(key.to_lowercase().chars().filter(|c| *c != '_'));
    normalized
}

/// Lookup table for the constants of one enum type
#[derive(Debug)]
pub struct EnumLookup {
    descriptor: EnumDescriptor,
    ordinals: HashMap<String, usize>,
}

impl EnumLookup {
    fn build(descriptor: &EnumDescriptor) -> Self {
        let mut ordinals = HashMap::with_capacity(descriptor.constants().len() * 2);
        for (ordinal, name) in descriptor.constants().iter().enumerate() {
            ordinals.insert(name.to_string(), ordinal);
        }
        // normalized keys never shadow an earlier constant
        for (ordinal, name) in descriptor.constants().iter().enumerate() {
            ordinals.entry(normalize(name)).or_insert(ordinal);
        }
        Self {
            descriptor: descriptor.clone(),
            ordinals,
        }
    }

    /// Shared table for `descriptor`, built on first use
    pub fn for_enum(descriptor: &EnumDescriptor) -> Arc<EnumLookup> {
        let mut cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = cache.get(descriptor).and_then(Weak::upgrade) {
            return existing;
        }

        cache.retain(|_, weak| weak.strong_count() > 0);
        let lookup = Arc::new(Self::build(descriptor));
        log::trace!("Built enum lookup for {}", descriptor.name());
        cache.insert(descriptor.clone(), Arc::downgrade(&lookup));
        lookup
    }

    /// Exact name first, then the normalized form
    pub fn find(&self, key: &str) -> Option<EnumConstant> {
        if key.contains(NORMALIZED_PREFIX) {
            return None;
        }
        let ordinal = self
            .ordinals
            .get(key)
            .or_else(|| self.ordinals.get(&normalize(key)))?;
        EnumConstant::new(self.descriptor.clone(), *ordinal)
    }
}

/// Reads enum constants of one concrete enum type
#[derive(Debug, Clone)]
pub struct EnumConverter {
    lookup: Arc<EnumLookup>,
    name: String,
}

impl EnumConverter {
    pub fn new(descriptor: &EnumDescriptor) -> Self {
        Self {
            lookup: EnumLookup::for_enum(descriptor),
            name: format!("enum {}", descriptor.name()),
        }
    }
}

impl Converter for EnumConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        let key = match value {
            Value::Enum(constant) if constant.descriptor() == &self.lookup.descriptor => {
                return Ok(value.clone());
            }
            Value::Enum(constant) => constant.name().to_string(),
            Value::Null => {
                return Err(Error::coercion_failed(value, self.lookup.descriptor.name(), "value is null"))
            }
            v if v.is_scalar() => v.to_string(),
            other => {
                return Err(Error::coercion_failed(
                    other,
                    self.lookup.descriptor.name(),
                    format!("cannot read an enum constant from {}", other.kind_name()),
                ))
            }
        };

        self.lookup.find(&key).map(Value::Enum).ok_or_else(|| {
            Error::coercion_failed(
                value,
                self.lookup.descriptor.name(),
                format!(
                    "Invalid enum constant provided, expected a value of enum {}, got {}",
                    self.lookup.descriptor.name(),
                    key
                ),
            )
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordinals() -> EnumDescriptor {
        EnumDescriptor::new("Ordinals", ["FIRST", "SECOND", "third", "FOURTH", "fourth"])
    }

    #[test]
    fn test_fuzzy_matching() {
        let lookup = EnumLookup::for_enum(&ordinals());
        assert_eq!(lookup.find("sEcOnD").unwrap().name(), "SECOND");
        assert_eq!(lookup.find("third").unwrap().name(), "third");
        assert_eq!(lookup.find("THIRD").unwrap().name(), "third");
        assert_eq!(lookup.find("fourth").unwrap().name(), "fourth");
        assert_eq!(lookup.find("Fourth").unwrap().name(), "FOURTH");
        assert!(lookup.find("3rd").is_none());
    }

    #[test]
    fn test_underscores_are_ignored() {
        let lookup = EnumLookup::for_enum(&EnumDescriptor::new("Mode", ["READ_WRITE", "READ"]));
        assert_eq!(lookup.find("readwrite").unwrap().name(), "READ_WRITE");
        assert_eq!(lookup.find("Read_Write").unwrap().ordinal(), 0);
    }

    #[test]
    fn test_reserved_prefix_cannot_be_injected() {
        let lookup = EnumLookup::for_enum(&ordinals());
        assert!(lookup.find("\0first").is_none());
    }

    #[test]
    fn test_lookups_are_shared_while_alive() {
        let descriptor = EnumDescriptor::new("SharedLookup", ["A", "B"]);
        let first = EnumLookup::for_enum(&descriptor);
        let second = EnumLookup::for_enum(&descriptor);
        assert!(Arc::ptr_eq(&first, &second));

        drop(first);
        drop(second);
        let cache = cache().lock().unwrap();
        assert!(cache.get(&descriptor).map_or(true, |weak| weak.upgrade().is_none()));
    }
}
