//! Field descriptors and field validators
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use crate::value::Value;
use regex::Regex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Reads a field from an instance payload
pub type Getter = Arc<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;

/// Assigns a converted value into an instance payload
pub type Setter = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;

/// A check run on a field's converted value before it is assigned
pub trait FieldValidator: Send + Sync + fmt::Debug {
    fn validate(&self, value: &Value) -> anyhow::Result<()>;

    fn name(&self) -> &str;
}

/// One named field of an object type
#[derive(Clone)]
pub struct FieldInfo {
    name: String,
    field_type: TypeDescriptor,
    getter: Getter,
    setter: Setter,
    validators: Vec<Arc<dyn FieldValidator>>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, field_type: TypeDescriptor, getter: Getter, setter: Setter) -> Self {
        Self {
            name: name.into(),
            field_type,
            getter,
            setter,
            validators: Vec::new(),
        }
    }

    pub fn with_validator(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn with_validators(mut self, validators: Vec<Arc<dyn FieldValidator>>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &TypeDescriptor {
        &self.field_type
    }

    pub fn validators(&self) -> &[Arc<dyn FieldValidator>] {
        &self.validators
    }

    pub fn get(&self, instance: &dyn Any) -> Result<Value> {
        (self.getter)(instance)
    }

    pub fn set(&self, intermediate: &mut dyn Any, value: Value) -> Result<()> {
        (self.setter)(intermediate, value)
    }

    /// Run every validator, stopping at the first rejection
    pub fn validate(&self, value: &Value) -> Result<()> {
        for validator in &self.validators {
            validator.validate(value).map_err(|e| Error::Validation {
                field: self.name.clone(),
                message: format!("{}: {}", validator.name(), e),
                source: Some(e),
            })?;
        }
        Ok(())
    }

    /// Same field read from and assigned to the `P` embedded in a `T`
    pub(crate) fn project<T: Any, P: Any>(
        &self,
        project: fn(&T) -> &P,
        project_mut: fn(&mut T) -> &mut P,
    ) -> FieldInfo {
        let getter = self.getter.clone();
        let setter = self.setter.clone();
        let name = self.name.clone();
        let set_name = self.name.clone();
        FieldInfo {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            getter: Arc::new(move |instance: &dyn Any| -> Result<Value> {
                match instance.downcast_ref::<T>() {
                    Some(outer) => getter(project(outer)),
                    None => Err(Error::configuration(format!(
                        "inherited field '{}' cannot be read from this instance",
                        name
                    ))),
                }
            }),
            setter: Arc::new(move |target: &mut dyn Any, value: Value| -> Result<()> {
                match target.downcast_mut::<T>() {
                    Some(outer) => setter(project_mut(outer), value),
                    None => Err(Error::configuration(format!(
                        "inherited field '{}' cannot be assigned on this instance",
                        set_name
                    ))),
                }
            }),
            validators: self.validators.clone(),
        }
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("type", &self.field_type)
            .field("validators", &self.validators)
            .finish()
    }
}

/// Rejects null, empty strings and empty collections
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl FieldValidator for NotEmpty {
    fn validate(&self, value: &Value) -> anyhow::Result<()> {
        let empty = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) | Value::Set(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            anyhow::bail!("value must not be empty");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "not_empty"
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl FieldValidator for Range {
    fn validate(&self, value: &Value) -> anyhow::Result<()> {
        let Some(v) = value.as_f64() else {
            anyhow::bail!("expected a number, found {}", value.kind_name());
        };
        if v < self.min || v > self.max {
            anyhow::bail!("{} is outside [{}, {}]", value, self.min, self.max);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "range"
    }
}

/// Text must match a regular expression
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Pattern)
            .map_err(|e| Error::configuration(format!("invalid pattern '{}': {}", pattern, e)))
    }
}

impl FieldValidator for Pattern {
    fn validate(&self, value: &Value) -> anyhow::Result<()> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => anyhow::bail!("expected text, found null"),
            other if other.is_scalar() => other.to_string(),
            other => anyhow::bail!("expected text, found {}", other.kind_name()),
        };
        if !self.0.is_match(&text) {
            anyhow::bail!("'{}' does not match /{}/", text, self.0.as_str());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

/// A named closure
#[derive(Clone)]
pub struct Custom {
    name: String,
    check: Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>,
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom").field("name", &self.name).finish()
    }
}

impl FieldValidator for Custom {
    fn validate(&self, value: &Value) -> anyhow::Result<()> {
        (self.check)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a validator from a closure
pub fn custom<F>(name: impl Into<String>, check: F) -> Custom
where
    F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Custom {
        name: name.into(),
        check: Arc::new(check),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldInfo {
        FieldInfo::new(
            "age",
            TypeDescriptor::i32(),
            Arc::new(|_: &dyn Any| -> Result<Value> { Ok(Value::Null) }),
            Arc::new(|_: &mut dyn Any, _: Value| -> Result<()> { Ok(()) }),
        )
    }

    #[test]
    fn test_range_validator() {
        let field = field().with_validator(Range::new(0.0, 150.0));
        assert!(field.validate(&Value::I32(30)).is_ok());

        let err = field.validate(&Value::I32(200)).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "age"));
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_not_empty_and_pattern() {
        assert!(NotEmpty.validate(&Value::from("  ")).is_err());
        assert!(NotEmpty.validate(&Value::list([1])).is_ok());

        let pattern = Pattern::new("^[a-z]+$").unwrap();
        assert!(pattern.validate(&Value::from("rex")).is_ok());
        assert!(pattern.validate(&Value::from("Rex")).is_err());
        assert!(Pattern::new("(").is_err());
    }

    #[test]
    fn test_custom_validator_keeps_source() {
        use std::error::Error as _;

        let even = custom("even", |value| match value.as_i128() {
            Some(v) if v % 2 == 0 => Ok(()),
            _ => anyhow::bail!("must be even"),
        });
        let field = field().with_validator(even);
        let err = field.validate(&Value::I32(3)).unwrap_err();
        assert!(err.to_string().contains("even: must be even"));
        assert!(err.source().is_some());
    }
}
