//! Converters for non-numeric scalar targets
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::numeric::{to_integer, IntKind};
use super::Converter;
use crate::bus::ConversionBus;
use crate::error::{Error, Result};
use crate::value::Value;
use std::path::PathBuf;
use url::Url;
use uuid::Uuid;

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        Ok(value.clone())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::F32(v) => Ok(Value::Bool(*v != 0.0)),
            Value::F64(v) => Ok(Value::Bool(*v != 0.0)),
            v if v.is_numeric() => Ok(Value::Bool(v.as_i128() != Some(0))),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
                _ => Err(Error::coercion_failed(
                    value,
                    "boolean",
                    "expected one of true/t/yes/y/1 or false/f/no/n/0",
                )),
            },
            other => Err(Error::coercion_failed(
                other,
                "boolean",
                format!("cannot read a boolean from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "boolean"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharConverter;

impl Converter for CharConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Char(c) => Ok(Value::Char(*c)),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(Error::coercion_failed(
                        value,
                        "char",
                        "Only single character expected",
                    )),
                }
            }
            v if v.is_numeric() => {
                let unit = to_integer(v, IntKind::I32)?;
                u16::try_from(unit)
                    .ok()
                    .and_then(|unit| char::from_u32(unit as u32))
                    .map(Value::Char)
                    .ok_or_else(|| {
                        Error::coercion_failed(value, "char", "not a valid UTF-16 code unit")
                    })
            }
            other => Err(Error::coercion_failed(
                other,
                "char",
                format!("cannot read a char from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "char"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Null => Err(Error::conversion_failed(value, "string", "value is null")),
            v if v.is_scalar() => Ok(Value::String(v.to_string())),
            other => Err(Error::conversion_failed(
                other,
                "string",
                format!("cannot read a string from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "string"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidConverter;

impl Converter for UuidConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Uuid(id) => Ok(Value::Uuid(*id)),
            Value::String(s) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|e| Error::coercion_failed(value, "uuid", e.to_string())),
            other => Err(Error::coercion_failed(
                other,
                "uuid",
                format!("cannot read a uuid from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "uuid"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UrlConverter;

impl Converter for UrlConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Url(url) => Ok(Value::Url(url.clone())),
            Value::String(s) => Url::parse(s.trim())
                .map(Value::Url)
                .map_err(|e| Error::coercion_failed(value, "url", e.to_string())),
            Value::Path(path) => Url::from_file_path(path).map(Value::Url).map_err(|_| {
                Error::conversion_failed(value, "url", "only absolute paths can become file URLs")
            }),
            other => Err(Error::coercion_failed(
                other,
                "url",
                format!("cannot read a url from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "url"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathConverter;

impl Converter for PathConverter {
    fn read(&self, value: &Value, _bus: &ConversionBus) -> Result<Value> {
        match value {
            Value::Path(path) => Ok(Value::Path(path.clone())),
            Value::String(s) => Ok(Value::Path(PathBuf::from(s))),
            Value::Url(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Value::Path)
                .map_err(|_| Error::conversion_failed(value, "path", "not a local file URL")),
            Value::List(segments) => {
                if segments.is_empty() {
                    return Ok(Value::Path(PathBuf::from(".")));
                }
                let mut path = PathBuf::new();
                for segment in segments {
                    match segment {
                        Value::String(s) => path.push(s),
                        other => {
                            return Err(Error::conversion_failed(
                                value,
                                "path",
                                format!("path segments must be strings, found {}", other.kind_name()),
                            ))
                        }
                    }
                }
                Ok(Value::Path(path))
            }
            other => Err(Error::conversion_failed(
                other,
                "path",
                format!("cannot read a path from {}", other.kind_name()),
            )),
        }
    }

    fn name(&self) -> &str {
        "path"
    }
}
