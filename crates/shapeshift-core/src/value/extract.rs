//! Typed extraction from and into [`Value`]
//!
//! Extraction is strict: coercion belongs to converters, so `FromValue`
//! only unwraps the variant that already matches.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::{EnumConstant, Instance, Value, ValueMap};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::PathBuf;
use url::Url;
use uuid::Uuid;

/// Types that can be taken out of a [`Value`]
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// Types that can be turned into a [`Value`]
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl<T: Into<Value>> IntoValue for T {
    fn into_value(self) -> Value {
        self.into()
    }
}

fn mismatch(value: &Value, expected: &str) -> Error {
    Error::conversion_failed(
        value,
        expected,
        format!("expected a {} value, found {}", expected, value.kind_name()),
    )
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident as $name:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch(&other, $name)),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool as "boolean",
    char => Char as "char",
    i8 => I8 as "byte",
    i16 => I16 as "short",
    i32 => I32 as "int",
    i64 => I64 as "long",
    i128 => BigInt as "biginteger",
    f32 => F32 as "float",
    f64 => F64 as "double",
    String => String as "string",
    Uuid => Uuid as "uuid",
    Url => Url as "url",
    PathBuf => Path as "path",
    EnumConstant => Enum as "enum",
    ValueMap => Map as "map",
    Instance => Object as "object",
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) | Value::Set(items) => {
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(mismatch(&other, "list")),
        }
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&other, "map")),
        }
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&other, "map")),
        }
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::map(map)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(map: HashMap<K, V>) -> Self {
        Value::map(map)
    }
}
