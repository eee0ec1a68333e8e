//! Bridge between [`Value`] and `serde`/`serde_json`
//!
//! Decoding never fails: JSON integers become `I64` (or `BigInt` above
//! `i64::MAX`), other numbers become `F64`. Encoding writes UUIDs, URLs,
//! paths and enum constants as strings and rejects what has no JSON shape:
//! non-finite floats, non-scalar map keys and unconverted object instances.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::{Value, ValueMap};
use crate::error::Result;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::BigInt(u as i128)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect::<ValueMap>(),
            ),
        }
    }
}

impl Value {
    /// Decode a JSON document
    pub fn from_json_str(input: &str) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        Ok(Value::from(json))
    }

    /// Encode as a `serde_json::Value`
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn map_key<E: serde::ser::Error>(key: &Value) -> std::result::Result<String, E> {
    match key {
        Value::Null | Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Object(_) => Err(
            E::custom(format!("map keys must be scalar values, found {}", key.kind_name())),
        ),
        Value::F32(v) if !v.is_finite() => Err(E::custom("non-finite float map key")),
        Value::F64(v) if !v.is_finite() => Err(E::custom("non-finite float map key")),
        scalar => Ok(scalar.to_string()),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::BigInt(v) => {
                if let Ok(small) = i64::try_from(*v) {
                    serializer.serialize_i64(small)
                } else if let Ok(unsigned) = u64::try_from(*v) {
                    serializer.serialize_u64(unsigned)
                } else {
                    serializer.serialize_i128(*v)
                }
            }
            Value::F32(v) if !v.is_finite() => {
                Err(S::Error::custom(format!("cannot serialize non-finite float {}", v)))
            }
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) if !v.is_finite() => {
                Err(S::Error::custom(format!("cannot serialize non-finite double {}", v)))
            }
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Uuid(v) => serializer.collect_str(v),
            Value::Url(v) => serializer.serialize_str(v.as_str()),
            Value::Path(v) => match v.to_str() {
                Some(s) => serializer.serialize_str(s),
                None => Err(S::Error::custom(format!(
                    "path {} is not valid UTF-8",
                    v.display()
                ))),
            },
            Value::Enum(v) => serializer.serialize_str(v.name()),
            Value::List(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(&map_key::<S::Error>(k)?, v)?;
                }
                out.end()
            }
            Value::Object(instance) => Err(S::Error::custom(format!(
                "{} instance must be written through its converter before serialization",
                instance.type_descriptor()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from_json_str(r#"{"fish":5,"bugs":"124880","time":"-1"}"#).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["fish", "bugs", "time"]);
        assert_eq!(map.get_str("fish"), Some(&Value::I64(5)));
    }

    #[test]
    fn test_number_mapping() {
        assert_eq!(Value::from(json!(12)), Value::I64(12));
        assert_eq!(Value::from(json!(u64::MAX)), Value::BigInt(u64::MAX as i128));
        assert_eq!(Value::from(json!(1.5)), Value::F64(1.5));
    }

    #[test]
    fn test_to_json_writes_scalars_as_strings() {
        let id = uuid::Uuid::nil();
        let value = Value::map([
            (Value::from("id"), Value::Uuid(id)),
            (Value::from(3), Value::Path("a/b".into())),
        ]);
        assert_eq!(
            value.to_json().unwrap(),
            json!({"id": "00000000-0000-0000-0000-000000000000", "3": "a/b"})
        );
    }

    #[test]
    fn test_to_json_rejects_unrepresentable_values() {
        assert!(Value::F64(f64::NAN).to_json().is_err());
        assert!(Value::map([(Value::list([1]), Value::Null)]).to_json().is_err());

        let instance = crate::value::Instance::new(crate::TypeDescriptor::object("Pet"), ());
        assert!(Value::Object(instance).to_json().is_err());
    }
}
