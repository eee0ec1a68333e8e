//! Runtime values
//!
//! [`Value`] is the closed set of already-decoded, native-shaped values the
//! engine reads from and writes back to. Object instances produced by the
//! object mapper travel as type-erased [`Instance`]s.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod extract;
mod json;

pub use extract::{FromValue, IntoValue};

use crate::types::{EnumDescriptor, TypeDescriptor, TypeKind};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Arbitrary-precision integer stand-in
    BigInt(i128),
    F32(f32),
    F64(f64),
    String(String),
    Uuid(Uuid),
    Url(Url),
    Path(PathBuf),
    Enum(EnumConstant),
    List(Vec<Value>),
    /// Unique elements in first-seen order
    Set(Vec<Value>),
    Map(ValueMap),
    Object(Instance),
}

impl Value {
    /// Runtime type of this value, used as the source half of a resolution key
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::any(),
            Value::Bool(_) => TypeDescriptor::bool(),
            Value::Char(_) => TypeDescriptor::char(),
            Value::I8(_) => TypeDescriptor::i8(),
            Value::I16(_) => TypeDescriptor::i16(),
            Value::I32(_) => TypeDescriptor::i32(),
            Value::I64(_) => TypeDescriptor::i64(),
            Value::BigInt(_) => TypeDescriptor::big_int(),
            Value::F32(_) => TypeDescriptor::f32(),
            Value::F64(_) => TypeDescriptor::f64(),
            Value::String(_) => TypeDescriptor::string(),
            Value::Uuid(_) => TypeDescriptor::uuid(),
            Value::Url(_) => TypeDescriptor::url(),
            Value::Path(_) => TypeDescriptor::path(),
            Value::Enum(constant) => TypeDescriptor::enumeration(constant.descriptor().clone()),
            Value::List(_) => TypeDescriptor::of(TypeKind::List),
            Value::Set(_) => TypeDescriptor::of(TypeKind::Set),
            Value::Map(_) => TypeDescriptor::of(TypeKind::Map),
            Value::Object(instance) => instance.type_descriptor().clone(),
        }
    }

    /// Short name of the value's variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "char",
            Value::I8(_) => "byte",
            Value::I16(_) => "short",
            Value::I32(_) => "int",
            Value::I64(_) => "long",
            Value::BigInt(_) => "biginteger",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::Url(_) => "url",
            Value::Path(_) => "path",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::BigInt(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    /// Whether the value holds no nested values
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Object(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Integral value widened to 128 bits; floats are not integral here
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::I8(v) => Some(*v as i128),
            Value::I16(v) => Some(*v as i128),
            Value::I32(v) => Some(*v as i128),
            Value::I64(v) => Some(*v as i128),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric value as a double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Elements of a list or set
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) | Value::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Build a list value
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs, in order
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Url(v) => write!(f, "{}", v),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::Enum(v) => write!(f, "{}", v.name()),
            Value::List(items) | Value::Set(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(instance) => write!(f, "<{} instance>", instance.type_descriptor()),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => BigInt,
    f32 => F32,
    f64 => F64,
    String => String,
    Uuid => Uuid,
    Url => Url,
    PathBuf => Path,
    EnumConstant => Enum,
    ValueMap => Map,
    Instance => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An enum constant: its enum type and the constant's ordinal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    descriptor: EnumDescriptor,
    ordinal: usize,
}

impl EnumConstant {
    /// The constant at `ordinal`, if the enum declares one
    pub fn new(descriptor: EnumDescriptor, ordinal: usize) -> Option<Self> {
        (ordinal < descriptor.constants().len()).then_some(Self {
            descriptor,
            ordinal,
        })
    }

    /// The constant with exactly this name
    pub fn by_name(descriptor: &EnumDescriptor, name: &str) -> Option<Self> {
        let ordinal = descriptor.constants().iter().position(|c| &**c == name)?;
        Some(Self {
            descriptor: descriptor.clone(),
            ordinal,
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.constants()[self.ordinal]
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn enum_name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        &self.descriptor
    }
}

/// Insertion-ordered key/value pairs
///
/// Lookups go through a hash index over the keys; inserting an existing key
/// replaces its value in place and keeps the original position.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
    index: Buckets,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: Buckets::with_capacity(capacity),
        }
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.index.find(hash_of(key), |i| self.entries[i].0 == *key)
    }

    /// Insert or replace, returning the previous value for the key
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(hash_of(&key), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Lookup by string key
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.index
            .find(hash_of_str(key), |i| self.entries[i].0.as_str() == Some(key))
            .map(|i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Remove a key; later entries shift down one position
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let index = self.position(key)?;
        let (_, removed) = self.entries.remove(index);
        self.index = Buckets::build(self.entries.iter().map(|(k, _)| k));
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// Maps compare entry by entry, in order
impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Hash for ValueMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.entries.len());
        for (k, v) in &self.entries {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = ValueMap::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Drop repeated values, keeping the first occurrence of each
pub(crate) fn dedupe(items: Vec<Value>) -> Vec<Value> {
    let mut seen = Buckets::with_capacity(items.len());
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        let hash = hash_of(&item);
        if seen.find(hash, |i| unique[i] == item).is_none() {
            seen.insert(hash, unique.len());
            unique.push(item);
        }
    }
    unique
}

/// Positions of values grouped by hash; callers confirm equality
#[derive(Debug, Clone, Default)]
struct Buckets(HashMap<u64, Vec<usize>>);

impl Buckets {
    fn with_capacity(capacity: usize) -> Self {
        Self(HashMap::with_capacity(capacity))
    }

    fn build<'a>(values: impl Iterator<Item = &'a Value>) -> Self {
        let mut buckets = Self::default();
        for (i, value) in values.enumerate() {
            buckets.insert(hash_of(value), i);
        }
        buckets
    }

    fn find(&self, hash: u64, matches: impl Fn(usize) -> bool) -> Option<usize> {
        self.0.get(&hash)?.iter().copied().find(|&i| matches(i))
    }

    fn insert(&mut self, hash: u64, position: usize) {
        self.0.entry(hash).or_default().push(position);
    }
}

const STRING_TAG: u8 = 10;

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn hash_of_str(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write_u8(STRING_TAG);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Consistent with `PartialEq`: `0.0` and `-0.0` hash alike, and each
/// variant is tagged so equal payloads of different kinds stay apart.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Bool(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            Value::Char(v) => {
                state.write_u8(2);
                v.hash(state);
            }
            Value::I8(v) => {
                state.write_u8(3);
                v.hash(state);
            }
            Value::I16(v) => {
                state.write_u8(4);
                v.hash(state);
            }
            Value::I32(v) => {
                state.write_u8(5);
                v.hash(state);
            }
            Value::I64(v) => {
                state.write_u8(6);
                v.hash(state);
            }
            Value::BigInt(v) => {
                state.write_u8(7);
                v.hash(state);
            }
            Value::F32(v) => {
                state.write_u8(8);
                let v = if *v == 0.0 { 0.0f32 } else { *v };
                v.to_bits().hash(state);
            }
            Value::F64(v) => {
                state.write_u8(9);
                let v = if *v == 0.0 { 0.0f64 } else { *v };
                v.to_bits().hash(state);
            }
            Value::String(v) => {
                state.write_u8(STRING_TAG);
                v.hash(state);
            }
            Value::Uuid(v) => {
                state.write_u8(11);
                v.hash(state);
            }
            Value::Url(v) => {
                state.write_u8(12);
                v.hash(state);
            }
            Value::Path(v) => {
                state.write_u8(13);
                v.hash(state);
            }
            Value::Enum(v) => {
                state.write_u8(14);
                v.hash(state);
            }
            Value::List(items) => {
                state.write_u8(15);
                items.hash(state);
            }
            Value::Set(items) => {
                state.write_u8(16);
                items.hash(state);
            }
            Value::Map(map) => {
                state.write_u8(17);
                map.hash(state);
            }
            Value::Object(instance) => {
                state.write_u8(18);
                instance.hash(state);
            }
        }
    }
}

/// A type-erased object instance tagged with its concrete type
#[derive(Clone)]
pub struct Instance {
    type_descriptor: TypeDescriptor,
    data: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(type_descriptor: TypeDescriptor, data: T) -> Self {
        Self {
            type_descriptor,
            data: Arc::new(data),
        }
    }

    pub(crate) fn from_boxed(type_descriptor: TypeDescriptor, data: Box<dyn Any + Send + Sync>) -> Self {
        Self {
            type_descriptor,
            data: Arc::from(data),
        }
    }

    /// Concrete type of the instance
    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Borrow the payload for mutation; `None` while other handles share it
    pub fn data_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        Arc::get_mut(&mut self.data)
    }

    pub fn data(&self) -> &(dyn Any + Send + Sync) {
        &*self.data
    }

    /// Extract the payload, cloning it when other handles still share it
    pub fn take<T: Any + Send + Sync + Clone>(self) -> Option<T> {
        let data = self.data.downcast::<T>().ok()?;
        Some(Arc::try_unwrap(data).unwrap_or_else(|shared| (*shared).clone()))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_descriptor)
            .finish_non_exhaustive()
    }
}

/// Instances compare by identity
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.type_descriptor == other.type_descriptor
    }
}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.data) as *const () as usize).hash(state);
        self.type_descriptor.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_map_preserves_order_and_replaces_in_place() {
        let mut map = ValueMap::new();
        map.insert("fish", 5);
        map.insert("bugs", 7);
        map.insert("time", -1);
        assert_eq!(map.insert("bugs", 124880), Some(Value::I32(7)));

        let keys: Vec<_> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["fish", "bugs", "time"]);
        assert_eq!(map.get_str("bugs"), Some(&Value::I32(124880)));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_value_map_lookup_after_remove() {
        let mut map: ValueMap = (0..100).map(|i| (format!("k{}", i), i)).collect();
        assert_eq!(map.remove(&Value::from("k10")), Some(Value::I32(10)));
        assert_eq!(map.get_str("k10"), None);
        assert_eq!(map.get_str("k11"), Some(&Value::I32(11)));
        assert_eq!(map.get(&Value::from("k99")), Some(&Value::I32(99)));
        assert_eq!(map.len(), 99);

        map.insert("k10", 0);
        assert_eq!(map.keys().last(), Some(&Value::from("k10")));
    }

    #[test]
    fn test_value_map_keys_keep_their_kind() {
        let mut map = ValueMap::new();
        map.insert(1i32, "int");
        map.insert(1i64, "long");
        map.insert(0.0f64, "zero");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::I64(1)), Some(&Value::from("long")));
        assert_eq!(map.get(&Value::F64(-0.0)), Some(&Value::from("zero")));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let items = vec![
            Value::from(3),
            Value::from(1),
            Value::from(3),
            Value::list([1, 2]),
            Value::list([1, 2]),
            Value::from(1i64),
        ];
        assert_eq!(
            dedupe(items),
            vec![Value::from(3), Value::from(1), Value::list([1, 2]), Value::from(1i64)]
        );
    }

    #[test]
    fn test_large_map_lookups() {
        let map: ValueMap = (0..50_000).map(|i| (format!("key{}", i), i)).collect();
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.get_str("key49999"), Some(&Value::I32(49_999)));
        assert_eq!(map.keys().next(), Some(&Value::from("key0")));
    }

    #[test]
    fn test_runtime_type_descriptors() {
        assert_eq!(Value::from(1i32).type_descriptor(), TypeDescriptor::i32());
        assert_eq!(Value::from("x").type_descriptor(), TypeDescriptor::string());
        assert!(Value::list([1, 2]).type_descriptor().is_raw());
        assert_eq!(Value::Null.type_descriptor(), TypeDescriptor::any());
    }

    #[test]
    fn test_enum_constant_lookup() {
        let colors = EnumDescriptor::new("Color", ["RED", "GREEN"]);
        let green = EnumConstant::by_name(&colors, "GREEN").unwrap();
        assert_eq!(green.ordinal(), 1);
        assert_eq!(green.enum_name(), "Color");
        assert!(EnumConstant::by_name(&colors, "green").is_none());
        assert!(EnumConstant::new(colors, 2).is_none());
    }

    #[test]
    fn test_instance_identity_and_take() {
        #[derive(Clone, Debug, PartialEq)]
        struct Point(i32, i32);

        let a = Instance::new(TypeDescriptor::object("Point"), Point(1, 2));
        let b = a.clone();
        let c = Instance::new(TypeDescriptor::object("Point"), Point(1, 2));
        assert_eq!(a, b);
        assert_ne!(a, c);

        assert_eq!(a.downcast_ref::<Point>(), Some(&Point(1, 2)));
        assert!(a.clone().take::<String>().is_none());
        assert_eq!(a.take::<Point>(), Some(Point(1, 2)));
    }

    #[test]
    fn test_display() {
        let value = Value::map([("a", Value::list([1, 2])), ("b", Value::Null)]);
        assert_eq!(value.to_string(), "{a=[1, 2], b=null}");
    }
}
