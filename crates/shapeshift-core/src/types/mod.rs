//! Structural type descriptors
//!
//! A [`TypeDescriptor`] is the key the conversion bus resolves converters
//! against: a closed [`TypeKind`], ordered type arguments and, for wildcards,
//! an upper bound. Descriptors are immutable, cheap to clone and compare
//! structurally.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

mod parser;

pub use parser::TypeResolver;

use std::fmt;
use std::sync::Arc;

/// Description of an enum type: its name and declared constants in order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumDescriptor {
    name: Arc<str>,
    constants: Arc<[Arc<str>]>,
}

impl EnumDescriptor {
    /// Create an enum descriptor from its name and constants
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            constants: constants
                .into_iter()
                .map(|c| Arc::from(c.into()))
                .collect::<Vec<Arc<str>>>()
                .into(),
        }
    }

    /// Enum type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared constants, in declaration order
    pub fn constants(&self) -> &[Arc<str>] {
        &self.constants
    }
}

/// The closed set of type kinds known to the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Top type; also the default source type
    Any,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    /// Arbitrary-precision integer stand-in
    BigInt,
    F32,
    F64,
    /// Abstract supertype of every numeric kind
    Number,
    String,
    Uuid,
    Url,
    Path,
    /// A concrete enum, or any enum when `None`
    Enum(Option<EnumDescriptor>),
    List,
    Set,
    Array,
    Map,
    /// A concrete object type, or any object when `None`
    Object(Option<Arc<str>>),
    /// An abstract object type resolved through a discriminator
    Interface(Arc<str>),
    Wildcard,
}

impl TypeKind {
    /// Number of type arguments a parameterized form of this kind carries
    pub fn expected_arity(&self) -> usize {
        match self {
            TypeKind::List | TypeKind::Set | TypeKind::Array => 1,
            TypeKind::Map => 2,
            _ => 0,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKind::I8
                | TypeKind::I16
                | TypeKind::I32
                | TypeKind::I64
                | TypeKind::BigInt
                | TypeKind::F32
                | TypeKind::F64
        )
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Inner {
    kind: TypeKind,
    args: Vec<TypeDescriptor>,
    bound: Option<TypeDescriptor>,
}

/// Immutable, structurally comparable description of a (possibly generic) type
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Arc<Inner>);

impl TypeDescriptor {
    /// Create a descriptor from a kind and its type arguments
    pub fn new(kind: TypeKind, args: Vec<TypeDescriptor>) -> Self {
        Self(Arc::new(Inner {
            kind,
            args,
            bound: None,
        }))
    }

    /// A descriptor without type arguments
    pub fn of(kind: TypeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn any() -> Self {
        Self::of(TypeKind::Any)
    }

    pub fn bool() -> Self {
        Self::of(TypeKind::Bool)
    }

    pub fn char() -> Self {
        Self::of(TypeKind::Char)
    }

    pub fn i8() -> Self {
        Self::of(TypeKind::I8)
    }

    pub fn i16() -> Self {
        Self::of(TypeKind::I16)
    }

    pub fn i32() -> Self {
        Self::of(TypeKind::I32)
    }

    pub fn i64() -> Self {
        Self::of(TypeKind::I64)
    }

    pub fn big_int() -> Self {
        Self::of(TypeKind::BigInt)
    }

    pub fn f32() -> Self {
        Self::of(TypeKind::F32)
    }

    pub fn f64() -> Self {
        Self::of(TypeKind::F64)
    }

    pub fn number() -> Self {
        Self::of(TypeKind::Number)
    }

    pub fn string() -> Self {
        Self::of(TypeKind::String)
    }

    pub fn uuid() -> Self {
        Self::of(TypeKind::Uuid)
    }

    pub fn url() -> Self {
        Self::of(TypeKind::Url)
    }

    pub fn path() -> Self {
        Self::of(TypeKind::Path)
    }

    /// A concrete enum type
    pub fn enumeration(descriptor: EnumDescriptor) -> Self {
        Self::of(TypeKind::Enum(Some(descriptor)))
    }

    /// The supertype of every enum
    pub fn any_enum() -> Self {
        Self::of(TypeKind::Enum(None))
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::List, vec![element])
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::Set, vec![element])
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::Array, vec![element])
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::new(TypeKind::Map, vec![key, value])
    }

    /// A concrete, instantiable object type
    pub fn object(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::of(TypeKind::Object(Some(Arc::from(name))))
    }

    /// The supertype of every object and interface
    pub fn any_object() -> Self {
        Self::of(TypeKind::Object(None))
    }

    /// An abstract object type
    pub fn interface(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::of(TypeKind::Interface(Arc::from(name)))
    }

    /// An unbounded wildcard (`?`)
    pub fn wildcard() -> Self {
        Self::of(TypeKind::Wildcard)
    }

    /// A bounded wildcard (`? extends bound`)
    pub fn wildcard_extends(bound: TypeDescriptor) -> Self {
        Self(Arc::new(Inner {
            kind: TypeKind::Wildcard,
            args: Vec::new(),
            bound: Some(bound),
        }))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    pub fn type_args(&self) -> &[TypeDescriptor] {
        &self.0.args
    }

    /// Upper bound of a wildcard
    pub fn upper_bound(&self) -> Option<&TypeDescriptor> {
        self.0.bound.as_ref()
    }

    /// Object or interface name, or the enum name for enums
    pub fn name(&self) -> Option<&str> {
        match &self.0.kind {
            TypeKind::Object(Some(name)) | TypeKind::Interface(name) => Some(name),
            TypeKind::Enum(Some(descriptor)) => Some(descriptor.name()),
            _ => None,
        }
    }

    /// A container kind used without its type arguments
    pub fn is_raw(&self) -> bool {
        self.0.kind.expected_arity() > 0 && self.0.args.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.0.kind.is_numeric()
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self.0.kind,
            TypeKind::I8 | TypeKind::I16 | TypeKind::I32 | TypeKind::I64 | TypeKind::BigInt
        )
    }

    /// Leaf kinds whose values carry no nested values
    pub fn is_scalar(&self) -> bool {
        self.is_numeric()
            || matches!(
                self.0.kind,
                TypeKind::Bool
                    | TypeKind::Char
                    | TypeKind::String
                    | TypeKind::Uuid
                    | TypeKind::Url
                    | TypeKind::Path
                    | TypeKind::Enum(Some(_))
            )
    }

    pub fn is_container(&self) -> bool {
        self.0.kind.expected_arity() > 0
    }

    /// Whether values can only exist as instances of some narrower type
    pub fn is_abstract(&self) -> bool {
        matches!(
            self.0.kind,
            TypeKind::Any
                | TypeKind::Number
                | TypeKind::Enum(None)
                | TypeKind::Object(None)
                | TypeKind::Interface(_)
                | TypeKind::Wildcard
        )
    }

    /// Replace a wildcard by its upper bound (`any` when unbounded)
    pub fn resolve_wildcard(&self) -> TypeDescriptor {
        match self.0.kind {
            TypeKind::Wildcard => self
                .0
                .bound
                .as_ref()
                .map(TypeDescriptor::resolve_wildcard)
                .unwrap_or_else(TypeDescriptor::any),
            _ => self.clone(),
        }
    }

    /// Whether a value of `other` is assignable to this type
    ///
    /// Named object subtyping is not known here; see
    /// `ObjectMapperFactory::is_subtype`.
    pub fn is_supertype_of(&self, other: &TypeDescriptor) -> bool {
        let this = self.resolve_wildcard();
        let other = other.resolve_wildcard();
        if this == other {
            return true;
        }

        match this.kind() {
            TypeKind::Any => true,
            TypeKind::Number => other.is_numeric(),
            TypeKind::Enum(None) => matches!(other.kind(), TypeKind::Enum(_)),
            TypeKind::Object(None) => {
                matches!(other.kind(), TypeKind::Object(_) | TypeKind::Interface(_))
            }
            TypeKind::List | TypeKind::Set | TypeKind::Array | TypeKind::Map => {
                if this.kind() != other.kind() {
                    return false;
                }
                if this.is_raw() {
                    return true;
                }
                this.type_args().len() == other.type_args().len()
                    && this
                        .type_args()
                        .iter()
                        .zip(other.type_args())
                        .all(|(mine, theirs)| argument_contains(mine, theirs))
            }
            _ => false,
        }
    }

    /// Parse a type expression such as `Map<String, List<int>>`
    pub fn parse(expr: &str) -> crate::Result<TypeDescriptor> {
        parser::parse(expr, None)
    }

    /// Parse a type expression, resolving non-builtin names through `resolver`
    pub fn parse_with(expr: &str, resolver: &dyn TypeResolver) -> crate::Result<TypeDescriptor> {
        parser::parse(expr, Some(resolver))
    }
}

/// Type arguments compare covariantly; a wildcard argument accepts anything
/// below its bound
fn argument_contains(declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool {
    declared == actual || declared.is_supertype_of(actual)
}

impl std::str::FromStr for TypeDescriptor {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind() {
            TypeKind::Any => "any",
            TypeKind::Bool => "boolean",
            TypeKind::Char => "char",
            TypeKind::I8 => "byte",
            TypeKind::I16 => "short",
            TypeKind::I32 => "int",
            TypeKind::I64 => "long",
            TypeKind::BigInt => "biginteger",
            TypeKind::F32 => "float",
            TypeKind::F64 => "double",
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::Uuid => "uuid",
            TypeKind::Url => "url",
            TypeKind::Path => "path",
            TypeKind::Enum(Some(descriptor)) => descriptor.name(),
            TypeKind::Enum(None) => "enum",
            TypeKind::List => "List",
            TypeKind::Set => "Set",
            TypeKind::Array => "Array",
            TypeKind::Map => "Map",
            TypeKind::Object(Some(name)) => name,
            TypeKind::Object(None) => "object",
            TypeKind::Interface(name) => name,
            TypeKind::Wildcard => {
                return match self.upper_bound() {
                    Some(bound) => write!(f, "? extends {}", bound),
                    None => write!(f, "?"),
                };
            }
        };
        write!(f, "{}", name)?;

        if !self.type_args().is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.type_args().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality_and_hash() {
        let a = TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::list(TypeDescriptor::i32()));
        let b = TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::list(TypeDescriptor::i32()));
        let c = TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::list(TypeDescriptor::i64()));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_raw_detection() {
        assert!(TypeDescriptor::of(TypeKind::List).is_raw());
        assert!(TypeDescriptor::of(TypeKind::Map).is_raw());
        assert!(!TypeDescriptor::list(TypeDescriptor::string()).is_raw());
        assert!(!TypeDescriptor::string().is_raw());
    }

    #[test]
    fn test_supertype_relations() {
        assert!(TypeDescriptor::any().is_supertype_of(&TypeDescriptor::uuid()));
        assert!(TypeDescriptor::number().is_supertype_of(&TypeDescriptor::f32()));
        assert!(!TypeDescriptor::number().is_supertype_of(&TypeDescriptor::string()));

        let raw_list = TypeDescriptor::of(TypeKind::List);
        assert!(raw_list.is_supertype_of(&TypeDescriptor::list(TypeDescriptor::i32())));
        assert!(!raw_list.is_supertype_of(&TypeDescriptor::set(TypeDescriptor::i32())));

        let numbers = TypeDescriptor::list(TypeDescriptor::number());
        assert!(numbers.is_supertype_of(&TypeDescriptor::list(TypeDescriptor::i32())));
        assert!(!TypeDescriptor::list(TypeDescriptor::i32()).is_supertype_of(&numbers));

        let bounded = TypeDescriptor::list(TypeDescriptor::wildcard_extends(TypeDescriptor::number()));
        assert!(bounded.is_supertype_of(&TypeDescriptor::list(TypeDescriptor::i32())));
        assert!(!bounded.is_supertype_of(&TypeDescriptor::list(TypeDescriptor::string())));
    }

    #[test]
    fn test_wildcard_candidate_uses_upper_bound() {
        let wildcard = TypeDescriptor::wildcard_extends(TypeDescriptor::number());
        assert!(wildcard.is_supertype_of(&TypeDescriptor::i16()));
        assert!(TypeDescriptor::number().is_supertype_of(&wildcard));
        assert_eq!(TypeDescriptor::wildcard().resolve_wildcard(), TypeDescriptor::any());
    }

    #[test]
    fn test_enum_and_object_supertypes() {
        let colors = TypeDescriptor::enumeration(EnumDescriptor::new("Color", ["RED", "GREEN"]));
        assert!(TypeDescriptor::any_enum().is_supertype_of(&colors));
        assert!(TypeDescriptor::any_object().is_supertype_of(&TypeDescriptor::object("Pet")));
        assert!(TypeDescriptor::any_object().is_supertype_of(&TypeDescriptor::interface("Animal")));
        assert!(!TypeDescriptor::object("Pet").is_supertype_of(&TypeDescriptor::object("Dog")));
    }

    #[test]
    fn test_display() {
        let ty = TypeDescriptor::map(
            TypeDescriptor::string(),
            TypeDescriptor::list(TypeDescriptor::wildcard_extends(TypeDescriptor::number())),
        );
        assert_eq!(ty.to_string(), "Map<string, List<? extends number>>");
        assert_eq!(TypeDescriptor::object("Pet").to_string(), "Pet");
    }
}
