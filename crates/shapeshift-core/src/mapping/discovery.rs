//! Field discovery and instance construction
//!
//! A [`FieldDiscoverer`] tells the mapper factory which fields a concrete
//! object type has and how its instances are built. [`SchemaDiscoverer`]
//! serves hand-registered [`ObjectSchema`]s describing plain Rust structs.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use super::field::{FieldInfo, FieldValidator};
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{FromValue, Instance, IntoValue, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Converted field values gathered before an instance is completed
///
/// Entries are `(field index, value)` in assignment order.
#[derive(Debug, Clone, Default)]
pub struct Intermediate {
    assignments: Vec<(usize, Value)>,
}

impl Intermediate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, index: usize, value: Value) {
        self.assignments.push((index, value));
    }

    pub fn assignments(&self) -> &[(usize, Value)] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn into_assignments(self) -> Vec<(usize, Value)> {
        self.assignments
    }
}

/// Two-phase construction of object instances
pub trait InstanceFactory: Send + Sync {
    fn begin(&self) -> Intermediate {
        Intermediate::new()
    }

    /// Build a fresh instance from the gathered values
    fn complete(&self, intermediate: Intermediate) -> Result<Instance>;

    /// Apply the gathered values to an existing instance
    fn complete_into(&self, instance: &mut Instance, intermediate: Intermediate) -> Result<()>;
}

/// What a discoverer found for one concrete type
pub struct Discovery {
    pub fields: Vec<FieldInfo>,
    pub factory: Arc<dyn InstanceFactory>,
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Source of object field metadata
pub trait FieldDiscoverer: Send + Sync {
    /// Fields and factory for `ty`, or `None` when this discoverer does not
    /// know the type
    fn discover(&self, ty: &TypeDescriptor) -> Result<Option<Discovery>>;

    /// Concrete type registered under a discriminator name
    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        let _ = name;
        None
    }

    /// Nominal subtyping known to this discoverer
    fn is_subtype(&self, concrete: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
        let _ = (concrete, declared);
        false
    }
}

type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Field layout of one Rust struct exposed as an object type
pub struct ObjectSchema {
    type_descriptor: TypeDescriptor,
    type_id: TypeId,
    fields: Vec<FieldInfo>,
    supertypes: Vec<TypeDescriptor>,
    constructor: Option<Constructor>,
}

impl ObjectSchema {
    /// Start describing `T` as the object type `name`
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> ObjectSchemaBuilder<T> {
        ObjectSchemaBuilder {
            type_descriptor: TypeDescriptor::object(name),
            fields: Vec::new(),
            supertypes: Vec::new(),
            constructor: None,
            error: None,
            _marker: PhantomData,
        }
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    pub fn name(&self) -> &str {
        self.type_descriptor.name().unwrap_or_default()
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Declared interfaces and inherited object types
    pub fn supertypes(&self) -> &[TypeDescriptor] {
        &self.supertypes
    }

    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    fn apply(&self, target: &mut dyn Any, intermediate: Intermediate) -> Result<()> {
        for (index, value) in intermediate.into_assignments() {
            let field = self.fields.get(index).ok_or_else(|| {
                Error::configuration(format!("{} has no field #{}", self.type_descriptor, index))
            })?;
            field.set(target, value)?;
        }
        Ok(())
    }
}

impl InstanceFactory for ObjectSchema {
    fn complete(&self, intermediate: Intermediate) -> Result<Instance> {
        let constructor = self.constructor.as_ref().ok_or_else(|| {
            Error::conversion_failed(
                &self.type_descriptor,
                &self.type_descriptor,
                "Unable to create instances for this type",
            )
        })?;
        let mut data = constructor();
        self.apply(&mut *data, intermediate)?;
        Ok(Instance::from_boxed(self.type_descriptor.clone(), data))
    }

    fn complete_into(&self, instance: &mut Instance, intermediate: Intermediate) -> Result<()> {
        let type_descriptor = instance.type_descriptor().clone();
        let data = instance.data_mut().ok_or_else(|| {
            Error::conversion_failed(
                &type_descriptor,
                &self.type_descriptor,
                "instance is shared and cannot be updated in place",
            )
        })?;
        self.apply(data, intermediate)
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("type", &self.type_descriptor)
            .field("fields", &self.fields)
            .field("supertypes", &self.supertypes)
            .field("instantiable", &self.is_instantiable())
            .finish()
    }
}

/// Builder for [`ObjectSchema`]
///
/// Mistakes are remembered and reported by [`build`](Self::build) so the
/// chain itself stays infallible.
pub struct ObjectSchemaBuilder<T> {
    type_descriptor: TypeDescriptor,
    fields: Vec<FieldInfo>,
    supertypes: Vec<TypeDescriptor>,
    constructor: Option<Constructor>,
    error: Option<Error>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ObjectSchemaBuilder<T> {
    pub fn constructor<C>(mut self, constructor: C) -> Self
    where
        C: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move || -> Box<dyn Any + Send + Sync> {
            Box::new(constructor())
        }));
        self
    }

    /// Build instances from `T::default()`
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    /// Add a field whose Rust type maps straight onto a [`Value`] variant
    pub fn field<F, G, S>(self, name: &str, field_type: TypeDescriptor, getter: G, setter: S) -> Self
    where
        F: IntoValue + FromValue + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let field = self.accessors(name, field_type, getter, setter);
        self.push(field)
    }

    /// Add a field checked by `validator` after conversion
    pub fn validated_field<F, G, S>(
        self,
        name: &str,
        field_type: TypeDescriptor,
        validator: impl FieldValidator + 'static,
        getter: G,
        setter: S,
    ) -> Self
    where
        F: IntoValue + FromValue + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let field = self
            .accessors(name, field_type, getter, setter)
            .with_validator(validator);
        self.push(field)
    }

    /// Add a field holding a nested object of the concrete type `field_type`
    pub fn object_field<F, G, S>(self, name: &str, field_type: TypeDescriptor, getter: G, setter: S) -> Self
    where
        F: Any + Clone + Send + Sync,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let owner = self.type_descriptor.to_string();
        let read_owner = owner.clone();
        let nested = field_type.clone();
        let field = FieldInfo::new(
            name,
            field_type,
            Arc::new(move |instance: &dyn Any| -> Result<Value> {
                let outer = downcast::<T>(instance, &read_owner)?;
                Ok(Value::Object(Instance::new(nested.clone(), getter(outer))))
            }),
            Arc::new(move |target: &mut dyn Any, value: Value| -> Result<()> {
                let outer = downcast_mut::<T>(target, &owner)?;
                let instance = Instance::from_value(value)?;
                let actual = instance.type_descriptor().clone();
                let inner = instance.take::<F>().ok_or_else(|| {
                    Error::conversion_failed(&actual, &owner, "nested instance has an unexpected Rust type")
                })?;
                setter(outer, inner);
                Ok(())
            }),
        );
        self.push(field)
    }

    /// Declare that this type implements the interface `name`
    pub fn implements(mut self, name: &str) -> Self {
        let interface = TypeDescriptor::interface(name);
        if !self.supertypes.contains(&interface) {
            self.supertypes.push(interface);
        }
        self
    }

    /// Inherit the fields and supertypes of `parent`, embedded in `T` as a `P`
    ///
    /// Inherited fields come before the fields declared afterwards.
    pub fn inherit<P: Any>(
        mut self,
        parent: &ObjectSchema,
        project: fn(&T) -> &P,
        project_mut: fn(&mut T) -> &mut P,
    ) -> Self {
        if parent.type_id != TypeId::of::<P>() {
            self.error.get_or_insert_with(|| {
                Error::configuration(format!(
                    "schema {} does not describe the embedded parent of {}",
                    parent.type_descriptor, self.type_descriptor
                ))
            });
            return self;
        }
        for field in &parent.fields {
            let projected = field.project(project, project_mut);
            self = self.push(projected);
        }
        for supertype in std::iter::once(&parent.type_descriptor).chain(&parent.supertypes) {
            if !self.supertypes.contains(supertype) {
                self.supertypes.push(supertype.clone());
            }
        }
        self
    }

    pub fn build(self) -> Result<ObjectSchema> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(ObjectSchema {
            type_descriptor: self.type_descriptor,
            type_id: TypeId::of::<T>(),
            fields: self.fields,
            supertypes: self.supertypes,
            constructor: self.constructor,
        })
    }

    fn push(mut self, field: FieldInfo) -> Self {
        if self.fields.iter().any(|f| f.name() == field.name()) {
            self.error.get_or_insert_with(|| {
                Error::configuration(format!(
                    "field '{}' is declared twice on {}",
                    field.name(),
                    self.type_descriptor
                ))
            });
        } else {
            self.fields.push(field);
        }
        self
    }

    fn accessors<F, G, S>(&self, name: &str, field_type: TypeDescriptor, getter: G, setter: S) -> FieldInfo
    where
        F: IntoValue + FromValue + 'static,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let owner = self.type_descriptor.to_string();
        let read_owner = owner.clone();
        FieldInfo::new(
            name,
            field_type,
            Arc::new(move |instance: &dyn Any| -> Result<Value> {
                let outer = downcast::<T>(instance, &read_owner)?;
                Ok(getter(outer).into_value())
            }),
            Arc::new(move |target: &mut dyn Any, value: Value| -> Result<()> {
                let outer = downcast_mut::<T>(target, &owner)?;
                setter(outer, F::from_value(value)?);
                Ok(())
            }),
        )
    }
}

fn downcast<'a, T: Any>(instance: &'a dyn Any, owner: &str) -> Result<&'a T> {
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| Error::configuration(format!("instance is not a {}", owner)))
}

fn downcast_mut<'a, T: Any>(instance: &'a mut dyn Any, owner: &str) -> Result<&'a mut T> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| Error::configuration(format!("instance is not a {}", owner)))
}

/// Discoverer backed by registered [`ObjectSchema`]s, keyed by type name
#[derive(Debug, Clone, Default)]
pub struct SchemaDiscoverer {
    schemas: HashMap<String, Arc<ObjectSchema>>,
}

impl SchemaDiscoverer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: ObjectSchema) -> Result<()> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(Error::configuration(format!(
                "a schema named {} is already registered",
                name
            )));
        }
        self.schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Chaining form of [`register`](Self::register)
    pub fn with(mut self, schema: ObjectSchema) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    pub fn schema(&self, name: &str) -> Option<&Arc<ObjectSchema>> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl FieldDiscoverer for SchemaDiscoverer {
    fn discover(&self, ty: &TypeDescriptor) -> Result<Option<Discovery>> {
        let TypeKind::Object(Some(name)) = ty.kind() else {
            return Ok(None);
        };
        Ok(self.schemas.get(&**name).map(|schema| Discovery {
            fields: schema.fields.clone(),
            factory: schema.clone(),
        }))
    }

    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.schemas
            .get(name)
            .map(|schema| schema.type_descriptor.clone())
    }

    fn is_subtype(&self, concrete: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
        concrete
            .name()
            .and_then(|name| self.schemas.get(name))
            .is_some_and(|schema| schema.supertypes.contains(declared))
    }
}
