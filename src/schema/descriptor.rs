//! Attribute descriptors.
//!
//! A descriptor is the declarative unit that maps one logical attribute to
//! the staging model (write side) and to the remote entity (read side). The
//! accessors are plain closures stored in a tagged [`Accessors`] variant, so
//! each kind carries exactly the functions it needs. Typed closures supplied
//! to the builder are wrapped here into closures over [`AttributeValue`].

use super::types::{AttributeFlag, AttributeFlags, AttributeInfo, AttributeKind, SemanticType};
use crate::attribute::{AttributeValue, ValueType};
use crate::error::ConnectorResult;

/// Writes one optional value into a staging model. `None` clears.
pub type Setter<M> =
    Box<dyn Fn(Option<AttributeValue>, &mut M) -> ConnectorResult<()> + Send + Sync>;

/// Adds or removes a list of values on a staging model.
pub type MultiSetter<M> =
    Box<dyn Fn(Vec<AttributeValue>, &mut M) -> ConnectorResult<()> + Send + Sync>;

/// Reads the values of an attribute from a remote entity.
pub type Getter<E> = Box<dyn Fn(&E) -> Vec<AttributeValue> + Send + Sync>;

/// Kind-specific accessor closures.
pub enum Accessors<M, E> {
    /// Server-assigned identifier: read only
    Identifier { getter: Getter<E> },
    /// Primary name: written on create, renamed on update
    DisplayName { setter: Setter<M>, getter: Getter<E> },
    /// Plain attribute; either side may be absent for read-only or write-only attributes
    Single {
        setter: Option<Setter<M>>,
        getter: Option<Getter<E>>,
    },
    /// Value set changed incrementally
    MultiValued {
        adder: MultiSetter<M>,
        remover: MultiSetter<M>,
        getter: Getter<E>,
    },
}

/// Mapping of one logical attribute.
pub struct AttributeDescriptor<M, E> {
    name: String,
    semantic_type: SemanticType,
    flags: AttributeFlags,
    remote_field: Option<String>,
    accessors: Accessors<M, E>,
}

impl<M, E> AttributeDescriptor<M, E> {
    pub(crate) fn new(
        name: impl Into<String>,
        semantic_type: SemanticType,
        flags: AttributeFlags,
        remote_field: Option<&str>,
        accessors: Accessors<M, E>,
    ) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            flags,
            remote_field: remote_field.map(str::to_string),
            accessors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    pub fn flags(&self) -> AttributeFlags {
        self.flags
    }

    pub fn accessors(&self) -> &Accessors<M, E> {
        &self.accessors
    }

    pub fn kind(&self) -> AttributeKind {
        match self.accessors {
            Accessors::Identifier { .. } => AttributeKind::Identifier,
            Accessors::DisplayName { .. } => AttributeKind::DisplayName,
            Accessors::Single { .. } => AttributeKind::Single,
            Accessors::MultiValued { .. } => AttributeKind::MultiValued,
        }
    }

    /// Remote field to fetch for this attribute: the hint, or the attribute name.
    pub fn remote_field(&self) -> &str {
        self.remote_field.as_deref().unwrap_or(&self.name)
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self.accessors, Accessors::MultiValued { .. })
    }

    pub fn is_creatable(&self) -> bool {
        self.flags.is_creatable()
    }

    pub fn is_updateable(&self) -> bool {
        self.flags.is_updateable()
    }

    /// Readable means flagged readable and backed by a getter.
    pub fn is_readable(&self) -> bool {
        self.flags.is_readable()
            && !matches!(self.accessors, Accessors::Single { getter: None, .. })
    }

    pub fn is_returned_by_default(&self) -> bool {
        self.flags.is_returned_by_default()
    }

    /// Read this attribute's values from a remote entity.
    pub fn read(&self, entity: &E) -> Vec<AttributeValue> {
        match &self.accessors {
            Accessors::Identifier { getter }
            | Accessors::DisplayName { getter, .. }
            | Accessors::MultiValued { getter, .. }
            | Accessors::Single {
                getter: Some(getter),
                ..
            } => getter(entity),
            Accessors::Single { getter: None, .. } => Vec::new(),
        }
    }

    /// Introspection record derived from kind, type and flags.
    pub fn info(&self) -> AttributeInfo {
        let writable = |allowed: bool| {
            allowed
                && match &self.accessors {
                    Accessors::Identifier { .. } => false,
                    Accessors::Single { setter, .. } => setter.is_some(),
                    _ => true,
                }
        };

        AttributeInfo {
            name: self.name.clone(),
            kind: self.kind(),
            semantic_type: self.semantic_type,
            multi_valued: self.is_multi_valued(),
            required: self.flags.is_required(),
            creatable: writable(self.flags.is_creatable()),
            updateable: writable(self.flags.is_updateable()),
            readable: self.is_readable(),
            returned_by_default: self.is_readable() && self.is_returned_by_default(),
        }
    }
}

impl<M, E> std::fmt::Debug for AttributeDescriptor<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("semantic_type", &self.semantic_type)
            .field("flags", &self.flags)
            .field("remote_field", &self.remote_field)
            .finish()
    }
}

/// Wrap a typed setter.
pub(crate) fn setter<M, T, F>(name: &str, f: F) -> Setter<M>
where
    M: 'static,
    T: ValueType,
    F: Fn(Option<T>, &mut M) + Send + Sync + 'static,
{
    let name = name.to_string();
    Box::new(move |value, model| {
        let typed = value.map(|v| T::from_value(&name, v)).transpose()?;
        f(typed, model);
        Ok(())
    })
}

/// Wrap a typed adder or remover.
pub(crate) fn multi_setter<M, T, F>(name: &str, f: F) -> MultiSetter<M>
where
    M: 'static,
    T: ValueType,
    F: Fn(Vec<T>, &mut M) + Send + Sync + 'static,
{
    let name = name.to_string();
    Box::new(move |values, model| {
        let typed = values
            .into_iter()
            .map(|v| T::from_value(&name, v))
            .collect::<ConnectorResult<Vec<T>>>()?;
        f(typed, model);
        Ok(())
    })
}

/// Wrap a typed single-value getter.
pub(crate) fn getter<E, T, F>(f: F) -> Getter<E>
where
    E: 'static,
    T: ValueType,
    F: Fn(&E) -> Option<T> + Send + Sync + 'static,
{
    Box::new(move |entity| f(entity).map(T::into_value).into_iter().collect())
}

/// Wrap a typed multi-value getter.
pub(crate) fn multi_getter<E, T, F>(f: F) -> Getter<E>
where
    E: 'static,
    T: ValueType,
    F: Fn(&E) -> Vec<T> + Send + Sync + 'static,
{
    Box::new(move |entity| f(entity).into_iter().map(T::into_value).collect())
}

/// Flags forced onto identifiers and read-only attributes.
pub(crate) const READ_ONLY_FLAGS: [AttributeFlag; 2] =
    [AttributeFlag::NotCreatable, AttributeFlag::NotUpdateable];

/// Flags forced onto write-only attributes.
pub(crate) const WRITE_ONLY_FLAGS: [AttributeFlag; 2] = [
    AttributeFlag::NotReadable,
    AttributeFlag::NotReturnedByDefault,
];
