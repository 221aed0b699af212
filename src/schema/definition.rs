//! Schema definitions: the ordered descriptor table for one object class.
//!
//! A [`SchemaDefinition`] is built once per configuration through
//! [`SchemaDefinitionBuilder`] and shared read-only afterwards. It drives the
//! three directions of attribute flow:
//!
//! - [`apply`](SchemaDefinition::apply) writes a create request into a fresh
//!   staging model
//! - [`apply_delta`](SchemaDefinition::apply_delta) writes update deltas into
//!   a staging model seeded from the current remote entity
//! - [`to_connector_object`](SchemaDefinition::to_connector_object) converts
//!   a remote entity into the host's attribute representation
//!
//! The engine is generic over the staging model `M` and the remote entity
//! `E`; it never interprets attribute names itself.

use super::descriptor::{
    self, Accessors, AttributeDescriptor, READ_ONLY_FLAGS, WRITE_ONLY_FLAGS,
};
use super::types::{AttributeFlag, AttributeFlags, AttributeKind, ObjectClassInfo, SemanticType};
use crate::attribute::{
    Attribute, AttributeDelta, AttributeSet, ConnectorObject, ObjectClass, Uid, ValueType,
};
use crate::error::{ConnectorError, ConnectorResult};
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

/// Builder for [`SchemaDefinition`].
///
/// Each `add_*` method registers one descriptor; registration order is the
/// order in which create requests are applied and read results assembled.
pub struct SchemaDefinitionBuilder<M, E> {
    object_class: ObjectClass,
    descriptors: Vec<AttributeDescriptor<M, E>>,
}

impl<M: 'static, E: 'static> SchemaDefinitionBuilder<M, E> {
    pub fn new(object_class: ObjectClass) -> Self {
        Self {
            object_class,
            descriptors: Vec::new(),
        }
    }

    /// Register the identifier. Identifiers are never created or updated.
    pub fn add_uid<T, G>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        getter: G,
        remote_field: Option<&str>,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        G: Fn(&E) -> Option<T> + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            merge_flags(flags, &READ_ONLY_FLAGS),
            remote_field,
            Accessors::Identifier {
                getter: descriptor::getter(getter),
            },
        ))
    }

    /// Register the display name.
    pub fn add_name<T, S, G>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        setter: S,
        getter: G,
        remote_field: Option<&str>,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        S: Fn(Option<T>, &mut M) + Send + Sync + 'static,
        G: Fn(&E) -> Option<T> + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            AttributeFlags::from_slice(flags),
            remote_field,
            Accessors::DisplayName {
                setter: descriptor::setter(name, setter),
                getter: descriptor::getter(getter),
            },
        ))
    }

    /// Register a readable and writable single-valued attribute.
    pub fn add<T, S, G>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        setter: S,
        getter: G,
        remote_field: Option<&str>,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        S: Fn(Option<T>, &mut M) + Send + Sync + 'static,
        G: Fn(&E) -> Option<T> + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            AttributeFlags::from_slice(flags),
            remote_field,
            Accessors::Single {
                setter: Some(descriptor::setter(name, setter)),
                getter: Some(descriptor::getter(getter)),
            },
        ))
    }

    /// Register a single-valued attribute that is only ever read.
    pub fn add_read_only<T, G>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        getter: G,
        remote_field: Option<&str>,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        G: Fn(&E) -> Option<T> + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            merge_flags(flags, &READ_ONLY_FLAGS),
            remote_field,
            Accessors::Single {
                setter: None,
                getter: Some(descriptor::getter(getter)),
            },
        ))
    }

    /// Register a single-valued attribute that is only ever written.
    pub fn add_write_only<T, S>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        setter: S,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        S: Fn(Option<T>, &mut M) + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            merge_flags(flags, &WRITE_ONLY_FLAGS),
            None,
            Accessors::Single {
                setter: Some(descriptor::setter(name, setter)),
                getter: None,
            },
        ))
    }

    /// Register a multi-valued attribute changed through add and remove.
    #[allow(clippy::too_many_arguments)]
    pub fn add_multiple<T, A, R, G>(
        &mut self,
        name: &str,
        semantic_type: SemanticType,
        adder: A,
        remover: R,
        getter: G,
        remote_field: Option<&str>,
        flags: &[AttributeFlag],
    ) -> &mut Self
    where
        T: ValueType,
        A: Fn(Vec<T>, &mut M) + Send + Sync + 'static,
        R: Fn(Vec<T>, &mut M) + Send + Sync + 'static,
        G: Fn(&E) -> Vec<T> + Send + Sync + 'static,
    {
        self.push(AttributeDescriptor::new(
            name,
            semantic_type,
            AttributeFlags::from_slice(flags),
            remote_field,
            Accessors::MultiValued {
                adder: descriptor::multi_setter(name, adder),
                remover: descriptor::multi_setter(name, remover),
                getter: descriptor::multi_getter(getter),
            },
        ))
    }

    pub(crate) fn push(&mut self, descriptor: AttributeDescriptor<M, E>) -> &mut Self {
        trace!(
            "Registering attribute '{}' on '{}'",
            descriptor.name(),
            self.object_class
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Validate the descriptor table and freeze it.
    ///
    /// Fails with [`ConnectorError::InvalidSchema`] unless there is exactly
    /// one identifier, exactly one display name and no duplicate names.
    pub fn build(self) -> ConnectorResult<SchemaDefinition<M, E>> {
        let invalid = |message: String| ConnectorError::InvalidSchema {
            object_class: self.object_class.to_string(),
            message,
        };

        let mut index = HashMap::with_capacity(self.descriptors.len());
        for (position, descriptor) in self.descriptors.iter().enumerate() {
            if index.insert(descriptor.name().to_string(), position).is_some() {
                return Err(invalid(format!(
                    "attribute '{}' is declared more than once",
                    descriptor.name()
                )));
            }
        }

        let positions = |kind: AttributeKind| -> Vec<usize> {
            self.descriptors
                .iter()
                .enumerate()
                .filter(|(_, d)| d.kind() == kind)
                .map(|(i, _)| i)
                .collect()
        };

        let uid_index = match positions(AttributeKind::Identifier).as_slice() {
            [single] => *single,
            found => {
                return Err(invalid(format!(
                    "expected exactly one identifier, found {}",
                    found.len()
                )));
            }
        };
        let name_index = match positions(AttributeKind::DisplayName).as_slice() {
            [single] => *single,
            found => {
                return Err(invalid(format!(
                    "expected exactly one display name, found {}",
                    found.len()
                )));
            }
        };

        debug!(
            "Built schema for '{}' with {} attributes",
            self.object_class,
            self.descriptors.len()
        );

        Ok(SchemaDefinition {
            object_class: self.object_class,
            descriptors: self.descriptors,
            index,
            uid_index,
            name_index,
            default_attributes: OnceLock::new(),
        })
    }
}

fn merge_flags(flags: &[AttributeFlag], forced: &[AttributeFlag]) -> AttributeFlags {
    forced
        .iter()
        .fold(AttributeFlags::from_slice(flags), |acc, flag| acc.with(*flag))
}

/// Immutable descriptor table for one object class.
pub struct SchemaDefinition<M, E> {
    object_class: ObjectClass,
    descriptors: Vec<AttributeDescriptor<M, E>>,
    index: HashMap<String, usize>,
    uid_index: usize,
    name_index: usize,
    default_attributes: OnceLock<BTreeMap<String, String>>,
}

impl<M: 'static, E: 'static> SchemaDefinition<M, E> {
    pub fn builder(object_class: ObjectClass) -> SchemaDefinitionBuilder<M, E> {
        SchemaDefinitionBuilder::new(object_class)
    }
}

impl<M, E> SchemaDefinition<M, E> {
    pub fn object_class(&self) -> &ObjectClass {
        &self.object_class
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &AttributeDescriptor<M, E>> {
        self.descriptors.iter()
    }

    /// Look up a descriptor by attribute name.
    pub fn descriptor(&self, name: &str) -> Option<&AttributeDescriptor<M, E>> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn uid_descriptor(&self) -> &AttributeDescriptor<M, E> {
        &self.descriptors[self.uid_index]
    }

    pub fn name_descriptor(&self) -> &AttributeDescriptor<M, E> {
        &self.descriptors[self.name_index]
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Introspection record for the host.
    pub fn object_class_info(&self) -> ObjectClassInfo {
        ObjectClassInfo {
            object_class: self.object_class.clone(),
            attributes: self.descriptors.iter().map(|d| d.info()).collect(),
        }
    }

    fn unknown_attribute(&self, name: &str) -> ConnectorError {
        ConnectorError::invalid_attribute(format!(
            "Unknown attribute '{}' for object class '{}'",
            name, self.object_class
        ))
    }

    /// Write a create request into a fresh staging model.
    ///
    /// Descriptors are visited in registration order. Identifiers and
    /// attributes flagged not creatable are never invoked. An attribute the
    /// schema does not declare fails the whole request before anything is
    /// staged.
    pub fn apply(&self, attributes: &AttributeSet, model: &mut M) -> ConnectorResult<()> {
        if let Some(unknown) = attributes.names().find(|n| !self.index.contains_key(*n)) {
            return Err(self.unknown_attribute(unknown));
        }

        for descriptor in &self.descriptors {
            let Some(attribute) = attributes.get(descriptor.name()) else {
                continue;
            };
            if !descriptor.is_creatable() {
                debug!(
                    "Ignoring non-creatable attribute '{}' on create",
                    descriptor.name()
                );
                continue;
            }

            match descriptor.accessors() {
                Accessors::Identifier { .. } => {}
                Accessors::DisplayName { setter, .. }
                | Accessors::Single {
                    setter: Some(setter),
                    ..
                } => setter(attribute.first_value().cloned(), model)?,
                Accessors::Single { setter: None, .. } => {
                    debug!("Attribute '{}' has no setter", descriptor.name());
                }
                Accessors::MultiValued { adder, .. } => {
                    adder(attribute.values().to_vec(), model)?
                }
            }
        }
        Ok(())
    }

    /// Write update deltas into a staging model.
    ///
    /// Single-valued attributes take the first added value; an empty add
    /// list or a remove-only delta clears them. Multi-valued attributes have
    /// their additions applied before their removals.
    pub fn apply_delta(&self, deltas: &[AttributeDelta], model: &mut M) -> ConnectorResult<()> {
        if let Some(unknown) = deltas.iter().find(|d| !self.index.contains_key(d.name())) {
            return Err(self.unknown_attribute(unknown.name()));
        }

        for delta in deltas {
            let Some(descriptor) = self.descriptor(delta.name()) else {
                continue;
            };
            if !descriptor.is_updateable() {
                warn!(
                    "Ignoring delta on non-updateable attribute '{}'",
                    descriptor.name()
                );
                continue;
            }

            match descriptor.accessors() {
                Accessors::Identifier { .. } => {}
                Accessors::DisplayName { setter, .. }
                | Accessors::Single {
                    setter: Some(setter),
                    ..
                } => {
                    if let Some(change) = delta.scalar_change() {
                        setter(change, model)?;
                    }
                }
                Accessors::Single { setter: None, .. } => {
                    debug!("Attribute '{}' has no setter", descriptor.name());
                }
                Accessors::MultiValued { adder, remover, .. } => {
                    if let Some(values) = delta.values_to_add() {
                        adder(values.to_vec(), model)?;
                    }
                    if let Some(values) = delta.values_to_remove() {
                        remover(values.to_vec(), model)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Convert a remote entity into a [`ConnectorObject`].
    ///
    /// The identifier and display name are always present. Other attributes
    /// are included when listed in `return_attributes`, readable and
    /// non-empty. With `allow_partial` set, requested multi-valued attributes
    /// that are not returned by default are marked incomplete instead of
    /// read, because their values were never fetched.
    pub fn to_connector_object(
        &self,
        entity: &E,
        return_attributes: &BTreeSet<String>,
        allow_partial: bool,
    ) -> ConnectorResult<ConnectorObject> {
        let uid = self.text_value(self.uid_descriptor(), entity)?;
        let name = self.text_value(self.name_descriptor(), entity)?;

        let mut attributes = AttributeSet::new();
        for (position, descriptor) in self.descriptors.iter().enumerate() {
            if position == self.uid_index
                || position == self.name_index
                || !descriptor.is_readable()
                || !return_attributes.contains(descriptor.name())
            {
                continue;
            }

            if allow_partial && descriptor.is_multi_valued() && !descriptor.is_returned_by_default()
            {
                attributes.insert(Attribute::incomplete(descriptor.name()));
                continue;
            }

            let values = descriptor.read(entity);
            if !values.is_empty() {
                attributes.insert(Attribute::new(descriptor.name(), values));
            }
        }

        Ok(ConnectorObject::new(
            self.object_class.clone(),
            Uid::with_name_hint(uid, name.clone()),
            name,
            attributes,
        ))
    }

    fn text_value(&self, descriptor: &AttributeDescriptor<M, E>, entity: &E) -> ConnectorResult<String> {
        descriptor
            .read(entity)
            .first()
            .and_then(|v| v.to_text())
            .ok_or_else(|| ConnectorError::Io {
                message: format!(
                    "Remote {} has no value for '{}'",
                    self.object_class,
                    descriptor.name()
                ),
            })
    }

    /// Attributes returned when the host asks for the defaults, mapped to the
    /// remote field that backs each one. Computed once.
    pub fn default_attributes_to_get(&self) -> &BTreeMap<String, String> {
        self.default_attributes.get_or_init(|| {
            self.descriptors
                .iter()
                .filter(|d| d.is_readable() && d.is_returned_by_default())
                .map(|d| (d.name().to_string(), d.remote_field().to_string()))
                .collect()
        })
    }

    /// Resolve the attributes to return for a read, mapped to remote fields.
    ///
    /// Without an explicit list, or when defaults are requested alongside
    /// one, every returned-by-default readable attribute is included.
    /// Explicitly requested attributes are added when they are readable;
    /// unknown names are ignored.
    pub fn attributes_to_get(
        &self,
        requested: Option<&[String]>,
        return_default_attributes: bool,
    ) -> BTreeMap<String, String> {
        let mut resolved = match requested {
            Some(_) if !return_default_attributes => BTreeMap::new(),
            _ => self.default_attributes_to_get().clone(),
        };

        for name in requested.unwrap_or_default() {
            match self.descriptor(name) {
                Some(descriptor) if descriptor.is_readable() => {
                    resolved.insert(
                        descriptor.name().to_string(),
                        descriptor.remote_field().to_string(),
                    );
                }
                Some(_) => debug!("Attribute '{}' is not readable", name),
                None => debug!("Ignoring unknown attribute '{}' in read request", name),
            }
        }
        resolved
    }
}

impl<M, E> std::fmt::Debug for SchemaDefinition<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("object_class", &self.object_class)
            .field("descriptors", &self.descriptors)
            .finish()
    }
}
