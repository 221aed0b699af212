//! Per-object-class orchestration.
//!
//! An [`ObjectHandler`] owns the schema of one object class and a handle to
//! the remote service. It turns host requests into staging models through
//! the schema, then issues the remote calls the model's dirty state calls
//! for, in a fixed order. Reads go the other way: fetch remote entities,
//! fill requested relations and convert them through the schema.
//!
//! # Key Types
//!
//! - [`ObjectHandler`] - Operations shared by every object class
//! - [`UserHandler`] - Users, keyed by immutable key
//! - [`GroupHandler`] - Groups, keyed by name
//! - [`ReadOptions`] - Resolved attributes to return and fields to fetch

pub mod group;
pub mod user;

pub use group::GroupHandler;
pub use user::UserHandler;

use crate::attribute::{AttributeDelta, AttributeSet, ConnectorObject, ObjectClass, Uid};
use crate::client::RemoteError;
use crate::error::{ConnectorError, ConnectorResult};
use crate::schema::{ObjectClassInfo, SchemaDefinition};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

/// Attributes to return for a read and the remote fields that back them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    return_attributes: BTreeSet<String>,
    fetch_fields: BTreeSet<String>,
    allow_partial_attribute_values: bool,
}

impl ReadOptions {
    /// Build from an attributes-to-get map of attribute name to remote field.
    pub fn new(attributes_to_get: BTreeMap<String, String>, allow_partial_attribute_values: bool) -> Self {
        let fetch_fields = attributes_to_get.values().cloned().collect();
        Self {
            return_attributes: attributes_to_get.into_keys().collect(),
            fetch_fields,
            allow_partial_attribute_values,
        }
    }

    pub fn return_attributes(&self) -> &BTreeSet<String> {
        &self.return_attributes
    }

    pub fn allow_partial_attribute_values(&self) -> bool {
        self.allow_partial_attribute_values
    }

    /// Whether the remote field `field` must be fetched.
    pub fn fetches(&self, field: &str) -> bool {
        self.fetch_fields.contains(field)
    }

    /// Whether a relation backed by `field` must be looked up. Relations are
    /// skipped when partial values are allowed; they come back marked
    /// incomplete instead.
    pub fn fetches_relation(&self, field: &str) -> bool {
        self.fetches(field) && !self.allow_partial_attribute_values
    }
}

/// Classify a remote result, turning not-found into `None`.
pub(crate) fn optional<T>(result: Result<T, RemoteError>) -> ConnectorResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            let error = ConnectorError::from(error);
            if error.is_not_found() {
                log::debug!("{}", error);
                Ok(None)
            } else {
                Err(error)
            }
        }
    }
}

/// Operations the connector session dispatches to each object class.
///
/// Futures are awaited sequentially by the session, one operation at a time.
pub trait ObjectHandler {
    /// Staging model written by the schema's setters
    type Model: 'static;
    /// Remote entity read by the schema's getters
    type Entity: 'static;

    fn object_class(&self) -> ObjectClass;

    fn schema(&self) -> &SchemaDefinition<Self::Model, Self::Entity>;

    /// Introspection record of this object class.
    fn object_class_info(&self) -> ObjectClassInfo {
        self.schema().object_class_info()
    }

    /// Create an object and return its identifier.
    fn create(&self, attributes: &AttributeSet) -> impl Future<Output = ConnectorResult<Uid>>;

    /// Apply update deltas to an existing object and return its identifier,
    /// carrying the new name when the object was renamed.
    fn update_delta(
        &self,
        uid: &Uid,
        deltas: &[AttributeDelta],
    ) -> impl Future<Output = ConnectorResult<Uid>>;

    fn delete(&self, uid: &Uid) -> impl Future<Output = ConnectorResult<()>>;

    /// Read one object by identifier; `None` when it does not exist.
    fn get_by_uid(
        &self,
        uid: &Uid,
        options: &ReadOptions,
    ) -> impl Future<Output = ConnectorResult<Option<ConnectorObject>>>;

    /// Read one object by name; `None` when it does not exist.
    fn get_by_name(
        &self,
        name: &str,
        options: &ReadOptions,
    ) -> impl Future<Output = ConnectorResult<Option<ConnectorObject>>>;

    /// Enumerate objects page by page, handing each to `handler` until it
    /// returns `false`. Returns the number of objects handed over.
    fn get_all<H>(
        &self,
        options: &ReadOptions,
        page_size: usize,
        page_offset: usize,
        handler: H,
    ) -> impl Future<Output = ConnectorResult<usize>>
    where
        H: FnMut(ConnectorObject) -> bool;

    /// Total number of objects, when the remote service reports it.
    fn count(&self) -> impl Future<Output = ConnectorResult<Option<usize>>>;
}
