//! Building blocks shared by the staging models.
//!
//! A staging model records what a create or update request changes, so the
//! handler can issue exactly the remote calls that are needed. Three kinds
//! of change are tracked separately:
//!
//! - [`DirtyFlags`] say which remote sub-resources were touched at all
//! - [`StagedAttributes`] hold the final value set of each touched custom
//!   attribute; an empty set clears the attribute, an absent key leaves it
//!   alone
//! - [`RelationChanges`] hold membership additions and removals verbatim;
//!   an absent list issues no call, a present list issues exactly one

use crate::client::AttributeStore;
use log::trace;
use std::collections::BTreeSet;

/// Which remote sub-resources a request touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Core fields of the entity, written by one update call
    pub core_fields: bool,
    /// Primary name, written by a rename call
    pub display_name: bool,
    /// Secret, written by a password call
    pub secret: bool,
    /// Custom attribute store, written by one store call
    pub multi_valued_attributes: bool,
}

impl DirtyFlags {
    /// Whether nothing was touched.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Final value sets of the custom attributes a request touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedAttributes {
    current: Option<AttributeStore>,
    pending: AttributeStore,
}

impl StagedAttributes {
    /// Staging area for a new object, with nothing stored yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Staging area seeded with an existing object's stored attributes.
    pub fn from_current(current: AttributeStore) -> Self {
        Self {
            current: Some(current),
            pending: AttributeStore::new(),
        }
    }

    /// Set `key` to a single value, or to the empty set when `value` is `None`.
    pub fn replace(&mut self, key: &str, value: Option<String>) {
        self.pending
            .insert(key.to_string(), value.into_iter().collect());
    }

    /// Add values to `key`, starting from the pending set, else the current set.
    pub fn add(&mut self, key: &str, values: Vec<String>) {
        let mut set = self.base(key);
        set.extend(values);
        trace!("Staged '{}' after add: {:?}", key, set);
        self.pending.insert(key.to_string(), set);
    }

    /// Remove values from `key`, starting from the pending set, else the
    /// current set. The result is staged even when it is empty.
    pub fn remove(&mut self, key: &str, values: Vec<String>) {
        let mut set = self.base(key);
        for value in &values {
            set.remove(value);
        }
        trace!("Staged '{}' after remove: {:?}", key, set);
        self.pending.insert(key.to_string(), set);
    }

    fn base(&self, key: &str) -> BTreeSet<String> {
        self.pending
            .get(key)
            .or_else(|| self.current.as_ref().and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_default()
    }

    /// Staged value sets, keyed by attribute.
    pub fn pending(&self) -> &AttributeStore {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Membership changes, kept in request order without diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationChanges {
    to_add: Option<Vec<String>>,
    to_remove: Option<Vec<String>>,
}

impl RelationChanges {
    pub fn add(&mut self, values: Vec<String>) {
        self.to_add.get_or_insert_with(Vec::new).extend(values);
    }

    pub fn remove(&mut self, values: Vec<String>) {
        self.to_remove.get_or_insert_with(Vec::new).extend(values);
    }

    /// Memberships to add; `None` when no addition was requested.
    pub fn to_add(&self) -> Option<&[String]> {
        self.to_add.as_deref()
    }

    /// Memberships to remove; `None` when no removal was requested.
    pub fn to_remove(&self) -> Option<&[String]> {
        self.to_remove.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_none() && self.to_remove.is_none()
    }
}
