//! Remote entities exchanged with the identity service.
//!
//! These mirror the service's resources: plain data with no behavior beyond
//! construction. Multi-valued custom attributes are kept as ordered sets keyed
//! by attribute name. Group memberships are not part of the remote resource;
//! handlers fill [`RemoteUser::groups`] and [`RemoteGroup::groups`] through a
//! separate relation lookup, and only when the host asked for them.

use crate::schema::CustomAttributeSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Custom attribute store of a remote entity.
pub type AttributeStore = BTreeMap<String, BTreeSet<String>>;

/// A user as held by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    /// Server-assigned key; absent until the user is created
    pub key: Option<Uuid>,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub active: bool,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: AttributeStore,
    /// Direct group memberships, filled only when requested
    #[serde(skip)]
    pub groups: Option<Vec<String>>,
}

impl RemoteUser {
    /// Create an active user with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            key: None,
            name: name.into(),
            first_name: None,
            last_name: None,
            display_name: None,
            email_address: None,
            active: true,
            created_date: None,
            updated_date: None,
            attributes: AttributeStore::new(),
            groups: None,
        }
    }
}

impl Default for RemoteUser {
    fn default() -> Self {
        Self::new("")
    }
}

impl CustomAttributeSource for RemoteUser {
    fn custom_attributes(&self) -> &AttributeStore {
        &self.attributes
    }
}

/// A group as held by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGroup {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub attributes: AttributeStore,
    /// Direct parent groups, filled only when requested
    #[serde(skip)]
    pub groups: Option<Vec<String>>,
}

impl RemoteGroup {
    /// Create an active group with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            active: true,
            attributes: AttributeStore::new(),
            groups: None,
        }
    }
}

impl Default for RemoteGroup {
    fn default() -> Self {
        Self::new("")
    }
}

impl CustomAttributeSource for RemoteGroup {
    fn custom_attributes(&self) -> &AttributeStore {
        &self.attributes
    }
}
