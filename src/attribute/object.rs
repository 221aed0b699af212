//! Object identity and read results.

use super::set::{Attribute, AttributeSet};
use super::value::AttributeValue;
use serde::Serialize;
use std::fmt;

/// The type tag of a directory object, such as `user` or `group`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectClass(String);

impl ObjectClass {
    /// Object class value for users.
    pub const USER: &'static str = "user";
    /// Object class value for groups.
    pub const GROUP: &'static str = "group";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn group() -> Self {
        Self::new(Self::GROUP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable identifier of a remote object.
///
/// The optional name hint carries the object's display name when it is
/// known, which lets callers address name-keyed remote calls without an
/// extra lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uid {
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_hint: Option<String>,
}

impl Uid {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name_hint: None,
        }
    }

    pub fn with_name_hint(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name_hint: Some(name.into()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn name_hint(&self) -> Option<&str> {
        self.name_hint.as_deref()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A remote object converted into the host's attribute representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorObject {
    object_class: ObjectClass,
    uid: Uid,
    name: String,
    attributes: AttributeSet,
}

impl ConnectorObject {
    pub fn new(object_class: ObjectClass, uid: Uid, name: String, attributes: AttributeSet) -> Self {
        Self {
            object_class,
            uid,
            name,
            attributes,
        }
    }

    pub fn object_class(&self) -> &ObjectClass {
        &self.object_class
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Get a returned attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Get the first value of a returned attribute.
    pub fn single_value(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.first_value(name)
    }
}
