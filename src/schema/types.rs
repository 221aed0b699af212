//! Attribute metadata types.
//!
//! These types describe attributes to the host: semantic type, capability
//! flags and the introspection records derived from them. They carry no
//! behavior; the closures that move values live in
//! [`AttributeDescriptor`](super::descriptor::AttributeDescriptor).

use crate::attribute::ObjectClass;
use serde::{Deserialize, Serialize};

/// Semantic type of an attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    /// Case-sensitive text
    String,
    /// Text compared without regard to case
    StringCaseInsensitive,
    /// Boolean value
    Boolean,
    /// Secret text such as a password
    GuardedSecret,
    /// Timestamp
    DateTime,
    /// UUID
    Uuid,
}

impl SemanticType {
    /// Compare two values of this type for equality.
    pub fn matches(&self, left: &str, right: &str) -> bool {
        match self {
            Self::StringCaseInsensitive => left.eq_ignore_ascii_case(right),
            _ => left == right,
        }
    }
}

/// Capability flag on an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeFlag {
    /// Must be supplied on create
    Required,
    /// Never applied on create
    NotCreatable,
    /// Never applied on update
    NotUpdateable,
    /// Never returned on reads
    NotReadable,
    /// Returned only when explicitly requested
    NotReturnedByDefault,
}

/// The set of flags on one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFlags {
    required: bool,
    not_creatable: bool,
    not_updateable: bool,
    not_readable: bool,
    not_returned_by_default: bool,
}

impl AttributeFlags {
    /// Build a flag set from a list of flags.
    pub fn from_slice(flags: &[AttributeFlag]) -> Self {
        flags
            .iter()
            .fold(Self::default(), |acc, flag| acc.with(*flag))
    }

    /// Return a copy with `flag` set.
    pub fn with(mut self, flag: AttributeFlag) -> Self {
        match flag {
            AttributeFlag::Required => self.required = true,
            AttributeFlag::NotCreatable => self.not_creatable = true,
            AttributeFlag::NotUpdateable => self.not_updateable = true,
            AttributeFlag::NotReadable => self.not_readable = true,
            AttributeFlag::NotReturnedByDefault => self.not_returned_by_default = true,
        }
        self
    }

    pub fn contains(&self, flag: AttributeFlag) -> bool {
        match flag {
            AttributeFlag::Required => self.required,
            AttributeFlag::NotCreatable => self.not_creatable,
            AttributeFlag::NotUpdateable => self.not_updateable,
            AttributeFlag::NotReadable => self.not_readable,
            AttributeFlag::NotReturnedByDefault => self.not_returned_by_default,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_creatable(&self) -> bool {
        !self.not_creatable
    }

    pub fn is_updateable(&self) -> bool {
        !self.not_updateable
    }

    pub fn is_readable(&self) -> bool {
        !self.not_readable
    }

    pub fn is_returned_by_default(&self) -> bool {
        !self.not_returned_by_default
    }
}

/// The role an attribute plays in its object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    /// Immutable, server-assigned identifier
    Identifier,
    /// Unique, mutable primary name
    DisplayName,
    /// Plain single-valued attribute
    Single,
    /// Attribute with a set of values changed by add/remove
    MultiValued,
}

/// Introspection record for one attribute.
///
/// Every field is derived mechanically from the descriptor's kind, type and
/// flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub multi_valued: bool,
    pub required: bool,
    pub creatable: bool,
    pub updateable: bool,
    pub readable: bool,
    pub returned_by_default: bool,
}

/// Introspection record for one object class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClassInfo {
    pub object_class: ObjectClass,
    pub attributes: Vec<AttributeInfo>,
}

impl ObjectClassInfo {
    /// Find an attribute record by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
