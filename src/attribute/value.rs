//! Attribute values exchanged with the host.
//!
//! An [`AttributeValue`] is one element of an attribute's value list. The
//! [`ValueType`] trait converts between these erased values and the typed
//! values that descriptor closures work with, so schema builders can be
//! written against `String`, `bool`, `DateTime<Utc>`, `Uuid` or
//! [`GuardedString`] directly.

use crate::error::{ConnectorError, ConnectorResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret string such as a password.
///
/// The content is wiped from memory when the value is dropped, never printed
/// by `Debug` and serialized as a mask.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct GuardedString {
    secret: String,
}

impl GuardedString {
    const MASK: &'static str = "********";

    /// Wrap a clear-text secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Borrow the clear-text secret.
    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// Whether the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for GuardedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MASK)
    }
}

impl Serialize for GuardedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::MASK)
    }
}

impl<'de> Deserialize<'de> for GuardedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(GuardedString::new)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Text value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Timestamp value
    DateTime(DateTime<Utc>),
    /// UUID value
    Uuid(Uuid),
    /// Secret value
    Secret(GuardedString),
}

impl AttributeValue {
    /// Name of the value's variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "datetime",
            Self::Uuid(_) => "uuid",
            Self::Secret(_) => "guarded string",
        }
    }

    /// Borrow the value as a string if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a boolean if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual form used for identifiers and name hints.
    ///
    /// Secrets have no textual form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::DateTime(dt) => Some(dt.to_rfc3339()),
            Self::Uuid(id) => Some(id.to_string()),
            Self::Secret(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<GuardedString> for AttributeValue {
    fn from(value: GuardedString) -> Self {
        Self::Secret(value)
    }
}

/// Conversion between typed values and [`AttributeValue`].
///
/// Implemented for every Rust type a descriptor closure may accept or
/// produce. `attribute` is only used to build the error message.
pub trait ValueType: Sized + Send + Sync + 'static {
    /// Convert an erased value into this type.
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self>;

    /// Convert this value into its erased form.
    fn into_value(self) -> AttributeValue;
}

fn type_mismatch(attribute: &str, expected: &str, actual: &AttributeValue) -> ConnectorError {
    ConnectorError::invalid_attribute(format!(
        "Attribute '{}' expects a {} value, got {}",
        attribute,
        expected,
        actual.type_name()
    ))
}

impl ValueType for String {
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self> {
        match value {
            AttributeValue::String(s) => Ok(s),
            other => Err(type_mismatch(attribute, "string", &other)),
        }
    }

    fn into_value(self) -> AttributeValue {
        AttributeValue::String(self)
    }
}

impl ValueType for bool {
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self> {
        match value {
            AttributeValue::Boolean(b) => Ok(b),
            other => Err(type_mismatch(attribute, "boolean", &other)),
        }
    }

    fn into_value(self) -> AttributeValue {
        AttributeValue::Boolean(self)
    }
}

impl ValueType for DateTime<Utc> {
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self> {
        match value {
            AttributeValue::DateTime(dt) => Ok(dt),
            other => Err(type_mismatch(attribute, "datetime", &other)),
        }
    }

    fn into_value(self) -> AttributeValue {
        AttributeValue::DateTime(self)
    }
}

impl ValueType for Uuid {
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self> {
        match value {
            AttributeValue::Uuid(id) => Ok(id),
            // Hosts frequently carry identifiers as plain strings
            AttributeValue::String(s) => Uuid::parse_str(&s).map_err(|e| {
                ConnectorError::invalid_attribute(format!(
                    "Attribute '{}' expects a UUID: {}",
                    attribute, e
                ))
            }),
            other => Err(type_mismatch(attribute, "uuid", &other)),
        }
    }

    fn into_value(self) -> AttributeValue {
        AttributeValue::Uuid(self)
    }
}

impl ValueType for GuardedString {
    fn from_value(attribute: &str, value: AttributeValue) -> ConnectorResult<Self> {
        match value {
            AttributeValue::Secret(secret) => Ok(secret),
            other => Err(type_mismatch(attribute, "guarded string", &other)),
        }
    }

    fn into_value(self) -> AttributeValue {
        AttributeValue::Secret(self)
    }
}
