//! Dynamically configured custom attributes.
//!
//! Custom attributes are declared in configuration as `name$type` tokens,
//! where the type is `string` or `stringArray` (case-insensitive). Each
//! valid token becomes a descriptor named `attributes.<name>` whose closures
//! capture the bare key and read or stage values through the
//! [`CustomAttributeSource`] and [`CustomAttributeTarget`] traits.

use super::definition::SchemaDefinitionBuilder;
use super::types::SemanticType;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of every custom attribute name.
pub const CUSTOM_ATTRIBUTE_PREFIX: &str = "attributes.";

const TOKEN_SEPARATOR: char = '$';

/// Value shape of a custom attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomAttributeType {
    /// One string value
    String,
    /// A set of string values
    StringArray,
}

impl CustomAttributeType {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "stringarray" => Some(Self::StringArray),
            _ => None,
        }
    }
}

/// A parsed custom attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttribute {
    key: String,
    attribute_type: CustomAttributeType,
}

impl CustomAttribute {
    pub fn new(key: impl Into<String>, attribute_type: CustomAttributeType) -> Self {
        Self {
            key: key.into(),
            attribute_type,
        }
    }

    /// Parse one `name$type` token.
    ///
    /// Returns `None` unless the token splits into exactly two parts, the
    /// name is non-empty and the type is known.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split(TOKEN_SEPARATOR);
        let (Some(key), Some(kind), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        CustomAttributeType::parse(kind.trim()).map(|t| Self::new(key, t))
    }

    /// Parse a list of tokens, dropping malformed ones with a warning.
    ///
    /// A key declared more than once keeps its first declaration; later
    /// ones are dropped with a warning as well.
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Vec<Self> {
        let mut seen = BTreeSet::new();
        tokens
            .iter()
            .filter_map(|token| {
                let token = token.as_ref();
                let Some(parsed) = Self::parse(token) else {
                    warn!("Ignoring malformed custom attribute declaration '{}'", token);
                    return None;
                };
                if !seen.insert(parsed.key.clone()) {
                    warn!(
                        "Ignoring custom attribute declaration '{}': '{}' is already declared",
                        token, parsed.key
                    );
                    return None;
                }
                Some(parsed)
            })
            .collect()
    }

    /// Key in the remote attribute store.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attribute_type(&self) -> CustomAttributeType {
        self.attribute_type
    }

    /// Attribute name exposed to the host.
    pub fn qualified_name(&self) -> String {
        format!("{}{}", CUSTOM_ATTRIBUTE_PREFIX, self.key)
    }
}

/// Remote entity that carries a custom attribute store.
pub trait CustomAttributeSource {
    fn custom_attributes(&self) -> &BTreeMap<String, BTreeSet<String>>;
}

/// Staging model that accepts custom attribute changes.
pub trait CustomAttributeTarget {
    /// Replace the value set of `key` with `value`, or clear it.
    fn replace_attribute(&mut self, key: &str, value: Option<String>);

    /// Add values to the set of `key`.
    fn add_attribute_values(&mut self, key: &str, values: Vec<String>);

    /// Remove values from the set of `key`.
    fn remove_attribute_values(&mut self, key: &str, values: Vec<String>);
}

impl<M, E> SchemaDefinitionBuilder<M, E>
where
    M: CustomAttributeTarget + 'static,
    E: CustomAttributeSource + 'static,
{
    /// Register one descriptor per custom attribute. Repeated keys after the
    /// first are skipped.
    pub fn add_custom_attributes(&mut self, custom: &[CustomAttribute]) -> &mut Self {
        let mut seen = BTreeSet::new();
        for attribute in custom {
            if !seen.insert(attribute.key.as_str()) {
                warn!("Skipping repeated custom attribute '{}'", attribute.key);
                continue;
            }
            let name = attribute.qualified_name();
            match attribute.attribute_type() {
                CustomAttributeType::String => {
                    let (set_key, get_key) = (attribute.key.clone(), attribute.key.clone());
                    self.add(
                        &name,
                        SemanticType::String,
                        move |value: Option<String>, model: &mut M| {
                            model.replace_attribute(&set_key, value)
                        },
                        move |entity: &E| {
                            entity
                                .custom_attributes()
                                .get(&get_key)
                                .and_then(|values| values.iter().next().cloned())
                        },
                        None,
                        &[],
                    );
                }
                CustomAttributeType::StringArray => {
                    let add_key = attribute.key.clone();
                    let remove_key = attribute.key.clone();
                    let get_key = attribute.key.clone();
                    self.add_multiple(
                        &name,
                        SemanticType::String,
                        move |values: Vec<String>, model: &mut M| {
                            model.add_attribute_values(&add_key, values)
                        },
                        move |values: Vec<String>, model: &mut M| {
                            model.remove_attribute_values(&remove_key, values)
                        },
                        move |entity: &E| {
                            entity
                                .custom_attributes()
                                .get(&get_key)
                                .map(|values| values.iter().cloned().collect())
                                .unwrap_or_default()
                        },
                        None,
                        &[],
                    );
                }
            }
        }
        self
    }
}
