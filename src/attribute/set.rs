//! Attribute sets and update deltas.
//!
//! An [`AttributeSet`] is what the host sends on create and what the
//! connector returns on reads. An [`AttributeDelta`] is one update
//! instruction against a named attribute, expressed as values to add and
//! values to remove. Absent lists and empty lists mean different things:
//! an absent list leaves that side of the change alone, an empty add list on
//! a single-valued attribute clears it.

use super::value::AttributeValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// A named attribute with its values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    name: String,
    values: Vec<AttributeValue>,
    /// Set when the values were deliberately not fetched
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    incomplete: bool,
}

impl Attribute {
    /// Create an attribute with the given values.
    pub fn new(name: impl Into<String>, values: Vec<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            values,
            incomplete: false,
        }
    }

    /// Create a single-valued attribute.
    pub fn single(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new(name, vec![value.into()])
    }

    /// Create an attribute whose values were not fetched.
    pub fn incomplete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            incomplete: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// The first value, if any.
    pub fn first_value(&self) -> Option<&AttributeValue> {
        self.values.first()
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }
}

/// A collection of attributes keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeSet {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing any attribute with the same name.
    pub fn insert(&mut self, attribute: Attribute) {
        self.attributes
            .insert(attribute.name().to_string(), attribute);
    }

    /// Add a single-valued attribute using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(Attribute::single(name, value));
        self
    }

    /// Add a multi-valued attribute using builder pattern.
    pub fn with_values<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        self.insert(Attribute::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Get the first value of an attribute.
    pub fn first_value(&self, name: &str) -> Option<&AttributeValue> {
        self.get(name).and_then(Attribute::first_value)
    }

    /// Check if an attribute exists.
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Iterate over all attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Iterate over attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut set = Self::new();
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}

/// An update instruction for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDelta {
    name: String,
    values_to_add: Option<Vec<AttributeValue>>,
    values_to_remove: Option<Vec<AttributeValue>>,
}

impl AttributeDelta {
    /// Create a delta with explicit add and remove lists.
    pub fn new(
        name: impl Into<String>,
        values_to_add: Option<Vec<AttributeValue>>,
        values_to_remove: Option<Vec<AttributeValue>>,
    ) -> Self {
        Self {
            name: name.into(),
            values_to_add,
            values_to_remove,
        }
    }

    /// Set a single-valued attribute to a new value.
    pub fn replace(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new(name, Some(vec![value.into()]), None)
    }

    /// Clear a single-valued attribute: an empty add list and no remove list.
    pub fn clear(name: impl Into<String>) -> Self {
        Self::new(name, Some(Vec::new()), None)
    }

    /// Add values to a multi-valued attribute.
    pub fn add<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        Self::new(name, Some(collect(values)), None)
    }

    /// Remove values from a multi-valued attribute.
    pub fn remove<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        Self::new(name, None, Some(collect(values)))
    }

    /// Add and remove values in one delta. Additions are applied first.
    pub fn add_and_remove<I, J, V, W>(name: impl Into<String>, add: I, remove: J) -> Self
    where
        I: IntoIterator<Item = V>,
        J: IntoIterator<Item = W>,
        V: Into<AttributeValue>,
        W: Into<AttributeValue>,
    {
        Self::new(name, Some(collect(add)), Some(collect(remove)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values_to_add(&self) -> Option<&[AttributeValue]> {
        self.values_to_add.as_deref()
    }

    pub fn values_to_remove(&self) -> Option<&[AttributeValue]> {
        self.values_to_remove.as_deref()
    }

    /// The change this delta implies for a single-valued attribute.
    ///
    /// `None` means the delta carries nothing to apply. `Some(None)` means
    /// clear the value; `Some(Some(v))` means set it to `v`.
    pub(crate) fn scalar_change(&self) -> Option<Option<AttributeValue>> {
        match (&self.values_to_add, &self.values_to_remove) {
            (Some(add), _) => Some(add.first().cloned()),
            (None, Some(_)) => Some(None),
            (None, None) => None,
        }
    }
}

fn collect<I, V>(values: I) -> Vec<AttributeValue>
where
    I: IntoIterator<Item = V>,
    V: Into<AttributeValue>,
{
    values.into_iter().map(Into::into).collect()
}
