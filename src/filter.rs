//! Search filters.
//!
//! The host may pass an arbitrary [`Filter`] tree with a search. Only an
//! equality test on the identifier or the display-name attribute can be
//! answered by a direct lookup; everything else is untranslatable and the
//! search falls back to enumerating every object.

use crate::attribute::{AttributeValue, Uid};

/// Filter expression supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Attribute equals value
    Equals {
        attribute: String,
        value: AttributeValue,
    },
    /// Negation of a filter
    Not(Box<Filter>),
    /// All filters hold
    And(Vec<Filter>),
    /// Any filter holds
    Or(Vec<Filter>),
}

impl Filter {
    /// Create an equality filter.
    pub fn equals(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Negate a filter.
    pub fn negate(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }
}

/// A filter the handlers can answer directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    /// Look up by identifier
    ByUid(Uid),
    /// Look up by display name
    ByName(String),
}

/// Translate a host filter for an object class whose identifier and display
/// name attributes are `uid_attribute` and `name_attribute`.
///
/// Returns `None` when the filter has no direct translation.
pub fn translate(filter: &Filter, uid_attribute: &str, name_attribute: &str) -> Option<SearchFilter> {
    let Filter::Equals { attribute, value } = filter else {
        return None;
    };
    let text = value.to_text()?;
    if attribute == uid_attribute {
        Some(SearchFilter::ByUid(Uid::new(text)))
    } else if attribute == name_attribute {
        Some(SearchFilter::ByName(text))
    } else {
        None
    }
}
