//! Host-side attribute representation.
//!
//! These are the abstract values the management console speaks: attribute
//! sets for create requests and read results, deltas for updates, and the
//! identity types that name objects.
//!
//! # Key Types
//!
//! - [`AttributeValue`] - One erased attribute value
//! - [`AttributeSet`] - Named attributes with value lists
//! - [`AttributeDelta`] - Add/remove instruction for one attribute
//! - [`ConnectorObject`] - A remote object converted for the host

pub mod object;
pub mod set;
pub mod value;

pub use object::{ConnectorObject, ObjectClass, Uid};
pub use set::{Attribute, AttributeDelta, AttributeSet};
pub use value::{AttributeValue, GuardedString, ValueType};

/// Operational attribute carrying the account password.
pub const PASSWORD_NAME: &str = "__PASSWORD__";

/// Operational attribute carrying the enabled state.
pub const ENABLE_NAME: &str = "__ENABLE__";
