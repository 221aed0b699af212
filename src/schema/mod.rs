//! Declarative schema mapping between host attributes and remote entities.
//!
//! Each object class is described by a [`SchemaDefinition`]: an ordered table
//! of [`AttributeDescriptor`]s that know how to stage a value into a staging
//! model and how to read it back from a remote entity. The same table drives
//! create, update, read and introspection.
//!
//! # Key Types
//!
//! - [`SchemaDefinition`] - Descriptor table with apply/read operations
//! - [`SchemaDefinitionBuilder`] - Typed registration of descriptors
//! - [`AttributeDescriptor`] - Mapping of one attribute
//! - [`CustomAttribute`] - Parsed `name$type` declaration
//!
//! # Examples
//!
//! ```rust
//! use directory_connector::attribute::{AttributeSet, ObjectClass};
//! use directory_connector::schema::{SchemaDefinition, SemanticType};
//!
//! #[derive(Default)]
//! struct Draft {
//!     name: Option<String>,
//! }
//!
//! struct Entity {
//!     id: String,
//!     name: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = SchemaDefinition::<Draft, Entity>::builder(ObjectClass::new("device"));
//! builder
//!     .add_uid("id", SemanticType::String, |e: &Entity| Some(e.id.clone()), None, &[])
//!     .add_name(
//!         "name",
//!         SemanticType::String,
//!         |value: Option<String>, draft: &mut Draft| draft.name = value,
//!         |e: &Entity| Some(e.name.clone()),
//!         None,
//!         &[],
//!     );
//! let schema = builder.build()?;
//!
//! let mut draft = Draft::default();
//! schema.apply(&AttributeSet::new().with("name", "printer-1"), &mut draft)?;
//! assert_eq!(draft.name.as_deref(), Some("printer-1"));
//! # Ok(())
//! # }
//! ```

pub mod custom;
pub mod definition;
pub mod descriptor;
pub mod types;


pub use custom::{CustomAttribute, CustomAttributeSource, CustomAttributeTarget, CustomAttributeType};
pub use definition::{SchemaDefinition, SchemaDefinitionBuilder};
pub use descriptor::{Accessors, AttributeDescriptor};
pub use types::{
    AttributeFlag, AttributeFlags, AttributeInfo, AttributeKind, ObjectClassInfo, SemanticType,
};
