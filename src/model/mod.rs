//! Staging models for create and update requests.
//!
//! The schema's setters write into a staging model; the handler then reads
//! the dirty flags, staged attribute sets and relation lists to decide which
//! remote calls to issue. Models are call-local and discarded afterwards.

pub mod group;
pub mod staging;
pub mod user;

pub use group::GroupModel;
pub use staging::{DirtyFlags, RelationChanges, StagedAttributes};
pub use user::UserModel;
