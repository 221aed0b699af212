//! Staging model for groups.

use super::staging::{DirtyFlags, RelationChanges, StagedAttributes};
use crate::client::{AttributeStore, RemoteGroup};
use crate::schema::CustomAttributeTarget;

/// Changes requested for one group.
#[derive(Debug, Clone, Default)]
pub struct GroupModel {
    group: RemoteGroup,
    new_name: Option<String>,
    attributes: StagedAttributes,
    parents: RelationChanges,
    flags: DirtyFlags,
}

impl GroupModel {
    /// Model for a group that does not exist yet.
    pub fn create() -> Self {
        Self::default()
    }

    /// Model seeded with the current state of an existing group.
    pub fn from_current(group: RemoteGroup) -> Self {
        Self {
            attributes: StagedAttributes::from_current(group.attributes.clone()),
            group,
            ..Self::default()
        }
    }

    /// Stage the group name. Only the create path reads it: `groupname` is
    /// not updateable, so no delta reaches this setter and groups have no
    /// rename call.
    pub fn set_name(&mut self, name: Option<String>) {
        self.new_name = name;
        self.flags.display_name = true;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.group.description = description;
        self.flags.core_fields = true;
    }

    /// Set the enabled state. A cleared value keeps the current state but
    /// still marks the core fields as touched.
    pub fn set_active(&mut self, active: Option<bool>) {
        if let Some(active) = active {
            self.group.active = active;
        }
        self.flags.core_fields = true;
    }

    pub fn add_parents(&mut self, parents: Vec<String>) {
        self.parents.add(parents);
    }

    pub fn remove_parents(&mut self, parents: Vec<String>) {
        self.parents.remove(parents);
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn group(&self) -> &RemoteGroup {
        &self.group
    }

    /// Name staged for create.
    pub fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    pub fn pending_attributes(&self) -> &AttributeStore {
        self.attributes.pending()
    }

    pub fn parents(&self) -> &RelationChanges {
        &self.parents
    }

    /// Entity to send on create, without custom attributes.
    pub fn to_new_group(&self) -> Option<RemoteGroup> {
        let name = self.new_name.as_ref()?;
        Some(RemoteGroup {
            name: name.clone(),
            attributes: AttributeStore::new(),
            groups: None,
            ..self.group.clone()
        })
    }
}

impl CustomAttributeTarget for GroupModel {
    fn replace_attribute(&mut self, key: &str, value: Option<String>) {
        self.attributes.replace(key, value);
        self.flags.multi_valued_attributes = true;
    }

    fn add_attribute_values(&mut self, key: &str, values: Vec<String>) {
        self.attributes.add(key, values);
        self.flags.multi_valued_attributes = true;
    }

    fn remove_attribute_values(&mut self, key: &str, values: Vec<String>) {
        self.attributes.remove(key, values);
        self.flags.multi_valued_attributes = true;
    }
}
