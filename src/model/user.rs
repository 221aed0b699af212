//! Staging model for users.

use super::staging::{DirtyFlags, RelationChanges, StagedAttributes};
use crate::attribute::GuardedString;
use crate::client::{AttributeStore, RemoteUser};
use crate::schema::CustomAttributeTarget;

/// Changes requested for one user.
///
/// Built fresh for every create or update call, filled by the schema's
/// setters and consumed by the user handler.
#[derive(Debug, Clone, Default)]
pub struct UserModel {
    user: RemoteUser,
    new_name: Option<String>,
    password: Option<GuardedString>,
    attributes: StagedAttributes,
    groups: RelationChanges,
    flags: DirtyFlags,
}

impl UserModel {
    /// Model for a user that does not exist yet.
    pub fn create() -> Self {
        Self::default()
    }

    /// Model seeded with the current state of an existing user.
    pub fn from_current(user: RemoteUser) -> Self {
        Self {
            attributes: StagedAttributes::from_current(user.attributes.clone()),
            user,
            ..Self::default()
        }
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.new_name = name;
        self.flags.display_name = true;
    }

    pub fn set_password(&mut self, password: Option<GuardedString>) {
        self.password = password;
        self.flags.secret = true;
    }

    /// Set the enabled state. A cleared value keeps the current state but
    /// still marks the core fields as touched.
    pub fn set_active(&mut self, active: Option<bool>) {
        if let Some(active) = active {
            self.user.active = active;
        }
        self.flags.core_fields = true;
    }

    pub fn set_first_name(&mut self, value: Option<String>) {
        self.user.first_name = value;
        self.flags.core_fields = true;
    }

    pub fn set_last_name(&mut self, value: Option<String>) {
        self.user.last_name = value;
        self.flags.core_fields = true;
    }

    pub fn set_display_name(&mut self, value: Option<String>) {
        self.user.display_name = value;
        self.flags.core_fields = true;
    }

    pub fn set_email(&mut self, value: Option<String>) {
        self.user.email_address = value;
        self.flags.core_fields = true;
    }

    pub fn add_groups(&mut self, groups: Vec<String>) {
        self.groups.add(groups);
    }

    pub fn remove_groups(&mut self, groups: Vec<String>) {
        self.groups.remove(groups);
    }

    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    /// The accumulated core fields, still carrying the current name.
    pub fn user(&self) -> &RemoteUser {
        &self.user
    }

    /// The staged primary name, if one was set.
    pub fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    /// The name to rename to, whenever a name was staged.
    pub fn rename_to(&self) -> Option<&str> {
        self.new_name.as_deref().filter(|_| self.flags.display_name)
    }

    pub fn password(&self) -> Option<&GuardedString> {
        self.password.as_ref()
    }

    pub fn pending_attributes(&self) -> &AttributeStore {
        self.attributes.pending()
    }

    pub fn groups(&self) -> &RelationChanges {
        &self.groups
    }

    /// Entity to send on create: the accumulated fields under the staged name,
    /// without custom attributes, which are stored by a separate call.
    pub fn to_new_user(&self) -> Option<RemoteUser> {
        let name = self.new_name.as_ref()?;
        Some(RemoteUser {
            name: name.clone(),
            attributes: AttributeStore::new(),
            groups: None,
            ..self.user.clone()
        })
    }
}

impl CustomAttributeTarget for UserModel {
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
