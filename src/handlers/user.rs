//! User handler.
//!
//! Users are identified by the immutable key the service assigns on create
//! and addressed by their current name for every mutating call. An update
//! issues at most one call per touched sub-resource, in this order: core
//! fields, rename, password, custom attributes, group additions, group
//! removals. Calls after a rename address the user by its new name.

use super::{ObjectHandler, ReadOptions, optional};
use crate::attribute::{
    AttributeDelta, AttributeSet, ConnectorObject, ENABLE_NAME, GuardedString, ObjectClass,
    PASSWORD_NAME, Uid,
};
use crate::client::{IdentityService, RemoteUser};
use crate::error::{ConnectorError, ConnectorResult};
use crate::model::UserModel;
use crate::pagination::{collect_all, enumerate};
use crate::schema::{AttributeFlag, CustomAttribute, SchemaDefinition, SemanticType};
use log::{debug, info, trace, warn};
use std::sync::Arc;

pub const KEY: &str = "key";
pub const USERNAME: &str = "username";
pub const FIRST_NAME: &str = "first-name";
pub const LAST_NAME: &str = "last-name";
pub const DISPLAY_NAME: &str = "display-name";
pub const EMAIL: &str = "email";
pub const GROUPS: &str = "groups";
pub const CREATED_DATE: &str = "created-date";
pub const UPDATED_DATE: &str = "updated-date";

/// Orchestrates user operations against an [`IdentityService`].
pub struct UserHandler<C> {
    client: Arc<C>,
    schema: SchemaDefinition<UserModel, RemoteUser>,
    relation_page_size: usize,
}

impl<C: IdentityService> UserHandler<C> {
    /// Create a handler. `relation_page_size` sizes the group lookups done
    /// while reading users.
    pub fn new(
        client: Arc<C>,
        schema: SchemaDefinition<UserModel, RemoteUser>,
        relation_page_size: usize,
    ) -> Self {
        Self {
            client,
            schema,
            relation_page_size,
        }
    }

    /// Build the user schema, including the configured custom attributes.
    pub fn create_schema(
        custom: &[CustomAttribute],
    ) -> ConnectorResult<SchemaDefinition<UserModel, RemoteUser>> {
        let mut sb = SchemaDefinition::<UserModel, RemoteUser>::builder(ObjectClass::user());

        sb.add_uid(
            KEY,
            SemanticType::Uuid,
            |user: &RemoteUser| user.key,
            None,
            &[AttributeFlag::Required],
        );

        // Unique and renameable, compared without regard to case
        sb.add_name(
            USERNAME,
            SemanticType::StringCaseInsensitive,
            |value: Option<String>, model: &mut UserModel| model.set_name(value),
            |user: &RemoteUser| Some(user.name.clone()).filter(|n| !n.is_empty()),
            Some("name"),
            &[AttributeFlag::Required],
        );

        sb.add_write_only(
            PASSWORD_NAME,
            SemanticType::GuardedSecret,
            |value: Option<GuardedString>, model: &mut UserModel| model.set_password(value),
            &[],
        );

        sb.add(
            ENABLE_NAME,
            SemanticType::Boolean,
            |value: Option<bool>, model: &mut UserModel| model.set_active(value),
            |user: &RemoteUser| Some(user.active),
            Some("active"),
            &[],
        );

        sb.add(
            LAST_NAME,
            SemanticType::String,
            |value: Option<String>, model: &mut UserModel| model.set_last_name(value),
            |user: &RemoteUser| user.last_name.clone(),
            None,
            &[],
        );
        sb.add(
            FIRST_NAME,
            SemanticType::String,
            |value: Option<String>, model: &mut UserModel| model.set_first_name(value),
            |user: &RemoteUser| user.first_name.clone(),
            None,
            &[],
        );
        sb.add(
            DISPLAY_NAME,
            SemanticType::String,
            |value: Option<String>, model: &mut UserModel| model.set_display_name(value),
            |user: &RemoteUser| user.display_name.clone(),
            None,
            &[],
        );
        sb.add(
            EMAIL,
            SemanticType::String,
            |value: Option<String>, model: &mut UserModel| model.set_email(value),
            |user: &RemoteUser| user.email_address.clone(),
            None,
            &[],
        );

        sb.add_custom_attributes(custom);

        sb.add_multiple(
            GROUPS,
            SemanticType::String,
            |groups: Vec<String>, model: &mut UserModel| model.add_groups(groups),
            |groups: Vec<String>, model: &mut UserModel| model.remove_groups(groups),
            |user: &RemoteUser| user.groups.clone().unwrap_or_default(),
            None,
            &[AttributeFlag::NotReturnedByDefault],
        );

        sb.add_read_only(
            CREATED_DATE,
            SemanticType::DateTime,
            |user: &RemoteUser| user.created_date,
            None,
            &[],
        );
        sb.add_read_only(
            UPDATED_DATE,
            SemanticType::DateTime,
            |user: &RemoteUser| user.updated_date,
            None,
            &[],
        );

        sb.build()
    }

    /// Fill the group relation when the read asks for it.
    async fn fill_relations(&self, user: &mut RemoteUser, options: &ReadOptions) -> ConnectorResult<()> {
        if !options.fetches_relation(GROUPS) {
            return Ok(());
        }
        let name = user.name.clone();
        debug!("Looking up groups of user '{}'", name);
        let groups = collect_all(self.relation_page_size, async |start: usize, size: usize| {
            self.client
                .fetch_user_groups_page(&name, start, size)
                .await
                .map_err(ConnectorError::from)
        })
        .await?;
        user.groups = Some(groups);
        Ok(())
    }

    async fn to_object(&self, mut user: RemoteUser, options: &ReadOptions) -> ConnectorResult<ConnectorObject> {
        self.fill_relations(&mut user, options).await?;
        self.schema.to_connector_object(
            &user,
            options.return_attributes(),
            options.allow_partial_attribute_values(),
        )
    }
}

impl<C: IdentityService> ObjectHandler for UserHandler<C> {
    type Model = UserModel;
    type Entity = RemoteUser;

    fn object_class(&self) -> ObjectClass {
        ObjectClass::user()
    }

    fn schema(&self) -> &SchemaDefinition<UserModel, RemoteUser> {
        &self.schema
    }

    async fn create(&self, attributes: &AttributeSet) -> ConnectorResult<Uid> {
        let mut model = UserModel::create();
        self.schema.apply(attributes, &mut model)?;

        let user = model.to_new_user().ok_or_else(|| {
            ConnectorError::invalid_attribute(format!("Attribute '{}' is required", USERNAME))
        })?;
        info!("Creating user '{}'", user.name);
        trace!("Create payload: {:?}", user);

        let key = self.client.create_user(&user, model.password()).await?;

        if let Some(groups) = model.groups().to_add() {
            debug!("Adding user '{}' to {} groups", user.name, groups.len());
            self.client.add_user_to_groups(&user.name, groups).await?;
        }
        if model.flags().multi_valued_attributes {
            debug!("Storing attributes of user '{}'", user.name);
            self.client
                .store_user_attributes(&user.name, model.pending_attributes())
                .await?;
        }

        Ok(Uid::with_name_hint(key.to_string(), user.name))
    }

    async fn update_delta(&self, uid: &Uid, deltas: &[AttributeDelta]) -> ConnectorResult<Uid> {
        let current = self.client.fetch_user_by_key(uid.value()).await?;
        info!("Updating user '{}' ({} deltas)", current.name, deltas.len());

        let mut model = UserModel::from_current(current);
        self.schema.apply_delta(deltas, &mut model)?;
        let flags = model.flags();
        trace!("Staged user changes: {:?}", flags);

        let mut name = model.user().name.clone();

        if flags.core_fields {
            debug!("Updating core fields of user '{}'", name);
            self.client.update_user(model.user()).await?;
        }
        if let Some(new_name) = model.rename_to() {
            debug!("Renaming user '{}' to '{}'", name, new_name);
            self.client.rename_user(&name, new_name).await?;
            name = new_name.to_string();
        }
        // The service has no call that clears a password; a cleared secret
        // flips the flag but has nothing to send.
        if flags.secret {
            match model.password() {
                Some(password) => {
                    debug!("Updating password of user '{}'", name);
                    self.client.update_user_password(&name, password).await?;
                }
                None => warn!("Cleared password for user '{}' is not sent", name),
            }
        }
        if flags.multi_valued_attributes {
            debug!("Storing attributes of user '{}'", name);
            self.client
                .store_user_attributes(&name, model.pending_attributes())
                .await?;
        }
        if let Some(groups) = model.groups().to_add() {
            debug!("Adding user '{}' to {} groups", name, groups.len());
            self.client.add_user_to_groups(&name, groups).await?;
        }
        if let Some(groups) = model.groups().to_remove() {
            debug!("Removing user '{}' from {} groups", name, groups.len());
            self.client.remove_user_from_groups(&name, groups).await?;
        }

        Ok(Uid::with_name_hint(uid.value(), name))
    }

    async fn delete(&self, uid: &Uid) -> ConnectorResult<()> {
        let name = match uid.name_hint() {
            Some(name) => name.to_string(),
            None => self.client.fetch_user_by_key(uid.value()).await?.name,
        };
        info!("Deleting user '{}'", name);
        self.client.delete_user(&name).await?;
        Ok(())
    }

    async fn get_by_uid(&self, uid: &Uid, options: &ReadOptions) -> ConnectorResult<Option<ConnectorObject>> {
        match optional(self.client.fetch_user_by_key(uid.value()).await)? {
            Some(user) => self.to_object(user, options).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str, options: &ReadOptions) -> ConnectorResult<Option<ConnectorObject>> {
        match optional(self.client.fetch_user_by_name(name).await)? {
            Some(user) => self.to_object(user, options).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_all<H>(
        &self,
        options: &ReadOptions,
        page_size: usize,
        page_offset: usize,
        mut handler: H,
    ) -> ConnectorResult<usize>
    where
        H: FnMut(ConnectorObject) -> bool,
    {
        enumerate(
            page_size,
            page_offset,
            async |start: usize, size: usize| {
                self.client
                    .fetch_users_page(start, size)
                    .await
                    .map_err(ConnectorError::from)
            },
            async |user: RemoteUser| {
                let object = self.to_object(user, options).await?;
                Ok(handler(object))
            },
        )
        .await
    }

    async fn count(&self) -> ConnectorResult<Option<usize>> {
        Ok(self.client.count_users().await?)
    }
}
