//! Group handler.
//!
//! Groups are identified and addressed by name. The name is fixed at
//! creation; updates touch core fields, custom attributes and parent-group
//! memberships, in that order.

use super::{ObjectHandler, ReadOptions, optional};
use crate::attribute::{
    AttributeDelta, AttributeSet, ConnectorObject, ENABLE_NAME, ObjectClass, Uid,
};
use crate::client::{IdentityService, RemoteGroup};
use crate::error::{ConnectorError, ConnectorResult};
use crate::model::GroupModel;
use crate::pagination::{collect_all, enumerate};
use crate::schema::{AttributeFlag, CustomAttribute, SchemaDefinition, SemanticType};
use log::{debug, info, trace};
use std::sync::Arc;

pub const KEY: &str = "key";
pub const GROUPNAME: &str = "groupname";
pub const DESCRIPTION: &str = "description";
pub const GROUPS: &str = "groups";

/// Orchestrates group operations against an [`IdentityService`].
pub struct GroupHandler<C> {
    client: Arc<C>,
    schema: SchemaDefinition<GroupModel, RemoteGroup>,
    relation_page_size: usize,
}

impl<C: IdentityService> GroupHandler<C> {
    pub fn new(
        client: Arc<C>,
        schema: SchemaDefinition<GroupModel, RemoteGroup>,
        relation_page_size: usize,
    ) -> Self {
        Self {
            client,
            schema,
            relation_page_size,
        }
    }

    /// Build the group schema, including the configured custom attributes.
    pub fn create_schema(
        custom: &[CustomAttribute],
    ) -> ConnectorResult<SchemaDefinition<GroupModel, RemoteGroup>> {
        let mut sb = SchemaDefinition::<GroupModel, RemoteGroup>::builder(ObjectClass::group());

        sb.add_uid(
            KEY,
            SemanticType::StringCaseInsensitive,
            |group: &RemoteGroup| Some(group.name.clone()).filter(|n| !n.is_empty()),
            Some("name"),
            &[],
        );

        sb.add_name(
            GROUPNAME,
            SemanticType::StringCaseInsensitive,
            |value: Option<String>, model: &mut GroupModel| model.set_name(value),
            |group: &RemoteGroup| Some(group.name.clone()).filter(|n| !n.is_empty()),
            Some("name"),
            &[AttributeFlag::Required, AttributeFlag::NotUpdateable],
        );

        sb.add(
            ENABLE_NAME,
            SemanticType::Boolean,
            |value: Option<bool>, model: &mut GroupModel| model.set_active(value),
            |group: &RemoteGroup| Some(group.active),
            Some("active"),
            &[],
        );

        sb.add(
            DESCRIPTION,
            SemanticType::String,
            |value: Option<String>, model: &mut GroupModel| model.set_description(value),
            |group: &RemoteGroup| group.description.clone(),
            None,
            &[],
        );

        sb.add_custom_attributes(custom);

        sb.add_multiple(
            GROUPS,
            SemanticType::String,
            |parents: Vec<String>, model: &mut GroupModel| model.add_parents(parents),
            |parents: Vec<String>, model: &mut GroupModel| model.remove_parents(parents),
            |group: &RemoteGroup| group.groups.clone().unwrap_or_default(),
            None,
            &[AttributeFlag::NotReturnedByDefault],
        );

        sb.build()
    }

    async fn fill_relations(&self, group: &mut RemoteGroup, options: &ReadOptions) -> ConnectorResult<()> {
        if !options.fetches_relation(GROUPS) {
            return Ok(());
        }
        let name = group.name.clone();
        debug!("Looking up parent groups of group '{}'", name);
        let parents = collect_all(self.relation_page_size, async |start: usize, size: usize| {
            self.client
                .fetch_group_parents_page(&name, start, size)
                .await
                .map_err(ConnectorError::from)
        })
        .await?;
        group.groups = Some(parents);
        Ok(())
    }

    async fn to_object(&self, mut group: RemoteGroup, options: &ReadOptions) -> ConnectorResult<ConnectorObject> {
        self.fill_relations(&mut group, options).await?;
        self.schema.to_connector_object(
            &group,
            options.return_attributes(),
            options.allow_partial_attribute_values(),
        )
    }
}

impl<C: IdentityService> ObjectHandler for GroupHandler<C> {
    type Model = GroupModel;
    type Entity = RemoteGroup;

    fn object_class(&self) -> ObjectClass {
        ObjectClass::group()
    }

    fn schema(&self) -> &SchemaDefinition<GroupModel, RemoteGroup> {
        &self.schema
    }

    async fn create(&self, attributes: &AttributeSet) -> ConnectorResult<Uid> {
        let mut model = GroupModel::create();
        self.schema.apply(attributes, &mut model)?;

        let group = model.to_new_group().ok_or_else(|| {
            ConnectorError::invalid_attribute(format!("Attribute '{}' is required", GROUPNAME))
        })?;
        info!("Creating group '{}'", group.name);
        trace!("Create payload: {:?}", group);

        self.client.create_group(&group).await?;

        if let Some(parents) = model.parents().to_add() {
            debug!("Adding group '{}' to {} groups", group.name, parents.len());
            self.client.add_group_to_groups(&group.name, parents).await?;
        }
        if model.flags().multi_valued_attributes {
            debug!("Storing attributes of group '{}'", group.name);
            self.client
                .store_group_attributes(&group.name, model.pending_attributes())
                .await?;
        }

        Ok(Uid::with_name_hint(group.name.clone(), group.name))
    }

    async fn update_delta(&self, uid: &Uid, deltas: &[AttributeDelta]) -> ConnectorResult<Uid> {
        let current = self.client.fetch_group(uid.value()).await?;
        info!("Updating group '{}' ({} deltas)", current.name, deltas.len());

        let mut model = GroupModel::from_current(current);
        self.schema.apply_delta(deltas, &mut model)?;
        let flags = model.flags();
        trace!("Staged group changes: {:?}", flags);

        let name = model.group().name.clone();

        if flags.core_fields {
            debug!("Updating core fields of group '{}'", name);
            self.client.update_group(model.group()).await?;
        }
        if flags.multi_valued_attributes {
            debug!("Storing attributes of group '{}'", name);
            self.client
                .store_group_attributes(&name, model.pending_attributes())
                .await?;
        }
        if let Some(parents) = model.parents().to_add() {
            debug!("Adding group '{}' to {} groups", name, parents.len());
            self.client.add_group_to_groups(&name, parents).await?;
        }
        if let Some(parents) = model.parents().to_remove() {
            debug!("Removing group '{}' from {} groups", name, parents.len());
            self.client.remove_group_from_groups(&name, parents).await?;
        }

        Ok(Uid::with_name_hint(name.clone(), name))
    }

    async fn delete(&self, uid: &Uid) -> ConnectorResult<()> {
        info!("Deleting group '{}'", uid);
        self.client.delete_group(uid.value()).await?;
        Ok(())
    }

    async fn get_by_uid(&self, uid: &Uid, options: &ReadOptions) -> ConnectorResult<Option<ConnectorObject>> {
        self.get_by_name(uid.value(), options).await
    }

    async fn get_by_name(&self, name: &str, options: &ReadOptions) -> ConnectorResult<Option<ConnectorObject>> {
        match optional(self.client.fetch_group(name).await)? {
            Some(group) => self.to_object(group, options).await.map(Some),
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
                    .fetch_groups_page(start, size)
                    .await
                    .map_err(ConnectorError::from)
            },
            async |group: RemoteGroup| {
                let object = self.to_object(group, options).await?;
                Ok(handler(object))
            },
        )
        .await
    }

    async fn count(&self) -> ConnectorResult<Option<usize>> {
        Ok(self.client.count_groups().await?)
    }
}
