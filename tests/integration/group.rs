//! Group operations against the in-memory identity service.

use crate::common::{connector_for, operations, seed_groups, seed_user, strings};
use directory_connector::attribute::ENABLE_NAME;
use directory_connector::client::{
    AttributeStore, IdentityService, InMemoryIdentityService, RemoteOperation, RemoteUser,
};
use directory_connector::{AttributeDelta, AttributeSet, ErrorKind, ObjectClass, Uid};
use std::collections::BTreeSet;

#[tokio::test]
async fn test_create_group_with_parents_and_attributes() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["engineering"]).await;
    let connector = connector_for(&service).await;

    let attributes = AttributeSet::new()
        .with("groupname", "platform")
        .with("description", "Platform team")
        .with("attributes.owner", "carol")
        .with_values("attributes.labels", ["infra"])
        .with_values("groups", ["engineering"]);

    let uid = connector
        .create(&ObjectClass::group(), &attributes)
        .await
        .unwrap();

    assert_eq!(uid.value(), "platform");
    assert_eq!(uid.name_hint(), Some("platform"));

    let calls = service.calls().await;
    assert_eq!(
        operations(&calls),
        vec![
            RemoteOperation::CreateGroup,
            RemoteOperation::AddGroupToGroups,
            RemoteOperation::StoreGroupAttributes,
        ]
    );
    assert_eq!(calls[1].arguments, strings(&["engineering"]));
    assert_eq!(calls[2].arguments, strings(&["labels=infra", "owner=carol"]));

    let stored = service.fetch_group("platform").await.unwrap();
    assert_eq!(stored.description.as_deref(), Some("Platform team"));
    assert_eq!(
        service.fetch_group_parents_page("platform", 0, 10).await.unwrap(),
        strings(&["engineering"])
    );
}

#[tokio::test]
async fn test_create_duplicate_group_ignores_case() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["Admins"]).await;
    let connector = connector_for(&service).await;

    let error = connector
        .create(&ObjectClass::group(), &AttributeSet::new().with("groupname", "admins"))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_update_core_fields_and_parents() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["engineering", "staff", "platform"]).await;
    service
        .add_group_to_groups("platform", &strings(&["staff"]))
        .await
        .unwrap();
    service.clear_calls().await;
    let connector = connector_for(&service).await;

    let uid = connector
        .update_delta(
            &ObjectClass::group(),
            &Uid::new("platform"),
            &[
                AttributeDelta::replace("description", "Platform engineering"),
                AttributeDelta::replace(ENABLE_NAME, false),
                AttributeDelta::add("groups", ["engineering"]),
                AttributeDelta::remove("groups", ["staff"]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(uid.value(), "platform");
    assert_eq!(
        operations(&service.calls().await),
        vec![
            RemoteOperation::FetchGroup,
            RemoteOperation::UpdateGroup,
            RemoteOperation::AddGroupToGroups,
            RemoteOperation::RemoveGroupFromGroups,
        ]
    );

    let stored = service.fetch_group("platform").await.unwrap();
    assert!(!stored.active);
    assert_eq!(
        service.fetch_group_parents_page("platform", 0, 10).await.unwrap(),
        strings(&["engineering"])
    );
}

#[tokio::test]
async fn test_group_name_is_not_updateable() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["platform"]).await;
    let connector = connector_for(&service).await;

    let uid = connector
        .update_delta(
            &ObjectClass::group(),
            &Uid::new("platform"),
            &[AttributeDelta::replace("groupname", "infrastructure")],
        )
        .await
        .unwrap();

    assert_eq!(uid.value(), "platform");
    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::FetchGroup]
    );
    assert!(service.fetch_group("infrastructure").await.is_err());
}

#[tokio::test]
async fn test_update_group_attributes_stores_only_touched_keys() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["platform"]).await;
    let mut attributes = AttributeStore::new();
    attributes.insert("owner".to_string(), BTreeSet::from(["carol".to_string()]));
    attributes.insert("labels".to_string(), BTreeSet::from(["infra".to_string()]));
    service
        .store_group_attributes("platform", &attributes)
        .await
        .unwrap();
    service.clear_calls().await;
    let connector = connector_for(&service).await;

    connector
        .update_delta(
            &ObjectClass::group(),
            &Uid::new("platform"),
            &[AttributeDelta::add("attributes.labels", ["oncall"])],
        )
        .await
        .unwrap();

    let calls = service.calls_of(RemoteOperation::StoreGroupAttributes).await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments, strings(&["labels=infra,oncall"]));

    let stored = service.fetch_group("platform").await.unwrap();
    assert!(stored.attributes.contains_key("owner"));
}

#[tokio::test]
async fn test_delete_group_forgets_memberships() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["platform"]).await;
    seed_user(&service, RemoteUser::new("alice")).await;
    service
        .add_user_to_groups("alice", &strings(&["platform"]))
        .await
        .unwrap();
    service.clear_calls().await;
    let connector = connector_for(&service).await;

    connector
        .delete(&ObjectClass::group(), &Uid::new("platform"))
        .await
        .unwrap();

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::DeleteGroup]
    );
    assert!(
        service
            .fetch_user_groups_page("alice", 0, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_add_to_missing_parent_is_not_found() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["platform"]).await;
    let connector = connector_for(&service).await;

    let error = connector
        .update_delta(
            &ObjectClass::group(),
            &Uid::new("platform"),
            &[AttributeDelta::add("groups", ["nonexistent"])],
        )
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}
