//! User operations against the in-memory identity service.

use crate::common::{connector_for, operations, seed_groups, seed_user, strings, user_with_attributes};
use directory_connector::attribute::{ENABLE_NAME, PASSWORD_NAME};
use directory_connector::client::{
    IdentityService, InMemoryIdentityService, RemoteError, RemoteOperation, RemoteUser,
};
use directory_connector::{
    AttributeDelta, AttributeSet, ErrorKind, GuardedString, ObjectClass, Uid,
};
use uuid::Uuid;

#[tokio::test]
async fn test_create_minimal_user_issues_one_call() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let uid = connector
        .create(&ObjectClass::user(), &AttributeSet::new().with("username", "alice"))
        .await
        .unwrap();

    assert!(Uuid::parse_str(uid.value()).is_ok());
    assert_eq!(uid.name_hint(), Some("alice"));
    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::CreateUser]
    );

    let stored = service.fetch_user_by_name("alice").await.unwrap();
    assert!(stored.active);
}

#[tokio::test]
async fn test_create_user_with_groups_attributes_and_password() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["admins", "developers"]).await;
    let connector = connector_for(&service).await;

    let attributes = AttributeSet::new()
        .with("username", "alice")
        .with("first-name", "Alice")
        .with("email", "alice@example.com")
        .with(ENABLE_NAME, false)
        .with(PASSWORD_NAME, GuardedString::new("initial-pw"))
        .with("attributes.department", "engineering")
        .with_values("attributes.tags", ["oncall", "remote"])
        .with_values("groups", ["admins", "developers"]);

    connector
        .create(&ObjectClass::user(), &attributes)
        .await
        .unwrap();

    let calls = service.calls().await;
    assert_eq!(
        operations(&calls),
        vec![
            RemoteOperation::CreateUser,
            RemoteOperation::AddUserToGroups,
            RemoteOperation::StoreUserAttributes,
        ]
    );
    assert_eq!(calls[1].arguments, strings(&["admins", "developers"]));
    assert_eq!(
        calls[2].arguments,
        strings(&["department=engineering", "tags=oncall,remote"])
    );

    let stored = service.fetch_user_by_name("alice").await.unwrap();
    assert!(!stored.active);
    assert_eq!(stored.first_name.as_deref(), Some("Alice"));
    assert_eq!(stored.email_address.as_deref(), Some("alice@example.com"));
    assert_eq!(service.password_of("alice").await.as_deref(), Some("initial-pw"));
}

#[tokio::test]
async fn test_create_duplicate_user_is_already_exists() {
    let service = InMemoryIdentityService::new();
    seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    let error = connector
        .create(&ObjectClass::user(), &AttributeSet::new().with("username", "ALICE"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::AlreadyExists);
    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::CreateUser]
    );
}

#[tokio::test]
async fn test_create_without_username_issues_no_calls() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let error = connector
        .create(&ObjectClass::user(), &AttributeSet::new().with("first-name", "Alice"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    assert!(error.to_string().contains("username"));
    assert!(service.calls().await.is_empty());
}

#[tokio::test]
async fn test_create_with_unknown_attribute_issues_no_calls() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let attributes = AttributeSet::new()
        .with("username", "alice")
        .with("attributes.costcenter", "42");
    let error = connector
        .create(&ObjectClass::user(), &attributes)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::InvalidInput);
    assert!(service.calls().await.is_empty());
}

#[tokio::test]
async fn test_update_dispatches_in_fixed_order_after_rename() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["admins"]).await;
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    let uid = connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[
                AttributeDelta::add("groups", ["admins"]),
                AttributeDelta::replace(PASSWORD_NAME, GuardedString::new("rotated")),
                AttributeDelta::replace("username", "alice.smith"),
                AttributeDelta::replace("last-name", "Smith"),
            ],
        )
        .await
        .unwrap();

    let calls = service.calls().await;
    assert_eq!(
        operations(&calls),
        vec![
            RemoteOperation::FetchUserByKey,
            RemoteOperation::UpdateUser,
            RemoteOperation::RenameUser,
            RemoteOperation::UpdateUserPassword,
            RemoteOperation::AddUserToGroups,
        ]
    );
    // Calls after the rename address the new name
    assert_eq!(calls[2].target, "alice");
    assert_eq!(calls[3].target, "alice.smith");
    assert_eq!(calls[4].target, "alice.smith");

    assert_eq!(uid.value(), key.to_string());
    assert_eq!(uid.name_hint(), Some("alice.smith"));
    assert_eq!(service.password_of("alice.smith").await.as_deref(), Some("rotated"));
    assert_eq!(
        service.fetch_user_groups_page("alice.smith", 0, 10).await.unwrap(),
        strings(&["admins"])
    );
}

#[tokio::test]
async fn test_update_core_fields_only() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[
                AttributeDelta::replace("display-name", "Alice A."),
                AttributeDelta::replace(ENABLE_NAME, false),
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::FetchUserByKey, RemoteOperation::UpdateUser]
    );
    let stored = service.fetch_user_by_name("alice").await.unwrap();
    assert_eq!(stored.display_name.as_deref(), Some("Alice A."));
    assert!(!stored.active);
}

#[tokio::test]
async fn test_touched_name_and_enable_are_sent_even_when_unchanged() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    let uid = connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[
                AttributeDelta::replace("username", "alice"),
                AttributeDelta::clear(ENABLE_NAME),
            ],
        )
        .await
        .unwrap();

    let calls = service.calls().await;
    assert_eq!(
        operations(&calls),
        vec![
            RemoteOperation::FetchUserByKey,
            RemoteOperation::UpdateUser,
            RemoteOperation::RenameUser,
        ]
    );
    assert_eq!(calls[2].arguments, strings(&["alice"]));
    assert_eq!(uid.name_hint(), Some("alice"));
    // Clearing the enabled state keeps it
    assert!(service.fetch_user_by_name("alice").await.unwrap().active);
}

#[tokio::test]
async fn test_cleared_password_sends_no_call() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[AttributeDelta::clear(PASSWORD_NAME)],
        )
        .await
        .unwrap();

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::FetchUserByKey]
    );
}

#[tokio::test]
async fn test_custom_attribute_deltas_store_final_sets() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(
        &service,
        user_with_attributes(
            "alice",
            &[("tags", &["oncall", "remote"]), ("department", &["sales"])],
        ),
    )
    .await;
    let connector = connector_for(&service).await;

    connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[
                AttributeDelta::add_and_remove("attributes.tags", ["mentor"], ["oncall"]),
                AttributeDelta::clear("attributes.department"),
            ],
        )
        .await
        .unwrap();

    let calls = service.calls_of(RemoteOperation::StoreUserAttributes).await;
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].arguments,
        strings(&["department=", "tags=mentor,remote"])
    );

    let stored = service.fetch_user_by_name("alice").await.unwrap();
    assert!(!stored.attributes.contains_key("department"));
    assert_eq!(
        stored.attributes.get("tags").map(|t| t.len()),
        Some(2)
    );
}

#[tokio::test]
async fn test_removing_every_value_clears_the_attribute() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, user_with_attributes("alice", &[("tags", &["oncall"])])).await;
    let connector = connector_for(&service).await;

    connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[AttributeDelta::remove("attributes.tags", ["oncall"])],
        )
        .await
        .unwrap();

    let calls = service.calls_of(RemoteOperation::StoreUserAttributes).await;
    assert_eq!(calls[0].arguments, strings(&["tags="]));
    assert!(service.fetch_user_by_name("alice").await.unwrap().attributes.is_empty());
}

#[tokio::test]
async fn test_update_of_missing_user_is_not_found() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let error = connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(Uuid::new_v4().to_string()),
            &[AttributeDelta::replace("email", "x@example.com")],
        )
        .await
        .unwrap_err();

    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_remote_failure_stops_the_update() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["admins", "auditors"]).await;
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;
    service
        .fail_next(
            RemoteOperation::AddUserToGroups,
            RemoteError::http(500, "internal error"),
        )
        .await;

    let error = connector
        .update_delta(
            &ObjectClass::user(),
            &Uid::new(key.to_string()),
            &[
                AttributeDelta::replace("email", "alice@example.com"),
                AttributeDelta::add_and_remove("groups", ["admins"], ["auditors"]),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::TransientIo);
    assert!(error.to_string().contains("internal error"));
    assert_eq!(
        operations(&service.calls().await),
        vec![
            RemoteOperation::FetchUserByKey,
            RemoteOperation::UpdateUser,
            RemoteOperation::AddUserToGroups,
        ]
    );
}

#[tokio::test]
async fn test_permission_failure_is_classified() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;
    service
        .fail_next(
            RemoteOperation::CreateUser,
            RemoteError::ApplicationPermission {
                message: "application may not create users".to_string(),
            },
        )
        .await;

    let error = connector
        .create(&ObjectClass::user(), &AttributeSet::new().with("username", "alice"))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_delete_uses_name_hint_when_present() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    connector
        .delete(
            &ObjectClass::user(),
            &Uid::with_name_hint(key.to_string(), "alice"),
        )
        .await
        .unwrap();

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::DeleteUser]
    );
    assert_eq!(service.user_count().await, 0);
}

#[tokio::test]
async fn test_delete_without_hint_resolves_the_name() {
    let service = InMemoryIdentityService::new();
    let key = seed_user(&service, RemoteUser::new("alice")).await;
    let connector = connector_for(&service).await;

    connector
        .delete(&ObjectClass::user(), &Uid::new(key.to_string()))
        .await
        .unwrap();

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::FetchUserByKey, RemoteOperation::DeleteUser]
    );
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let error = connector
        .delete(&ObjectClass::user(), &Uid::with_name_hint("k", "ghost"))
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}
