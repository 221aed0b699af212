//! Searches: direct lookups, paged enumeration and attribute selection.

use crate::common::{
    configuration_with_page_size, connector_for, connector_with, operations, seed_groups,
    seed_user, strings, user_with_attributes,
};
use directory_connector::client::{
    IdentityService, InMemoryIdentityService, RemoteOperation, RemoteUser,
};
use directory_connector::{
    AttributeValue, ConnectorObject, Filter, ObjectClass, SearchFilter, SearchOptions,
};

async fn seed_users(service: &InMemoryIdentityService, count: usize) {
    for i in 0..count {
        seed_user(service, RemoteUser::new(format!("user{:02}", i))).await;
    }
}

fn collect(objects: &mut Vec<ConnectorObject>) -> impl FnMut(ConnectorObject) -> bool + '_ {
    move |object| {
        objects.push(object);
        true
    }
}

#[tokio::test]
async fn test_equality_filters_translate_to_lookups() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;
    let user = ObjectClass::user();

    assert_eq!(
        connector
            .translate_filter(&user, &Filter::equals("username", "alice"))
            .unwrap(),
        Some(SearchFilter::ByName("alice".to_string()))
    );
    assert!(matches!(
        connector
            .translate_filter(&user, &Filter::equals("key", "abc"))
            .unwrap(),
        Some(SearchFilter::ByUid(_))
    ));
    assert_eq!(
        connector
            .translate_filter(&user, &Filter::equals("email", "a@example.com"))
            .unwrap(),
        None
    );
    assert_eq!(
        connector
            .translate_filter(
                &ObjectClass::group(),
                &Filter::equals("groupname", "admins")
            )
            .unwrap(),
        Some(SearchFilter::ByName("admins".to_string()))
    );
}

#[tokio::test]
async fn test_search_by_name_returns_default_attributes() {
    let service = InMemoryIdentityService::new();
    let mut alice = user_with_attributes("alice", &[("department", &["engineering"])]);
    alice.email_address = Some("alice@example.com".to_string());
    let key = seed_user(&service, alice).await;
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByName("ALICE".to_string())),
            &SearchOptions::default(),
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 1);
    assert_eq!(result.remaining_paged_results, None);
    let object = &found[0];
    assert_eq!(object.uid().value(), key.to_string());
    assert_eq!(object.name(), "alice");
    assert_eq!(
        object.single_value("email"),
        Some(&AttributeValue::from("alice@example.com"))
    );
    assert_eq!(
        object.single_value("attributes.department"),
        Some(&AttributeValue::from("engineering"))
    );
    assert_eq!(
        object.single_value("__ENABLE__"),
        Some(&AttributeValue::from(true))
    );
    assert!(object.attribute("created-date").is_some());
    // Relations and secrets are never part of the defaults
    assert!(object.attribute("groups").is_none());
    assert!(object.attribute("__PASSWORD__").is_none());

    assert_eq!(
        operations(&service.calls().await),
        vec![RemoteOperation::FetchUserByName]
    );
}

#[tokio::test]
async fn test_search_by_uid_for_missing_object_handles_nothing() {
    let service = InMemoryIdentityService::new();
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByUid(directory_connector::Uid::new(
                "00000000-0000-0000-0000-000000000000",
            ))),
            &SearchOptions::default(),
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 0);
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_requested_relations_are_fetched_in_pages() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["a", "b", "c"]).await;
    seed_user(&service, RemoteUser::new("alice")).await;
    service
        .add_user_to_groups("alice", &strings(&["a", "b", "c"]))
        .await
        .unwrap();
    service.clear_calls().await;
    let connector = connector_with(&service, configuration_with_page_size(2)).await;

    let mut found = Vec::new();
    connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByName("alice".to_string())),
            &SearchOptions::default().with_attributes_to_get(["groups"]),
            collect(&mut found),
        )
        .await
        .unwrap();

    let groups = found[0].attribute("groups").unwrap();
    assert_eq!(groups.values().len(), 3);
    assert!(!groups.is_incomplete());
    // Explicit list without defaults: only what was asked for
    assert!(found[0].attribute("email").is_none());
    assert!(found[0].attribute("__ENABLE__").is_none());

    let pages: Vec<Vec<String>> = service
        .calls_of(RemoteOperation::FetchUserGroupsPage)
        .await
        .into_iter()
        .map(|call| call.arguments)
        .collect();
    assert_eq!(
        pages,
        vec![strings(&["0", "2"]), strings(&["2", "2"]), strings(&["4", "2"])]
    );
}

#[tokio::test]
async fn test_partial_values_skip_relation_lookups() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["a"]).await;
    seed_user(&service, RemoteUser::new("alice")).await;
    service
        .add_user_to_groups("alice", &strings(&["a"]))
        .await
        .unwrap();
    service.clear_calls().await;
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByName("alice".to_string())),
            &SearchOptions::default()
                .with_attributes_to_get(["groups"])
                .with_return_default_attributes(true)
                .with_allow_partial_attribute_values(true),
            collect(&mut found),
        )
        .await
        .unwrap();

    let groups = found[0].attribute("groups").unwrap();
    assert!(groups.is_incomplete());
    assert!(found[0].attribute("__ENABLE__").is_some());
    assert!(
        service
            .calls_of(RemoteOperation::FetchUserGroupsPage)
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_enumeration_walks_every_page() {
    let service = InMemoryIdentityService::new();
    seed_users(&service, 5).await;
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            None,
            &SearchOptions::default().with_page_size(2),
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 5);
    assert_eq!(result.remaining_paged_results, None);
    let names: Vec<&str> = found.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["user00", "user01", "user02", "user03", "user04"]);

    // A short page does not end the walk; the empty one does
    assert_eq!(
        service.calls_of(RemoteOperation::FetchUsersPage).await.len(),
        4
    );
}

#[tokio::test]
async fn test_handler_can_stop_enumeration() {
    let service = InMemoryIdentityService::new();
    seed_users(&service, 5).await;
    let connector = connector_for(&service).await;

    let mut seen = 0;
    let result = connector
        .search(
            &ObjectClass::user(),
            None,
            &SearchOptions::default().with_page_size(2),
            |_| {
                seen += 1;
                seen < 3
            },
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 3);
    assert_eq!(seen, 3);
    assert_eq!(
        service.calls_of(RemoteOperation::FetchUsersPage).await.len(),
        2
    );
}

#[tokio::test]
async fn test_explicit_page_reports_remaining_results() {
    let service = InMemoryIdentityService::with_totals();
    seed_users(&service, 5).await;
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            None,
            &SearchOptions::default()
                .with_page_size(2)
                .with_paged_results_offset(1),
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 2);
    assert_eq!(result.remaining_paged_results, Some(3));
    let pages = service.calls_of(RemoteOperation::FetchUsersPage).await;
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].arguments, strings(&["0", "2"]));
}

#[tokio::test]
async fn test_explicit_offset_is_an_object_index() {
    let service = InMemoryIdentityService::new();
    seed_users(&service, 5).await;
    let connector = connector_for(&service).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            None,
            &SearchOptions::default()
                .with_page_size(2)
                .with_paged_results_offset(4),
            collect(&mut found),
        )
        .await
        .unwrap();

    let names: Vec<&str> = found.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["user03", "user04"]);
    // Without a remote total the delivered count stands in for it
    assert_eq!(result.remaining_paged_results, Some(2 - 8));
}

#[tokio::test]
async fn test_group_enumeration_uses_configured_page_size() {
    let service = InMemoryIdentityService::new();
    seed_groups(&service, &["a", "b", "c"]).await;
    let connector = connector_with(&service, configuration_with_page_size(2)).await;

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::group(),
            None,
            &SearchOptions::default(),
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 3);
    assert_eq!(found[0].uid().value(), "a");
    let pages = service.calls_of(RemoteOperation::FetchGroupsPage).await;
    assert_eq!(pages[0].arguments, strings(&["0", "2"]));
    assert_eq!(pages.len(), 3);
}

#[tokio::test]
async fn test_lookup_with_explicit_offset_reports_remaining_results() {
    let service = InMemoryIdentityService::with_totals();
    seed_users(&service, 3).await;
    let connector = connector_for(&service).await;
    let options = SearchOptions::default()
        .with_page_size(10)
        .with_paged_results_offset(1);

    let mut found = Vec::new();
    let result = connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByName("user01".to_string())),
            &options,
            collect(&mut found),
        )
        .await
        .unwrap();

    assert_eq!(result.handled, 1);
    // Only the delivered object counts, never the remote total
    assert_eq!(result.remaining_paged_results, Some(1 - 10));

    let result = connector
        .search(
            &ObjectClass::user(),
            Some(&SearchFilter::ByName("nobody".to_string())),
            &options,
            |_| true,
        )
        .await
        .unwrap();
    assert_eq!(result.handled, 0);
    assert_eq!(result.remaining_paged_results, Some(-10));
    assert!(
        service
            .calls()
            .await
            .iter()
            .all(|call| call.operation == RemoteOperation::FetchUserByName)
    );
}
