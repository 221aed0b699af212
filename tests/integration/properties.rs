//! Property-based tests for custom attribute and membership reconciliation.
//!
//! Uses proptest to generate current value sets and add/remove lists, then
//! checks what the connector stores against the set algebra it promises.

use crate::common::{connector_for, seed_groups, seed_user};
use directory_connector::client::{
    IdentityService, InMemoryIdentityService, RemoteOperation, RemoteUser,
};
use directory_connector::{AttributeDelta, ObjectClass, Uid};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn value_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-f]", 0..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_multi_valued_delta_stores_union_minus_removals(
        current in value_set(),
        to_add in value_set(),
        to_remove in value_set(),
    ) {
        let stored = tokio_test::block_on(async {
            let service = InMemoryIdentityService::new();
            let mut user = RemoteUser::new("alice");
            user.attributes.insert("tags".to_string(), current.clone());
            let key = seed_user(&service, user).await;
            let connector = connector_for(&service).await;

            connector
                .update_delta(
                    &ObjectClass::user(),
                    &Uid::new(key.to_string()),
                    &[AttributeDelta::add_and_remove(
                        "attributes.tags",
                        to_add.iter().cloned(),
                        to_remove.iter().cloned(),
                    )],
                )
                .await
                .unwrap();

            let user = service.fetch_user_by_name("alice").await.unwrap();
            user.attributes.get("tags").cloned().unwrap_or_default()
        });

        let expected: BTreeSet<String> = current
            .union(&to_add)
            .filter(|value| !to_remove.contains(*value))
            .cloned()
            .collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn test_membership_changes_are_sent_verbatim(
        to_add in prop::collection::vec("[a-f]", 1..4),
        to_remove in prop::collection::vec("[a-f]", 1..4),
    ) {
        let (added, removed) = tokio_test::block_on(async {
            let service = InMemoryIdentityService::new();
            seed_groups(&service, &["a", "b", "c", "d", "e", "f"]).await;
            let key = seed_user(&service, RemoteUser::new("alice")).await;
            let connector = connector_for(&service).await;

            connector
                .update_delta(
                    &ObjectClass::user(),
                    &Uid::new(key.to_string()),
                    &[
                        AttributeDelta::add("groups", to_add.iter().cloned()),
                        AttributeDelta::remove("groups", to_remove.iter().cloned()),
                    ],
                )
                .await
                .unwrap();

            let added = service.calls_of(RemoteOperation::AddUserToGroups).await;
            let removed = service.calls_of(RemoteOperation::RemoveUserFromGroups).await;
            (added, removed)
        });

        prop_assert_eq!(added.len(), 1);
        prop_assert_eq!(removed.len(), 1);
        prop_assert_eq!(&added[0].arguments, &to_add);
        prop_assert_eq!(&removed[0].arguments, &to_remove);
    }
}
