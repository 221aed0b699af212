//! Common test utilities for connector testing.
//!
//! Provides a ready configuration, a connector bound to a shared
//! [`InMemoryIdentityService`], seeding helpers and shortcuts for reading the
//! remote call journal.

use directory_connector::client::{
    IdentityService, InMemoryIdentityService, RemoteCall, RemoteGroup, RemoteOperation,
    RemoteUser,
};
use directory_connector::{Connector, ConnectorConfiguration, GuardedString};
use uuid::Uuid;

pub const USER_ATTRIBUTES: [&str; 2] = ["department$string", "tags$stringArray"];
pub const GROUP_ATTRIBUTES: [&str; 2] = ["owner$string", "labels$stringArray"];

/// Route connector logs to the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Valid configuration with custom attributes for both object classes.
pub fn test_configuration() -> ConnectorConfiguration {
    configuration_with_page_size(50)
}

pub fn configuration_with_page_size(page_size: usize) -> ConnectorConfiguration {
    ConnectorConfiguration::builder(
        "https://directory.example.com/identity",
        "provisioning",
        GuardedString::new("app-secret"),
    )
    .with_page_size(page_size)
    .with_user_attributes_schema(USER_ATTRIBUTES)
    .with_group_attributes_schema(GROUP_ATTRIBUTES)
    .build()
    .expect("test configuration is valid")
}

/// Initialize a connector on a clone of `service` and clear the journal.
pub async fn connector_for(service: &InMemoryIdentityService) -> Connector<InMemoryIdentityService> {
    connector_with(service, test_configuration()).await
}

pub async fn connector_with(
    service: &InMemoryIdentityService,
    configuration: ConnectorConfiguration,
) -> Connector<InMemoryIdentityService> {
    init_logging();
    let mut connector = Connector::new();
    connector
        .init(configuration, service.clone())
        .await
        .expect("connector initializes");
    service.clear_calls().await;
    connector
}

/// Create groups directly in the service, leaving the journal empty.
pub async fn seed_groups(service: &InMemoryIdentityService, names: &[&str]) {
    for name in names {
        service
            .create_group(&RemoteGroup::new(*name))
            .await
            .expect("group is created");
    }
    service.clear_calls().await;
}

/// Create a user directly in the service and return its key.
pub async fn seed_user(service: &InMemoryIdentityService, user: RemoteUser) -> Uuid {
    let key = service
        .create_user(&user, None)
        .await
        .expect("user is created");
    service.clear_calls().await;
    key
}

/// A user with a custom attribute store.
pub fn user_with_attributes(name: &str, attributes: &[(&str, &[&str])]) -> RemoteUser {
    let mut user = RemoteUser::new(name);
    for (key, values) in attributes {
        user.attributes.insert(
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
    }
    user
}

/// Operations of the recorded calls, in order.
pub fn operations(calls: &[RemoteCall]) -> Vec<RemoteOperation> {
    calls.iter().map(|call| call.operation).collect()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
