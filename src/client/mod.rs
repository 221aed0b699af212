//! Remote identity service facade.
//!
//! [`IdentityService`] is the narrow set of primitives the handlers need from
//! the remote REST API, per object type: fetch, create, update core fields,
//! store custom attributes, rename, set password, change group relations,
//! page through objects and delete. Transport, serialization and
//! authentication live behind implementations of this trait.
//!
//! Every method is async and returns a raw [`RemoteError`] on failure. The
//! handlers await each call in turn; implementations never see overlapping
//! calls from one connector session.
//!
//! # Example Usage
//!
//! ```rust
//! use directory_connector::client::{IdentityService, InMemoryIdentityService, RemoteUser};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = InMemoryIdentityService::new();
//! let key = service.create_user(&RemoteUser::new("alice"), None).await?;
//!
//! let user = service.fetch_user_by_key(&key.to_string()).await?;
//! assert_eq!(user.name, "alice");
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod errors;
pub mod in_memory;

pub use entity::{AttributeStore, RemoteGroup, RemoteUser};
pub use errors::RemoteError;
pub use in_memory::{InMemoryIdentityService, RemoteCall, RemoteOperation};

use crate::attribute::GuardedString;
use std::future::Future;
use uuid::Uuid;

/// Primitives of the remote identity service.
///
/// Users are addressed by their immutable key for reads and by their current
/// name for everything else; groups are addressed by name throughout.
/// Page fetches take a 0-based start index and return an empty page once the
/// collection is exhausted.
pub trait IdentityService: Send + Sync {
    /// Fetch a user by its immutable key.
    fn fetch_user_by_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<RemoteUser, RemoteError>> + Send;

    /// Fetch a user by its current name.
    fn fetch_user_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<RemoteUser, RemoteError>> + Send;

    /// Create a user with an optional initial password and return its key.
    fn create_user(
        &self,
        user: &RemoteUser,
        password: Option<&GuardedString>,
    ) -> impl Future<Output = Result<Uuid, RemoteError>> + Send;

    /// Replace the core fields of the user named `user.name`.
    fn update_user(&self, user: &RemoteUser)
    -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Store custom attributes of a user.
    ///
    /// Each entry replaces the whole value set of its key; an empty set
    /// removes the key. Keys not present are left untouched.
    fn store_user_attributes(
        &self,
        name: &str,
        attributes: &AttributeStore,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Set a user's password.
    fn update_user_password(
        &self,
        name: &str,
        password: &GuardedString,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Rename a user.
    fn rename_user(
        &self,
        name: &str,
        new_name: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Add a user to each listed group.
    fn add_user_to_groups(
        &self,
        name: &str,
        groups: &[String],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove a user from each listed group.
    fn remove_user_from_groups(
        &self,
        name: &str,
        groups: &[String],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Fetch one window of users.
    fn fetch_users_page(
        &self,
        start: usize,
        size: usize,
    ) -> impl Future<Output = Result<Vec<RemoteUser>, RemoteError>> + Send;

    /// Fetch one window of the groups a user directly belongs to.
    fn fetch_user_groups_page(
        &self,
        name: &str,
        start: usize,
        size: usize,
    ) -> impl Future<Output = Result<Vec<String>, RemoteError>> + Send;

    /// Delete a user.
    fn delete_user(&self, name: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Total number of users, when the service can report it.
    fn count_users(&self) -> impl Future<Output = Result<Option<usize>, RemoteError>> + Send {
        async { Ok(None) }
    }

    /// Fetch a group by name.
    fn fetch_group(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<RemoteGroup, RemoteError>> + Send;

    /// Create a group.
    fn create_group(
        &self,
        group: &RemoteGroup,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Replace the core fields of the group named `group.name`.
    fn update_group(
        &self,
        group: &RemoteGroup,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Store custom attributes of a group, with the same rules as users.
    fn store_group_attributes(
        &self,
        name: &str,
        attributes: &AttributeStore,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Add a group as a child of each listed parent group.
    fn add_group_to_groups(
        &self,
        name: &str,
        parents: &[String],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove a group from each listed parent group.
    fn remove_group_from_groups(
        &self,
        name: &str,
        parents: &[String],
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Fetch one window of groups.
    fn fetch_groups_page(
        &self,
        start: usize,
        size: usize,
    ) -> impl Future<Output = Result<Vec<RemoteGroup>, RemoteError>> + Send;

    /// Fetch one window of a group's direct parent groups.
    fn fetch_group_parents_page(
        &self,
        name: &str,
        start: usize,
        size: usize,
    ) -> impl Future<Output = Result<Vec<String>, RemoteError>> + Send;

    /// Delete a group.
    fn delete_group(&self, name: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Total number of groups, when the service can report it.
    fn count_groups(&self) -> impl Future<Output = Result<Option<usize>, RemoteError>> + Send {
        async { Ok(None) }
    }

    /// Check that the service is reachable and accepts the credentials.
    fn test_connection(&self) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Release any resources held by the client.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
