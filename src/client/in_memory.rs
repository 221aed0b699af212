//! In-memory identity service.
//!
//! A thread-safe implementation of [`IdentityService`] backed by ordered maps
//! behind a tokio `RwLock`. It follows the remote service's observable rules:
//! names are unique without regard to case, memberships require both sides
//! to exist, stored attributes with an empty value set are removed, and pages
//! past the end are empty.
//!
//! Every call is recorded in a journal of [`RemoteCall`]s so tests can assert
//! exactly which remote calls an operation issued and in which order, and any
//! operation can be made to fail once with [`InMemoryIdentityService::fail_next`].
//!
//! # Example Usage
//!
//! ```rust
//! use directory_connector::client::{
//!     IdentityService, InMemoryIdentityService, RemoteGroup, RemoteOperation, RemoteUser,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = InMemoryIdentityService::new();
//! service.create_group(&RemoteGroup::new("admins")).await?;
//! service.create_user(&RemoteUser::new("alice"), None).await?;
//! service
//!     .add_user_to_groups("alice", &["admins".to_string()])
//!     .await?;
//!
//! let groups = service.fetch_user_groups_page("alice", 0, 50).await?;
//! assert_eq!(groups, vec!["admins".to_string()]);
//!
//! let calls = service.calls().await;
//! assert_eq!(calls.last().map(|c| c.operation), Some(RemoteOperation::FetchUserGroupsPage));
//! # Ok(())
//! # }
//! ```

use super::{AttributeStore, IdentityService, RemoteError, RemoteGroup, RemoteUser};
use crate::attribute::GuardedString;
use chrono::Utc;
use log::trace;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use uuid::Uuid;

const USER: &str = "user";
const GROUP: &str = "group";

/// Remote primitives, as recorded in the call journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    FetchUserByKey,
    FetchUserByName,
    CreateUser,
    UpdateUser,
    StoreUserAttributes,
    UpdateUserPassword,
    RenameUser,
    AddUserToGroups,
    RemoveUserFromGroups,
    FetchUsersPage,
    FetchUserGroupsPage,
    DeleteUser,
    FetchGroup,
    CreateGroup,
    UpdateGroup,
    StoreGroupAttributes,
    AddGroupToGroups,
    RemoveGroupFromGroups,
    FetchGroupsPage,
    FetchGroupParentsPage,
    DeleteGroup,
    TestConnection,
}

/// One recorded remote call.
///
/// `target` is the key or name the call addressed; `arguments` holds the
/// call's list payload in a readable form (group names, `key=v1,v2`
/// attribute entries, or page start and size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub operation: RemoteOperation,
    pub target: String,
    pub arguments: Vec<String>,
}

impl RemoteCall {
    fn new(operation: RemoteOperation, target: impl Into<String>) -> Self {
        Self {
            operation,
            target: target.into(),
            arguments: Vec::new(),
        }
    }

    fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Default)]
struct Directory {
    // Keyed by lowercased name
    users: BTreeMap<String, RemoteUser>,
    groups: BTreeMap<String, RemoteGroup>,
    passwords: HashMap<String, GuardedString>,
    // Lowercased member name -> canonical group names
    user_memberships: HashMap<String, BTreeSet<String>>,
    group_memberships: HashMap<String, BTreeSet<String>>,
    journal: Vec<RemoteCall>,
    faults: HashMap<RemoteOperation, RemoteError>,
}

impl Directory {
    fn user_mut(&mut self, name: &str) -> Result<&mut RemoteUser, RemoteError> {
        self.users
            .get_mut(&fold(name))
            .ok_or_else(|| RemoteError::not_found(USER, name))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut RemoteGroup, RemoteError> {
        self.groups
            .get_mut(&fold(name))
            .ok_or_else(|| RemoteError::not_found(GROUP, name))
    }

    /// Canonical names of the listed groups, failing on the first unknown one.
    fn canonical_groups(&self, groups: &[String]) -> Result<Vec<String>, RemoteError> {
        groups
            .iter()
            .map(|g| {
                self.groups
                    .get(&fold(g))
                    .map(|group| group.name.clone())
                    .ok_or_else(|| RemoteError::not_found(GROUP, g.as_str()))
            })
            .collect()
    }

    fn forget_group(&mut self, name: &str) {
        for memberships in self
            .user_memberships
            .values_mut()
            .chain(self.group_memberships.values_mut())
        {
            memberships.retain(|g| !g.eq_ignore_ascii_case(name));
        }
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn store_attributes(target: &mut AttributeStore, attributes: &AttributeStore) {
    for (key, values) in attributes {
        if values.is_empty() {
            target.remove(key);
        } else {
            target.insert(key.clone(), values.clone());
        }
    }
}

fn attribute_arguments(attributes: &AttributeStore) -> Vec<String> {
    attributes
        .iter()
        .map(|(key, values)| {
            format!(
                "{}={}",
                key,
                values.iter().cloned().collect::<Vec<_>>().join(",")
            )
        })
        .collect()
}

fn page<T: Clone>(items: impl Iterator<Item = T>, start: usize, size: usize) -> Vec<T> {
    items.skip(start).take(size).collect()
}

/// Thread-safe in-memory identity service.
#[derive(Clone, Default)]
pub struct InMemoryIdentityService {
    directory: Arc<RwLock<Directory>>,
    report_totals: bool,
}

impl InMemoryIdentityService {
    /// Create an empty service that does not report totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty service that reports user and group totals.
    pub fn with_totals() -> Self {
        Self {
            report_totals: true,
            ..Self::default()
        }
    }

    /// Make the next call of `operation` fail with `error`.
    pub async fn fail_next(&self, operation: RemoteOperation, error: RemoteError) {
        self.directory.write().await.faults.insert(operation, error);
    }

    /// All calls recorded so far, oldest first.
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.directory.read().await.journal.clone()
    }

    /// Recorded calls of one operation.
    pub async fn calls_of(&self, operation: RemoteOperation) -> Vec<RemoteCall> {
        self.directory
            .read()
            .await
            .journal
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    /// Forget the recorded calls.
    pub async fn clear_calls(&self) {
        self.directory.write().await.journal.clear();
    }

    /// The stored password of a user, in clear text.
    pub async fn password_of(&self, name: &str) -> Option<String> {
        self.directory
            .read()
            .await
            .passwords
            .get(&fold(name))
            .map(|p| p.expose().to_string())
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.directory.read().await.users.len()
    }

    /// Number of stored groups.
    pub async fn group_count(&self) -> usize {
        self.directory.read().await.groups.len()
    }

    /// Record the call and take the write lock, unless a fault is armed.
    async fn begin(&self, call: RemoteCall) -> Result<RwLockWriteGuard<'_, Directory>, RemoteError> {
        let mut directory = self.directory.write().await;
        trace!("In-memory call {:?} on '{}'", call.operation, call.target);
        let fault = directory.faults.remove(&call.operation);
        directory.journal.push(call);
        match fault {
            Some(error) => Err(error),
            None => Ok(directory),
        }
    }
}

impl IdentityService for InMemoryIdentityService {
    async fn fetch_user_by_key(&self, key: &str) -> Result<RemoteUser, RemoteError> {
        let directory = self
            .begin(RemoteCall::new(RemoteOperation::FetchUserByKey, key))
            .await?;
        directory
            .users
            .values()
            .find(|u| u.key.is_some_and(|k| k.to_string().eq_ignore_ascii_case(key)))
            .cloned()
            .ok_or_else(|| RemoteError::not_found(USER, key))
    }

    async fn fetch_user_by_name(&self, name: &str) -> Result<RemoteUser, RemoteError> {
        let directory = self
            .begin(RemoteCall::new(RemoteOperation::FetchUserByName, name))
            .await?;
        directory
            .users
            .get(&fold(name))
            .cloned()
            .ok_or_else(|| RemoteError::not_found(USER, name))
    }

    async fn create_user(
        &self,
        user: &RemoteUser,
        password: Option<&GuardedString>,
    ) -> Result<Uuid, RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::CreateUser, user.name.as_str()))
            .await?;
        let folded = fold(&user.name);
        if directory.users.contains_key(&folded) {
            return Err(RemoteError::duplicate(USER, user.name.as_str()));
        }

        let key = Uuid::new_v4();
        let now = Utc::now();
        let mut stored = user.clone();
        stored.key = Some(key);
        stored.created_date = Some(now);
        stored.updated_date = Some(now);
        stored.groups = None;
        stored.attributes.retain(|_, values| !values.is_empty());

        if let Some(password) = password {
            directory.passwords.insert(folded.clone(), password.clone());
        }
        directory.users.insert(folded, stored);
        Ok(key)
    }

    async fn update_user(&self, user: &RemoteUser) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::UpdateUser, user.name.as_str()))
            .await?;
        let stored = directory.user_mut(&user.name)?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.display_name = user.display_name.clone();
        stored.email_address = user.email_address.clone();
        stored.active = user.active;
        stored.updated_date = Some(Utc::now());
        Ok(())
    }

    async fn store_user_attributes(
        &self,
        name: &str,
        attributes: &AttributeStore,
    ) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::StoreUserAttributes, name)
            .with_arguments(attribute_arguments(attributes));
        let mut directory = self.begin(call).await?;
        let stored = directory.user_mut(name)?;
        store_attributes(&mut stored.attributes, attributes);
        stored.updated_date = Some(Utc::now());
        Ok(())
    }

    async fn update_user_password(
        &self,
        name: &str,
        password: &GuardedString,
    ) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::UpdateUserPassword, name))
            .await?;
        directory.user_mut(name)?;
        directory.passwords.insert(fold(name), password.clone());
        Ok(())
    }

    async fn rename_user(&self, name: &str, new_name: &str) -> Result<(), RemoteError> {
        let call =
            RemoteCall::new(RemoteOperation::RenameUser, name).with_arguments([new_name]);
        let mut directory = self.begin(call).await?;
        let (old, new) = (fold(name), fold(new_name));
        if old != new && directory.users.contains_key(&new) {
            return Err(RemoteError::duplicate(USER, new_name));
        }
        let mut user = directory
            .users
            .remove(&old)
            .ok_or_else(|| RemoteError::not_found(USER, name))?;
        user.name = new_name.to_string();
        user.updated_date = Some(Utc::now());
        directory.users.insert(new.clone(), user);

        if let Some(password) = directory.passwords.remove(&old) {
            directory.passwords.insert(new.clone(), password);
        }
        if let Some(memberships) = directory.user_memberships.remove(&old) {
            directory.user_memberships.insert(new, memberships);
        }
        Ok(())
    }

    async fn add_user_to_groups(&self, name: &str, groups: &[String]) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::AddUserToGroups, name)
            .with_arguments(groups.iter().cloned());
        let mut directory = self.begin(call).await?;
        directory.user_mut(name)?;
        let canonical = directory.canonical_groups(groups)?;
        directory
            .user_memberships
            .entry(fold(name))
            .or_default()
            .extend(canonical);
        Ok(())
    }

    async fn remove_user_from_groups(
        &self,
        name: &str,
        groups: &[String],
    ) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::RemoveUserFromGroups, name)
            .with_arguments(groups.iter().cloned());
        let mut directory = self.begin(call).await?;
        directory.user_mut(name)?;
        if let Some(memberships) = directory.user_memberships.get_mut(&fold(name)) {
            memberships.retain(|g| !groups.iter().any(|r| r.eq_ignore_ascii_case(g)));
        }
        Ok(())
    }

    async fn fetch_users_page(
        &self,
        start: usize,
        size: usize,
    ) -> Result<Vec<RemoteUser>, RemoteError> {
        let call = RemoteCall::new(RemoteOperation::FetchUsersPage, USER)
            .with_arguments([start.to_string(), size.to_string()]);
        let directory = self.begin(call).await?;
        Ok(page(directory.users.values().cloned(), start, size))
    }

    async fn fetch_user_groups_page(
        &self,
        name: &str,
        start: usize,
        size: usize,
    ) -> Result<Vec<String>, RemoteError> {
        let call = RemoteCall::new(RemoteOperation::FetchUserGroupsPage, name)
            .with_arguments([start.to_string(), size.to_string()]);
        let mut directory = self.begin(call).await?;
        directory.user_mut(name)?;
        Ok(directory
            .user_memberships
            .get(&fold(name))
            .map(|groups| page(groups.iter().cloned(), start, size))
            .unwrap_or_default())
    }

    async fn delete_user(&self, name: &str) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::DeleteUser, name))
            .await?;
        let folded = fold(name);
        directory
            .users
            .remove(&folded)
            .ok_or_else(|| RemoteError::not_found(USER, name))?;
        directory.passwords.remove(&folded);
        directory.user_memberships.remove(&folded);
        Ok(())
    }

    async fn count_users(&self) -> Result<Option<usize>, RemoteError> {
        Ok(self
            .report_totals
            .then_some(self.directory.read().await.users.len()))
    }

    async fn fetch_group(&self, name: &str) -> Result<RemoteGroup, RemoteError> {
        let directory = self
            .begin(RemoteCall::new(RemoteOperation::FetchGroup, name))
            .await?;
        directory
            .groups
            .get(&fold(name))
            .cloned()
            .ok_or_else(|| RemoteError::not_found(GROUP, name))
    }

    async fn create_group(&self, group: &RemoteGroup) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::CreateGroup, group.name.as_str()))
            .await?;
        let folded = fold(&group.name);
        if directory.groups.contains_key(&folded) {
            return Err(RemoteError::duplicate(GROUP, group.name.as_str()));
        }
        let mut stored = group.clone();
        stored.groups = None;
        stored.attributes.retain(|_, values| !values.is_empty());
        directory.groups.insert(folded, stored);
        Ok(())
    }

    async fn update_group(&self, group: &RemoteGroup) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::UpdateGroup, group.name.as_str()))
            .await?;
        let stored = directory.group_mut(&group.name)?;
        stored.description = group.description.clone();
        stored.active = group.active;
        Ok(())
    }

    async fn store_group_attributes(
        &self,
        name: &str,
        attributes: &AttributeStore,
    ) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::StoreGroupAttributes, name)
            .with_arguments(attribute_arguments(attributes));
        let mut directory = self.begin(call).await?;
        let stored = directory.group_mut(name)?;
        store_attributes(&mut stored.attributes, attributes);
        Ok(())
    }

    async fn add_group_to_groups(&self, name: &str, parents: &[String]) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::AddGroupToGroups, name)
            .with_arguments(parents.iter().cloned());
        let mut directory = self.begin(call).await?;
        directory.group_mut(name)?;
        let canonical = directory.canonical_groups(parents)?;
        directory
            .group_memberships
            .entry(fold(name))
            .or_default()
            .extend(canonical);
        Ok(())
    }

    async fn remove_group_from_groups(
        &self,
        name: &str,
        parents: &[String],
    ) -> Result<(), RemoteError> {
        let call = RemoteCall::new(RemoteOperation::RemoveGroupFromGroups, name)
            .with_arguments(parents.iter().cloned());
        let mut directory = self.begin(call).await?;
        directory.group_mut(name)?;
        if let Some(memberships) = directory.group_memberships.get_mut(&fold(name)) {
            memberships.retain(|g| !parents.iter().any(|r| r.eq_ignore_ascii_case(g)));
        }
        Ok(())
    }

    async fn fetch_groups_page(
        &self,
        start: usize,
        size: usize,
    ) -> Result<Vec<RemoteGroup>, RemoteError> {
        let call = RemoteCall::new(RemoteOperation::FetchGroupsPage, GROUP)
            .with_arguments([start.to_string(), size.to_string()]);
        let directory = self.begin(call).await?;
        Ok(page(directory.groups.values().cloned(), start, size))
    }

    async fn fetch_group_parents_page(
        &self,
        name: &str,
        start: usize,
        size: usize,
    ) -> Result<Vec<String>, RemoteError> {
        let call = RemoteCall::new(RemoteOperation::FetchGroupParentsPage, name)
            .with_arguments([start.to_string(), size.to_string()]);
        let mut directory = self.begin(call).await?;
        directory.group_mut(name)?;
        Ok(directory
            .group_memberships
            .get(&fold(name))
            .map(|groups| page(groups.iter().cloned(), start, size))
            .unwrap_or_default())
    }

    async fn delete_group(&self, name: &str) -> Result<(), RemoteError> {
        let mut directory = self
            .begin(RemoteCall::new(RemoteOperation::DeleteGroup, name))
            .await?;
        let folded = fold(name);
        directory
            .groups
            .remove(&folded)
            .ok_or_else(|| RemoteError::not_found(GROUP, name))?;
        directory.group_memberships.remove(&folded);
        directory.forget_group(name);
        Ok(())
    }

    async fn count_groups(&self) -> Result<Option<usize>, RemoteError> {
        Ok(self
            .report_totals
            .then_some(self.directory.read().await.groups.len()))
    }

    async fn test_connection(&self) -> Result<(), RemoteError> {
        self.begin(RemoteCall::new(RemoteOperation::TestConnection, ""))
            .await
            .map(|_| ())
    }
}
