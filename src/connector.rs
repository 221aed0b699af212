//! Host-facing connector session.
//!
//! A [`Connector`] is initialized once with a configuration and an
//! [`IdentityService`] client. Initialization validates the configuration,
//! checks the connection and builds the user and group schemas; the session
//! then dispatches each host operation to the handler of the requested object
//! class until it is disposed.
//!
//! # Examples
//!
//! ```rust
//! use directory_connector::attribute::{AttributeSet, GuardedString, ObjectClass};
//! use directory_connector::client::InMemoryIdentityService;
//! use directory_connector::config::ConnectorConfiguration;
//! use directory_connector::connector::{Connector, SearchOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfiguration::builder(
//!     "https://directory.example.com",
//!     "provisioning",
//!     GuardedString::new("s3cret"),
//! )
//! .build()?;
//!
//! let mut connector = Connector::new();
//! connector.init(config, InMemoryIdentityService::new()).await?;
//!
//! let uid = connector
//!     .create(&ObjectClass::user(), &AttributeSet::new().with("username", "alice"))
//!     .await?;
//!
//! let mut names = Vec::new();
//! connector
//!     .search(&ObjectClass::user(), None, &SearchOptions::default(), |object| {
//!         names.push(object.name().to_string());
//!         true
//!     })
//!     .await?;
//! assert_eq!(names, vec!["alice".to_string()]);
//! # let _ = uid;
//! # Ok(())
//! # }
//! ```

use crate::attribute::{AttributeDelta, AttributeSet, ConnectorObject, ObjectClass, Uid};
use crate::client::IdentityService;
use crate::config::ConnectorConfiguration;
use crate::error::{ConnectorError, ConnectorResult, ErrorKind};
use crate::filter::{self, Filter, SearchFilter};
use crate::handlers::{GroupHandler, ObjectHandler, ReadOptions, UserHandler};
use crate::pagination::remaining_paged_results;
use crate::schema::ObjectClassInfo;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;

/// Search options the connector honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationOption {
    PageSize,
    PagedResultsOffset,
    AttributesToGet,
    ReturnDefaultAttributes,
    AllowPartialAttributeValues,
}

/// Introspection document for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSchema {
    pub object_classes: Vec<ObjectClassInfo>,
    pub operation_options: Vec<OperationOption>,
}

impl ConnectorSchema {
    /// Find the record of one object class.
    pub fn object_class(&self, object_class: &ObjectClass) -> Option<&ObjectClassInfo> {
        self.object_classes
            .iter()
            .find(|info| &info.object_class == object_class)
    }
}

/// Options of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Window size; the configured default when absent
    pub page_size: Option<usize>,
    /// 1-based offset of a single page; absent or 0 enumerates everything
    pub paged_results_offset: Option<usize>,
    /// Attributes to return; the defaults when absent
    pub attributes_to_get: Option<Vec<String>>,
    /// Return the default attributes in addition to `attributes_to_get`
    pub return_default_attributes: bool,
    /// Skip relation lookups and mark those attributes incomplete
    pub allow_partial_attribute_values: bool,
}

impl SearchOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_paged_results_offset(mut self, offset: usize) -> Self {
        self.paged_results_offset = Some(offset);
        self
    }

    pub fn with_attributes_to_get<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_to_get = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_return_default_attributes(mut self, enabled: bool) -> Self {
        self.return_default_attributes = enabled;
        self
    }

    pub fn with_allow_partial_attribute_values(mut self, enabled: bool) -> Self {
        self.allow_partial_attribute_values = enabled;
        self
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Objects handed to the result handler
    pub handled: usize,
    /// Objects left after the requested page; only for explicit page offsets
    pub remaining_paged_results: Option<i64>,
}

struct Session<C> {
    configuration: ConnectorConfiguration,
    client: Arc<C>,
    users: UserHandler<C>,
    groups: GroupHandler<C>,
}

/// A connector session bound to one identity service.
pub struct Connector<C> {
    session: Option<Session<C>>,
}

impl<C: IdentityService> Default for Connector<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IdentityService> Connector<C> {
    /// Create an uninitialized connector.
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Validate the configuration, check the connection and build the schemas.
    ///
    /// Re-initializing replaces the previous session.
    pub async fn init(&mut self, configuration: ConnectorConfiguration, client: C) -> ConnectorResult<()> {
        configuration.validate()?;
        info!(
            "Initializing connector for '{}' as application '{}'",
            configuration.base_url, configuration.application_name
        );

        let client = Arc::new(client);
        client.test_connection().await?;

        let page_size = configuration.default_query_page_size;
        let users = UserHandler::new(
            Arc::clone(&client),
            UserHandler::<C>::create_schema(&configuration.user_custom_attributes())?,
            page_size,
        );
        let groups = GroupHandler::new(
            Arc::clone(&client),
            GroupHandler::<C>::create_schema(&configuration.group_custom_attributes())?,
            page_size,
        );

        self.session = Some(Session {
            configuration,
            client,
            users,
            groups,
        });
        debug!("Connector initialized");
        Ok(())
    }

    fn session(&self) -> ConnectorResult<&Session<C>> {
        self.session.as_ref().ok_or(ConnectorError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// The active configuration.
    pub fn configuration(&self) -> ConnectorResult<&ConnectorConfiguration> {
        Ok(&self.session()?.configuration)
    }

    /// Describe the object classes and search options of this connector.
    pub fn schema(&self) -> ConnectorResult<ConnectorSchema> {
        let session = self.session()?;
        Ok(ConnectorSchema {
            object_classes: vec![
                session.users.object_class_info(),
                session.groups.object_class_info(),
            ],
            operation_options: vec![
                OperationOption::PageSize,
                OperationOption::PagedResultsOffset,
                OperationOption::AttributesToGet,
                OperationOption::ReturnDefaultAttributes,
                OperationOption::AllowPartialAttributeValues,
            ],
        })
    }

    /// Create an object and return its identifier.
    pub async fn create(&self, object_class: &ObjectClass, attributes: &AttributeSet) -> ConnectorResult<Uid> {
        let session = self.session()?;
        let result = match object_class.as_str() {
            ObjectClass::USER => session.users.create(attributes).await,
            ObjectClass::GROUP => session.groups.create(attributes).await,
            _ => Err(unsupported(object_class)),
        };
        report("create", object_class, result)
    }

    /// Apply update deltas to an object.
    pub async fn update_delta(
        &self,
        object_class: &ObjectClass,
        uid: &Uid,
        deltas: &[AttributeDelta],
    ) -> ConnectorResult<Uid> {
        let session = self.session()?;
        let result = match object_class.as_str() {
            ObjectClass::USER => session.users.update_delta(uid, deltas).await,
            ObjectClass::GROUP => session.groups.update_delta(uid, deltas).await,
            _ => Err(unsupported(object_class)),
        };
        report("update", object_class, result)
    }

    /// Delete an object.
    pub async fn delete(&self, object_class: &ObjectClass, uid: &Uid) -> ConnectorResult<()> {
        let session = self.session()?;
        let result = match object_class.as_str() {
            ObjectClass::USER => session.users.delete(uid).await,
            ObjectClass::GROUP => session.groups.delete(uid).await,
            _ => Err(unsupported(object_class)),
        };
        report("delete", object_class, result)
    }

    /// Translate a host filter into a direct lookup, if it has one.
    pub fn translate_filter(
        &self,
        object_class: &ObjectClass,
        filter: &Filter,
    ) -> ConnectorResult<Option<SearchFilter>> {
        let session = self.session()?;
        match object_class.as_str() {
            ObjectClass::USER => Ok(translate_for(&session.users, filter)),
            ObjectClass::GROUP => Ok(translate_for(&session.groups, filter)),
            _ => Err(unsupported(object_class)),
        }
    }

    /// Hand matching objects to `handler` until it returns `false`.
    ///
    /// Without a filter every object is enumerated, page by page.
    pub async fn search<F>(
        &self,
        object_class: &ObjectClass,
        filter: Option<&SearchFilter>,
        options: &SearchOptions,
        handler: F,
    ) -> ConnectorResult<SearchResult>
    where
        F: FnMut(ConnectorObject) -> bool,
    {
        let session = self.session()?;
        let default_page_size = session.configuration.default_query_page_size;
        info!("Searching '{}' with filter {:?}", object_class, filter);

        let result = match object_class.as_str() {
            ObjectClass::USER => {
                search_with(&session.users, filter, options, default_page_size, handler).await
            }
            ObjectClass::GROUP => {
                search_with(&session.groups, filter, options, default_page_size, handler).await
            }
            _ => Err(unsupported(object_class)),
        };
        report("search", object_class, result)
    }

    /// Check that the identity service is reachable.
    pub async fn test(&self) -> ConnectorResult<()> {
        let session = self.session()?;
        info!("Testing connection to '{}'", session.configuration.base_url);
        Ok(session.client.test_connection().await?)
    }

    /// Close the client and drop the session.
    pub async fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Disposing connector for '{}'", session.configuration.base_url);
            session.client.close().await;
        }
    }
}

fn unsupported(object_class: &ObjectClass) -> ConnectorError {
    ConnectorError::UnsupportedObjectClass(object_class.to_string())
}

/// Log a failed operation and hand the result back unchanged.
fn report<T>(operation: &str, object_class: &ObjectClass, result: ConnectorResult<T>) -> ConnectorResult<T> {
    if let Err(e) = &result {
        match e.kind() {
            ErrorKind::AlreadyExists | ErrorKind::NotFound => {
                warn!("{} of '{}' failed: {}", operation, object_class, e)
            }
            _ => error!("{} of '{}' failed: {}", operation, object_class, e),
        }
    }
    result
}

fn translate_for<H: ObjectHandler>(handler: &H, filter: &Filter) -> Option<SearchFilter> {
    let schema = handler.schema();
    filter::translate(
        filter,
        schema.uid_descriptor().name(),
        schema.name_descriptor().name(),
    )
}

async fn search_with<H, F>(
    handler: &H,
    filter: Option<&SearchFilter>,
    options: &SearchOptions,
    default_page_size: usize,
    mut results: F,
) -> ConnectorResult<SearchResult>
where
    H: ObjectHandler,
    F: FnMut(ConnectorObject) -> bool,
{
    let attributes_to_get = handler.schema().attributes_to_get(
        options.attributes_to_get.as_deref(),
        options.return_default_attributes,
    );
    let read = ReadOptions::new(attributes_to_get, options.allow_partial_attribute_values);

    let page_size = options
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(default_page_size);
    let page_offset = options.paged_results_offset.unwrap_or(0);

    let found = match filter {
        Some(SearchFilter::ByUid(uid)) => handler.get_by_uid(uid, &read).await?,
        Some(SearchFilter::ByName(name)) => handler.get_by_name(name, &read).await?,
        None => {
            let handled = handler
                .get_all(&read, page_size, page_offset, results)
                .await?;

            let remaining_paged_results = if page_offset >= 1 {
                let total = handler.count().await?.unwrap_or(handled);
                remaining_paged_results(total, page_size, page_offset)
            } else {
                None
            };
            return Ok(SearchResult {
                handled,
                remaining_paged_results,
            });
        }
    };

    let handled = match found {
        Some(object) => {
            results(object);
            1
        }
        None => 0,
    };
    // A direct lookup counts only what it delivered
    Ok(SearchResult {
        handled,
        remaining_paged_results: remaining_paged_results(handled, page_size, page_offset),
    })
}
