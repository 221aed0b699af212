//! Provisioning connector library for Rust.
//!
//! Reconciles users and groups held by an identity management console with
//! a remote identity service. A declarative schema maps host attributes onto
//! remote entities, and a delta-reconciliation layer turns add/remove updates
//! into the minimal set of remote calls.
//!
//! # Core Components
//!
//! - [`Connector`] - Session the host drives with create/update/delete/search
//! - [`SchemaDefinition`] - Attribute mapping for one object class
//! - [`IdentityService`] - Trait for implementing remote service clients
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use directory_connector::{Connector, ConnectorConfiguration};
//! use directory_connector::client::InMemoryIdentityService;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfiguration::from_file("connector.json")?;
//! let mut connector = Connector::new();
//! connector.init(config, InMemoryIdentityService::new()).await?;
//! let schema = connector.schema()?;
//! # let _ = schema;
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod model;
pub mod pagination;
pub mod schema;

// Re-export commonly used types for convenience
pub use attribute::{
    AttributeDelta, AttributeSet, AttributeValue, ConnectorObject, GuardedString, ObjectClass, Uid,
};
pub use client::{IdentityService, RemoteError};
pub use config::{ConnectorConfiguration, HttpProxyConfiguration};
pub use connector::{Connector, ConnectorSchema, SearchOptions, SearchResult};
pub use error::{ConnectorError, ConnectorResult, ErrorKind};
pub use filter::{Filter, SearchFilter};
pub use schema::{SchemaDefinition, SchemaDefinitionBuilder};
