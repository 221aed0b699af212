//! Connector configuration.
//!
//! A [`ConnectorConfiguration`] is read from a JSON document (camelCase keys)
//! or assembled with [`ConnectorConfigurationBuilder`]. Values omitted from a
//! document take their defaults; [`ConnectorConfiguration::validate`] checks
//! the required connection settings before a session uses them.
//!
//! # Examples
//!
//! ```rust
//! use directory_connector::config::ConnectorConfiguration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectorConfiguration::from_json(r#"{
//!     "baseUrl": "https://directory.example.com/identity",
//!     "applicationName": "provisioning",
//!     "applicationPassword": "s3cret",
//!     "userAttributesSchema": ["department$string", "tags$stringArray"]
//! }"#)?;
//!
//! assert_eq!(config.default_query_page_size, 50);
//! assert_eq!(config.user_custom_attributes().len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::attribute::GuardedString;
use crate::error::{ConnectorError, ConnectorResult};
use crate::schema::CustomAttribute;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_PAGE_SIZE: usize = 50;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 600_000;
const DEFAULT_PROXY_PORT: u16 = 3128;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_connection_timeout_ms() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_MS
}

fn default_socket_timeout_ms() -> u64 {
    DEFAULT_SOCKET_TIMEOUT_MS
}

fn default_proxy_port() -> u16 {
    DEFAULT_PROXY_PORT
}

/// HTTP proxy used to reach the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpProxyConfiguration {
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<GuardedString>,
}

impl HttpProxyConfiguration {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PROXY_PORT,
            user: None,
            password: None,
        }
    }
}

/// Settings of one connector instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfiguration {
    /// Base URL of the identity service REST API
    #[serde(default)]
    pub base_url: String,
    /// Application name the connector authenticates as
    #[serde(default)]
    pub application_name: String,
    /// Application password
    #[serde(default)]
    pub application_password: Option<GuardedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<HttpProxyConfiguration>,
    /// Window size for paged reads, including relation lookups
    #[serde(default = "default_page_size")]
    pub default_query_page_size: usize,
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,
    /// Custom user attributes as `name$type` tokens
    #[serde(default)]
    pub user_attributes_schema: Vec<String>,
    /// Custom group attributes as `name$type` tokens
    #[serde(default)]
    pub group_attributes_schema: Vec<String>,
}

impl Default for ConnectorConfiguration {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            application_name: String::new(),
            application_password: None,
            http_proxy: None,
            default_query_page_size: DEFAULT_PAGE_SIZE,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            socket_timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
            user_attributes_schema: Vec::new(),
            group_attributes_schema: Vec::new(),
        }
    }
}

impl ConnectorConfiguration {
    /// Create a builder with the required connection settings.
    pub fn builder(
        base_url: impl Into<String>,
        application_name: impl Into<String>,
        application_password: GuardedString,
    ) -> ConnectorConfigurationBuilder {
        ConnectorConfigurationBuilder::new(base_url, application_name, application_password)
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> ConnectorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check that the connection settings are present and usable.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConnectorError::configuration("Base URL is required"));
        }
        if self.application_name.trim().is_empty() {
            return Err(ConnectorError::configuration("Application name is required"));
        }
        if self
            .application_password
            .as_ref()
            .is_none_or(GuardedString::is_empty)
        {
            return Err(ConnectorError::configuration(
                "Application password is required",
            ));
        }
        if self.default_query_page_size == 0 {
            return Err(ConnectorError::configuration(
                "Default query page size must be greater than 0",
            ));
        }
        if let Some(proxy) = &self.http_proxy {
            if proxy.host.trim().is_empty() {
                return Err(ConnectorError::configuration(
                    "HTTP proxy host must not be empty",
                ));
            }
        }
        Ok(())
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Valid custom user attribute declarations; malformed or repeated tokens are dropped.
    pub fn user_custom_attributes(&self) -> Vec<CustomAttribute> {
        CustomAttribute::parse_all(&self.user_attributes_schema)
    }

    /// Valid custom group attribute declarations; malformed or repeated tokens are dropped.
    pub fn group_custom_attributes(&self) -> Vec<CustomAttribute> {
        CustomAttribute::parse_all(&self.group_attributes_schema)
    }
}

/// Builder for [`ConnectorConfiguration`].
pub struct ConnectorConfigurationBuilder {
    configuration: ConnectorConfiguration,
}

impl ConnectorConfigurationBuilder {
    pub fn new(
        base_url: impl Into<String>,
        application_name: impl Into<String>,
        application_password: GuardedString,
    ) -> Self {
        Self {
            configuration: ConnectorConfiguration {
                base_url: base_url.into(),
                application_name: application_name.into(),
                application_password: Some(application_password),
                ..ConnectorConfiguration::default()
            },
        }
    }

    pub fn with_http_proxy(mut self, proxy: HttpProxyConfiguration) -> Self {
        self.configuration.http_proxy = Some(proxy);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.configuration.default_query_page_size = page_size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.configuration.connection_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.configuration.socket_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_user_attributes_schema<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configuration.user_attributes_schema = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group_attributes_schema<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configuration.group_attributes_schema = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Build the configuration with validation.
    pub fn build(self) -> ConnectorResult<ConnectorConfiguration> {
        self.configuration.validate()?;
        Ok(self.configuration)
    }
}
