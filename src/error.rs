//! Error types for connector operations.
//!
//! Every failure surfaced to the host is a [`ConnectorError`]. Raw failures
//! from the remote identity service arrive as [`RemoteError`] and are
//! classified exactly once, through the `From` conversion below, at the point
//! where a handler awaits a remote call. The schema engine and the staging
//! models never catch or reclassify errors; they propagate them with `?`.

use crate::client::RemoteError;

/// Coarse classification of connector failures.
///
/// Hosts use the kind to decide retry policy: [`ErrorKind::NotFound`] and
/// [`ErrorKind::AlreadyExists`] are recognizable outcomes, every other kind
/// is a generic operation failure carrying the original remote message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The identifier or name resolves to nothing.
    NotFound,
    /// A create collided with an existing object.
    AlreadyExists,
    /// Remote authorization rejected the call.
    PermissionDenied,
    /// Remote or local validation rejected attribute values.
    InvalidInput,
    /// Network, timeout or unclassified remote failure.
    TransientIo,
    /// Connector configuration or schema construction problem.
    Configuration,
}

/// Main error type for connector operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The target object does not exist in the remote service
    #[error("Object not found: {message}")]
    NotFound { message: String },

    /// The object to create already exists in the remote service
    #[error("Object already exists: {message}")]
    AlreadyExists { message: String },

    /// The remote service refused the call for this application
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// An attribute value was rejected, or an attribute is unknown
    #[error("Invalid attribute value: {message}")]
    InvalidAttributeValue { message: String },

    /// The remote service rejected the connector's credentials
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Transport failure or any remote failure without a better classification
    #[error("Remote I/O error: {message}")]
    Io { message: String },

    /// Invalid connector configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A schema definition violates the descriptor invariants
    #[error("Invalid schema definition for '{object_class}': {message}")]
    InvalidSchema {
        object_class: String,
        message: String,
    },

    /// The host asked for an object class this connector does not manage
    #[error("Unsupported object class: {0}")]
    UnsupportedObjectClass(String),

    /// The connector session was disposed or never initialized
    #[error("Connector is not initialized")]
    NotInitialized,

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    File(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Create an invalid attribute value error.
    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::InvalidAttributeValue {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::InvalidAttributeValue { .. } | Self::UnsupportedObjectClass(_) => {
                ErrorKind::InvalidInput
            }
            Self::ConnectionFailed { .. } | Self::Io { .. } | Self::NotInitialized => {
                ErrorKind::TransientIo
            }
            Self::Configuration { .. }
            | Self::InvalidSchema { .. }
            | Self::File(_)
            | Self::Json(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the target object was missing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Whether a create collided with an existing object.
    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }
}

impl From<RemoteError> for ConnectorError {
    fn from(error: RemoteError) -> Self {
        let message = error.to_string();
        match error {
            RemoteError::ObjectNotFound { .. } => Self::NotFound { message },
            RemoteError::DuplicateObject { .. } => Self::AlreadyExists { message },
            RemoteError::ApplicationPermission { .. } => Self::PermissionDenied { message },
            RemoteError::InvalidAuthentication { .. } => Self::ConnectionFailed { message },
            RemoteError::Http { status, .. } => match status {
                400 => Self::InvalidAttributeValue { message },
                403 => Self::PermissionDenied { message },
                404 => Self::NotFound { message },
                409 => Self::AlreadyExists { message },
                401 => Self::ConnectionFailed { message },
                _ => Self::Io { message },
            },
            RemoteError::Transport { .. } => Self::Io { message },
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
