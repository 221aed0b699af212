//! Raw failures reported by the remote identity service.
//!
//! These errors describe what the remote side said, without any opinion on
//! how the host should treat it. Classification into
//! [`ConnectorError`](crate::error::ConnectorError) happens in exactly one
//! place, the `From<RemoteError>` conversion in [`crate::error`].

/// Errors returned by [`IdentityService`](super::IdentityService) calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The named user or group does not exist
    #[error("{entity} '{name}' does not exist")]
    ObjectNotFound { entity: &'static str, name: String },

    /// A user or group with this name already exists
    #[error("{entity} '{name}' already exists")]
    DuplicateObject { entity: &'static str, name: String },

    /// The application is not allowed to perform the call
    #[error("Application permission denied: {message}")]
    ApplicationPermission { message: String },

    /// The application credentials were rejected
    #[error("Authentication rejected: {message}")]
    InvalidAuthentication { message: String },

    /// The service answered with an unexpected HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never reached the service or the response was lost
    #[error("Transport failure: {message}")]
    Transport { message: String },
}

impl RemoteError {
    /// Create an object-not-found error.
    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            entity,
            name: name.into(),
        }
    }

    /// Create a duplicate-object error.
    pub fn duplicate(entity: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateObject {
            entity,
            name: name.into(),
        }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
