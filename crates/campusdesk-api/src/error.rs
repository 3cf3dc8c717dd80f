use std::collections::BTreeMap;

use thiserror::Error;

/// Top-level error type for the `campusdesk-api` crate.
///
/// The display strings are the messages shown to staff, so they are phrased
/// for people rather than for logs. `campusdesk-core` wraps these and the CLI
/// maps them onto diagnostics and exit codes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401, or a login rejected by the backend.
    #[error("{message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The request did not complete within the configured timeout.
    #[error("Connection timed out. Please check your internet connection and try again.")]
    Timeout,

    /// No response was received (DNS failure, refused connection, reset).
    #[error("Network error. Please check your internet connection.")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// Any other HTTP transport error (body read failures, redirects).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 500.
    #[error("Internal Server Error")]
    ServerError,

    /// HTTP 404.
    #[error("Sorry! the data you are looking for could not be found")]
    NotFound,

    /// HTTP 422 with per-field messages (`{"errors": {"email": ["taken"]}}`).
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Any other non-success status. `message` comes from the response body.
    #[error("{message}")]
    Api { status: u16, message: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// A 2xx response whose envelope carried `status: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Requests ────────────────────────────────────────────────────
    /// An update or delete was attempted without an entity id.
    #[error("{resource} ID is required for updating")]
    MissingId { resource: String },
}

impl Error {
    /// Classify a `reqwest` failure into timeout, network or transport.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || (err.is_request() && err.status().is_none()) {
            Self::Network { source: err }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if the session token was rejected and logging in
    /// again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network { .. } | Self::ServerError => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Api { status: 404, .. })
    }

    /// HTTP status code behind this error, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::ServerError => Some(500),
            Self::NotFound => Some(404),
            Self::Validation { .. } => Some(422),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Per-field validation messages, if the backend sent any.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            Error::Timeout.to_string(),
            "Connection timed out. Please check your internet connection and try again."
        );
        assert_eq!(Error::ServerError.to_string(), "Internal Server Error");
        assert_eq!(
            Error::NotFound.to_string(),
            "Sorry! the data you are looking for could not be found"
        );
        assert_eq!(
            Error::MissingId {
                resource: "Role".into()
            }
            .to_string(),
            "Role ID is required for updating"
        );
    }

    #[test]
    fn transient_classification() {
        assert!(Error::Timeout.is_transient());
        assert!(Error::ServerError.is_transient());
        assert!(
            Error::Api {
                status: 503,
                message: "busy".into()
            }
            .is_transient()
        );
        assert!(!Error::NotFound.is_transient());
        assert!(
            !Error::Authentication {
                message: "Invalid credentials".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn status_and_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_owned(), vec!["The email has already been taken.".to_owned()]);
        let err = Error::Validation {
            message: "The given data was invalid.".into(),
            errors,
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.field_errors().unwrap()["email"].len(), 1);
        assert!(Error::NotFound.is_not_found());
        assert_eq!(Error::Timeout.status(), None);
    }
}
