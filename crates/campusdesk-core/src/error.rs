// ── Core error types ──
//
// Errors surfaced to the CLI and TUI. Transport details are folded into a
// few categories; the messages stay the ones staff see in the dashboard.

use thiserror::Error;

use crate::request::FieldErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("{message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    // ── Connectivity ─────────────────────────────────────────────────
    /// Timeouts and requests that never got a response.
    #[error("{message}")]
    ConnectionFailed { message: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("{message}")]
    NotFound { message: String },

    /// Invalid input, caught locally or reported by the backend (HTTP 422).
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    /// The backend answered `status: false`.
    #[error("{message}")]
    Rejected { message: String },

    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Local validation failure with per-field messages.
    pub fn invalid(fields: FieldErrors) -> Self {
        let message = fields
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid input".into());
        Self::Validation { message, fields }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated
        )
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// A message the backend wrote for people, as opposed to a generic
    /// status description. Used to decide whether a failure notice can be
    /// more specific than "Failed to save ...".
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message, .. } | Self::Rejected { message } => Some(message),
            Self::Api {
                message,
                status: Some(status),
            } if (400..500).contains(status) && message != "An error occurred" => Some(message),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<campusdesk_api::Error> for CoreError {
    fn from(err: campusdesk_api::Error) -> Self {
        use campusdesk_api::Error as Api;

        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::Timeout | Api::Network { .. } => Self::ConnectionFailed {
                message: err.to_string(),
            },
            Api::Transport(ref e) => Self::Api {
                message: err.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid API URL: {e}"),
            },
            Api::ServerError => Self::Api {
                message: err.to_string(),
                status: Some(500),
            },
            Api::NotFound => Self::NotFound {
                message: err.to_string(),
            },
            Api::Validation { message, errors } => Self::Validation {
                message,
                fields: errors
                    .into_iter()
                    .filter_map(|(field, messages)| {
                        messages.into_iter().next().map(|first| (field, first))
                    })
                    .collect(),
            },
            Api::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            Api::Rejected { message } => Self::Rejected { message },
            Api::Deserialization { message, body: _ } => {
                Self::Internal(format!("Unexpected response: {message}"))
            }
            Api::MissingId { .. } => {
                let message = err.to_string();
                let mut fields = FieldErrors::new();
                fields.insert("id".into(), message.clone());
                Self::Validation { message, fields }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn keeps_user_facing_messages() {
        let err = CoreError::from(campusdesk_api::Error::Timeout);
        assert!(err.is_connection());
        assert_eq!(
            err.to_string(),
            "Connection timed out. Please check your internet connection and try again."
        );

        let err = CoreError::from(campusdesk_api::Error::NotFound);
        assert!(err.is_not_found());
        assert!(err.backend_message().is_none());
    }

    #[test]
    fn validation_keeps_first_field_message() {
        let mut errors = BTreeMap::new();
        errors.insert(
            "email".to_owned(),
            vec!["taken".to_owned(), "invalid".to_owned()],
        );
        let err = CoreError::from(campusdesk_api::Error::Validation {
            message: "The given data was invalid.".into(),
            errors,
        });
        assert_eq!(err.field_errors().unwrap()["email"], "taken");
        assert_eq!(err.backend_message(), Some("The given data was invalid."));
    }

    #[test]
    fn generic_api_message_is_not_backend_text() {
        let err = CoreError::Api {
            message: "An error occurred".into(),
            status: Some(403),
        };
        assert!(err.backend_message().is_none());
        let err = CoreError::Api {
            message: "Forbidden for your role".into(),
            status: Some(403),
        };
        assert_eq!(err.backend_message(), Some("Forbidden for your role"));
    }

    #[test]
    fn invalid_uses_first_message() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), "Name is required".into());
        let err = CoreError::invalid(fields);
        assert_eq!(err.to_string(), "Name is required");
    }
}
