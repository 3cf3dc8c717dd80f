//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code per category.

use miette::Diagnostic;
use thiserror::Error;

use campusdesk_config::ConfigError;
use campusdesk_core::CoreError;
use campusdesk_core::request::FieldErrors;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const VALIDATION: i32 = 4;
    pub const CONNECTION: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(campusdesk::connection_failed),
        help(
            "Check that the API is reachable.\n\
             URL: {url}\n\
             Override it with --api-url or: campusdesk config set api_url <URL>"
        )
    )]
    ConnectionFailed { url: String, message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(campusdesk::auth_failed),
        help("Sign in again with: campusdesk login")
    )]
    AuthFailed { message: String },

    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(
        code(campusdesk::no_session),
        help(
            "Sign in with: campusdesk login\n\
             Or pass a token with --token / CAMPUSDESK_TOKEN."
        )
    )]
    NoSession { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource} {id} not found")]
    #[diagnostic(
        code(campusdesk::not_found),
        help("Run: campusdesk {command} list to see available rows")
    )]
    NotFound {
        resource: String,
        id: String,
        command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(campusdesk::not_found))]
    Missing { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(campusdesk::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(campusdesk::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(campusdesk::invalid_form), help("{details}"))]
    InvalidForm { message: String, details: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(campusdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: campusdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(campusdesk::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(campusdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(campusdesk::prompt))]
    Prompt(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(campusdesk::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(campusdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoSession { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::Missing { .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. }
            | Self::InvalidForm { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::VALIDATION,
            Self::Config(err) => match err {
                ConfigError::NoToken { .. } => exit_code::AUTH,
                ConfigError::UnknownProfile { .. } => exit_code::NOT_FOUND,
                ConfigError::Validation { .. } => exit_code::VALIDATION,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }

    /// Form errors as one line per field, for diagnostics help text.
    pub fn invalid_form(fields: &FieldErrors) -> Self {
        let message = fields
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid input".into());
        let details = fields
            .iter()
            .map(|(field, reason)| format!("{field}: {reason}"))
            .collect::<Vec<_>>()
            .join("\n");
        Self::InvalidForm { message, details }
    }

    /// Attach the base URL to a core error from a request against it.
    pub fn from_core(err: CoreError, url: &str) -> Self {
        match err {
            CoreError::ConnectionFailed { message } => Self::ConnectionFailed {
                url: url.to_owned(),
                message,
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { message } => Self::ConnectionFailed {
                url: "(configured API)".into(),
                message,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotAuthenticated => Self::AuthFailed {
                message: "Not logged in".into(),
            },
            CoreError::NotFound { message } => Self::Missing { message },
            CoreError::Validation { message, fields } => {
                if fields.is_empty() {
                    Self::Validation {
                        field: "input".into(),
                        reason: message,
                    }
                } else {
                    Self::invalid_form(&fields)
                }
            }
            CoreError::Rejected { message } => Self::Api {
                message,
                status: None,
            },
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoToken { profile } => Self::NoSession { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "Invalid credentials".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing: CliError = CoreError::NotFound {
            message: "Resource not found".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let offline = CliError::from_core(
            CoreError::ConnectionFailed {
                message: "Network error".into(),
            },
            "http://localhost/api/",
        );
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let no_token: CliError = ConfigError::NoToken {
            profile: "default".into(),
        }
        .into();
        assert_eq!(no_token.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn form_errors_keep_every_field() {
        let mut fields = FieldErrors::new();
        fields.insert("block_id".into(), "Block is required".into());
        fields.insert("name".into(), "Name is required".into());

        let err: CliError = CoreError::invalid(fields).into();
        assert_eq!(err.exit_code(), exit_code::VALIDATION);
        let CliError::InvalidForm { message, details } = err else {
            panic!("expected InvalidForm");
        };
        assert_eq!(message, "Block is required");
        assert_eq!(details, "block_id: Block is required\nname: Name is required");
    }
}
