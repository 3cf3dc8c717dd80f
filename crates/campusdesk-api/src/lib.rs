//! Async Rust client for the campus facilities REST API.
//!
//! The backend wraps every response in a `{status, message, data, meta}`
//! envelope and authenticates with a bearer token obtained from
//! `auth/login`. This crate handles:
//!
//! - **Transport**: a shared [`reqwest::Client`] with timeout, JSON headers
//!   and a [`RetryPolicy`] for timeouts, network failures and idempotent 5xx
//! - **Authentication**: [`ApiClient::login`] installs the session token,
//!   which is attached as `Authorization: Bearer …` to every request
//! - **Resources**: [`ResourceKind`] describes each entity's collection path
//!   and its update/delete conventions, so CRUD is a single generic surface
//! - **Envelopes**: [`Envelope`], [`Page`] and [`PageMeta`] decode list and
//!   mutation responses, tolerating numbers sent as strings
//!
//! Errors map to the user-facing messages the dashboard shows; see [`Error`].

pub mod client;
pub mod de;
pub mod envelope;
pub mod error;
pub mod resource;
pub mod session;
pub mod transport;

pub use client::{ApiClient, DEFAULT_BASE_URL, Saved};
pub use envelope::{Ack, Envelope, Page, PageMeta, PageRequest};
pub use error::Error;
pub use resource::{DeleteStyle, ResourceKind, UpdateStyle};
pub use session::{AuthUser, RoleSummary, Session};
pub use transport::{RetryPolicy, TransportConfig};
