// campusdesk-core: domain model, table engine and CRUD workflows between
// campusdesk-api and its consumers (CLI/TUI).

pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod menu;
pub mod model;
pub mod page;
pub mod permissions;
pub mod request;
pub mod resource;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::Controller;
pub use error::CoreError;
pub use page::{Notice, NoticeLevel, ResourcePage, SubmitOutcome};
pub use resource::Resource;

pub use campusdesk_api::{
    Ack, AuthUser, DEFAULT_BASE_URL, Page, PageMeta, PageRequest, ResourceKind, Session,
};

// Model types at the crate root for ergonomics.
pub use model::{
    Block, Building, Campus, Department, DepartmentType, EntityId, Permission, Role, Room,
    RoomFacility, RoomType, User,
};
