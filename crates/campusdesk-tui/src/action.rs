//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use campusdesk_core::dashboard::Dashboard;
use campusdesk_core::menu::{Menu, Route};
use campusdesk_core::page::delete_prompt;
use campusdesk_core::{
    AuthUser, Block, Building, Campus, CoreError, Department, DepartmentType, EntityId, Notice,
    Page, Resource, ResourceKind, Role, Room, RoomFacility, RoomType, SubmitOutcome, User,
};

use crate::screen::ScreenId;

/// Result of a background fetch; errors are shared so actions stay `Clone`.
pub type Fetched<T> = Result<T, Arc<CoreError>>;

/// Lookup options for a choice field: `(id, name)`.
pub type Options = Vec<(EntityId, String)>;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    Navigate(Route),
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,
    FocusMenu,
    FocusContent,

    // ── Session ──
    LoggedIn(Arc<AuthUser>),
    LoginFailed(String),
    RequestLogout,
    Logout,
    /// A request came back 401; the stored token is no longer valid.
    SessionExpired,

    // ── Data ──
    DashboardLoaded(Dashboard),
    RequestMenuPage(u64),
    MenuLoaded(Menu),
    PageLoaded {
        screen: ScreenId,
        generation: u64,
        result: Fetched<LoadedPage>,
    },
    LookupLoaded {
        screen: ScreenId,
        field: &'static str,
        result: Fetched<Options>,
    },
    Submitted {
        screen: ScreenId,
        outcome: SubmitOutcome,
    },
    DeleteConfirmed {
        screen: ScreenId,
        id: EntityId,
    },
    Deleted {
        screen: ScreenId,
        notice: Notice,
    },

    // ── Overlays ──
    Notify(Notice),
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
}

/// Destructive actions waiting for y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete {
        screen: ScreenId,
        kind: ResourceKind,
        id: EntityId,
        name: String,
    },
    Logout,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { kind, name, .. } => f.write_str(&delete_prompt(*kind, name)),
            Self::Logout => f.write_str("Sign out and forget the stored token?"),
        }
    }
}

// ── Typed pages ─────────────────────────────────────────────────────

macro_rules! loaded_pages {
    ($($model:ident),* $(,)?) => {
        /// A fetched page of any resource, so one action can carry them all.
        #[derive(Debug, Clone)]
        pub enum LoadedPage {
            $($model(Page<$model>),)*
        }

        $(
            impl Listed for $model {
                fn wrap(page: Page<Self>) -> LoadedPage {
                    LoadedPage::$model(page)
                }

                fn unwrap_page(loaded: LoadedPage) -> Option<Page<Self>> {
                    match loaded {
                        LoadedPage::$model(page) => Some(page),
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Resources whose pages travel through [`Action::PageLoaded`].
pub trait Listed: Resource {
    fn wrap(page: Page<Self>) -> LoadedPage;

    /// `None` when the page holds a different resource.
    fn unwrap_page(loaded: LoadedPage) -> Option<Page<Self>>;
}

loaded_pages!(
    Campus,
    Block,
    Building,
    Room,
    RoomType,
    RoomFacility,
    DepartmentType,
    Department,
    Role,
    User,
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::PageMeta;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pages_unwrap_only_as_their_own_type() {
        let page = Page {
            data: Vec::<RoomType>::new(),
            meta: PageMeta::single(0),
        };
        let loaded = RoomType::wrap(page.clone());
        assert_eq!(RoomType::unwrap_page(loaded.clone()), Some(page));
        assert_eq!(Role::unwrap_page(loaded), None);
    }

    #[test]
    fn confirm_prompts() {
        let delete = ConfirmAction::Delete {
            screen: ScreenId::Campuses,
            kind: ResourceKind::Campus,
            id: EntityId::new(3).unwrap(),
            name: "Main".into(),
        };
        assert_eq!(delete.to_string(), delete_prompt(ResourceKind::Campus, "Main"));
        assert!(ConfirmAction::Logout.to_string().contains("Sign out"));
    }
}
