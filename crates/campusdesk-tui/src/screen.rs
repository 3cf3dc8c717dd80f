//! Screen identifiers and their mapping to menu routes.

use std::fmt;

use campusdesk_core::ResourceKind;
use campusdesk_core::menu::{Route, SETTINGS_PAGES};

/// Identifies each screen in the content pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    /// Sign-in form; takes the whole frame.
    Login,
    #[default]
    Dashboard,
    Campuses,
    /// Rooms of the building last opened from the menu.
    Rooms,
    Settings(ResourceKind),
}

impl ScreenId {
    /// Screens reachable with Tab / Shift+Tab, in menu order.
    pub fn tab_order() -> Vec<Self> {
        let mut order = vec![Self::Dashboard, Self::Campuses];
        order.extend(SETTINGS_PAGES.iter().map(|&kind| Self::Settings(kind)));
        order
    }

    pub fn from_route(route: Route) -> Self {
        match route {
            Route::Dashboard => Self::Dashboard,
            Route::Campuses => Self::Campuses,
            Route::Rooms(_) => Self::Rooms,
            Route::Settings(kind) => Self::Settings(kind),
        }
    }

    /// Route for screens that do not carry a parameter.
    pub fn route(self) -> Option<Route> {
        match self {
            Self::Dashboard => Some(Route::Dashboard),
            Self::Campuses => Some(Route::Campuses),
            Self::Settings(kind) => Some(Route::Settings(kind)),
            Self::Login | Self::Rooms => None,
        }
    }

    /// Next screen in tab order (wraps around). Screens outside the
    /// order land on the first entry.
    pub fn next(self) -> Self {
        let order = Self::tab_order();
        let next = order
            .iter()
            .position(|&s| s == self)
            .map_or(0, |i| (i + 1) % order.len());
        order.get(next).copied().unwrap_or_default()
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let order = Self::tab_order();
        let prev = order
            .iter()
            .position(|&s| s == self)
            .map_or(0, |i| (i + order.len() - 1) % order.len());
        order.get(prev).copied().unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Campuses => "Campuses",
            Self::Rooms => "Rooms",
            Self::Settings(kind) => kind.plural_title(),
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::EntityId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tab_order_wraps() {
        let order = ScreenId::tab_order();
        assert_eq!(order.first(), Some(&ScreenId::Dashboard));
        assert_eq!(order.last(), Some(&ScreenId::Settings(ResourceKind::User)));
        assert_eq!(ScreenId::Dashboard.next(), ScreenId::Campuses);
        assert_eq!(ScreenId::Dashboard.prev(), ScreenId::Settings(ResourceKind::User));
        assert_eq!(ScreenId::Settings(ResourceKind::User).next(), ScreenId::Dashboard);
        assert_eq!(ScreenId::Rooms.next(), ScreenId::Dashboard);
    }

    #[test]
    fn routes_map_to_screens() {
        let building = EntityId::new(4).unwrap();
        assert_eq!(ScreenId::from_route(Route::Rooms(building)), ScreenId::Rooms);
        assert_eq!(
            ScreenId::from_route(Route::Settings(ResourceKind::RoomType)),
            ScreenId::Settings(ResourceKind::RoomType)
        );
        assert_eq!(ScreenId::Campuses.route(), Some(Route::Campuses));
        assert_eq!(ScreenId::Rooms.route(), None);
        assert_eq!(ScreenId::Settings(ResourceKind::Role).to_string(), "Roles");
    }
}
