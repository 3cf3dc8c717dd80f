// ── Navigation menu ──
//
// Sidebar model: the dashboard link, the campus → block → building tree and
// the settings pages. Built from plain lists so it can be rendered by the
// TUI tree widget or printed by the CLI.

use std::fmt;

use campusdesk_api::{PageMeta, ResourceKind};
use serde::Serialize;

use crate::model::{Block, Building, EntityId};

/// Campus page size used by the menu.
pub const MENU_CAMPUS_PAGE_SIZE: u64 = 10;

pub const LOADING_LABEL: &str = "Loading...";
pub const LOGIN_REQUIRED: &str = "Please log in to view campus data";

/// Settings pages in menu order.
pub const SETTINGS_PAGES: [ResourceKind; 9] = [
    ResourceKind::Campus,
    ResourceKind::Block,
    ResourceKind::Building,
    ResourceKind::RoomType,
    ResourceKind::RoomFacility,
    ResourceKind::DepartmentType,
    ResourceKind::Department,
    ResourceKind::Role,
    ResourceKind::User,
];

// ── Routes ──────────────────────────────────────────────────────────

/// A navigable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    /// Full campus list.
    Campuses,
    /// Rooms of one building.
    Rooms(EntityId),
    /// Settings page for one resource.
    Settings(ResourceKind),
}

impl Route {
    pub fn path(self) -> String {
        match self {
            Self::Dashboard => "/dashboard".into(),
            Self::Campuses => "/campuses".into(),
            Self::Rooms(building) => format!("/rooms/{building}"),
            Self::Settings(kind) => format!("/settings-{kind}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.path())
    }
}

// ── Items ───────────────────────────────────────────────────────────

/// One node of the menu tree. Items without a route only expand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Unique within the tree (`campus-1`, `block-4`, `building-9`).
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn link(id: impl Into<String>, label: impl Into<String>, route: Route) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            route: Some(route),
            children: Vec::new(),
        }
    }

    pub fn group(id: impl Into<String>, label: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            route: None,
            children,
        }
    }

    /// Placeholder leaf (loading text, error text).
    pub fn note(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::group(id, label, Vec::new())
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Group blocks by campus and buildings by block.
///
/// Campuses come from the blocks themselves, in first-seen order, so a
/// campus without blocks does not appear. Blocks without an embedded
/// campus are skipped.
pub fn build_campus_tree(blocks: &[Block], buildings: &[Building]) -> Vec<MenuItem> {
    let mut campuses: Vec<MenuItem> = Vec::new();

    for block in blocks {
        let Some(campus) = block.campus.as_ref() else {
            continue;
        };
        let campus_id = format!("campus-{}", campus.id);
        if campuses.iter().any(|c| c.id == campus_id) {
            continue;
        }

        let children = blocks
            .iter()
            .filter(|b| b.campus.as_ref().is_some_and(|c| c.id == campus.id))
            .map(|b| {
                let rooms = buildings
                    .iter()
                    .filter(|building| building.block_key() == Some(b.id))
                    .map(|building| {
                        MenuItem::link(
                            format!("building-{}", building.id),
                            &building.name,
                            Route::Rooms(building.id),
                        )
                    })
                    .collect();
                MenuItem::group(format!("block-{}", b.id), &b.name, rooms)
            })
            .collect();

        campuses.push(MenuItem::group(campus_id, &campus.name, children));
    }

    campuses
}

// ── Campus section ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampusTree {
    Loading,
    Error(String),
    Loaded(Vec<MenuItem>),
}

impl CampusTree {
    /// Children of the "AAU Campuses" entry.
    pub fn items(&self) -> Vec<MenuItem> {
        match self {
            Self::Loading => vec![MenuItem::note("loading", LOADING_LABEL)],
            Self::Error(message) => vec![MenuItem::note("error", message)],
            Self::Loaded(items) => items.clone(),
        }
    }
}

/// Campus page the tree was loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampusPager {
    pub current_page: u64,
    pub last_page: u64,
}

impl Default for CampusPager {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
        }
    }
}

impl CampusPager {
    pub fn from_meta(meta: PageMeta) -> Self {
        Self {
            current_page: meta.current_page.max(1),
            last_page: meta.last_page.max(1),
        }
    }

    /// Target page if it lies within `1..=last_page`.
    pub fn go_to(self, page: u64) -> Option<u64> {
        (1..=self.last_page).contains(&page).then_some(page)
    }

    pub fn next(self) -> Option<u64> {
        self.go_to(self.current_page + 1)
    }

    pub fn previous(self) -> Option<u64> {
        self.go_to(self.current_page.saturating_sub(1))
    }

    pub fn is_paged(self) -> bool {
        self.last_page > 1
    }
}

/// Controls under the open campus section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuFooter {
    pub view_all: Route,
    /// Present only when there is more than one campus page.
    pub pager: Option<CampusPager>,
}

// ── Menu ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub campuses: CampusTree,
    pub pager: CampusPager,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            campuses: CampusTree::Loading,
            pager: CampusPager::default(),
        }
    }
}

impl Menu {
    pub fn loaded(items: Vec<MenuItem>, pager: CampusPager) -> Self {
        Self {
            campuses: CampusTree::Loaded(items),
            pager,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            campuses: CampusTree::Error(message.into()),
            pager: CampusPager::default(),
        }
    }

    pub fn logged_out() -> Self {
        Self::error(LOGIN_REQUIRED)
    }

    /// Footer for the campus section; only shown while it is expanded.
    pub fn footer(&self, campus_open: bool) -> Option<MenuFooter> {
        campus_open.then(|| MenuFooter {
            view_all: Route::Campuses,
            pager: self.pager.is_paged().then_some(self.pager),
        })
    }

    /// The whole sidebar.
    pub fn items(&self) -> Vec<MenuItem> {
        vec![
            MenuItem::link("dashboard", "Dashboards", Route::Dashboard),
            MenuItem::group("campus", "AAU Campuses", self.campuses.items()),
            settings_item(),
        ]
    }
}

fn settings_item() -> MenuItem {
    let pages = SETTINGS_PAGES
        .iter()
        .map(|&kind| {
            MenuItem::link(
                format!("{kind}-settings"),
                kind.plural_title(),
                Route::Settings(kind),
            )
        })
        .collect();
    MenuItem::group("settings", "Settings", pages)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fixtures() -> (Vec<Block>, Vec<Building>) {
        let blocks = serde_json::from_value(json!([
            {"id": 1, "name": "Block A", "campus": {"id": 10, "name": "Main"}},
            {"id": 2, "name": "Block B", "campus": {"id": 20, "name": "Lideta"}},
            {"id": 3, "name": "Block C", "campus": {"id": 10, "name": "Main (renamed)"}},
            {"id": 4, "name": "Orphan"}
        ]))
        .unwrap();
        let buildings = serde_json::from_value(json!([
            {"id": 7, "name": "Library", "block": {"id": 1, "name": "Block A"}},
            {"id": 8, "name": "Lab", "block_id": 3},
            {"id": 9, "name": "Hall", "block": {"id": 1, "name": "Block A"}}
        ]))
        .unwrap();
        (blocks, buildings)
    }

    #[test]
    fn tree_groups_by_campus_first_seen() {
        let (blocks, buildings) = fixtures();
        let tree = build_campus_tree(&blocks, &buildings);

        let campuses: Vec<&str> = tree.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(campuses, vec!["Main", "Lideta"]);

        let main = &tree[0];
        let blocks: Vec<&str> = main.children.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(blocks, vec!["Block A", "Block C"]);
        assert_eq!(main.children[0].children.len(), 2);

        let lab = main.find("building-8").unwrap();
        assert_eq!(lab.route.unwrap().path(), "/rooms/8");
        assert!(tree[1].children[0].children.is_empty());
    }

    #[test]
    fn campus_section_states() {
        let loading = Menu::default();
        assert_eq!(loading.items()[1].children[0].label, LOADING_LABEL);

        let out = Menu::logged_out();
        assert_eq!(out.items()[1].children[0].label, LOGIN_REQUIRED);
    }

    #[test]
    fn footer_and_pager_bounds() {
        let menu = Menu::loaded(Vec::new(), CampusPager::default());
        assert_eq!(menu.footer(false), None);
        let footer = menu.footer(true).unwrap();
        assert_eq!(footer.view_all.path(), "/campuses");
        assert!(footer.pager.is_none());

        let pager = CampusPager::from_meta(PageMeta {
            total: 25,
            last_page: 3,
            current_page: 3,
            per_page: 10,
        });
        assert_eq!(pager.next(), None);
        assert_eq!(pager.previous(), Some(2));
        assert_eq!(pager.go_to(0), None);
        let menu = Menu::loaded(Vec::new(), pager);
        assert_eq!(menu.footer(true).unwrap().pager, Some(pager));
    }

    #[test]
    fn settings_links() {
        let items = Menu::default().items();
        let settings = &items[2];
        assert_eq!(settings.children.len(), 9);
        assert_eq!(settings.children[3].label, "Room Types");
        assert_eq!(
            settings.children[3].route.unwrap().path(),
            "/settings-room-type"
        );
        assert_eq!(items[0].route, Some(Route::Dashboard));
    }
}
