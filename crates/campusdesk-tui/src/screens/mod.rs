//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod form;
pub mod login;
pub mod menu;
pub mod resource;

use campusdesk_core::controller::BUILDING_FILTER;
use campusdesk_core::request::FormValues;
use campusdesk_core::{
    Block, Building, Campus, Controller, Department, DepartmentType, EntityId, ResourceKind,
    Role, Room, RoomFacility, RoomType, User,
};

use crate::component::Component;
use crate::screen::ScreenId;
use resource::ResourceScreen;

/// Create every screen except Rooms, which is built per building.
pub fn create_screens(
    controller: &Controller,
    profile_name: &str,
    email: Option<String>,
    page_size: usize,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    let mut screens: Vec<(ScreenId, Box<dyn Component>)> = vec![
        (
            ScreenId::Login,
            Box::new(login::LoginScreen::new(
                controller.clone(),
                profile_name.to_owned(),
                email,
            )),
        ),
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(controller.clone())),
        ),
        (
            ScreenId::Campuses,
            ResourceScreen::<Campus>::new(ScreenId::Campuses, controller.clone(), page_size)
                .boxed(),
        ),
    ];
    screens.extend(
        campusdesk_core::menu::SETTINGS_PAGES
            .iter()
            .map(|&kind| (ScreenId::Settings(kind), settings_screen(kind, controller, page_size))),
    );
    screens
}

/// Table screen for one settings page.
fn settings_screen(kind: ResourceKind, ctl: &Controller, page_size: usize) -> Box<dyn Component> {
    let id = ScreenId::Settings(kind);
    let ctl = ctl.clone();
    match kind {
        ResourceKind::Campus => ResourceScreen::<Campus>::new(id, ctl, page_size).boxed(),
        ResourceKind::Block => ResourceScreen::<Block>::new(id, ctl, page_size).boxed(),
        ResourceKind::Building => ResourceScreen::<Building>::new(id, ctl, page_size).boxed(),
        ResourceKind::Room => ResourceScreen::<Room>::new(id, ctl, page_size).boxed(),
        ResourceKind::RoomType => ResourceScreen::<RoomType>::new(id, ctl, page_size).boxed(),
        ResourceKind::RoomFacility => {
            ResourceScreen::<RoomFacility>::new(id, ctl, page_size).boxed()
        }
        ResourceKind::DepartmentType => {
            ResourceScreen::<DepartmentType>::new(id, ctl, page_size).boxed()
        }
        ResourceKind::Department => ResourceScreen::<Department>::new(id, ctl, page_size).boxed(),
        ResourceKind::Role => ResourceScreen::<Role>::new(id, ctl, page_size).boxed(),
        ResourceKind::User => ResourceScreen::<User>::new(id, ctl, page_size).boxed(),
    }
}

/// Rooms of one building: filtered by it, and new rooms default to it.
pub fn rooms_screen(
    controller: &Controller,
    building: EntityId,
    page_size: usize,
) -> Box<dyn Component> {
    ResourceScreen::<Room>::new(ScreenId::Rooms, controller.clone(), page_size)
        .with_filter(BUILDING_FILTER, building.to_string())
        .with_defaults(FormValues::new().with("building_id", building.to_string()))
        .with_title(format!("Rooms · building #{building}"))
        .boxed()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use campusdesk_core::ControllerConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn every_tab_has_a_screen() {
        let ctl = Controller::new(ControllerConfig::new("http://localhost:9/api/").unwrap())
            .unwrap();
        let screens = create_screens(&ctl, "default", None, 10);
        let ids: HashSet<ScreenId> = screens.iter().map(|(id, _)| *id).collect();

        for id in ScreenId::tab_order() {
            assert!(ids.contains(&id), "missing screen {id}");
        }
        assert!(ids.contains(&ScreenId::Login));
        assert!(!ids.contains(&ScreenId::Rooms));
        assert_eq!(ids.len(), screens.len());
    }
}
