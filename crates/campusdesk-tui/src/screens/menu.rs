//! Sidebar: dashboard link, the campus → block → building tree and the
//! settings pages.
//!
//! The campus section loads one page of campuses at a time; `[` and `]`
//! move between pages while the section is open. Picking a building opens
//! its rooms.

use std::cell::RefCell;

use campusdesk_core::Controller;
use campusdesk_core::menu::{Menu, MenuItem, Route};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use tui_tree_widget::{Tree, TreeItem, TreeState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets;

const CAMPUS_GROUP: &str = "campus";

pub struct MenuPanel {
    controller: Controller,
    action_tx: Option<UnboundedSender<Action>>,
    menu: Menu,
    items: Vec<TreeItem<'static, String>>,
    /// Rendering needs `&mut TreeState`; render only gets `&self`.
    state: RefCell<TreeState<String>>,
    /// Route of the screen on show, drawn bold.
    active: Option<Route>,
    focused: bool,
    loading: bool,
}

impl MenuPanel {
    pub fn new(controller: Controller) -> Self {
        let mut state = TreeState::default();
        state.open(vec![CAMPUS_GROUP.to_owned()]);
        state.select(vec!["dashboard".to_owned()]);
        let mut panel = Self {
            controller,
            action_tx: None,
            menu: Menu::default(),
            items: Vec::new(),
            state: RefCell::new(state),
            active: Some(Route::Dashboard),
            focused: false,
            loading: false,
        };
        panel.rebuild();
        panel
    }

    fn set_menu(&mut self, menu: Menu) {
        self.menu = menu;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.items = self
            .menu
            .items()
            .iter()
            .map(|item| tree_item(item, self.active))
            .collect();
    }

    fn load_page(&mut self, page: u64) {
        self.loading = true;
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        debug!(page, "loading campus menu");
        let ctl = self.controller.clone();
        tokio::spawn(async move {
            let menu = ctl.menu(page).await;
            let _ = tx.send(Action::MenuLoaded(menu));
        });
    }

    fn campus_open(&self) -> bool {
        self.state
            .borrow()
            .opened()
            .contains(&vec![CAMPUS_GROUP.to_owned()])
    }

    /// Follow the selected link, or fold/unfold the selected group.
    fn activate(&mut self) -> Option<Action> {
        let selected = self.state.borrow().selected().last().cloned()?;
        let route = self
            .menu
            .items()
            .iter()
            .find_map(|item| item.find(&selected))
            .and_then(|item| item.route);
        match route {
            Some(route) => Some(Action::Navigate(route)),
            None => {
                self.state.borrow_mut().toggle_selected();
                None
            }
        }
    }

    fn turn_page(&mut self, forward: bool) {
        if self.loading || !self.campus_open() {
            return;
        }
        let pager = self.menu.pager;
        let target = if forward { pager.next() } else { pager.previous() };
        if let Some(page) = target {
            self.load_page(page);
        }
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let Some(footer) = self.menu.footer(self.campus_open()) else {
            return Vec::new();
        };
        let mut lines = vec![widgets::key_hints(&[("v", "view all campuses")])];
        if let Some(pager) = footer.pager {
            lines.push(Line::from(vec![
                Span::styled(" [ ", theme::key_hint_key()),
                Span::styled(
                    format!("page {} of {}", pager.current_page, pager.last_page),
                    theme::key_hint(),
                ),
                Span::styled(" ]", theme::key_hint_key()),
            ]));
        }
        lines
    }
}

/// Links are styled as links; the active one is bold.
fn tree_item(item: &MenuItem, active: Option<Route>) -> TreeItem<'static, String> {
    let style = match item.route {
        Some(route) if Some(route) == active => theme::link().add_modifier(Modifier::BOLD),
        Some(_) => theme::link(),
        None if item.children.is_empty() => theme::note(),
        None => Style::default().fg(theme::TEXT),
    };
    let text = Line::styled(item.label.clone(), style);
    if item.children.is_empty() {
        return TreeItem::new_leaf(item.id.clone(), text);
    }

    let children = item.children.iter().map(|c| tree_item(c, active)).collect();
    match TreeItem::new(item.id.clone(), text.clone(), children) {
        Ok(group) => group,
        Err(e) => {
            warn!(id = %item.id, error = %e, "menu group has duplicate entries");
            TreeItem::new_leaf(item.id.clone(), text)
        }
    }
}

impl Component for MenuPanel {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        if self.controller.is_authenticated() {
            self.load_page(1);
        } else {
            self.set_menu(Menu::logged_out());
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.get_mut().key_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.get_mut().key_down();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.state.get_mut().key_left();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.get_mut().key_right();
            }
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.activate()),
            KeyCode::Char('v') if self.campus_open() => {
                return Ok(Some(Action::Navigate(Route::Campuses)));
            }
            KeyCode::Char(']') => self.turn_page(true),
            KeyCode::Char('[') => self.turn_page(false),
            KeyCode::Char('r') if !self.loading => self.load_page(self.menu.pager.current_page),
            KeyCode::Esc => return Ok(Some(Action::FocusContent)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RequestMenuPage(page) => self.load_page(*page),
            Action::MenuLoaded(menu) => {
                self.loading = false;
                self.set_menu(menu.clone());
            }
            Action::Navigate(route) => {
                self.active = Some(*route);
                self.rebuild();
            }
            Action::Logout | Action::SessionExpired => {
                self.loading = false;
                self.set_menu(Menu::logged_out());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Menu ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let footer = self.footer_lines();
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(widgets::to_u16(footer.len())),
        ])
        .split(inner);

        match Tree::new(&self.items) {
            Ok(tree) => {
                let tree = tree
                    .highlight_style(theme::table_selected())
                    .highlight_symbol("› ");
                frame.render_stateful_widget(tree, layout[0], &mut self.state.borrow_mut());
            }
            Err(e) => {
                let message = Span::styled(format!(" {e}"), theme::error_text());
                frame.render_widget(Paragraph::new(message), layout[0]);
            }
        }
        frame.render_widget(Paragraph::new(footer), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "menu"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::menu::{CampusPager, LOGIN_REQUIRED};
    use campusdesk_core::{ControllerConfig, EntityId, ResourceKind};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn panel() -> MenuPanel {
        let ctl = Controller::new(ControllerConfig::new("http://localhost:9/api/").unwrap())
            .unwrap();
        MenuPanel::new(ctl)
    }

    fn press(panel: &mut MenuPanel, code: KeyCode) -> Option<Action> {
        panel
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn select(panel: &mut MenuPanel, path: &[&str]) {
        let path = path.iter().map(|s| (*s).to_owned()).collect();
        panel.state.get_mut().select(path);
    }

    fn campus_menu(pager: CampusPager) -> Menu {
        let building = MenuItem::link(
            "building-9",
            "Science Building",
            Route::Rooms(EntityId::new(9).unwrap()),
        );
        let block = MenuItem::group("block-4", "Block A", vec![building]);
        Menu::loaded(vec![MenuItem::group("campus-1", "Sidist Kilo", vec![block])], pager)
    }

    #[test]
    fn links_navigate_and_groups_fold() {
        let mut p = panel();
        p.update(&Action::MenuLoaded(campus_menu(CampusPager::default()))).unwrap();

        select(&mut p, &["campus", "campus-1", "block-4", "building-9"]);
        let action = press(&mut p, KeyCode::Enter);
        assert!(matches!(
            action,
            Some(Action::Navigate(Route::Rooms(id))) if id == EntityId::new(9).unwrap()
        ));

        select(&mut p, &["settings", "room-type-settings"]);
        let action = press(&mut p, KeyCode::Enter);
        assert!(matches!(
            action,
            Some(Action::Navigate(Route::Settings(ResourceKind::RoomType)))
        ));

        assert!(p.campus_open());
        select(&mut p, &["campus"]);
        assert!(press(&mut p, KeyCode::Enter).is_none());
        assert!(!p.campus_open());
        assert!(p.footer_lines().is_empty());
        assert!(press(&mut p, KeyCode::Char('v')).is_none());
    }

    #[test]
    fn pager_shows_only_with_several_pages() {
        let mut p = panel();
        p.update(&Action::MenuLoaded(campus_menu(CampusPager::default()))).unwrap();
        assert_eq!(p.footer_lines().len(), 1);

        let paged = CampusPager {
            current_page: 1,
            last_page: 3,
        };
        p.update(&Action::MenuLoaded(campus_menu(paged))).unwrap();
        assert_eq!(p.footer_lines().len(), 2);

        press(&mut p, KeyCode::Char('['));
        assert!(!p.loading);
        press(&mut p, KeyCode::Char(']'));
        assert!(p.loading);
    }

    #[test]
    fn logout_replaces_the_tree() {
        let mut p = panel();
        p.update(&Action::MenuLoaded(campus_menu(CampusPager::default()))).unwrap();
        p.update(&Action::Logout).unwrap();
        assert_eq!(
            p.menu.campuses.items().first().map(|i| i.label.as_str()),
            Some(LOGIN_REQUIRED)
        );
        let view_all = press(&mut p, KeyCode::Char('v'));
        assert!(matches!(view_all, Some(Action::Navigate(Route::Campuses))));
    }
}
