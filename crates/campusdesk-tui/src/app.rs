//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use campusdesk_config as config;
use campusdesk_core::menu::Route;
use campusdesk_core::{AuthUser, Controller, EntityId, Notice};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::menu::MenuPanel;
use crate::screens::{create_screens, rooms_screen};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::{self, to_u16};

const MENU_WIDTH: u16 = 32;
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Sidebar; lives outside `screens` because it is always drawn.
    menu: MenuPanel,
    /// Keys go to the sidebar instead of the active screen.
    menu_focused: bool,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Action sender; components dispatch actions through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver, drained by the main loop.
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    profile_name: String,
    /// Prefill for the sign-in form.
    email: Option<String>,
    page_size: usize,
    /// Building whose rooms the Rooms screen shows.
    rooms_building: Option<EntityId>,
    /// Signed-in user; unknown when the session came from a stored token.
    user: Option<Arc<AuthUser>>,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notice, Instant)>,
}

impl App {
    /// Create the app. Starts on the dashboard when the controller already
    /// carries a token, otherwise on the sign-in form.
    pub fn new(
        controller: Controller,
        profile_name: String,
        email: Option<String>,
        page_size: usize,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens = create_screens(&controller, &profile_name, email.clone(), page_size)
            .into_iter()
            .collect();
        let active_screen = if controller.is_authenticated() {
            ScreenId::Dashboard
        } else {
            ScreenId::Login
        };

        Self {
            active_screen,
            previous_screen: None,
            screens,
            menu: MenuPanel::new(controller.clone()),
            menu_focused: false,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            user: controller.current_user(),
            controller,
            profile_name,
            email,
            page_size,
            rooms_building: None,
            pending_confirm: None,
            notification: None,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
            debug!(component = screen.id(), "screen ready");
        }
        // Focus the initial screen
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;
        self.menu.init(self.action_tx.clone())?;

        let mut events = EventReader::new(
            Duration::from_millis(100), // 10 Hz tick (debounce, spinners)
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action(s)
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the sidebar or active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        if self.help_visible {
            // In help mode, Esc or ? closes help
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // Sign-in form and open forms / search boxes get every key
        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());
        if capturing && !self.menu_focused {
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                return screen.handle_key_event(key);
            }
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('m')) => {
                return Ok(Some(if self.menu_focused {
                    Action::FocusContent
                } else {
                    Action::FocusMenu
                }));
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            (KeyModifiers::SHIFT | KeyModifiers::NONE, KeyCode::Char('L')) => {
                return Ok(Some(Action::RequestLogout));
            }
            _ => {}
        }

        if self.menu_focused {
            return self.menu.handle_key_event(key);
        }

        if key.code == KeyCode::Esc {
            return Ok(Some(Action::GoBack));
        }

        // Delegate to active screen component
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                debug!(width = w, height = h, "terminal resized");
            }

            Action::Render => {}

            Action::Tick => {
                // Auto-dismiss notifications
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > TOAST_DURATION {
                        self.notification = None;
                    }
                }
                // Debounced search and spinners on the screen in view
                self.forward(self.active_screen, action)?;
            }

            // ── Navigation ──────────────────────────────────────────
            Action::Navigate(route) => {
                self.menu.update(action)?;
                self.set_menu_focus(false);
                match route {
                    Route::Rooms(building) => self.open_rooms(*building)?,
                    other => self.switch_to(ScreenId::from_route(*other)),
                }
            }

            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.switch_to(prev);
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::FocusMenu => self.set_menu_focus(true),
            Action::FocusContent => self.set_menu_focus(false),

            // ── Session ─────────────────────────────────────────────
            Action::LoggedIn(user) => {
                info!(user = %user.email, "session started");
                self.user = Some(Arc::clone(user));
                self.email = Some(user.email.clone());
                self.forward(ScreenId::Login, action)?;
                self.menu.update(&Action::RequestMenuPage(1))?;
                self.previous_screen = None;
                self.switch_to(ScreenId::Dashboard);
                self.action_tx.send(Action::Notify(Notice::success(format!(
                    "Signed in as {}",
                    user.name
                ))))?;
            }

            Action::LoginFailed(_) => self.forward(ScreenId::Login, action)?,

            Action::RequestLogout => {
                if self.active_screen != ScreenId::Login {
                    self.pending_confirm = Some(ConfirmAction::Logout);
                }
            }

            Action::Logout | Action::SessionExpired => {
                // Several in-flight requests may all report the expiry.
                if self.active_screen != ScreenId::Login {
                    self.sign_out(action)?;
                }
            }

            // ── Data ────────────────────────────────────────────────
            Action::DashboardLoaded(_) => self.forward(ScreenId::Dashboard, action)?,

            Action::RequestMenuPage(_) | Action::MenuLoaded(_) => {
                self.menu.update(action)?;
            }

            Action::PageLoaded { screen, .. }
            | Action::LookupLoaded { screen, .. }
            | Action::Submitted { screen, .. }
            | Action::DeleteConfirmed { screen, .. }
            | Action::Deleted { screen, .. } => self.forward(*screen, action)?,

            // ── Overlays ────────────────────────────────────────────
            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    let follow_up = match confirm {
                        ConfirmAction::Delete { screen, id, .. } => {
                            Action::DeleteConfirmed { screen, id }
                        }
                        ConfirmAction::Logout => Action::Logout,
                    };
                    self.action_tx.send(follow_up)?;
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }
        }
        Ok(())
    }

    /// Hand `action` to one screen and queue whatever it answers with.
    fn forward(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        if self.active_screen != ScreenId::Login {
            self.previous_screen = Some(self.active_screen);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Replace the Rooms screen with one for `building` and show it.
    fn open_rooms(&mut self, building: EntityId) -> Result<()> {
        let mut screen = rooms_screen(&self.controller, building, self.page_size);
        screen.init(self.action_tx.clone())?;
        self.rooms_building = Some(building);

        if self.active_screen == ScreenId::Rooms {
            screen.set_focused(true);
            self.screens.insert(ScreenId::Rooms, screen);
        } else {
            self.screens.insert(ScreenId::Rooms, screen);
            self.switch_to(ScreenId::Rooms);
        }
        Ok(())
    }

    fn set_menu_focus(&mut self, focused: bool) {
        self.menu_focused = focused;
        self.menu.set_focused(focused);
    }

    /// Drop the session everywhere and go back to the sign-in form.
    fn sign_out(&mut self, reason: &Action) -> Result<()> {
        self.controller.logout();
        match config::clear_token(&self.profile_name) {
            Ok(true) => debug!(profile = %self.profile_name, "stored token removed"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not remove the stored token"),
        }
        self.menu.update(reason)?;
        self.set_menu_focus(false);

        // Fresh screens: nothing from the old session stays on show.
        self.screens = create_screens(
            &self.controller,
            &self.profile_name,
            self.email.clone(),
            self.page_size,
        )
        .into_iter()
        .collect();
        self.user = None;
        self.rooms_building = None;
        self.previous_screen = None;
        self.active_screen = ScreenId::Login;
        self.init_screens()?;

        let notice = if matches!(reason, Action::SessionExpired) {
            warn!("session expired");
            Notice::warning("Your session has expired. Please sign in again.")
        } else {
            info!("signed out");
            Notice::info("Signed out")
        };
        self.action_tx.send(Action::Notify(notice))?;
        Ok(())
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Sign-in gets the full frame, without sidebar or status bar
        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
        } else {
            // Layout: [header] [menu | screen content] [status bar]
            let layout = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);
            let body = Layout::horizontal([Constraint::Length(MENU_WIDTH), Constraint::Min(1)])
                .split(layout[1]);

            self.render_header(frame, layout[0]);
            self.menu.render(frame, body[0]);
            if let Some(screen) = self.screens.get(&self.active_screen) {
                screen.render(frame, body[1]);
            }
            self.render_status_bar(frame, layout[2]);
        }

        // Render overlays on top (order matters: last = topmost)
        if let Some((ref notice, _)) = self.notification {
            self.render_notification(frame, area, notice);
        }
        if let Some(ref confirm) = self.pending_confirm {
            self.render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Route of the screen on show, as a path.
    fn current_path(&self) -> String {
        match (self.active_screen, self.rooms_building) {
            (ScreenId::Rooms, Some(building)) => Route::Rooms(building).path(),
            (screen, _) => screen.route().map(Route::path).unwrap_or_default(),
        }
    }

    /// Top line: app name, current path and who is signed in.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let who = self.user.as_ref().map_or_else(
            || format!("profile {}", self.profile_name),
            |u| format!("{} <{}>", u.name, u.email),
        );
        let who_width = to_u16(who.chars().count() + 2);
        let halves = Layout::horizontal([Constraint::Min(1), Constraint::Length(who_width)])
            .split(area);

        let left = Line::from(vec![
            Span::styled(" Campus Desk ", theme::title_style()),
            Span::styled(self.current_path(), theme::note()),
        ]);
        frame.render_widget(Paragraph::new(left), halves[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{who} "), theme::key_hint())).right_aligned(),
            halves[1],
        );
    }

    /// Render the bottom status bar with key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.menu_focused {
            widgets::key_hints(&[
                ("↑/↓", "move"),
                ("←/→", "fold"),
                ("Enter", "open"),
                ("[/]", "campus page"),
                ("Esc", "back"),
            ])
        } else {
            widgets::key_hints(&[
                ("m", "menu"),
                ("Tab", "next screen"),
                ("L", "sign out"),
                ("?", "help"),
                ("q", "quit"),
            ])
        };
        frame.render_widget(Paragraph::new(hints), area);
    }

    /// Render the help overlay centered on screen.
    #[allow(clippy::unused_self)]
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_area = widgets::centered(area, 60, 26);
        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_PANEL));

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::TEAL).add_modifier(Modifier::BOLD),
            ))
        };
        let row = |key: &'static str, label: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<12}"), theme::key_hint_key()),
                Span::styled(label, theme::key_hint()),
            ])
        };

        let help_text = vec![
            section("Navigation"),
            row("Tab/S-Tab", "Next / previous screen"),
            row("m", "Focus the menu"),
            row("Enter", "Open link / fold group"),
            row("v", "View all campuses"),
            row("[ ]", "Previous / next campus page"),
            row("Esc", "Back / close"),
            Line::from(""),
            section("Tables"),
            row("j/k ↑/↓", "Move up/down"),
            row("/", "Search this page"),
            row("←/→ s", "Pick column / sort"),
            row("n/p", "Next / previous page"),
            row("+/-", "Rows per page"),
            row("c e d", "Create / edit / delete"),
            row("r", "Reload"),
            Line::from(""),
            section("Forms"),
            row("Tab/↑/↓", "Move between fields"),
            row("Space", "Toggle / pick option"),
            row("Enter", "Save"),
            Line::from(""),
            row("L", "Sign out"),
            row("q", "Quit"),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a centered confirmation dialog.
    #[allow(clippy::unused_self)]
    fn render_confirm_dialog(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let dialog_area = widgets::centered(area, 60, 7);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::AMBER))
            .style(Style::default().bg(theme::BG_PANEL));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        frame.render_widget(
            Paragraph::new(Span::styled(confirm.to_string(), Style::default().fg(theme::TEXT)))
                .wrap(ratatui::widgets::Wrap { trim: true }),
            layout[0],
        );
        let hints = widgets::key_hints(&[("y", "confirm"), ("n", "cancel")]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    /// Render a notification toast in the bottom-right corner.
    #[allow(clippy::unused_self)]
    fn render_notification(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let width = to_u16(notice.message.chars().count() + 6).clamp(20, 72);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 1); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width.min(area.width), height);

        let (color, icon) = theme::notice(notice.level);

        frame.render_widget(Clear, toast_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme::BG_PANEL));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(notice.message.as_str(), Style::default().fg(theme::TEXT)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::{ControllerConfig, ResourceKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn app() -> App {
        let ctl = Controller::new(ControllerConfig::new("http://localhost:9/api/").unwrap())
            .unwrap();
        App::new(ctl, "default".into(), None, 10)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn starts_on_sign_in_without_a_token() {
        let mut a = app();
        assert_eq!(a.active_screen, ScreenId::Login);
        // q is text on the sign-in form, not quit
        assert!(a.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        let quit = a
            .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(matches!(quit, Some(Action::Quit)));
    }

    #[test]
    fn navigation_tracks_the_previous_screen() {
        let mut a = app();
        a.process_action(&Action::SwitchScreen(ScreenId::Dashboard)).unwrap();
        assert_eq!(a.previous_screen, None);

        let route = Route::Settings(ResourceKind::RoomType);
        a.process_action(&Action::Navigate(route)).unwrap();
        assert_eq!(a.active_screen, ScreenId::Settings(ResourceKind::RoomType));
        assert_eq!(a.current_path(), route.path());

        a.process_action(&Action::GoBack).unwrap();
        assert_eq!(a.active_screen, ScreenId::Dashboard);
    }

    // The new screen starts loading, which spawns a request.
    #[tokio::test]
    async fn rooms_screen_is_rebuilt_per_building() {
        let mut a = app();
        a.process_action(&Action::SwitchScreen(ScreenId::Dashboard)).unwrap();
        let building = EntityId::new(9).unwrap();
        a.process_action(&Action::Navigate(Route::Rooms(building))).unwrap();

        assert_eq!(a.active_screen, ScreenId::Rooms);
        assert_eq!(a.rooms_building, Some(building));
        assert_eq!(a.current_path(), Route::Rooms(building).path());
        assert!(a.screens.contains_key(&ScreenId::Rooms));
    }

    #[test]
    fn confirm_dialog_owns_the_keyboard() {
        let mut a = app();
        a.process_action(&Action::SwitchScreen(ScreenId::Dashboard)).unwrap();
        a.process_action(&Action::RequestLogout).unwrap();
        assert_eq!(a.pending_confirm, Some(ConfirmAction::Logout));

        assert!(a.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        let yes = a.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(yes, Some(Action::ConfirmYes)));

        a.process_action(&Action::ConfirmYes).unwrap();
        assert_eq!(a.pending_confirm, None);
        assert!(matches!(a.action_rx.try_recv(), Ok(Action::Logout)));
    }

    #[test]
    fn menu_focus_redirects_keys() {
        let mut a = app();
        a.process_action(&Action::SwitchScreen(ScreenId::Dashboard)).unwrap();
        let focus = a.handle_key_event(key(KeyCode::Char('m'))).unwrap();
        assert!(matches!(focus, Some(Action::FocusMenu)));
        a.process_action(&Action::FocusMenu).unwrap();

        let back = a.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(back, Some(Action::FocusContent)));
    }
}
