//! Sign-in screen. Takes the whole frame until a session exists.
//!
//! A successful login stores the token in the system keyring and keeps
//! the email on the profile, the same as `campusdesk auth login`.

use std::sync::Arc;

use campusdesk_config as config;
use campusdesk_core::Controller;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use secrecy::SecretString;
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tui_input::Input;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{self, input};

const PANEL_WIDTH: u16 = 56;
const PANEL_HEIGHT: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    Editing,
    Submitting,
}

pub struct LoginScreen {
    controller: Controller,
    action_tx: Option<UnboundedSender<Action>>,
    profile_name: String,
    email: Input,
    password: Input,
    active: LoginField,
    state: LoginState,
    error: Option<String>,
    throbber_state: ThrobberState,
    focused: bool,
}

impl LoginScreen {
    pub fn new(controller: Controller, profile_name: String, email: Option<String>) -> Self {
        let active = if email.is_some() {
            LoginField::Password
        } else {
            LoginField::Email
        };
        Self {
            controller,
            action_tx: None,
            profile_name,
            email: Input::new(email.unwrap_or_default()),
            password: Input::default(),
            active,
            state: LoginState::Editing,
            error: None,
            throbber_state: ThrobberState::default(),
            focused: false,
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.active {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    fn switch_field(&mut self) {
        self.active = match self.active {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    /// First problem with the typed credentials, in field order.
    fn validate(&self) -> Option<(LoginField, &'static str)> {
        if self.email.value().trim().is_empty() {
            return Some((LoginField::Email, "Email is required"));
        }
        if self.password.value().is_empty() {
            return Some((LoginField::Password, "Password is required"));
        }
        None
    }

    fn submit(&mut self) {
        if let Some((field, message)) = self.validate() {
            self.active = field;
            self.error = Some(message.to_owned());
            return;
        }
        self.error = None;
        self.state = LoginState::Submitting;

        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let ctl = self.controller.clone();
        let profile_name = self.profile_name.clone();
        let email = self.email.value().trim().to_owned();
        let password = SecretString::from(self.password.value().to_owned());

        tokio::spawn(async move {
            match ctl.login(&email, &password).await {
                Ok(session) => {
                    info!(user = %session.user.email, "signed in");
                    if let Err(e) = config::store_token(&profile_name, &session.token) {
                        warn!(error = %e, "could not store the token in the system keyring");
                    }
                    remember_email(&profile_name, &email);
                    let _ = tx.send(Action::LoggedIn(Arc::new(session.user)));
                }
                Err(e) => {
                    warn!(error = %e, "sign-in failed");
                    let _ = tx.send(Action::LoginFailed(e.to_string()));
                }
            }
        });
    }
}

/// Keep the login email on the profile so the next sign-in is prefilled.
fn remember_email(profile_name: &str, email: &str) {
    let mut cfg = config::load_config_or_default();
    if cfg.profile(profile_name).and_then(|p| p.email.as_deref()) == Some(email) {
        return;
    }
    cfg.profile_mut(profile_name).email = Some(email.to_owned());
    if let Err(e) = config::save_config(&cfg) {
        warn!(error = %e, "could not remember the login email");
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.state == LoginState::Submitting {
            return Ok(None);
        }
        match key.code {
            KeyCode::Esc => return Ok(Some(Action::Quit)),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.switch_field(),
            KeyCode::Enter => {
                if self.active == LoginField::Email && self.password.value().is_empty() {
                    self.active = LoginField::Password;
                } else {
                    self.submit();
                }
            }
            _ => {
                if input::edit(self.active_input(), key) {
                    self.error = None;
                }
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick if self.state == LoginState::Submitting => {
                self.throbber_state.calc_next();
            }
            Action::LoginFailed(message) => {
                self.state = LoginState::Editing;
                self.active = LoginField::Password;
                self.error = Some(message.clone());
            }
            Action::LoggedIn(_) => {
                self.state = LoginState::Editing;
                self.password = Input::default();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let panel = widgets::centered(area, PANEL_WIDTH, PANEL_HEIGHT);
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(" Campus Desk · Sign in ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_PANEL));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(input::HEIGHT),
            Constraint::Length(input::HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        let api = format!(" {}", self.controller.config().api_url);
        frame.render_widget(Paragraph::new(Span::styled(api, theme::note())), layout[0]);

        let editing = self.state == LoginState::Editing;
        input::render(
            frame,
            layout[2],
            "Email",
            &self.email,
            editing && self.active == LoginField::Email,
            false,
        );
        input::render(
            frame,
            layout[3],
            "Password",
            &self.password,
            editing && self.active == LoginField::Password,
            true,
        );

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {error}"), theme::error_text())),
                layout[4],
            );
        }

        if editing {
            let hints =
                widgets::key_hints(&[("Enter", "sign in"), ("Tab", "next"), ("Esc", "quit")]);
            frame.render_widget(Paragraph::new(Line::from(hints)), layout[5]);
        } else {
            let throbber = Throbber::default()
                .label("Signing in...")
                .style(theme::key_hint())
                .throbber_style(Style::default().fg(theme::INDIGO));
            frame.render_stateful_widget(throbber, layout[5], &mut self.throbber_state.clone());
        }
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "login"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::ControllerConfig;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn screen(email: Option<&str>) -> LoginScreen {
        let ctl = Controller::new(ControllerConfig::new("http://localhost:9/api/").unwrap())
            .unwrap();
        LoginScreen::new(ctl, "default".into(), email.map(str::to_owned))
    }

    fn press(screen: &mut LoginScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[test]
    fn remembered_email_starts_on_password() {
        let s = screen(Some("admin@aau.edu.et"));
        assert_eq!(s.email.value(), "admin@aau.edu.et");
        assert_eq!(s.active, LoginField::Password);
        assert_eq!(screen(None).active, LoginField::Email);
    }

    #[test]
    fn empty_fields_are_reported_before_sending() {
        let mut s = screen(None);
        s.submit();
        assert_eq!(s.error.as_deref(), Some("Email is required"));
        assert_eq!(s.state, LoginState::Editing);

        type_text(&mut s, "admin@aau.edu.et");
        assert!(s.error.is_none());
        press(&mut s, KeyCode::Tab);
        s.submit();
        assert_eq!(s.error.as_deref(), Some("Password is required"));
        assert_eq!(s.active, LoginField::Password);
    }

    #[test]
    fn enter_moves_from_email_to_password_then_submits() {
        let mut s = screen(None);
        type_text(&mut s, "admin@aau.edu.et");
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.active, LoginField::Password);

        type_text(&mut s, "secret");
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.state, LoginState::Submitting);
        assert!(press(&mut s, KeyCode::Esc).is_none());
    }

    #[test]
    fn failure_shows_the_message_and_unlocks_the_form() {
        let mut s = screen(Some("admin@aau.edu.et"));
        type_text(&mut s, "wrong");
        press(&mut s, KeyCode::Enter);

        s.update(&Action::LoginFailed("Invalid credentials".into())).unwrap();
        assert_eq!(s.state, LoginState::Editing);
        assert_eq!(s.error.as_deref(), Some("Invalid credentials"));
        assert!(matches!(press(&mut s, KeyCode::Esc), Some(Action::Quit)));
    }
}
