//! Dashboard screen: entity totals in three cards.
//!
//! ┌─ Total Campuses ─┐ ┌─ Total Blocks ─┐ ┌─ Total Buildings ─┐
//! │        4         │ │       12       │ │        37         │
//! └──────────────────┘ └────────────────┘ └───────────────────┘

use campusdesk_core::Controller;
use campusdesk_core::dashboard::{Dashboard, DashboardStats};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets;

const CARD_HEIGHT: u16 = 5;

pub struct DashboardScreen {
    controller: Controller,
    action_tx: Option<UnboundedSender<Action>>,
    dashboard: Option<Dashboard>,
    throbber_state: ThrobberState,
    focused: bool,
    loading: bool,
}

impl DashboardScreen {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            action_tx: None,
            dashboard: None,
            throbber_state: ThrobberState::default(),
            focused: false,
            loading: false,
        }
    }

    fn refresh(&mut self) {
        self.loading = true;
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let ctl = self.controller.clone();
        tokio::spawn(async move {
            let dashboard = ctl.dashboard().await;
            let _ = tx.send(Action::DashboardLoaded(dashboard));
        });
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, title: &str, value: u64) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = if self.dashboard.is_some() {
            value.to_string()
        } else {
            "–".to_owned()
        };
        let value = Paragraph::new(Span::styled(
            text,
            Style::default().fg(theme::TEAL).add_modifier(Modifier::BOLD),
        ))
        .centered();
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        frame.render_widget(value, middle);
    }
}

impl Component for DashboardScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('r') && !self.loading {
            self.refresh();
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick if self.loading => self.throbber_state.calc_next(),
            Action::DashboardLoaded(dashboard) => {
                self.loading = false;
                self.dashboard = Some(dashboard.clone());
                return Ok(dashboard.notice.clone().map(Action::Notify));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Dashboard ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(CARD_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        let cards = Layout::horizontal([Constraint::Ratio(1, 3); 3])
            .spacing(1)
            .split(rows[1]);
        let values = self.dashboard.as_ref().map_or_else(
            || Dashboard::loaded(DashboardStats::default()).cards(),
            Dashboard::cards,
        );
        for ((title, value), area) in values.into_iter().zip(cards.iter()) {
            self.render_card(frame, *area, title, value);
        }

        if self.loading {
            let throbber = Throbber::default()
                .label("Loading statistics")
                .style(theme::key_hint())
                .throbber_style(Style::default().fg(theme::INDIGO));
            frame.render_stateful_widget(throbber, rows[2], &mut self.throbber_state.clone());
        }

        let hints = widgets::key_hints(&[("r", "refresh"), ("m", "menu"), ("Tab", "next")]);
        frame.render_widget(Paragraph::new(Line::from(hints)), rows[3]);
    }

    /// Totals are fetched again on every visit.
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused && !self.loading {
            self.refresh();
        }
    }

    fn id(&self) -> &str {
        "dashboard"
    }
}
