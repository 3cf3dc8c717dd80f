//! List/edit/delete screen, written once for every resource type.
//!
//! Wraps a [`ResourcePage`] (server-paginated rows plus table state) and
//! drives it with keys: `/` filters the current page after a short
//! debounce, `s` sorts by the highlighted column, `n`/`p` page through the
//! API and `+`/`-` change the page size. Requests run on spawned tasks and
//! report back through actions, tagged with a generation so responses to
//! superseded requests are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use campusdesk_core::page::{self, ResourcePage};
use campusdesk_core::request::{FormMode, FormRequest, FormValues, Lookup};
use campusdesk_core::table::{
    Debounce, PAGE_SIZE_OPTIONS, SEARCH_DEBOUNCE, SortDirection, TableView,
};
use campusdesk_core::{Controller, EntityId, PageRequest, SubmitOutcome};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tui_input::Input;

use super::form::{FormEvent, FormState};
use crate::action::{Action, ConfirmAction, Listed};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::{self, input, to_u16};

/// Widest a column may grow before its text is clipped.
const MAX_COLUMN_WIDTH: usize = 40;

/// Shared by all screens so a rebuilt screen never accepts a response
/// meant for the one it replaced.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

pub struct ResourceScreen<R: Listed> {
    id: ScreenId,
    title: String,
    controller: Controller,
    action_tx: Option<UnboundedSender<Action>>,
    page: ResourcePage<R>,
    view: TableView,
    selected: usize,
    /// Column `s` sorts by.
    sort_cursor: usize,
    search: Input,
    debounce: Debounce<String>,
    form: Option<FormState>,
    /// Prefill for create forms (the building of a rooms list).
    defaults: FormValues,
    generation: u64,
    throbber_state: ThrobberState,
    focused: bool,
    loaded: bool,
    searching: bool,
}

impl<R: Listed> ResourceScreen<R> {
    pub fn new(id: ScreenId, controller: Controller, page_size: usize) -> Self {
        let mut page = ResourcePage::new().with_page_size(page_size);
        let view = page.view();
        Self {
            id,
            title: R::KIND.plural_title().to_owned(),
            controller,
            action_tx: None,
            page,
            view,
            selected: 0,
            sort_cursor: 0,
            search: Input::default(),
            debounce: Debounce::new(SEARCH_DEBOUNCE),
            form: None,
            defaults: FormValues::new(),
            generation: 0,
            throbber_state: ThrobberState::default(),
            focused: false,
            loaded: false,
            searching: false,
        }
    }

    /// Extra query parameter sent with every fetch.
    #[must_use]
    pub fn with_filter(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.page = self.page.with_filter(key, value);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: FormValues) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn boxed(self) -> Box<dyn Component> {
        Box::new(self)
    }

    // ── Requests ────────────────────────────────────────────────────

    fn reload(&mut self) {
        self.fetch(self.page.page_request());
    }

    fn fetch(&mut self, request: PageRequest) {
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.loaded = true;
        self.page.begin_load();

        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let ctl = self.controller.clone();
        let filters = self.page.filters().to_vec();
        let (screen, generation) = (self.id, self.generation);
        debug!(%screen, page = request.page, limit = request.limit, "fetching page");

        tokio::spawn(async move {
            let result = ctl
                .list::<R>(request, &filters)
                .await
                .map(R::wrap)
                .map_err(Arc::new);
            let _ = tx.send(Action::PageLoaded {
                screen,
                generation,
                result,
            });
        });
    }

    fn request_lookups(&self, lookups: Vec<(&'static str, Lookup)>) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        for (field, lookup) in lookups {
            let ctl = self.controller.clone();
            let tx = tx.clone();
            let screen = self.id;
            tokio::spawn(async move {
                let result = match lookup {
                    Lookup::Resource(kind) => ctl.lookup(kind).await,
                    Lookup::Permissions => ctl
                        .permissions()
                        .await
                        .map(|all| all.into_iter().map(|p| (p.id, p.name)).collect()),
                };
                let _ = tx.send(Action::LookupLoaded {
                    screen,
                    field,
                    result: result.map_err(Arc::new),
                });
            });
        }
    }

    fn submit(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        form.begin_submit();
        let (mode, values) = (form.mode(), form.values());

        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let ctl = self.controller.clone();
        let screen = self.id;
        tokio::spawn(async move {
            let outcome = page::save::<R>(&ctl, mode, &values).await;
            let _ = tx.send(Action::Submitted { screen, outcome });
        });
    }

    fn delete(&self, id: EntityId) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let ctl = self.controller.clone();
        let screen = self.id;
        tokio::spawn(async move {
            let notice = page::remove::<R>(&ctl, id).await;
            let _ = tx.send(Action::Deleted { screen, notice });
        });
    }

    // ── State ───────────────────────────────────────────────────────

    fn refresh_view(&mut self) {
        self.view = self.page.view();
        self.selected = self.selected.min(self.view.rows.len().saturating_sub(1));
    }

    fn selected_row(&self) -> Option<&R> {
        let row = self.view.rows.get(self.selected)?;
        self.page.row(row.index)
    }

    fn apply_search(&mut self, text: String) {
        self.page.table_mut().set_global_filter(text);
        self.selected = 0;
        self.refresh_view();
    }

    /// Debounced search and spinner animation.
    fn on_tick(&mut self, now: Instant) {
        if let Some(text) = self.debounce.poll(now) {
            self.apply_search(text);
        }
        let saving = self.form.as_ref().is_some_and(FormState::is_submitting);
        if self.page.is_loading() || saving {
            self.throbber_state.calc_next();
        }
    }

    fn move_sort_cursor(&mut self, forward: bool) {
        let sortable: Vec<usize> = self
            .view
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.sortable)
            .map(|(i, _)| i)
            .collect();
        let at = sortable.iter().position(|&i| i == self.sort_cursor);
        let next = match (at, forward) {
            (Some(at), true) => sortable.get(at + 1),
            (Some(at), false) => at.checked_sub(1).and_then(|i| sortable.get(i)),
            (None, _) => sortable.first(),
        };
        if let Some(&column) = next {
            self.sort_cursor = column;
        }
    }

    fn toggle_sort(&mut self) {
        let Some(column) = self.page.columns().get(self.sort_cursor).copied() else {
            return;
        };
        if self.page.table_mut().toggle_sort(&column) {
            self.refresh_view();
        }
    }

    /// Step through the page-size options, wrapping at either end.
    fn cycle_page_size(&mut self, up: bool) {
        let current = self.page.table().page_size();
        let at = PAGE_SIZE_OPTIONS.iter().position(|&s| s == current);
        let len = PAGE_SIZE_OPTIONS.len();
        let next = match (at, up) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 0,
        };
        if let Some(request) = PAGE_SIZE_OPTIONS
            .get(next)
            .and_then(|&size| self.page.change_page_size(size))
        {
            self.selected = 0;
            self.fetch(request);
        }
    }

    fn open_form(&mut self, mode: FormMode) {
        let initial = match mode {
            FormMode::Create => self.defaults.clone(),
            FormMode::Edit(_) => match self.selected_row() {
                Some(row) => row.form_values(),
                None => return,
            },
        };
        let form = FormState::new(R::KIND, mode, R::Request::fields(), &initial);
        self.request_lookups(form.lookups());
        self.form = Some(form);
    }

    fn on_submitted(&mut self, outcome: &SubmitOutcome) -> Option<Action> {
        let notice = outcome.notice().cloned().map(Action::Notify);
        match outcome {
            SubmitOutcome::Saved(_) => {
                self.form = None;
                self.reload();
            }
            SubmitOutcome::Invalid(fields) | SubmitOutcome::Failed { fields, .. } => {
                if let Some(form) = self.form.as_mut() {
                    form.end_submit();
                    form.set_errors(fields.clone());
                }
            }
        }
        notice
    }

    // ── Keys ────────────────────────────────────────────────────────

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.searching = false;
                self.search = Input::default();
                self.debounce = Debounce::new(SEARCH_DEBOUNCE);
                self.apply_search(String::new());
            }
            KeyCode::Enter => {
                self.searching = false;
                if let Some(text) = self.debounce.flush() {
                    self.apply_search(text);
                }
            }
            _ => {
                if input::edit(&mut self.search, key) {
                    self.debounce.push(self.search.value().to_owned(), Instant::now());
                }
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.handle_key(key) {
            Some(FormEvent::Submit) => self.submit(),
            Some(FormEvent::Cancel) => self.form = None,
            None => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let last = self.view.rows.len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        if let Some(err) = self.page.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {err}"), theme::error_text())),
                Rect::new(area.x, area.y, area.width, 1),
            );
        }
        if self.view.rows.is_empty() {
            let message = if self.page.is_loading() {
                "Loading...".to_owned()
            } else {
                format!("No {} found", self.title.to_lowercase())
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, theme::note())).centered(),
                Rect::new(area.x, area.y + area.height / 2, area.width, 1),
            );
            return;
        }

        let header = Row::new(self.view.headers.iter().enumerate().map(|(i, h)| {
            let arrow = match h.sort {
                Some(SortDirection::Ascending) => " ▲",
                Some(SortDirection::Descending) => " ▼",
                None => "",
            };
            let style = if i == self.sort_cursor && h.sortable {
                theme::table_header_cursor()
            } else {
                theme::table_header()
            };
            Cell::from(Span::styled(format!("{}{arrow}", h.title), style))
        }));

        let widths: Vec<Constraint> = (0..self.view.headers.len())
            .map(|i| {
                let header = self.view.headers.get(i).map_or(0, |h| h.title.len() + 2);
                let widest = self
                    .view
                    .rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                Constraint::Length(to_u16(header.max(widest).min(MAX_COLUMN_WIDTH)))
            })
            .collect();

        let rows = self.view.rows.iter().map(|r| {
            Row::new(r.cells.iter().map(|c| Cell::from(c.as_str()))).style(theme::table_row())
        });

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(theme::table_selected());
        let mut state = TableState::default().with_selected(Some(self.selected));
        let table_area = if self.page.error().is_some() {
            Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1))
        } else {
            area
        };
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = format!(
            " {}  ·  {}  ·  {} per page",
            self.view.footer(),
            self.view.page_label(),
            self.view.page_size
        );
        let layout = Layout::horizontal([Constraint::Min(1), Constraint::Length(16)]).split(area);
        frame.render_widget(Paragraph::new(Span::styled(text, theme::key_hint())), layout[0]);

        if self.page.is_loading() {
            let throbber = Throbber::default()
                .label("Loading")
                .style(theme::key_hint())
                .throbber_style(Style::default().fg(theme::INDIGO));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        }
    }
}

// ── Component impl ──────────────────────────────────────────────────

impl<R: Listed> Component for ResourceScreen<R> {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            self.handle_form_key(key);
            return Ok(None);
        }
        if self.searching {
            self.handle_search_key(key);
            return Ok(None);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('d') if ctrl => self.move_selection(10),
            KeyCode::Char('u') if ctrl => self.move_selection(-10),
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('G') => self.move_selection(isize::MAX),
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Left | KeyCode::Char('h') => self.move_sort_cursor(false),
            KeyCode::Right | KeyCode::Char('l') => self.move_sort_cursor(true),
            KeyCode::Char('s') => self.toggle_sort(),
            KeyCode::Char('n') | KeyCode::PageDown => {
                if let Some(request) = self.page.next_page() {
                    self.selected = 0;
                    self.fetch(request);
                }
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                if let Some(request) = self.page.previous_page() {
                    self.selected = 0;
                    self.fetch(request);
                }
            }
            KeyCode::Char('+' | '=') => self.cycle_page_size(true),
            KeyCode::Char('-') => self.cycle_page_size(false),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('c' | 'a') => self.open_form(FormMode::Create),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_row().map(R::id) {
                    self.open_form(FormMode::Edit(id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(row) = self.selected_row() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::Delete {
                        screen: self.id,
                        kind: R::KIND,
                        id: row.id(),
                        name: row.display_name().to_owned(),
                    })));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.on_tick(Instant::now()),

            Action::PageLoaded {
                screen,
                generation,
                result,
            } if *screen == self.id => {
                if *generation != self.generation {
                    debug!(%screen, generation, "dropping stale page");
                    return Ok(None);
                }
                match result {
                    Ok(loaded) => {
                        if let Some(page) = R::unwrap_page(loaded.clone()) {
                            self.page.apply(page);
                            self.refresh_view();
                        }
                    }
                    Err(err) => {
                        self.page.fail(err);
                        if err.is_auth() {
                            return Ok(Some(Action::SessionExpired));
                        }
                    }
                }
            }

            Action::LookupLoaded {
                screen,
                field,
                result,
            } if *screen == self.id => {
                if let Some(form) = self.form.as_mut() {
                    form.set_choices(field, result.clone().map_err(|e| e.to_string()));
                }
            }

            Action::Submitted { screen, outcome } if *screen == self.id => {
                return Ok(self.on_submitted(outcome));
            }

            Action::DeleteConfirmed { screen, id } if *screen == self.id => self.delete(*id),

            Action::Deleted { screen, notice } if *screen == self.id => {
                // The row may or may not be gone; show what the API has now.
                self.reload();
                return Ok(Some(Action::Notify(notice.clone())));
            }

            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let filter = self.page.table().global_filter();
        let title = if filter.is_empty() {
            format!(" {} ", self.title)
        } else {
            format!(" {} · \"{filter}\" ", self.title)
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let search_height = if self.searching { input::HEIGHT } else { 0 };
        let layout = Layout::vertical([
            Constraint::Length(search_height),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        if self.searching {
            input::render(frame, layout[0], "Search", &self.search, true, false);
        }
        self.render_table(frame, layout[1]);
        self.render_footer(frame, layout[2]);

        let hints = if self.searching {
            widgets::key_hints(&[("Enter", "apply"), ("Esc", "clear")])
        } else {
            widgets::key_hints(&[
                ("/", "search"),
                ("←/→ s", "sort"),
                ("n/p", "page"),
                ("+/-", "size"),
                ("c", "create"),
                ("e", "edit"),
                ("d", "delete"),
            ])
        };
        frame.render_widget(Paragraph::new(Line::from(hints)), layout[3]);

        if let Some(form) = &self.form {
            form.render(frame, area, &self.throbber_state);
        }
    }

    fn captures_input(&self) -> bool {
        self.searching || self.form.is_some()
    }

    /// The first focus loads the list; later visits keep what is shown.
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused && !self.loaded {
            self.reload();
        }
    }

    fn id(&self) -> &str {
        R::KIND.into()
    }
}
