//! Create/edit form built from a request type's field list.
//!
//! Text-like fields are `tui_input` inputs; choice fields show the options
//! fetched for their lookup and keep the chosen ids. The form only gathers
//! raw values: parsing and validation happen in `campusdesk_core` when the
//! values are submitted, and the resulting field errors are shown inline.

use campusdesk_core::request::{FieldErrors, FieldKind, FieldSpec, FormMode, FormValues, Lookup};
use campusdesk_core::{EntityId, ResourceKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::Input;

use crate::theme;
use crate::widgets::{self, input, to_u16};

/// Rows of options visible in a choice box.
const CHOICE_ROWS: usize = 5;

/// Options of a choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choices {
    Loading,
    Ready(Vec<(EntityId, String)>),
    Failed(String),
}

impl Choices {
    fn len(&self) -> usize {
        match self {
            Self::Ready(options) => options.len(),
            Self::Loading | Self::Failed(_) => 0,
        }
    }

    fn id_at(&self, index: usize) -> Option<EntityId> {
        match self {
            Self::Ready(options) => options.get(index).map(|(id, _)| *id),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Value {
    Text(Input),
    Toggle(bool),
    Choice {
        choices: Choices,
        cursor: usize,
        chosen: Vec<EntityId>,
        multiple: bool,
    },
}

#[derive(Debug, Clone)]
struct Field {
    schema: FieldSpec,
    value: Value,
}

impl Field {
    fn new(schema: FieldSpec, initial: &FormValues) -> Self {
        let raw = initial.raw(schema.key);
        let value = match schema.kind {
            FieldKind::Toggle => Value::Toggle(initial.flag(schema.key, true)),
            FieldKind::Choice(_) | FieldKind::MultiChoice(_) => Value::Choice {
                choices: Choices::Loading,
                cursor: 0,
                chosen: raw
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter_map(|part| part.parse().ok())
                    .collect(),
                multiple: matches!(schema.kind, FieldKind::MultiChoice(_)),
            },
            FieldKind::Text
            | FieldKind::LongText
            | FieldKind::Email
            | FieldKind::Password
            | FieldKind::Decimal
            | FieldKind::Count => Value::Text(Input::new(raw.to_owned())),
        };
        Self { schema, value }
    }

    fn raw(&self) -> String {
        match &self.value {
            Value::Text(input) => input.value().to_owned(),
            Value::Toggle(on) => on.to_string(),
            Value::Choice { chosen, .. } => chosen
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    fn height(&self, has_error: bool) -> u16 {
        let body = match &self.value {
            Value::Text(_) => input::HEIGHT,
            Value::Toggle(_) => 1,
            Value::Choice { choices, .. } => {
                let rows = choices.len().clamp(1, CHOICE_ROWS);
                1 + 2 + to_u16(rows)
            }
        };
        body + u16::from(has_error)
    }
}

/// What the screen should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct FormState {
    kind: ResourceKind,
    mode: FormMode,
    fields: Vec<Field>,
    focus: usize,
    errors: FieldErrors,
    submitting: bool,
}

impl FormState {
    pub fn new(
        kind: ResourceKind,
        mode: FormMode,
        schemas: &[FieldSpec],
        initial: &FormValues,
    ) -> Self {
        Self {
            kind,
            mode,
            fields: schemas.iter().map(|&schema| Field::new(schema, initial)).collect(),
            focus: 0,
            errors: FieldErrors::new(),
            submitting: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("New {}", self.kind.label()),
            FormMode::Edit(id) => format!("Edit {} #{id}", self.kind.label()),
        }
    }

    /// Raw values for every field, keyed by field key.
    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            values.set(field.schema.key, field.raw());
        }
        values
    }

    /// Choice fields and where their options come from.
    pub fn lookups(&self) -> Vec<(&'static str, Lookup)> {
        self.fields
            .iter()
            .filter_map(|f| match f.schema.kind {
                FieldKind::Choice(lookup) | FieldKind::MultiChoice(lookup) => {
                    Some((f.schema.key, lookup))
                }
                _ => None,
            })
            .collect()
    }

    /// Fill a choice field; the cursor starts on the current choice.
    pub fn set_choices(&mut self, key: &str, result: Result<Vec<(EntityId, String)>, String>) {
        let Some(field) = self.fields.iter_mut().find(|f| f.schema.key == key) else {
            return;
        };
        if let Value::Choice {
            choices,
            cursor,
            chosen,
            ..
        } = &mut field.value
        {
            *choices = match result {
                Ok(options) => {
                    *cursor = chosen
                        .first()
                        .and_then(|id| options.iter().position(|(o, _)| o == id))
                        .unwrap_or(0);
                    Choices::Ready(options)
                }
                Err(message) => Choices::Failed(message),
            };
        }
    }

    /// Show errors and move focus to the first field that has one.
    pub fn set_errors(&mut self, errors: FieldErrors) {
        if let Some(first) = self
            .fields
            .iter()
            .position(|f| errors.contains_key(f.schema.key))
        {
            self.focus = first;
        }
        self.errors = errors;
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
    }

    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    // ── Keys ────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormEvent> {
        if key.code == KeyCode::Esc {
            return Some(FormEvent::Cancel);
        }
        if self.submitting {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return Some(FormEvent::Submit),
            KeyCode::Char('s') if ctrl => return Some(FormEvent::Submit),
            KeyCode::Tab => {
                self.focus_next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus_prev();
                return None;
            }
            _ => {}
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return None;
        };
        let key_name = field.schema.key;
        let mut changed = false;
        let mut leave: Option<bool> = None;

        match &mut field.value {
            Value::Text(text) => match key.code {
                KeyCode::Down => leave = Some(true),
                KeyCode::Up => leave = Some(false),
                _ => changed = input::edit(text, key),
            },
            Value::Toggle(on) => match key.code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    *on = !*on;
                    changed = true;
                }
                KeyCode::Down => leave = Some(true),
                KeyCode::Up => leave = Some(false),
                _ => {}
            },
            Value::Choice {
                choices,
                cursor,
                chosen,
                multiple,
            } => match key.code {
                KeyCode::Down if *cursor + 1 < choices.len() => *cursor += 1,
                KeyCode::Up if *cursor > 0 => *cursor -= 1,
                KeyCode::Down => leave = Some(true),
                KeyCode::Up => leave = Some(false),
                KeyCode::Char(' ') => {
                    if let Some(id) = choices.id_at(*cursor) {
                        if let Some(at) = chosen.iter().position(|c| *c == id) {
                            chosen.remove(at);
                        } else if *multiple {
                            chosen.push(id);
                        } else {
                            *chosen = vec![id];
                        }
                        changed = true;
                    }
                }
                _ => {}
            },
        }

        if changed {
            self.errors.remove(key_name);
        }
        match leave {
            Some(true) => self.focus_next(),
            Some(false) => self.focus_prev(),
            None => {}
        }
        None
    }

    // ── Rendering ───────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, throbber: &ThrobberState) {
        let panel = widgets::centered(area, 72, area.height.saturating_sub(2));
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .title(format!(" {} ", self.title()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_PANEL));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        self.render_fields(frame, layout[0]);

        if self.submitting {
            let throbber_widget = Throbber::default()
                .label(" Saving...")
                .style(theme::input_text())
                .throbber_style(Style::default().fg(theme::INDIGO));
            frame.render_stateful_widget(throbber_widget, layout[1], &mut throbber.clone());
        } else {
            frame.render_widget(
                Paragraph::new(widgets::key_hints(&[
                    ("Tab", "next"),
                    ("Space", "choose"),
                    ("Enter", "save"),
                    ("Esc", "cancel"),
                ])),
                layout[1],
            );
        }
    }

    fn heights(&self) -> Vec<u16> {
        self.fields
            .iter()
            .map(|f| f.height(self.errors.contains_key(f.schema.key)))
            .collect()
    }

    /// First field to draw so the focused one is fully visible.
    fn first_visible(&self, available: u16) -> usize {
        let heights = self.heights();
        let mut first = 0;
        while first < self.focus {
            let needed: u16 = heights
                .get(first..=self.focus)
                .map_or(0, |h| h.iter().sum());
            if needed <= available {
                break;
            }
            first += 1;
        }
        first
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect) {
        let heights = self.heights();
        let mut y = area.y;
        let bottom = area.y + area.height;

        for (index, field) in self
            .fields
            .iter()
            .enumerate()
            .skip(self.first_visible(area.height))
        {
            let height = heights.get(index).copied().unwrap_or(1);
            if y + height > bottom {
                break;
            }
            let active = index == self.focus;
            let error = self.errors.get(field.schema.key);
            let body = height - u16::from(error.is_some());
            let label = if field.schema.is_required(self.mode) {
                format!("{} *", field.schema.label)
            } else {
                field.schema.label.to_owned()
            };

            let field_area = Rect::new(area.x, y, area.width, body);
            match &field.value {
                Value::Text(text) => {
                    let masked = field.schema.is_secret();
                    input::render(frame, field_area, &label, text, active, masked);
                }
                Value::Toggle(on) => {
                    let mark = if *on { "[x]" } else { "[ ]" };
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!("{mark} {label}"),
                            theme::input_label(active),
                        )),
                        field_area,
                    );
                }
                Value::Choice {
                    choices,
                    cursor,
                    chosen,
                    multiple,
                } => render_choices(
                    frame,
                    field_area,
                    &label,
                    choices,
                    (*cursor, chosen.as_slice(), *multiple),
                    active,
                ),
            }

            if let Some(message) = error {
                frame.render_widget(
                    Paragraph::new(Span::styled(format!("  {message}"), theme::error_text())),
                    Rect::new(area.x, y + body, area.width, 1),
                );
            }
            y += height;
        }
    }
}

fn render_choices(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    choices: &Choices,
    (cursor, chosen, multiple): (usize, &[EntityId], bool),
    active: bool,
) {
    let picked: Vec<String> = chosen.iter().map(|id| format!("#{id}")).collect();
    let title = if picked.is_empty() {
        label.to_owned()
    } else {
        format!("{label}  {}", picked.join(", "))
    };
    frame.render_widget(
        Paragraph::new(Span::styled(title, theme::input_label(active))),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(active));
    let box_area = Rect::new(
        area.x,
        area.y + 1,
        area.width,
        area.height.saturating_sub(1),
    );
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let lines: Vec<Line> = match choices {
        Choices::Loading => vec![Line::from(Span::styled("Loading...", theme::note()))],
        Choices::Failed(message) => vec![Line::from(Span::styled(
            format!("Could not load options: {message}"),
            theme::error_text(),
        ))],
        Choices::Ready(options) if options.is_empty() => {
            vec![Line::from(Span::styled("No options", theme::note()))]
        }
        Choices::Ready(options) => {
            let start = cursor.saturating_sub(CHOICE_ROWS - 1);
            options
                .iter()
                .enumerate()
                .skip(start)
                .take(CHOICE_ROWS)
                .map(|(i, (id, name))| {
                    let on = chosen.contains(id);
                    let mark = match (multiple, on) {
                        (true, true) => "[x]",
                        (true, false) => "[ ]",
                        (false, true) => "(•)",
                        (false, false) => "( )",
                    };
                    let style = if active && i == cursor {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    Line::from(Span::styled(format!("{mark} {name}"), style))
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::request::{FormRequest, RoleRequest, UserRequest};
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(form: &mut FormState, code: KeyCode) -> Option<FormEvent> {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    fn id(n: u64) -> EntityId {
        EntityId::new(n).unwrap()
    }

    #[test]
    fn edit_form_is_prefilled() {
        let initial = FormValues::new()
            .with("name", "Abebe")
            .with("email", "abebe@aau.edu.et")
            .with("role_id", "2")
            .with("is_active", "false");
        let form = FormState::new(
            ResourceKind::User,
            FormMode::Edit(id(9)),
            UserRequest::fields(),
            &initial,
        );
        let values = form.values();
        assert_eq!(values.raw("name"), "Abebe");
        assert_eq!(values.raw("role_id"), "2");
        assert_eq!(values.raw("password"), "");
        assert_eq!(values.raw("is_active"), "false");
        assert_eq!(form.title(), "Edit user #9");
    }

    #[test]
    fn typing_and_choosing_fill_values() {
        let mut form = FormState::new(
            ResourceKind::Role,
            FormMode::Create,
            RoleRequest::fields(),
            &FormValues::new(),
        );
        type_text(&mut form, "Registrar");

        let lookups = form.lookups();
        let (key, lookup) = lookups.first().copied().unwrap();
        assert_eq!(lookup, Lookup::Permissions);
        form.set_choices(
            key,
            Ok(vec![(id(1), "view-campus".into()), (id(2), "edit-campus".into())]),
        );

        // Move to the permission picker, choose both, then drop the first.
        while form.fields.get(form.focus).map(|f| f.schema.key) != Some(key) {
            press(&mut form, KeyCode::Tab);
        }
        press(&mut form, KeyCode::Char(' '));
        press(&mut form, KeyCode::Down);
        press(&mut form, KeyCode::Char(' '));
        assert_eq!(form.values().raw(key), "1,2");
        press(&mut form, KeyCode::Up);
        press(&mut form, KeyCode::Char(' '));
        assert_eq!(form.values().raw(key), "2");
        assert_eq!(form.values().raw("name"), "Registrar");

        assert_eq!(press(&mut form, KeyCode::Enter), Some(FormEvent::Submit));
    }

    #[test]
    fn errors_move_focus_and_clear_on_edit() {
        let mut form = FormState::new(
            ResourceKind::User,
            FormMode::Create,
            UserRequest::fields(),
            &FormValues::new(),
        );
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), "Email is required".into());
        form.set_errors(errors);
        assert_eq!(form.fields.get(form.focus).map(|f| f.schema.key), Some("email"));

        type_text(&mut form, "a@b.et");
        assert!(form.errors.is_empty());
    }

    #[test]
    fn submitting_blocks_edits_but_not_cancel() {
        let mut form = FormState::new(
            ResourceKind::Role,
            FormMode::Create,
            RoleRequest::fields(),
            &FormValues::new(),
        );
        form.begin_submit();
        type_text(&mut form, "x");
        assert_eq!(form.values().raw("name"), "");
        assert_eq!(press(&mut form, KeyCode::Enter), None);
        assert_eq!(press(&mut form, KeyCode::Esc), Some(FormEvent::Cancel));
    }
}
