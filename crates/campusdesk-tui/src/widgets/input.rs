//! Single-line text inputs built on `tui_input::Input`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, InputRequest};

use super::to_u16;
use crate::theme;

/// Rows taken by [`render`]: label plus a bordered box.
pub const HEIGHT: u16 = 4;

const MASK: char = '\u{25CF}';

/// Editing request for a key press, if it edits text.
pub fn request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let req = match key.code {
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
        KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
        KeyCode::Char(_) if ctrl || alt => return None,
        KeyCode::Char(c) => InputRequest::InsertChar(c),
        KeyCode::Backspace if ctrl || alt => InputRequest::DeletePrevWord,
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left if ctrl => InputRequest::GoToPrevWord,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right if ctrl => InputRequest::GoToNextWord,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    };
    Some(req)
}

/// Apply a key to the input. True when the value changed.
pub fn edit(input: &mut Input, key: KeyEvent) -> bool {
    let Some(req) = request(key) else {
        return false;
    };
    let before = input.value().to_owned();
    input.handle(req);
    input.value() != before
}

/// Label line and a rounded box holding the value. Places the terminal
/// cursor when `active`.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    active: bool,
    masked: bool,
) {
    if area.height < 3 {
        return;
    }

    frame.render_widget(
        Paragraph::new(Span::styled(label, theme::input_label(active))),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(active));
    let box_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    // Keep one column free for the cursor at the end of the text.
    let width = usize::from(inner.width.saturating_sub(1)).max(1);
    let (text, cursor) = if masked {
        let len = input.value().chars().count();
        (MASK.to_string().repeat(len), input.cursor())
    } else {
        (input.value().to_owned(), input.visual_cursor())
    };
    let scroll = cursor.saturating_sub(width);

    frame.render_widget(
        Paragraph::new(Span::styled(text, theme::input_text())).scroll((0, to_u16(scroll))),
        inner,
    );

    if active {
        frame.set_cursor_position((inner.x + to_u16(cursor - scroll), inner.y));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_edits_the_value() {
        let mut input = Input::default();
        for c in "Main".chars() {
            assert!(edit(&mut input, key(KeyCode::Char(c))));
        }
        assert!(edit(&mut input, key(KeyCode::Backspace)));
        assert_eq!(input.value(), "Mai");

        assert!(!edit(&mut input, key(KeyCode::Home)));
        assert_eq!(input.cursor(), 0);
        assert!(!edit(&mut input, key(KeyCode::Tab)));
    }

    #[test]
    fn control_chords_are_not_inserted() {
        let mut input = Input::new("Sidist Kilo".into());
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        edit(&mut input, ctrl_u);
        assert_eq!(input.value(), "");

        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert!(!edit(&mut input, ctrl_x));
        assert_eq!(input.value(), "");
    }
}
