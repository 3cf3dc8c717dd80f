//! Small rendering helpers shared by screens.

pub mod input;

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};

use crate::theme;

/// Saturating `usize` → `u16` for terminal coordinates.
pub fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// A `width` × `height` rectangle centred in `area`, clipped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// `key label  key label` hint line.
pub fn key_hints<'a>(pairs: &[(&'a str, &'a str)]) -> Line<'a> {
    let mut spans = Vec::with_capacity(pairs.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (key, label) in pairs {
        spans.push(Span::styled(*key, theme::key_hint_key()));
        spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn centered_clips_to_area() {
        let area = Rect::new(10, 5, 40, 10);
        assert_eq!(centered(area, 20, 4), Rect::new(20, 8, 20, 4));
        assert_eq!(centered(area, 80, 30), area);
    }

    #[test]
    fn hints_alternate_keys_and_labels() {
        let line = key_hints(&[("q", "quit"), ("?", "help")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " q quit  ? help  ");
    }
}
