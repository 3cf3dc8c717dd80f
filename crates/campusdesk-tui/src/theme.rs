//! Palette and semantic styles.

use campusdesk_core::NoticeLevel;
use ratatui::style::{Color, Modifier, Style};

// ── Palette ─────────────────────────────────────────────────────────

pub const INDIGO: Color = Color::Rgb(121, 134, 255); // #7986ff
pub const TEAL: Color = Color::Rgb(94, 234, 212); // #5eead4
pub const AMBER: Color = Color::Rgb(251, 191, 36); // #fbbf24
pub const GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const RED: Color = Color::Rgb(248, 113, 113); // #f87171

pub const TEXT: Color = Color::Rgb(203, 213, 225); // #cbd5e1
pub const MUTED: Color = Color::Rgb(100, 116, 139); // #64748b
pub const BG_SELECTED: Color = Color::Rgb(30, 41, 59); // #1e293b
pub const BG_PANEL: Color = Color::Rgb(15, 23, 42); // #0f172a

// ── Semantic styles ─────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(INDIGO)
}

pub fn border_default() -> Style {
    Style::default().fg(MUTED)
}

pub fn border(focused: bool) -> Style {
    if focused {
        border_focused()
    } else {
        border_default()
    }
}

pub fn table_header() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

/// Header of the column `s` would sort.
pub fn table_header_cursor() -> Style {
    table_header().add_modifier(Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(INDIGO)
        .bg(BG_SELECTED)
        .add_modifier(Modifier::BOLD)
}

/// Menu entries that open a screen.
pub fn link() -> Style {
    Style::default().fg(TEXT)
}

/// Menu entries that only label (blocks, loading, errors).
pub fn note() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
}

pub fn input_label(active: bool) -> Style {
    Style::default().fg(if active { TEAL } else { TEXT })
}

pub fn input_text() -> Style {
    Style::default().fg(TEXT)
}

pub fn error_text() -> Style {
    Style::default().fg(RED)
}

pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

/// Toast border colour and icon for a notice level.
pub fn notice(level: NoticeLevel) -> (Color, &'static str) {
    match level {
        NoticeLevel::Success => (GREEN, "✓"),
        NoticeLevel::Error => (RED, "✗"),
        NoticeLevel::Warning => (AMBER, "!"),
        NoticeLevel::Info => (TEAL, "·"),
    }
}
