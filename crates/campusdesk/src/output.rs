//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables are built from
//! the core `TableView` (or `Tabled` rows for fixed shapes), structured
//! formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use campusdesk_core::table::{SortDirection, TableView};
use campusdesk_core::{Notice, NoticeLevel};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status line for a notice: `✓ Campus deleted successfully`.
pub fn notice_line(notice: &Notice, color: bool) -> String {
    let (mark, text) = match notice.level {
        NoticeLevel::Success => ("✓", &notice.message),
        NoticeLevel::Error => ("✗", &notice.message),
        NoticeLevel::Info => ("•", &notice.message),
        NoticeLevel::Warning => ("!", &notice.message),
    };
    let line = format!("{mark} {text}");
    if !color {
        return line;
    }
    match notice.level {
        NoticeLevel::Success => line.green().to_string(),
        NoticeLevel::Error => line.red().to_string(),
        NoticeLevel::Info => line.cyan().to_string(),
        NoticeLevel::Warning => line.yellow().to_string(),
    }
}

/// Print a notice to stderr unless quiet. Errors are always shown.
pub fn print_notice(notice: &Notice, color: bool, quiet: bool) {
    if quiet && !notice.is_error() {
        return;
    }
    eprintln!("{}", notice_line(notice, color));
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one table page.
///
/// - `table`: the view's headers and cells, with a paging footer
/// - `json` / `json-compact` / `yaml`: the rows behind the visible cells
/// - `plain`: `id_fn` of each visible row, one per line
pub fn render_view<T: Serialize>(
    format: OutputFormat,
    view: &TableView,
    rows: &[T],
    id_fn: impl Fn(&T) -> String,
) -> String {
    let visible: Vec<&T> = view.rows.iter().filter_map(|r| rows.get(r.index)).collect();
    match format {
        OutputFormat::Table => render_view_table(view),
        OutputFormat::Json => render_json(&visible, false),
        OutputFormat::JsonCompact => render_json(&visible, true),
        OutputFormat::Yaml => render_yaml(&visible),
        OutputFormat::Plain => visible
            .into_iter()
            .map(id_fn)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// listings rather than rows.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Two-column key/value table.
pub fn render_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut builder = Builder::new();
    for (key, value) in pairs {
        builder.push_record([key.to_owned(), value]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_view_table(view: &TableView) -> String {
    let mut builder = Builder::new();
    builder.push_record(view.headers.iter().map(|h| match h.sort {
        Some(SortDirection::Ascending) => format!("{} ▲", h.title),
        Some(SortDirection::Descending) => format!("{} ▼", h.title),
        None => h.title.to_owned(),
    }));
    for row in &view.rows {
        builder.push_record(row.cells.iter().cloned());
    }
    let table = builder.build().with(Style::rounded()).to_string();
    format!("{table}\n{}  ·  {}", view.footer(), view.page_label())
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}
