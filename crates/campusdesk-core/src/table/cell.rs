// ── Cell values and column definitions ──

use std::cmp::Ordering;

/// A single table value. Ordering: empty < numbers < text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Display text. Whole numbers render without a fractional part.
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Total order used for sorting.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Empty, _) => Ordering::Less,
            (_, Self::Empty) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Option<&str>> for Cell {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Empty, Self::from)
    }
}

impl From<u64> for Cell {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<Option<u64>> for Cell {
    fn from(n: Option<u64>) -> Self {
        n.map_or(Self::Empty, Self::from)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One table column over rows of type `T`.
///
/// `accessor` yields the value used for sorting and, unless `render` is
/// set, for display. `truncate` shortens the displayed text.
pub struct Column<T> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&T) -> Cell,
    pub render: Option<fn(&T) -> String>,
    pub sortable: bool,
    pub truncate: Option<usize>,
}

// Manual impls: derives would require `T: Clone`.
impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("truncate", &self.truncate)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    pub const fn new(id: &'static str, header: &'static str, accessor: fn(&T) -> Cell) -> Self {
        Self {
            id,
            header,
            accessor,
            render: None,
            sortable: true,
            truncate: None,
        }
    }

    #[must_use]
    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    #[must_use]
    pub const fn truncate(mut self, max: usize) -> Self {
        self.truncate = Some(max);
        self
    }

    #[must_use]
    pub const fn render_with(mut self, render: fn(&T) -> String) -> Self {
        self.render = Some(render);
        self
    }

    pub fn value(&self, row: &T) -> Cell {
        (self.accessor)(row)
    }

    /// Full display text, before truncation.
    pub fn text(&self, row: &T) -> String {
        self.render
            .map_or_else(|| self.value(row).render(), |render| render(row))
    }

    /// Display text as shown in a table cell.
    pub fn display(&self, row: &T) -> String {
        let text = self.text(row);
        match self.truncate {
            Some(max) => super::truncate_text(&text, max),
            None => text,
        }
    }
}
