// ── Generic data table ──
//
// Sorting, global filtering and pagination over any row type. In client
// mode all rows are local and paging slices them; in server mode the rows
// are one page from the API and page changes surface as `TableEvent`s for
// the caller to fetch.

mod cell;
mod debounce;

use campusdesk_api::{PageMeta, PageRequest};

pub use cell::{Cell, Column};
pub use debounce::{Debounce, SEARCH_DEBOUNCE};

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Cut `text` to `max` characters and append `...` when it was longer.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_owned()
    }
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

// ── State ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: &'static str,
    pub descending: bool,
}

impl SortState {
    pub fn direction(self) -> SortDirection {
        if self.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    Client,
    Server(PageMeta),
}

/// Work the caller must do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// Fetch this page (1-based) from the API.
    FetchPage(PageRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    global_filter: String,
    sort: Option<SortState>,
    page_index: usize,
    page_size: usize,
    pagination: Pagination,
    /// Rows left after filtering at the last `view`. `None` once the
    /// filter changes, until the next `view` counts again.
    filtered_rows: Option<usize>,
}

impl TableState {
    /// Table paginating over local rows.
    pub fn client() -> Self {
        Self::with_pagination(Pagination::Client)
    }

    /// Table showing one server page at a time.
    pub fn server() -> Self {
        Self::with_pagination(Pagination::Server(PageMeta::default()))
    }

    fn with_pagination(pagination: Pagination) -> Self {
        Self {
            global_filter: String::new(),
            sort: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            pagination,
            filtered_rows: Some(0),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn is_server(&self) -> bool {
        matches!(self.pagination, Pagination::Server(_))
    }

    /// The page this table is showing, as an API request.
    pub fn current_request(&self) -> PageRequest {
        PageRequest::new(to_u64(self.page_index) + 1, to_u64(self.page_size))
    }

    // ── Filtering & sorting ─────────────────────────────────────────

    /// Case-insensitive substring filter over every column's display text.
    /// Client mode jumps back to the first page.
    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.global_filter = text.into();
        if !self.is_server() {
            self.page_index = 0;
            self.filtered_rows = None;
        }
    }

    /// Cycle a column through descending → ascending → unsorted.
    /// Returns `false` for columns that cannot be sorted.
    pub fn toggle_sort<T>(&mut self, column: &Column<T>) -> bool {
        if !column.sortable {
            return false;
        }
        self.sort = match self.sort {
            Some(s) if s.column == column.id && s.descending => Some(SortState {
                column: column.id,
                descending: false,
            }),
            Some(s) if s.column == column.id => None,
            _ => Some(SortState {
                column: column.id,
                descending: true,
            }),
        };
        true
    }

    /// Sort by `column` in a fixed direction, skipping the toggle cycle.
    pub fn set_sort<T>(&mut self, column: &Column<T>, descending: bool) -> bool {
        if !column.sortable {
            return false;
        }
        self.sort = Some(SortState {
            column: column.id,
            descending,
        });
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    // ── Pagination ──────────────────────────────────────────────────

    /// Adopt metadata from a freshly fetched server page.
    pub fn set_server_meta(&mut self, meta: PageMeta) {
        self.page_index = to_usize(meta.current_page.saturating_sub(1));
        self.pagination = Pagination::Server(meta);
    }

    pub fn page_count(&self) -> usize {
        match self.pagination {
            // Unknown bounds keep paging on the current page.
            Pagination::Client => self
                .filtered_rows
                .map_or(self.page_index + 1, |n| n.div_ceil(self.page_size).max(1)),
            Pagination::Server(meta) => to_usize(meta.last_page).max(1),
        }
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    /// Move to a 0-based page. Out-of-range or unchanged indices are ignored.
    pub fn go_to_page(&mut self, index: usize) -> Option<TableEvent> {
        if index >= self.page_count() || index == self.page_index {
            return None;
        }
        self.page_index = index;
        self.is_server()
            .then(|| TableEvent::FetchPage(self.current_request()))
    }

    pub fn next_page(&mut self) -> Option<TableEvent> {
        if self.can_next() {
            self.go_to_page(self.page_index + 1)
        } else {
            None
        }
    }

    pub fn previous_page(&mut self) -> Option<TableEvent> {
        if self.can_previous() {
            self.go_to_page(self.page_index - 1)
        } else {
            None
        }
    }

    /// Change the page size. Client mode keeps the current top row on
    /// screen; server mode restarts at page 1.
    pub fn set_page_size(&mut self, size: usize) -> Option<TableEvent> {
        let size = size.max(1);
        match self.pagination {
            Pagination::Client => {
                let top_row = self.page_index * self.page_size;
                self.page_size = size;
                self.page_index = top_row / size;
                None
            }
            Pagination::Server(_) => {
                self.page_size = size;
                self.page_index = 0;
                Some(TableEvent::FetchPage(self.current_request()))
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Filter, sort and page `rows`, rendering every visible cell.
    pub fn view<T>(&mut self, rows: &[T], columns: &[Column<T>]) -> TableView {
        let needle = self.global_filter.trim().to_lowercase();
        let mut visible: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                needle.is_empty()
                    || columns
                        .iter()
                        .any(|c| c.text(row).to_lowercase().contains(&needle))
            })
            .map(|(i, _)| i)
            .collect();

        if let Some(sort) = self.sort {
            if let Some(column) = columns.iter().find(|c| c.id == sort.column) {
                let keys: Vec<Cell> = rows.iter().map(|r| column.value(r)).collect();
                visible.sort_by(|&a, &b| {
                    let ord = keys[a].sort_cmp(&keys[b]);
                    if sort.descending { ord.reverse() } else { ord }
                });
            }
        }

        self.filtered_rows = Some(visible.len());
        let (page_rows, total) = match self.pagination {
            Pagination::Client => {
                self.page_index = self.page_index.min(self.page_count() - 1);
                let start = self.page_index * self.page_size;
                let page: Vec<usize> = visible
                    .into_iter()
                    .skip(start)
                    .take(self.page_size)
                    .collect();
                (page, to_u64(rows.len()))
            }
            Pagination::Server(meta) => (visible, meta.total),
        };

        let headers = columns
            .iter()
            .map(|c| HeaderView {
                id: c.id,
                title: c.header,
                sortable: c.sortable,
                sort: self
                    .sort
                    .filter(|s| s.column == c.id)
                    .map(SortState::direction),
            })
            .collect();

        let rows = page_rows
            .into_iter()
            .map(|index| RowView {
                index,
                cells: columns.iter().map(|c| c.display(&rows[index])).collect(),
            })
            .collect::<Vec<_>>();

        TableView {
            headers,
            shown: rows.len(),
            rows,
            total,
            page_index: self.page_index,
            page_count: self.page_count(),
            page_size: self.page_size,
            can_previous: self.can_previous(),
            can_next: self.can_next(),
        }
    }
}

// ── View ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub id: &'static str,
    pub title: &'static str,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Index into the slice passed to [`TableState::view`].
    pub index: usize,
    pub cells: Vec<String>,
}

/// A rendered page, ready for any front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub shown: usize,
    pub total: u64,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

impl TableView {
    /// `"Showing 10 of 42 Results"`.
    pub fn footer(&self) -> String {
        format!("Showing {} of {} Results", self.shown, self.total)
    }

    /// `"Page 2 of 5"`.
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page_index + 1, self.page_count)
    }
}
