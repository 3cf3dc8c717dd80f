// ── CRUD page workflow ──
//
// A list page holds one server page of rows plus its table state and runs
// fetch → table → form → notice → refetch. The state half is synchronous so
// the TUI can drive it from spawned tasks; `load`/`submit`/`delete` are the
// async conveniences the CLI and tests use.

use campusdesk_api::{Page, PageMeta, PageRequest, ResourceKind};
use tracing::debug;

use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::EntityId;
use crate::request::{FieldErrors, FormMode, FormRequest, FormValues};
use crate::resource::Resource;
use crate::table::{Column, TableEvent, TableState, TableView};

// ── Notices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
    Warning,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// `"New building added successfully"` / `"Building updated successfully"`.
    pub fn saved(kind: ResourceKind, mode: FormMode) -> Self {
        match mode {
            FormMode::Create => Self::success(format!("New {} added successfully", kind.label())),
            FormMode::Edit(_) => Self::success(format!("{} updated successfully", kind.title())),
        }
    }

    pub fn deleted(kind: ResourceKind) -> Self {
        Self::success(format!("{} deleted successfully", kind.title()))
    }

    /// The backend's own message when it sent one, else a generic failure.
    pub fn save_failed(kind: ResourceKind, err: &CoreError) -> Self {
        Self::error(
            err.backend_message()
                .map_or_else(|| format!("Failed to save {}", kind.label()), str::to_owned),
        )
    }

    pub fn delete_failed(kind: ResourceKind) -> Self {
        Self::error(format!("Failed to delete {}", kind.label()))
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Confirmation text shown before a delete.
pub fn delete_prompt(kind: ResourceKind, name: &str) -> String {
    format!(
        "Are you sure you want to delete the {} \"{name}\"? This action cannot be undone.",
        kind.label()
    )
}

// ── Save / delete ───────────────────────────────────────────────────

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(Notice),
    /// Rejected locally; nothing was sent.
    Invalid(FieldErrors),
    /// The backend refused or could not be reached.
    Failed { notice: Notice, fields: FieldErrors },
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Notice to show, if any. Local validation only marks fields.
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Saved(notice) | Self::Failed { notice, .. } => Some(notice),
            Self::Invalid(_) => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(fields) | Self::Failed { fields, .. } => Some(fields),
            Self::Saved(_) => None,
        }
    }
}

/// Build the request from form input and create or update.
pub async fn save<R: Resource>(
    ctl: &Controller,
    mode: FormMode,
    values: &FormValues,
) -> SubmitOutcome {
    let request = match R::Request::build(values, mode) {
        Ok(request) => request,
        Err(fields) => return SubmitOutcome::Invalid(fields),
    };
    save_request::<R>(ctl, mode, &request).await
}

/// Create or update with an already built request.
pub async fn save_request<R: Resource>(
    ctl: &Controller,
    mode: FormMode,
    request: &R::Request,
) -> SubmitOutcome {
    match ctl.save::<R>(mode, request).await {
        Ok(_) => SubmitOutcome::Saved(Notice::saved(R::KIND, mode)),
        Err(err) => {
            debug!(kind = %R::KIND, "save failed: {err}");
            SubmitOutcome::Failed {
                notice: Notice::save_failed(R::KIND, &err),
                fields: err.field_errors().cloned().unwrap_or_default(),
            }
        }
    }
}

pub async fn remove<R: Resource>(ctl: &Controller, id: EntityId) -> Notice {
    match ctl.delete::<R>(id).await {
        Ok(_) => Notice::deleted(R::KIND),
        Err(err) => {
            debug!(kind = %R::KIND, %id, "delete failed: {err}");
            Notice::delete_failed(R::KIND)
        }
    }
}

// ── ResourcePage ────────────────────────────────────────────────────

/// One server-paginated list of `R`.
#[derive(Debug, Clone)]
pub struct ResourcePage<R: Resource> {
    rows: Vec<R>,
    table: TableState,
    columns: Vec<Column<R>>,
    filters: Vec<(&'static str, String)>,
    loading: bool,
    error: Option<String>,
}

impl<R: Resource> Default for ResourcePage<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourcePage<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            table: TableState::server(),
            columns: R::columns(),
            filters: Vec::new(),
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.table = self.table.with_page_size(size);
        self
    }

    /// Extra query parameter sent with every fetch (e.g. `buildingId`).
    #[must_use]
    pub fn with_filter(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.filters.push((key, value.into()));
        self
    }

    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn filters(&self) -> &[(&'static str, String)] {
        &self.filters
    }

    pub fn meta(&self) -> PageMeta {
        match self.table.pagination() {
            crate::table::Pagination::Server(meta) => meta,
            crate::table::Pagination::Client => PageMeta::single(self.rows.len()),
        }
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn row(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    // ── State transitions ───────────────────────────────────────────

    /// The page to fetch next.
    pub fn page_request(&self) -> PageRequest {
        self.table.current_request()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Adopt a fetched page.
    pub fn apply(&mut self, page: Page<R>) {
        self.table.set_server_meta(page.meta);
        self.rows = page.data;
        self.loading = false;
        self.error = None;
    }

    /// Record a failed fetch. Rows from the last good page stay.
    pub fn fail(&mut self, err: &CoreError) {
        self.loading = false;
        self.error = Some(err.to_string());
    }

    /// Move to a 1-based page. `None` when out of range or unchanged.
    pub fn change_page(&mut self, page: u64) -> Option<PageRequest> {
        let index = usize::try_from(page.checked_sub(1)?).ok()?;
        Self::fetch(self.table.go_to_page(index))
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        Self::fetch(self.table.next_page())
    }

    pub fn previous_page(&mut self) -> Option<PageRequest> {
        Self::fetch(self.table.previous_page())
    }

    /// New page size; always restarts at page 1.
    pub fn change_page_size(&mut self, size: usize) -> Option<PageRequest> {
        Self::fetch(self.table.set_page_size(size))
    }

    fn fetch(event: Option<TableEvent>) -> Option<PageRequest> {
        event.map(|TableEvent::FetchPage(request)| request)
    }

    pub fn view(&mut self) -> TableView {
        self.table.view(&self.rows, &self.columns)
    }

    // ── Async conveniences ──────────────────────────────────────────

    /// Fetch the current page.
    pub async fn load(&mut self, ctl: &Controller) -> Result<(), CoreError> {
        self.fetch_page(ctl, self.page_request()).await
    }

    pub async fn go_to(&mut self, ctl: &Controller, page: u64) -> Result<(), CoreError> {
        match self.change_page(page) {
            Some(request) => self.fetch_page(ctl, request).await,
            None => Ok(()),
        }
    }

    pub async fn resize(&mut self, ctl: &Controller, size: usize) -> Result<(), CoreError> {
        match self.change_page_size(size) {
            Some(request) => self.fetch_page(ctl, request).await,
            None => Ok(()),
        }
    }

    async fn fetch_page(
        &mut self,
        ctl: &Controller,
        request: PageRequest,
    ) -> Result<(), CoreError> {
        self.begin_load();
        match ctl.list::<R>(request, &self.filters).await {
            Ok(page) => {
                self.apply(page);
                Ok(())
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Save a form and refetch the current page when it went through.
    pub async fn submit(
        &mut self,
        ctl: &Controller,
        mode: FormMode,
        values: &FormValues,
    ) -> SubmitOutcome {
        let outcome = save::<R>(ctl, mode, values).await;
        if outcome.is_saved() {
            self.refresh(ctl).await;
        }
        outcome
    }

    /// Delete and refetch. The refetch also runs after a failed delete so
    /// the list reflects whatever the backend now holds.
    pub async fn delete(&mut self, ctl: &Controller, id: EntityId) -> Notice {
        let notice = remove::<R>(ctl, id).await;
        self.refresh(ctl).await;
        notice
    }

    async fn refresh(&mut self, ctl: &Controller) {
        if let Err(err) = self.load(ctl).await {
            debug!(kind = %R::KIND, "refetch failed: {err}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_api::Error as ApiError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::Campus;

    #[test]
    fn notice_texts() {
        let id = EntityId::new(3).unwrap();
        assert_eq!(
            Notice::saved(ResourceKind::Building, FormMode::Create).message,
            "New building added successfully"
        );
        assert_eq!(
            Notice::saved(ResourceKind::RoomType, FormMode::Edit(id)).message,
            "Room type updated successfully"
        );
        assert_eq!(
            Notice::deleted(ResourceKind::User).message,
            "User deleted successfully"
        );
        assert!(Notice::delete_failed(ResourceKind::Role).is_error());
        assert_eq!(
            delete_prompt(ResourceKind::Campus, "Main"),
            "Are you sure you want to delete the campus \"Main\"? This action cannot be undone."
        );
    }

    #[test]
    fn save_failed_prefers_backend_text() {
        let err = CoreError::from(ApiError::Api {
            status: 409,
            message: "Name already taken".into(),
        });
        assert_eq!(
            Notice::save_failed(ResourceKind::Block, &err).message,
            "Name already taken"
        );
        let err = CoreError::from(ApiError::ServerError);
        assert_eq!(
            Notice::save_failed(ResourceKind::Block, &err).message,
            "Failed to save block"
        );
    }

    fn page(current: u64, last: u64) -> Page<Campus> {
        Page {
            data: serde_json::from_value(json!([
                {"id": 1, "name": "Main"},
                {"id": 2, "name": "Lideta"}
            ]))
            .unwrap(),
            meta: PageMeta {
                total: last * 2,
                last_page: last,
                current_page: current,
                per_page: 2,
            },
        }
    }

    #[test]
    fn page_transitions() {
        let mut list = ResourcePage::<Campus>::new();
        assert_eq!(list.page_request(), PageRequest::new(1, 10));

        list.begin_load();
        assert!(list.is_loading());
        list.apply(page(1, 4));
        assert!(!list.is_loading());
        assert_eq!(list.meta().total, 8);

        assert_eq!(list.change_page(3), Some(PageRequest::new(3, 10)));
        assert_eq!(list.change_page(0), None);
        assert_eq!(list.change_page(9), None);

        list.apply(page(3, 4));
        assert_eq!(list.change_page_size(20), Some(PageRequest::new(1, 20)));

        let view = list.view();
        assert_eq!(view.footer(), "Showing 2 of 8 Results");
    }

    #[test]
    fn failed_fetch_keeps_rows() {
        let mut list = ResourcePage::<Campus>::new().with_filter("campusId", "4");
        list.apply(page(1, 1));
        list.begin_load();
        list.fail(&CoreError::from(ApiError::Timeout));
        assert_eq!(list.rows().len(), 2);
        assert!(list.error().unwrap().starts_with("Connection timed out"));
        assert_eq!(list.filters(), &[("campusId", "4".to_owned())]);
    }

    #[test]
    fn submit_outcome_accessors() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), "Name is required".into());
        let invalid = SubmitOutcome::Invalid(fields);
        assert!(invalid.notice().is_none());
        assert_eq!(invalid.field_errors().unwrap()["name"], "Name is required");
        assert!(SubmitOutcome::Saved(Notice::info("ok")).is_saved());
    }
}
