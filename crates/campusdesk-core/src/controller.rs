// ── Controller abstraction ──
//
// Single entry point for the CLI and TUI: owns the API client and the
// signed-in user, and exposes typed CRUD plus the composite reads behind
// the dashboard, the menu and the role form.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use campusdesk_api::{Ack, ApiClient, AuthUser, Page, PageRequest, ResourceKind, Saved, Session};
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::dashboard::{Dashboard, DashboardStats};
use crate::error::CoreError;
use crate::menu::{CampusPager, MENU_CAMPUS_PAGE_SIZE, Menu, build_campus_tree};
use crate::model::{
    Block, Building, Campus, Department, DepartmentType, EntityId, Permission, Role, Room,
    RoomFacility, RoomType, User,
};
use crate::permissions::{PERMISSION_SOURCE_LIMIT, derive_permissions};
use crate::request::FormMode;
use crate::resource::Resource;

/// Page size for the block and building lists behind the menu tree.
const MENU_TREE_LIMIT: u64 = 100;

/// Page size used when collecting choice-field options.
pub const LOOKUP_PAGE_SIZE: u64 = 100;

/// Query key that scopes the rooms list to one building.
pub const BUILDING_FILTER: &str = "buildingId";

/// Cheaply cloneable handle to one backend.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: ApiClient,
    user: ArcSwapOption<AuthUser>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Build the client. Does not contact the backend.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.api_url.as_str(), &config.transport())?;
        if let Some(token) = &config.token {
            client.set_token(token.clone());
        }
        Ok(Self::with_client(config, client))
    }

    /// Wrap an existing client (tests inject one with a fast retry policy).
    pub fn with_client(config: ControllerConfig, client: ApiClient) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                user: ArcSwapOption::empty(),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, CoreError> {
        let session = self
            .inner
            .client
            .login(email, password)
            .await
            .map_err(|e| match CoreError::from(e) {
                // A refused login is an auth failure whatever the status code.
                CoreError::Rejected { message } => CoreError::AuthenticationFailed { message },
                other => other,
            })?;
        self.inner.user.store(Some(Arc::new(session.user.clone())));
        Ok(session)
    }

    pub fn logout(&self) {
        self.inner.client.logout();
        self.inner.user.store(None);
    }

    /// Whether requests carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.inner.client.has_token()
    }

    /// The user from this process's login, if any.
    pub fn current_user(&self) -> Option<Arc<AuthUser>> {
        self.inner.user.load_full()
    }

    // ── Typed CRUD ───────────────────────────────────────────────────

    pub async fn list<R: Resource>(
        &self,
        page: PageRequest,
        filters: &[(&str, String)],
    ) -> Result<Page<R>, CoreError> {
        debug!(kind = %R::KIND, page = page.page, limit = page.limit, "listing");
        Ok(self.inner.client.list(R::KIND, page, filters).await?)
    }

    /// Every row, walking all pages.
    pub async fn list_all<R: Resource>(
        &self,
        limit: u64,
        filters: &[(&str, String)],
    ) -> Result<Vec<R>, CoreError> {
        Ok(self.inner.client.list_all(R::KIND, limit, filters).await?)
    }

    pub async fn get<R: Resource>(&self, id: EntityId) -> Result<R, CoreError> {
        Ok(self.inner.client.get(R::KIND, id.get()).await?)
    }

    pub async fn create<R: Resource>(&self, request: &R::Request) -> Result<Saved<R>, CoreError> {
        let saved: Saved<Value> = self.inner.client.create(R::KIND, request).await?;
        info!(kind = %R::KIND, "created");
        Ok(typed(saved))
    }

    pub async fn update<R: Resource>(
        &self,
        id: EntityId,
        request: &R::Request,
    ) -> Result<Saved<R>, CoreError> {
        let saved: Saved<Value> = self.inner.client.update(R::KIND, id.get(), request).await?;
        info!(kind = %R::KIND, %id, "updated");
        Ok(typed(saved))
    }

    /// Create or update depending on the form mode.
    pub async fn save<R: Resource>(
        &self,
        mode: FormMode,
        request: &R::Request,
    ) -> Result<Saved<R>, CoreError> {
        match mode {
            FormMode::Create => self.create::<R>(request).await,
            FormMode::Edit(id) => self.update::<R>(id, request).await,
        }
    }

    pub async fn delete<R: Resource>(&self, id: EntityId) -> Result<Ack, CoreError> {
        let ack = self.inner.client.delete(R::KIND, id.get()).await?;
        info!(kind = %R::KIND, %id, "deleted");
        Ok(ack)
    }

    // ── Composite reads ──────────────────────────────────────────────

    /// One page of the rooms in a building.
    pub async fn rooms_of_building(
        &self,
        building: EntityId,
        page: PageRequest,
    ) -> Result<Page<Room>, CoreError> {
        self.list::<Room>(page, &[(BUILDING_FILTER, building.to_string())])
            .await
    }

    /// Permission catalogue, collected from the first page of roles.
    pub async fn permissions(&self) -> Result<Vec<Permission>, CoreError> {
        let roles: Page<Role> = self
            .list(PageRequest::first(PERMISSION_SOURCE_LIMIT), &[])
            .await?;
        Ok(derive_permissions(&roles.data))
    }

    /// Entity totals for the dashboard. Never fails: errors turn into a
    /// zeroed dashboard with a notice.
    pub async fn dashboard(&self) -> Dashboard {
        if !self.is_authenticated() {
            return Dashboard::unauthenticated();
        }
        match self.dashboard_stats().await {
            Ok(stats) => Dashboard::loaded(stats),
            Err(err) => {
                warn!("dashboard statistics failed: {err}");
                Dashboard::failed()
            }
        }
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, CoreError> {
        // Only `meta.total` is used, so one row per list is enough.
        let page = PageRequest::first(1);
        let (campuses, buildings, blocks) = futures::try_join!(
            self.list::<Campus>(page, &[]),
            self.list::<Building>(page, &[]),
            self.list::<Block>(page, &[]),
        )?;
        Ok(DashboardStats {
            campuses: campuses.meta.total,
            buildings: buildings.meta.total,
            blocks: blocks.meta.total,
        })
    }

    /// Sidebar menu with the campus tree for `campus_page`.
    pub async fn menu(&self, campus_page: u64) -> Menu {
        if !self.is_authenticated() {
            return Menu::logged_out();
        }
        let tree = PageRequest::first(MENU_TREE_LIMIT);
        let loaded = futures::try_join!(
            self.list::<Campus>(PageRequest::new(campus_page, MENU_CAMPUS_PAGE_SIZE), &[]),
            self.list::<Block>(tree, &[]),
            self.list::<Building>(tree, &[]),
        );
        match loaded {
            Ok((campuses, blocks, buildings)) => Menu::loaded(
                build_campus_tree(&blocks.data, &buildings.data),
                CampusPager::from_meta(campuses.meta),
            ),
            Err(err) => {
                warn!("menu data failed: {err}");
                Menu::error(err.to_string())
            }
        }
    }

    /// Options for a choice field: `(id, name)` of every row.
    pub async fn lookup(&self, kind: ResourceKind) -> Result<Vec<(EntityId, String)>, CoreError> {
        macro_rules! options {
            ($model:ty) => {
                self.list_all::<$model>(LOOKUP_PAGE_SIZE, &[])
                    .await?
                    .iter()
                    .map(|r| (r.id(), r.display_name().to_owned()))
                    .collect()
            };
        }
        Ok(match kind {
            ResourceKind::Campus => options!(Campus),
            ResourceKind::Block => options!(Block),
            ResourceKind::Building => options!(Building),
            ResourceKind::Room => options!(Room),
            ResourceKind::RoomType => options!(RoomType),
            ResourceKind::RoomFacility => options!(RoomFacility),
            ResourceKind::DepartmentType => options!(DepartmentType),
            ResourceKind::Department => options!(Department),
            ResourceKind::Role => options!(Role),
            ResourceKind::User => options!(User),
        })
    }
}

/// Decode the saved entity; shapes the model cannot read are dropped.
fn typed<R: Resource>(saved: Saved<Value>) -> Saved<R> {
    Saved {
        message: saved.message,
        data: saved.data.and_then(|v| serde_json::from_value(v).ok()),
    }
}
