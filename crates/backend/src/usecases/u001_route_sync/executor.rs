use super::reconcile;
use super::session_tracker::SyncSessionTracker;
use crate::domain::a001_page::repository as page_repository;
use crate::domain::a002_nav_item::repository as nav_repository;
use crate::shared::error::{CmsError, CmsResult};
use crate::shared::realtime;
use contracts::domain::a001_page::aggregate::Page;
use contracts::shared::realtime::ChangeKind;
use contracts::shared::route_inventory::{list_routes, RouteDescriptor};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u001_route_sync::{
    ForceRestoreRequest, RouteSync, SyncOutcome, SyncPhase, SyncSession, SyncStatusReport,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Executor для UseCase синхронизации маршрутов со страницами
///
/// Все проходы выполняются внутри запроса; повтор после ошибки
/// запускает оператор.
#[derive(Clone)]
pub struct RouteSyncExecutor {
    tracker: Arc<SyncSessionTracker>,
    routes: &'static [RouteDescriptor],
    session_max_age_hours: i64,
}

impl RouteSyncExecutor {
    pub fn new(tracker: Arc<SyncSessionTracker>, session_max_age_hours: i64) -> Self {
        Self::with_routes(tracker, list_routes(), session_max_age_hours)
    }

    pub fn with_routes(
        tracker: Arc<SyncSessionTracker>,
        routes: &'static [RouteDescriptor],
        session_max_age_hours: i64,
    ) -> Self {
        Self {
            tracker,
            routes,
            session_max_age_hours,
        }
    }

    /// Новая сессия с проверкой при первой загрузке
    ///
    /// Если реестр страниц пуст, создаётся по странице на каждый маршрут.
    pub async fn start_session(&self, db: &DatabaseConnection) -> CmsResult<SyncSession> {
        let removed = self.tracker.cleanup_old_sessions(self.session_max_age_hours);
        if removed > 0 {
            tracing::info!("Removed {} stale sync session(s)", removed);
        }

        let session_id = Uuid::new_v4().to_string();
        tracing::info!("{}: starting session {}", RouteSync::full_name(), session_id);
        self.tracker.create_session(session_id.clone());
        self.tracker.begin_pass(&session_id, SyncPhase::Bootstrapping);

        match self.bootstrap(db, &session_id).await {
            Ok(outcome) if outcome.failed == 0 => {
                self.tracker.set_outcome(&session_id, outcome);
                self.tracker.transition(&session_id, SyncPhase::Idle);
            }
            Ok(outcome) => {
                tracing::warn!(
                    "Bootstrap of session {} failed for {} route(s)",
                    session_id,
                    outcome.failed
                );
                self.tracker.set_outcome(&session_id, outcome);
                self.tracker.transition(&session_id, SyncPhase::BootstrapFailed);
            }
            Err(e) => {
                tracing::error!("Bootstrap of session {} failed: {}", session_id, e);
                self.tracker.add_error(&session_id, None, e.to_string());
                self.tracker.transition(&session_id, SyncPhase::BootstrapFailed);
                return Err(CmsError::Bootstrap(format!("session {}: {}", session_id, e)));
            }
        }

        self.get_session(&session_id)
    }

    async fn bootstrap(&self, db: &DatabaseConnection, session_id: &str) -> CmsResult<SyncOutcome> {
        let existing = page_repository::count(db).await?;
        if existing > 0 {
            tracing::info!("Bootstrap skipped: registry already has {} page(s)", existing);
            let pages = page_repository::list_all(db).await?;
            return Ok(self.outcome(&pages, 0, 0, 0));
        }

        tracing::info!("Registry is empty, creating pages for {} route(s)", self.routes.len());
        let routes: Vec<&RouteDescriptor> = self.routes.iter().collect();
        let (created, failed) = self.create_route_pages(db, session_id, &routes).await;
        let pages = page_repository::list_all(db).await?;
        Ok(self.outcome(&pages, created, 0, failed))
    }

    /// Создать страницы для маршрутов без совпадения
    ///
    /// Уже сопоставленные маршруты не трогаются, поэтому повторный запуск
    /// ничего не дублирует.
    pub async fn sync(&self, db: &DatabaseConnection, session_id: &str) -> CmsResult<SyncSession> {
        let session = self.get_session(session_id)?;
        if !session.phase.can_sync() {
            return Err(CmsError::Validation(format!(
                "Синхронизация недоступна в состоянии {:?}",
                session.phase
            )));
        }
        self.tracker.begin_pass(session_id, SyncPhase::Syncing);

        match self.run_sync(db, session_id).await {
            Ok(outcome) => {
                let failed = outcome.failed;
                self.tracker.set_outcome(session_id, outcome);
                if failed > 0 {
                    self.tracker.transition(session_id, SyncPhase::SyncFailed);
                } else {
                    self.finish_synced(db, session_id).await?;
                }
            }
            Err(e) => {
                tracing::error!("Route sync of session {} failed: {}", session_id, e);
                self.tracker.add_error(session_id, None, e.to_string());
                self.tracker.transition(session_id, SyncPhase::SyncFailed);
                return Err(CmsError::Sync(format!("session {}: {}", session_id, e)));
            }
        }

        self.get_session(session_id)
    }

    async fn run_sync(&self, db: &DatabaseConnection, session_id: &str) -> CmsResult<SyncOutcome> {
        let pages = page_repository::list_all(db).await?;
        let missing = reconcile::unmatched_routes(self.routes, &pages);
        tracing::info!(
            "Route sync: {} of {} route(s) without a page",
            missing.len(),
            self.routes.len()
        );

        let (created, failed) = self.create_route_pages(db, session_id, &missing).await;
        let pages = page_repository::list_all(db).await?;
        Ok(self.outcome(&pages, created, 0, failed))
    }

    /// Принудительное восстановление: недостающие страницы создаются,
    /// существующие перезаписываются данными маршрута
    pub async fn force_restore(
        &self,
        db: &DatabaseConnection,
        session_id: &str,
        request: ForceRestoreRequest,
    ) -> CmsResult<SyncSession> {
        if !request.confirm {
            return Err(CmsError::Validation(
                "Принудительное восстановление требует подтверждения (confirm = true)".into(),
            ));
        }
        let session = self.get_session(session_id)?;
        if !session.can_force_restore() {
            return Err(CmsError::Validation(format!(
                "Принудительное восстановление недоступно в состоянии {:?}",
                session.phase
            )));
        }
        self.tracker.begin_pass(session_id, SyncPhase::ForceSyncing);
        tracing::warn!("Force restore started in session {}", session_id);

        match self.run_force_restore(db, session_id).await {
            Ok(outcome) => {
                let failed = outcome.failed;
                self.tracker.set_outcome(session_id, outcome);
                if failed > 0 {
                    self.tracker.transition(session_id, SyncPhase::ForceSyncFailed);
                } else {
                    self.finish_synced(db, session_id).await?;
                }
            }
            Err(e) => {
                tracing::error!("Force restore of session {} failed: {}", session_id, e);
                self.tracker.add_error(session_id, None, e.to_string());
                self.tracker.transition(session_id, SyncPhase::ForceSyncFailed);
                return Err(CmsError::ForceSync(format!("session {}: {}", session_id, e)));
            }
        }

        self.get_session(session_id)
    }

    async fn run_force_restore(
        &self,
        db: &DatabaseConnection,
        session_id: &str,
    ) -> CmsResult<SyncOutcome> {
        let pages = page_repository::list_all(db).await?;
        let by_slug = reconcile::index_by_slug(&pages);

        let mut created = 0;
        let mut restored = 0;
        let mut failed = 0;
        for route in self.routes {
            let result = match by_slug.get(route.slug().as_str()) {
                Some(existing) => {
                    let mut page = (*existing).clone();
                    page.restore_from_route(route);
                    page.before_write();
                    page_repository::update(db, &page)
                        .await
                        .map(|_| {
                            restored += 1;
                            realtime::notify::<Page>(ChangeKind::Update, page.id);
                        })
                }
                None => {
                    let page = Page::new_for_route(route);
                    page_repository::insert(db, &page).await.map(|_| {
                        created += 1;
                        realtime::notify::<Page>(ChangeKind::Insert, page.id);
                    })
                }
            };
            if let Err(e) = result {
                failed += 1;
                tracing::error!("Force restore of {} failed: {}", route.path, e);
                self.tracker
                    .add_error(session_id, Some(route.path.to_string()), e.to_string());
            }
        }

        let pages = page_repository::list_all(db).await?;
        Ok(self.outcome(&pages, created, restored, failed))
    }

    /// Отчёт о расхождениях маршрутов, страниц и навигации
    pub async fn status(&self, db: &DatabaseConnection) -> CmsResult<SyncStatusReport> {
        let pages = page_repository::list_all(db).await?;
        let items = nav_repository::list_all(db).await?;
        Ok(reconcile::status_report(self.routes, &pages, &items))
    }

    pub fn get_session(&self, session_id: &str) -> CmsResult<SyncSession> {
        self.tracker
            .get_session(session_id)
            .ok_or_else(|| CmsError::not_found("Sync session", session_id))
    }

    /// Synced, либо подсказка о настройке навигации, если пунктов ещё нет
    async fn finish_synced(&self, db: &DatabaseConnection, session_id: &str) -> CmsResult<()> {
        let phase = if nav_repository::count(db).await? == 0 {
            SyncPhase::NavigationSetupPending
        } else {
            SyncPhase::Synced
        };
        self.tracker.transition(session_id, phase);
        Ok(())
    }

    async fn create_route_pages(
        &self,
        db: &DatabaseConnection,
        session_id: &str,
        routes: &[&RouteDescriptor],
    ) -> (usize, usize) {
        let mut created = 0;
        let mut failed = 0;
        for route in routes {
            let page = Page::new_for_route(route);
            match page_repository::insert(db, &page).await {
                Ok(()) => {
                    created += 1;
                    realtime::notify::<Page>(ChangeKind::Insert, page.id);
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Failed to create page for {}: {}", route.path, e);
                    self.tracker
                        .add_error(session_id, Some(route.path.to_string()), e.to_string());
                }
            }
        }
        (created, failed)
    }

    fn outcome(&self, pages: &[Page], created: usize, restored: usize, failed: usize) -> SyncOutcome {
        let total_routes = self.routes.len();
        SyncOutcome {
            total_routes,
            matched: total_routes - reconcile::unmatched_routes(self.routes, pages).len(),
            created,
            restored,
            failed,
        }
    }
}
