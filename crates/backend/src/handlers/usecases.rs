use axum::{extract::Path, Json};
use contracts::shared::route_inventory::{list_routes, RouteDescriptor};
use contracts::usecases::u001_route_sync::{ForceRestoreRequest, SyncSession, SyncStatusReport};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::shared::config::SyncConfig;
use crate::shared::data::db::get_connection;
use crate::shared::error::CmsResult;
use crate::usecases::u001_route_sync::{RouteSyncExecutor, SyncSessionTracker};

// ============================================================================
// UseCase u001: Route sync
// ============================================================================

static ROUTE_SYNC_EXECUTOR: OnceCell<Arc<RouteSyncExecutor>> = OnceCell::new();

/// Инициализация executor-а синхронизации; повторный вызов игнорируется
pub fn init_route_sync(session_max_age_hours: i64) {
    let tracker = Arc::new(SyncSessionTracker::new());
    let _ = ROUTE_SYNC_EXECUTOR.set(Arc::new(RouteSyncExecutor::new(
        tracker,
        session_max_age_hours,
    )));
}

fn executor() -> &'static RouteSyncExecutor {
    ROUTE_SYNC_EXECUTOR.get_or_init(|| {
        Arc::new(RouteSyncExecutor::new(
            Arc::new(SyncSessionTracker::new()),
            SyncConfig::default().session_max_age_hours,
        ))
    })
}

/// GET /api/u001/routes
pub async fn u001_list_routes() -> Json<Vec<RouteDescriptor>> {
    Json(list_routes().to_vec())
}

/// GET /api/u001/status
pub async fn u001_status() -> CmsResult<Json<SyncStatusReport>> {
    Ok(Json(executor().status(get_connection()).await?))
}

/// POST /api/u001/sessions
pub async fn u001_start_session() -> CmsResult<Json<SyncSession>> {
    match executor().start_session(get_connection()).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            tracing::error!("Failed to start route sync session: {}", e);
            Err(e)
        }
    }
}

/// GET /api/u001/sessions/:session_id
pub async fn u001_get_session(Path(session_id): Path<String>) -> CmsResult<Json<SyncSession>> {
    Ok(Json(executor().get_session(&session_id)?))
}

/// POST /api/u001/sessions/:session_id/sync
pub async fn u001_sync(Path(session_id): Path<String>) -> CmsResult<Json<SyncSession>> {
    match executor().sync(get_connection(), &session_id).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            tracing::error!("Route sync failed: {}", e);
            Err(e)
        }
    }
}

/// POST /api/u001/sessions/:session_id/force-restore
pub async fn u001_force_restore(
    Path(session_id): Path<String>,
    Json(request): Json<ForceRestoreRequest>,
) -> CmsResult<Json<SyncSession>> {
    match executor()
        .force_restore(get_connection(), &session_id, request)
        .await
    {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            tracing::error!("Force restore failed: {}", e);
            Err(e)
        }
    }
}
