use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a002_nav_item::aggregate::{
    MoveRequest, NavItem, NavItemDto, NavItemListQuery, NavItemUpdateDto, QuickSetupRequest,
    ReorderRequest,
};

use crate::domain::a002_nav_item::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::CmsResult;

/// GET /api/nav-items?nav_group=header
pub async fn list(Query(query): Query<NavItemListQuery>) -> CmsResult<Json<Vec<NavItem>>> {
    let items = service::list(get_connection(), query.nav_group.as_deref()).await?;
    Ok(Json(items))
}

/// GET /api/nav-items/:id
pub async fn get_by_id(Path(id): Path<String>) -> CmsResult<Json<NavItem>> {
    let id = service::parse_nav_item_id(&id)?;
    Ok(Json(service::get(get_connection(), id).await?))
}

/// POST /api/nav-items
pub async fn create(Json(dto): Json<NavItemDto>) -> CmsResult<(StatusCode, Json<NavItem>)> {
    let item = service::create(get_connection(), dto).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/nav-items/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<NavItemUpdateDto>,
) -> CmsResult<Json<NavItem>> {
    let id = service::parse_nav_item_id(&id)?;
    Ok(Json(service::update(get_connection(), id, dto).await?))
}

/// DELETE /api/nav-items/:id
pub async fn delete(Path(id): Path<String>) -> CmsResult<StatusCode> {
    let id = service::parse_nav_item_id(&id)?;
    service::delete(get_connection(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/nav-items/reorder
pub async fn reorder(Json(request): Json<ReorderRequest>) -> CmsResult<Json<Vec<NavItem>>> {
    Ok(Json(
        service::reorder_within_group(get_connection(), request).await?,
    ))
}

/// POST /api/nav-items/move
pub async fn move_item(Json(request): Json<MoveRequest>) -> CmsResult<Json<Vec<NavItem>>> {
    Ok(Json(
        service::move_between_groups(get_connection(), request).await?,
    ))
}

/// POST /api/nav-items/quick-setup
pub async fn quick_setup(
    Json(request): Json<QuickSetupRequest>,
) -> CmsResult<(StatusCode, Json<Vec<NavItem>>)> {
    let created = service::quick_setup(get_connection(), request).await?;
    tracing::info!("Quick setup created {} navigation item(s)", created.len());
    Ok((StatusCode::CREATED, Json(created)))
}
