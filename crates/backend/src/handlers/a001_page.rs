use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_page::aggregate::{Page, PageDto, PageListQuery, PageUpdateDto};

use crate::domain::a001_page::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::CmsResult;

/// GET /api/pages?order=title|type
pub async fn list(Query(query): Query<PageListQuery>) -> CmsResult<Json<Vec<Page>>> {
    let pages = service::list(get_connection(), query.order).await?;
    Ok(Json(pages))
}

/// GET /api/pages/:id
pub async fn get_by_id(Path(id): Path<String>) -> CmsResult<Json<Page>> {
    let id = service::parse_page_id(&id)?;
    Ok(Json(service::get(get_connection(), id).await?))
}

/// GET /api/pages/:id/children
pub async fn children(Path(id): Path<String>) -> CmsResult<Json<Vec<Page>>> {
    let id = service::parse_page_id(&id)?;
    Ok(Json(service::children(get_connection(), id).await?))
}

/// POST /api/pages
pub async fn create(Json(dto): Json<PageDto>) -> CmsResult<(StatusCode, Json<Page>)> {
    let page = service::create(get_connection(), dto).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// PUT /api/pages/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<PageUpdateDto>,
) -> CmsResult<Json<Page>> {
    let id = service::parse_page_id(&id)?;
    Ok(Json(service::update(get_connection(), id, dto).await?))
}

/// POST /api/pages/:id/toggle-visibility
pub async fn toggle_visibility(Path(id): Path<String>) -> CmsResult<Json<Page>> {
    let id = service::parse_page_id(&id)?;
    Ok(Json(service::toggle_visibility(get_connection(), id).await?))
}

/// DELETE /api/pages/:id
pub async fn delete(Path(id): Path<String>) -> CmsResult<StatusCode> {
    let id = service::parse_page_id(&id)?;
    service::delete(get_connection(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
