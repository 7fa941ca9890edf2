use axum::{extract::Path, Json};
use contracts::domain::a002_nav_item::aggregate::MenuEntry;

use crate::domain::a002_nav_item::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::CmsResult;

/// GET /api/site/menu/:group
///
/// Public endpoint used by the site header and footer.
pub async fn menu(Path(group): Path<String>) -> CmsResult<Json<Vec<MenuEntry>>> {
    Ok(Json(service::render_menu(get_connection(), &group).await?))
}
