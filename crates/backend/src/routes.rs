use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::shared::realtime::websocket;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        .route(
            "/api/system/auth/refresh",
            post(system::handlers::auth::refresh),
        )
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        // System auth routes (protected)
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // ========================================
        // PUBLIC SITE ROUTES
        // ========================================
        .route(
            "/api/site/menu/:group",
            get(handlers::site_navigation::menu),
        )
        // ========================================
        // ADMIN ROUTES
        // ========================================
        .merge(admin_routes())
}

fn admin_routes() -> Router {
    Router::new()
        // A001 Page registry
        .route(
            "/api/pages",
            get(handlers::a001_page::list).post(handlers::a001_page::create),
        )
        .route(
            "/api/pages/:id",
            get(handlers::a001_page::get_by_id)
                .put(handlers::a001_page::update)
                .delete(handlers::a001_page::delete),
        )
        .route(
            "/api/pages/:id/children",
            get(handlers::a001_page::children),
        )
        .route(
            "/api/pages/:id/toggle-visibility",
            post(handlers::a001_page::toggle_visibility),
        )
        // A002 Navigation items
        .route(
            "/api/nav-items",
            get(handlers::a002_nav_item::list).post(handlers::a002_nav_item::create),
        )
        .route(
            "/api/nav-items/reorder",
            post(handlers::a002_nav_item::reorder),
        )
        .route(
            "/api/nav-items/move",
            post(handlers::a002_nav_item::move_item),
        )
        .route(
            "/api/nav-items/quick-setup",
            post(handlers::a002_nav_item::quick_setup),
        )
        .route(
            "/api/nav-items/:id",
            get(handlers::a002_nav_item::get_by_id)
                .put(handlers::a002_nav_item::update)
                .delete(handlers::a002_nav_item::delete),
        )
        // UseCase u001: Route sync
        .route("/api/u001/routes", get(handlers::usecases::u001_list_routes))
        .route("/api/u001/status", get(handlers::usecases::u001_status))
        .route(
            "/api/u001/sessions",
            post(handlers::usecases::u001_start_session),
        )
        .route(
            "/api/u001/sessions/:session_id",
            get(handlers::usecases::u001_get_session),
        )
        .route(
            "/api/u001/sessions/:session_id/sync",
            post(handlers::usecases::u001_sync),
        )
        .route(
            "/api/u001/sessions/:session_id/force-restore",
            post(handlers::usecases::u001_force_restore),
        )
        // Realtime change feed
        .route("/api/realtime", get(websocket::ws_handler))
        .route_layer(middleware::from_fn(system::auth::middleware::require_admin))
}
