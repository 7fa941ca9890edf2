use serde::{Deserialize, Serialize};

/// Состояние синхронизации одного маршрута
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSyncRow {
    pub path: String,
    pub page_name: String,
    pub is_dynamic: bool,
    /// Slug, который должна иметь страница маршрута
    pub slug: String,
    pub page_id: Option<String>,
    pub synced: bool,
}

/// Пункт навигации, ссылающийся на удалённую страницу ("Not synced")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedNavItem {
    pub id: String,
    pub label: String,
    pub nav_group: String,
    pub linked_page_id: String,
}

/// Отчёт о расхождениях между маршрутами, страницами и навигацией
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatusReport {
    pub total_routes: usize,
    pub synced_routes: usize,
    pub routes: Vec<RouteSyncRow>,
    pub orphaned_nav_items: Vec<OrphanedNavItem>,
    pub nav_items_total: usize,
    /// Страницы есть, а навигация ещё не настроена
    pub navigation_setup_pending: bool,
}

impl SyncStatusReport {
    pub fn is_fully_synced(&self) -> bool {
        self.synced_routes == self.total_routes
    }
}
