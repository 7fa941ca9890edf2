pub mod progress;
pub mod request;
pub mod response;

pub use progress::{SyncErrorEntry, SyncOutcome, SyncPhase, SyncSession};
pub use request::ForceRestoreRequest;
pub use response::{OrphanedNavItem, RouteSyncRow, SyncStatusReport};

use crate::usecases::common::UseCaseMetadata;

pub struct RouteSync;

impl UseCaseMetadata for RouteSync {
    fn usecase_index() -> &'static str {
        "u001"
    }

    fn usecase_name() -> &'static str {
        "route_sync"
    }

    fn display_name() -> &'static str {
        "Синхронизация маршрутов"
    }

    fn description() -> &'static str {
        "Сверка скомпилированного списка маршрутов с реестром страниц и восстановление недостающих страниц"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(RouteSync::full_name(), "u001_route_sync");
    }
}
