use serde::{Deserialize, Serialize};

/// Состояние сессии синхронизации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    Idle,
    Bootstrapping,
    BootstrapFailed,
    Syncing,
    Synced,
    SyncFailed,
    ForceSyncing,
    ForceSyncFailed,
    /// Страницы синхронизированы, но пунктов навигации ещё нет (только подсказка)
    NavigationSetupPending,
}

impl SyncPhase {
    pub fn can_sync(&self) -> bool {
        matches!(
            self,
            SyncPhase::Idle
                | SyncPhase::BootstrapFailed
                | SyncPhase::Synced
                | SyncPhase::SyncFailed
                | SyncPhase::NavigationSetupPending
        )
    }

    /// ForceSyncFailed завершает сессию: дальше только ручное вмешательство
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::ForceSyncFailed)
    }

    /// Показывать ли оператору аварийные инструменты
    pub fn shows_emergency_tools(&self) -> bool {
        matches!(
            self,
            SyncPhase::BootstrapFailed | SyncPhase::SyncFailed | SyncPhase::ForceSyncFailed
        )
    }
}

/// Итог последнего прохода синхронизации
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Всего маршрутов в инвентаре
    pub total_routes: usize,
    /// Маршрутов, для которых после прохода есть страница
    pub matched: usize,
    /// Создано страниц
    pub created: usize,
    /// Перезаписано страниц (только принудительное восстановление)
    pub restored: usize,
    /// Маршрутов, обработка которых завершилась ошибкой
    pub failed: usize,
}

/// Информация об ошибке синхронизации
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncErrorEntry {
    /// Маршрут, при обработке которого произошла ошибка
    pub path: Option<String>,
    pub message: String,
}

/// Сессия синхронизации маршрутов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSession {
    pub session_id: String,
    pub phase: SyncPhase,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub last_outcome: Option<SyncOutcome>,
    #[serde(default)]
    pub error_list: Vec<SyncErrorEntry>,
}

impl SyncSession {
    pub fn new(session_id: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            session_id,
            phase: SyncPhase::Idle,
            started_at: now,
            updated_at: now,
            last_outcome: None,
            error_list: Vec::new(),
        }
    }

    /// Принудительное восстановление доступно после неудачной синхронизации
    /// или после синхронизации, не нашедшей ни одного совпадения
    pub fn can_force_restore(&self) -> bool {
        match self.phase {
            SyncPhase::SyncFailed => true,
            SyncPhase::Synced | SyncPhase::NavigationSetupPending => self
                .last_outcome
                .as_ref()
                .map(|o| o.matched == 0)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn transition(&mut self, phase: SyncPhase) {
        self.phase = phase;
        self.updated_at = chrono::Utc::now();
    }
}
