use contracts::usecases::u001_route_sync::{SyncErrorEntry, SyncOutcome, SyncPhase, SyncSession};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Сессии синхронизации маршрутов (in-memory, живут до очистки по возрасту)
#[derive(Clone)]
pub struct SyncSessionTracker {
    sessions: Arc<RwLock<HashMap<String, SyncSession>>>,
}

impl SyncSessionTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Создать новую сессию в состоянии Idle
    pub fn create_session(&self, session_id: String) -> SyncSession {
        let session = SyncSession::new(session_id.clone());
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session_id, session.clone());
        session
    }

    pub fn get_session(&self, session_id: &str) -> Option<SyncSession> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.get(session_id).cloned()
    }

    /// Перевести сессию в новое состояние
    pub fn transition(&self, session_id: &str, phase: SyncPhase) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(session_id) {
            tracing::debug!(
                "Sync session {}: {:?} -> {:?}",
                session_id,
                session.phase,
                phase
            );
            session.transition(phase);
        }
    }

    /// Начало нового прохода: ошибки прошлого прохода сбрасываются
    pub fn begin_pass(&self, session_id: &str, phase: SyncPhase) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(session_id) {
            session.error_list.clear();
            session.transition(phase);
        }
    }

    pub fn set_outcome(&self, session_id: &str, outcome: SyncOutcome) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_outcome = Some(outcome);
        }
    }

    /// Добавить ошибку
    pub fn add_error(&self, session_id: &str, path: Option<String>, message: String) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(session_id) {
            session.error_list.push(SyncErrorEntry { path, message });
        }
    }

    /// Удалить сессии, не менявшиеся дольше `max_age_hours`
    pub fn cleanup_old_sessions(&self, max_age_hours: i64) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let now = chrono::Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| (now - session.updated_at).num_hours() < max_age_hours);
        before - sessions.len()
    }
}

impl Default for SyncSessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_resets_errors() {
        let tracker = SyncSessionTracker::new();
        tracker.create_session("s1".into());
        tracker.add_error("s1", Some("/about".into()), "boom".into());
        assert_eq!(tracker.get_session("s1").unwrap().error_list.len(), 1);

        tracker.begin_pass("s1", SyncPhase::Syncing);
        let session = tracker.get_session("s1").unwrap();
        assert!(session.error_list.is_empty());
        assert_eq!(session.phase, SyncPhase::Syncing);
    }

    #[test]
    fn test_cleanup_removes_stale_sessions() {
        let tracker = SyncSessionTracker::new();
        tracker.create_session("fresh".into());
        tracker.create_session("stale".into());
        {
            let mut sessions = tracker.sessions.write().unwrap();
            let stale = sessions.get_mut("stale").unwrap();
            stale.updated_at = chrono::Utc::now() - chrono::Duration::hours(48);
        }

        assert_eq!(tracker.cleanup_old_sessions(24), 1);
        assert!(tracker.get_session("fresh").is_some());
        assert!(tracker.get_session("stale").is_none());
    }

    #[test]
    fn test_unknown_session_is_ignored() {
        let tracker = SyncSessionTracker::new();
        tracker.transition("missing", SyncPhase::Synced);
        assert!(tracker.get_session("missing").is_none());
    }
}
