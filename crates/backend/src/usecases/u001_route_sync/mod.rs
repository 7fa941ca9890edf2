pub mod executor;
pub mod reconcile;
pub mod session_tracker;

pub use executor::RouteSyncExecutor;
pub use session_tracker::SyncSessionTracker;
