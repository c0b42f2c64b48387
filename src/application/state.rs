use sea_orm::DatabaseConnection;

use crate::services::activity::ActivityService;
use crate::services::notify::NotifyService;

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub activity: ActivityService,
    pub notify: NotifyService,
}

impl AppState {
    pub fn new(db: DbConn, activity: ActivityService, notify: NotifyService) -> Self {
        Self {
            db,
            activity,
            notify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;

    #[tokio::test]
    async fn test_app_state_clone_shares_services() {
        let db = create_test_db().await;
        let activity = ActivityService::new();
        activity.set_db(db.clone()).await;

        let state = AppState::new(db, activity, NotifyService::new());
        let cloned = state.clone();

        // Clones must observe the same activity sink
        assert!(cloned.activity.is_ready().await);
    }
}
