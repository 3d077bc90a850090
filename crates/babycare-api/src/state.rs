use std::sync::Arc;

use babycare_db::Database;

use crate::directory::DirectoryOrder;
use crate::fixtures::{DEMO_BABYSITTERS, DemoBabysitter};
use crate::sessions::SessionHub;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub settings: ApiSettings,
    pub sessions: SessionHub,
    pub demo_babysitters: &'static [DemoBabysitter],
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub directory_order: DirectoryOrder,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".into(),
            token_ttl: chrono::Duration::days(30),
            directory_order: DirectoryOrder::default(),
        }
    }
}

impl AppStateInner {
    pub fn new(db: Database, settings: ApiSettings) -> AppState {
        Arc::new(Self {
            db,
            settings,
            sessions: SessionHub::new(),
            demo_babysitters: DEMO_BABYSITTERS,
        })
    }
}
