use std::sync::Arc;

use advert_db::Database;

use crate::config::ApiConfig;
use crate::workflow::Workflow;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppStateInner {
    pub fn new(db: Database, config: ApiConfig) -> AppState {
        Arc::new(Self { db, config })
    }

    pub fn workflow(&self) -> Workflow<'_> {
        Workflow::new(&self.db, &self.config)
    }
}
