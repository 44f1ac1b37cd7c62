use crate::config::Config;
use crate::view::Dashboard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(config: Config, dashboard: Dashboard) -> Self {
        Self {
            config: Arc::new(config),
            dashboard,
        }
    }
}
