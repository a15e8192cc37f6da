use crate::api::BackendClient;
use crate::dashboard::Dashboard;
use chrono::NaiveDate;

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(backend: BackendClient, today: NaiveDate) -> Self {
        Self {
            dashboard: Dashboard::new(backend.clone(), today),
            backend,
        }
    }
}
