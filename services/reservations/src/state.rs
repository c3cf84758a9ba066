use crate::domain::types::SeedStaff;
use crate::infra::Store;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub seed_staff: SeedStaff,
}

impl AppState {
    pub fn user_repo(&self) -> Store {
        self.store.clone()
    }

    pub fn schedule_repo(&self) -> Store {
        self.store.clone()
    }

    pub fn schedule_query(&self) -> Store {
        self.store.clone()
    }

    pub fn capacity_store(&self) -> Store {
        self.store.clone()
    }

    pub fn maintenance_repo(&self) -> Store {
        self.store.clone()
    }
}
