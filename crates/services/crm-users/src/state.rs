//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::Database;
use crate::repository::{MemoryUserStore, UserStore};
use crate::service::{UserManager, UserService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    /// `None` when running on the in-memory store
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create new app state.
    pub fn new(user_service: Arc<dyn UserService>, database: Option<Arc<Database>>) -> Self {
        Self {
            user_service,
            database,
        }
    }

    /// Wire the service to the SeaORM store.
    pub fn from_database(database: Arc<Database>) -> Self {
        let repo = Arc::new(UserStore::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(repo));
        Self::new(user_service, Some(database))
    }

    /// Wire the service to a fresh in-memory store.
    pub fn in_memory() -> Self {
        let repo = Arc::new(MemoryUserStore::new());
        let user_service = Arc::new(UserManager::new(repo));
        Self::new(user_service, None)
    }
}
