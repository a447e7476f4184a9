//! Application state shared across all handlers

use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Router state. Cloning shares the same connection pool.
#[derive(Clone)]
pub struct AppState {
    db: Arc<DatabaseConnection>,
}

impl AppState {
    /// Wraps an open connection for sharing between handlers and background tasks.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// The database connection
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// A shared handle for work that outlives a request.
    #[must_use]
    pub fn shared_db(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.db)
    }

    /// Gives the connection back once every other handle has been dropped.
    ///
    /// Returns the state unchanged while handles are still alive.
    pub fn into_db(self) -> Result<DatabaseConnection, Self> {
        Arc::try_unwrap(self.db).map_err(|db| Self { db })
    }
}
