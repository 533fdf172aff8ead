//! Shared application state handed to every handler.

use mercado_db::Database;

/// Shared application state.
///
/// Cloning is cheap: the database handle wraps a pooled connection set.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    /// Creates the state around an initialized database.
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
