use std::sync::Arc;

use tracing::error;

use newsboard_db::Database;

use crate::error::ApiError;
use crate::views::Views;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub views: Box<dyn Views>,
}

impl AppStateInner {
    pub fn new(db: Database, session_secret: String, views: Box<dyn Views>) -> AppState {
        Arc::new(Self {
            db,
            session_secret,
            views,
        })
    }
}

/// Run a repository call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> newsboard_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map_err(ApiError::from)
}
