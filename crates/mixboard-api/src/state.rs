use std::sync::Arc;

use tracing::error;

use mixboard_db::Database;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::identity::TokenKeys;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenKeys,
}

impl AppStateInner {
    pub fn new(db: Database, auth: &AuthConfig) -> AppState {
        Arc::new(Self {
            db,
            tokens: TokenKeys::new(auth),
        })
    }
}

/// Run blocking store work (and anything CPU-heavy next to it, like password
/// hashing) off the async runtime. The work logs to the caller's subscriber.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    tokio::task::spawn_blocking(move || tracing::dispatcher::with_default(&dispatch, || f(&state.db)))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal(e)
        })?
}
