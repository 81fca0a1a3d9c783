pub mod auth;
pub mod campaigns;
pub mod error;
pub mod extract;
pub mod lifecycle;
pub mod middleware;
pub mod payments;
pub mod registrations;
pub mod reminders;
pub mod router;
pub mod uploads;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use traahi_db::{Database, DbResult};
use traahi_providers::payment::PaymentProvider;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

/// Process-wide collaborators, built once at startup and shared by every handler.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub payments: Arc<dyn PaymentProvider>,
    pub upload_dir: PathBuf,
    /// Base URL for returned upload links. Falls back to the request's Host header.
    pub public_url: Option<String>,
}

/// Run a blocking DB closure off the async runtime.
pub(crate) async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map_err(ApiError::from)
}
