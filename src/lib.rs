pub mod ai;
pub mod api;
pub mod confirm;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod schema;
pub mod similarity;
pub mod store;
pub mod thresholds;
pub mod util;

use std::sync::Arc;

pub type SharedDB = Arc<store::ContactDB>;

/// Run a blocking DB operation on tokio's blocking thread pool.
///
/// All synchronous ContactDB calls in async context MUST go through this
/// to avoid starving tokio worker threads.
pub async fn db_call<F, T>(db: &SharedDB, f: F) -> Result<T, error::CrmError>
where
    F: FnOnce(&store::ContactDB) -> T + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| error::CrmError::Internal(e.to_string()))
}

#[derive(Clone)]
pub struct AppState {
    pub db: SharedDB,
    pub ai: Option<ai::AiConfig>,
    pub api_key: Option<String>,
    pub orchestrator: Arc<confirm::Orchestrator>,
}
