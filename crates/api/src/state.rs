use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pipecheck_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Criticality classifier. The mutex serializes training and
    /// prediction so concurrent imports cannot interleave encoder
    /// refits with weight updates.
    pub classifier: Arc<Mutex<pipecheck_ml::Classifier>>,
}
