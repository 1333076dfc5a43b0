use std::sync::Arc;

use consulta_mailer::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is internally reference-counted and the rest
/// is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: consulta_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Transactional email sender (possibly in disabled mode).
    pub mailer: Arc<Mailer>,
}
