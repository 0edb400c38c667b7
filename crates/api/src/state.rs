use std::sync::Arc;

use boardroom_github::GitHubClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: boardroom_db::DbPool,
    /// Server configuration (JWT secret, timeouts, CORS origins).
    pub config: Arc<ServerConfig>,
    /// GitHub client for the target repository, constructed once at startup
    /// from validated configuration.
    pub github: Arc<GitHubClient>,
}
