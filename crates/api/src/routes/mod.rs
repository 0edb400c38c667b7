//! Route registration.
//!
//! | Method | Path                        | Auth       | Handler                            |
//! |--------|-----------------------------|------------|------------------------------------|
//! | GET    | `/health`                   | none       | [`health::health_check`]           |
//! | POST   | `/api/v1/auth/login`        | none       | [`crate::handlers::auth::login`]   |
//! | POST   | `/api/v1/ideas`             | any user   | [`crate::handlers::idea::propose`] |
//! | GET    | `/api/v1/ideas`             | any user   | [`crate::handlers::idea::list`]    |
//! | POST   | `/api/v1/ideas/{id}/approve`| admin      | [`crate::handlers::idea::approve`] |
//! | POST   | `/api/v1/ideas/{id}/execute`| any user   | [`crate::handlers::idea::execute`] |

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod idea;

/// Build the `/api/v1` router. Mounted under `/api/v1` by the binary.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/ideas", idea::routes())
}
