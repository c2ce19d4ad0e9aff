use crate::AppState;
use axum::Router;

pub mod users;

/// API v1 routes
pub fn routes() -> Router<AppState> {
    Router::new().nest("/users", users::routes())
}
