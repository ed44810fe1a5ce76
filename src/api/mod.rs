/// API routes and handlers
pub mod auth;
pub mod contacts;
pub mod user;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(contacts::routes())
        .merge(user::routes())
}
