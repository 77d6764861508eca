//! Route definitions for the `/quotes` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quote;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(quote::create))
        .route("/{id}", get(quote::get_by_id))
}
