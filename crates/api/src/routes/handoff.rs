//! Route definitions for the `/handoffs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::handoff;
use crate::state::AppState;

/// Routes mounted at `/handoffs`.
///
/// `/outbox` is registered as a static segment, so it takes precedence over
/// `/{token}`.
///
/// ```text
/// POST   /                  -> issue
/// GET    /outbox            -> outbox
/// GET    /{token}           -> validate
/// POST   /{token}/claim     -> claim
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handoff::issue))
        .route("/outbox", get(handoff::outbox))
        .route("/{token}", get(handoff::validate))
        .route("/{token}/claim", post(handoff::claim))
}
