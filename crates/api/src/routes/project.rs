//! Route definitions for the `/projects` resource and everything scoped
//! under a single project.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{participant, project, quote, room, selection};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /{id}                               -> get_by_id
///
/// GET    /{project_id}/participants          -> list
/// PUT    /{project_id}/participants          -> grant
///
/// GET    /{project_id}/rooms                 -> list
/// POST   /{project_id}/rooms                 -> create
///
/// GET    /{project_id}/selections            -> list
/// POST   /{project_id}/selections            -> create
/// PUT    /{project_id}/selections/{id}       -> update
/// DELETE /{project_id}/selections/{id}       -> delete
///
/// GET    /{project_id}/quotes                -> list_chains
/// ```
pub fn router() -> Router<AppState> {
    let participant_routes =
        Router::new().route("/", get(participant::list).put(participant::grant));

    let room_routes = Router::new().route("/", get(room::list).post(room::create));

    let selection_routes = Router::new()
        .route("/", get(selection::list).post(selection::create))
        .route("/{id}", put(selection::update).delete(selection::delete));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id))
        .nest("/{project_id}/participants", participant_routes)
        .nest("/{project_id}/rooms", room_routes)
        .nest("/{project_id}/selections", selection_routes)
        .route("/{project_id}/quotes", get(quote::list_chains))
}
