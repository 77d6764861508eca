pub mod handoff;
pub mod health;
pub mod project;
pub mod quote;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                        list, create
/// /projects/{id}                                   get (with caller's access)
/// /projects/{project_id}/participants              list, grant (PUT, owner only)
/// /projects/{project_id}/rooms                     list, create
/// /projects/{project_id}/selections                list, create
/// /projects/{project_id}/selections/{id}           update, delete
/// /projects/{project_id}/quotes                    quote chains, newest first
///
/// /quotes                                          create (vendor)
/// /quotes/{id}                                     get
///
/// /handoffs                                        issue (vendor)
/// /handoffs/outbox                                 sent handoffs (vendor)
/// /handoffs/{token}                                validate (public)
/// /handoffs/{token}/claim                          claim (recipient)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/quotes", quote::router())
        .nest("/handoffs", handoff::router())
}
