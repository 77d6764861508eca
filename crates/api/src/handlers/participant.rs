//! Handlers for `/projects/{id}/participants`.

use axum::extract::{Path, State};
use axum::Json;
use handoff_core::access::Grantee;
use handoff_core::error::CoreError;
use handoff_core::types::DbId;
use handoff_db::models::participant::{GrantParticipant, ProjectParticipant};
use handoff_db::repositories::{OrganizationRepo, ParticipantRepo, UserRepo};
use handoff_events::bus::PARTICIPANT_GRANTED;
use handoff_events::PlatformEvent;
use serde_json::json;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/participants
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectParticipant>>>> {
    access::assert_view(&state.pool, user.user_id, project_id).await?;
    let participants = ParticipantRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// PUT /api/v1/projects/{id}/participants
///
/// Grants access, or updates role and side in place for an existing
/// grantee. Only owners may share a project.
pub async fn grant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<GrantParticipant>,
) -> AppResult<Json<DataResponse<ProjectParticipant>>> {
    access::assert_owner(&state.pool, user.user_id, project_id).await?;

    let exists = match input.grantee {
        Grantee::User(id) => UserRepo::find_by_id(&state.pool, id).await?.is_some(),
        Grantee::Org(id) => OrganizationRepo::find_by_id(&state.pool, id).await?.is_some(),
    };
    if !exists {
        let (entity, id) = match input.grantee {
            Grantee::User(id) => ("User", id),
            Grantee::Org(id) => ("Organization", id),
        };
        return Err(CoreError::NotFound { entity, id }.into());
    }

    let participant =
        ParticipantRepo::upsert(&state.pool, project_id, input.grantee, input.side, input.role)
            .await?;

    state.event_bus.publish(
        PlatformEvent::new(PARTICIPANT_GRANTED)
            .with_source("project", project_id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "participant_id": participant.id,
                "role": input.role,
                "side": input.side,
            })),
    );

    Ok(Json(DataResponse { data: participant }))
}
