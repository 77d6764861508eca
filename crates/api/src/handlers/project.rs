//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use handoff_core::access::AccessSummary;
use handoff_core::error::CoreError;
use handoff_core::handoff::ProjectKind;
use handoff_core::types::DbId;
use handoff_db::models::project::{CreateProject, Project};
use handoff_db::repositories::{OrganizationRepo, ProjectRepo};
use handoff_events::bus::PROJECT_CREATED;
use handoff_events::PlatformEvent;
use serde::Serialize;
use validator::Validate;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A project together with how the caller reaches it.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub access: AccessSummary,
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    input.validate()?;

    if let Some(org_id) = input.design_org_id {
        let orgs = OrganizationRepo::active_org_ids(&state.pool, user.user_id).await?;
        if !orgs.contains(&org_id) {
            return Err(CoreError::Forbidden(
                "You are not an active member of that organization".into(),
            )
            .into());
        }
    }

    let project = ProjectRepo::create(
        &state.pool,
        user.user_id,
        input.title.trim(),
        ProjectKind::Project,
        input.design_org_id,
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(PROJECT_CREATED)
            .with_source("project", project.id)
            .with_actor(user.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let orgs = OrganizationRepo::active_org_ids(&state.pool, user.user_id).await?;
    let projects = ProjectRepo::list_accessible(&state.pool, user.user_id, &orgs).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let (project, access) = access::assert_view(&state.pool, user.user_id, id).await?;
    Ok(Json(DataResponse {
        data: ProjectDetail {
            project,
            access: access.summary(),
        },
    }))
}
