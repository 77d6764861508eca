//! The single access-check surface for handlers.
//!
//! Loads the project, the caller's active organizations, and the project's
//! participant grants, then defers to [`handoff_core::access`] for the
//! decision. Handlers never compare ownership columns themselves.

use handoff_core::access::{require_view, resolve_access, ParticipantGrant, ProjectAccess};
use handoff_core::error::CoreError;
use handoff_core::types::DbId;
use handoff_db::models::project::Project;
use handoff_db::repositories::{OrganizationRepo, ParticipantRepo, ProjectRepo};
use handoff_db::DbPool;

use crate::error::AppResult;

/// Load a project or fail with `NotFound`.
pub async fn load_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }
            .into()
        })
}

/// Resolve the caller's access to an already-loaded project.
pub async fn resolve(
    pool: &DbPool,
    caller_id: DbId,
    project: &Project,
) -> AppResult<Option<ProjectAccess>> {
    let org_ids = OrganizationRepo::active_org_ids(pool, caller_id).await?;
    let grants = ParticipantRepo::list_by_project(pool, project.id)
        .await?
        .iter()
        .map(|p| p.to_grant())
        .collect::<Result<Vec<ParticipantGrant>, CoreError>>()?;

    Ok(resolve_access(
        project.id,
        caller_id,
        project.ownership(),
        &grants,
        org_ids,
    ))
}

/// Fail with `Forbidden` unless the caller can view the project.
pub async fn assert_view(
    pool: &DbPool,
    caller_id: DbId,
    project_id: DbId,
) -> AppResult<(Project, ProjectAccess)> {
    let project = load_project(pool, project_id).await?;
    let access = require_view(resolve(pool, caller_id, &project).await?)?;
    Ok((project, access))
}

/// Fail with `Forbidden` unless the caller is an OWNER or EDITOR.
pub async fn assert_edit(
    pool: &DbPool,
    caller_id: DbId,
    project_id: DbId,
) -> AppResult<(Project, ProjectAccess)> {
    let (project, access) = assert_view(pool, caller_id, project_id).await?;
    Ok((project, access.require_edit()?))
}

/// Fail with `Forbidden` unless the caller is an OWNER.
pub async fn assert_owner(
    pool: &DbPool,
    caller_id: DbId,
    project_id: DbId,
) -> AppResult<(Project, ProjectAccess)> {
    let (project, access) = assert_view(pool, caller_id, project_id).await?;
    Ok((project, access.require_owner()?))
}
