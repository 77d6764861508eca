//! Repository for the `project_participants` table.

use handoff_core::access::{Grantee, Role, Side};
use handoff_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::participant::ProjectParticipant;

const COLUMNS: &str =
    "id, project_id, organization_id, user_id, side, role, created_at, updated_at";

/// Provides participant grant operations.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// All grants on a project, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_participants
             WHERE project_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ProjectParticipant>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Grant access, or update role/side in place if the grantee already
    /// has a row on this project. Never creates duplicates.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        grantee: Grantee,
        side: Side,
        role: Role,
    ) -> Result<ProjectParticipant, sqlx::Error> {
        let conflict_target = match grantee {
            Grantee::User(_) => "(project_id, user_id) WHERE user_id IS NOT NULL",
            Grantee::Org(_) => "(project_id, organization_id) WHERE organization_id IS NOT NULL",
        };
        let query = format!(
            "INSERT INTO project_participants (project_id, organization_id, user_id, side, role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT {conflict_target}
             DO UPDATE SET side = EXCLUDED.side, role = EXCLUDED.role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectParticipant>(&query)
            .bind(project_id)
            .bind(grantee.organization_id())
            .bind(grantee.user_id())
            .bind(side.as_str())
            .bind(role.as_str())
            .fetch_one(executor)
            .await
    }
}
