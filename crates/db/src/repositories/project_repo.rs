//! Repository for the `projects` table.

use handoff_core::handoff::ProjectKind;
use handoff_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::project::Project;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, kind, owner_id, designer_id, design_org_id, \
    handoff_invited_at, handoff_claimed_at, created_at, updated_at";

/// Provides project persistence. Access decisions are made by the caller.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project owned and designed by `owner_id`.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: DbId,
        title: &str,
        kind: ProjectKind,
        design_org_id: Option<DbId>,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, kind, owner_id, designer_id, design_org_id)
             VALUES ($1, $2, $3, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(title)
            .bind(kind.as_str())
            .bind(owner_id)
            .bind(design_org_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Projects the user reaches directly, through a user grant, or through
    /// a grant to one of `org_ids`. Newest first.
    pub async fn list_accessible(
        pool: &PgPool,
        user_id: DbId,
        org_ids: &[DbId],
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             WHERE p.owner_id = $1
                OR p.designer_id = $1
                OR EXISTS (
                    SELECT 1 FROM project_participants pp
                    WHERE pp.project_id = p.id
                      AND (pp.user_id = $1 OR pp.organization_id = ANY($2))
                )
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(org_ids)
            .fetch_all(pool)
            .await
    }

    /// Record that a handoff was issued from this project.
    pub async fn stamp_handoff_invited(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET handoff_invited_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that a handoff issued from this project was claimed.
    pub async fn stamp_handoff_claimed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET handoff_claimed_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
