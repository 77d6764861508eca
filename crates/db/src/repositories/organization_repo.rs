//! Repository for `organizations` and `organization_members`.

use handoff_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization, OrganizationMember};

const COLUMNS: &str = "id, name, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, organization_id, user_id, is_active, created_at, updated_at";

/// Provides organization and membership operations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!("INSERT INTO organizations (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add (or re-activate) a member. Idempotent.
    pub async fn add_member(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<OrganizationMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO organization_members (organization_id, user_id, is_active)
             VALUES ($1, $2, true)
             ON CONFLICT (organization_id, user_id) DO UPDATE SET is_active = true
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, OrganizationMember>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Mark a membership inactive. Returns `true` if a row changed.
    pub async fn deactivate_member(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE organization_members SET is_active = false
             WHERE organization_id = $1 AND user_id = $2 AND is_active",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of the organizations the user is an active member of, oldest
    /// membership first.
    pub async fn active_org_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT organization_id FROM organization_members
             WHERE user_id = $1 AND is_active
             ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
