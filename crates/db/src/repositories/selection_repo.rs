//! Repository for the `selections` table.

use handoff_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::selection::{Attribution, CreateSelection, Selection, UpdateSelection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, room_id, product_name, description, vendor_name, finish, \
    quantity, note, photo_url, vendor_rep_id, vendor_org_id, source_visit_id, created_at, updated_at";

/// Fields of a selection materialized from a handoff package item.
#[derive(Debug, Clone)]
pub struct MaterializedSelection {
    pub product_name: String,
    pub description: Option<String>,
    pub vendor_name: Option<String>,
    pub finish: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
    pub photo_url: Option<String>,
}

/// Provides CRUD operations for selections.
pub struct SelectionRepo;

impl SelectionRepo {
    /// Insert a hand-made selection.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateSelection,
        attribution: Attribution,
    ) -> Result<Selection, sqlx::Error> {
        let query = format!(
            "INSERT INTO selections
                (project_id, room_id, product_name, description, vendor_name, finish,
                 quantity, note, photo_url, vendor_rep_id, vendor_org_id)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 1), $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(project_id)
            .bind(input.room_id)
            .bind(&input.product_name)
            .bind(&input.description)
            .bind(&input.vendor_name)
            .bind(&input.finish)
            .bind(input.quantity)
            .bind(&input.note)
            .bind(&input.photo_url)
            .bind(attribution.vendor_rep_id)
            .bind(attribution.vendor_org_id)
            .fetch_one(pool)
            .await
    }

    /// Insert one selection produced by claiming a handoff.
    pub async fn insert_materialized<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        visit_id: DbId,
        item: &MaterializedSelection,
        attribution: Attribution,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO selections
                (project_id, product_name, description, vendor_name, finish, quantity,
                 note, photo_url, vendor_rep_id, vendor_org_id, source_visit_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(project_id)
        .bind(&item.product_name)
        .bind(&item.description)
        .bind(&item.vendor_name)
        .bind(&item.finish)
        .bind(item.quantity)
        .bind(&item.note)
        .bind(&item.photo_url)
        .bind(attribution.vendor_rep_id)
        .bind(attribution.vendor_org_id)
        .bind(visit_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// List a project's selections, oldest first.
    ///
    /// With `vendor_scope = Some(orgs)` only rows attributed to one of
    /// `orgs` are returned.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        vendor_scope: Option<&[DbId]>,
    ) -> Result<Vec<Selection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM selections
             WHERE project_id = $1
               AND ($2::BIGINT[] IS NULL OR vendor_org_id = ANY($2))
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(project_id)
            .bind(vendor_scope)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM selections WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Selection>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a selection. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the project.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateSelection,
    ) -> Result<Option<Selection>, sqlx::Error> {
        let query = format!(
            "UPDATE selections SET
                room_id = COALESCE($3, room_id),
                product_name = COALESCE($4, product_name),
                description = COALESCE($5, description),
                finish = COALESCE($6, finish),
                quantity = COALESCE($7, quantity),
                note = COALESCE($8, note),
                photo_url = COALESCE($9, photo_url)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Selection>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.room_id)
            .bind(&input.product_name)
            .bind(&input.description)
            .bind(&input.finish)
            .bind(input.quantity)
            .bind(&input.note)
            .bind(&input.photo_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a selection. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM selections WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM selections WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
