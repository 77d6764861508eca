//! Repository for the `quote_attachments` table.

use handoff_core::error::CoreError;
use handoff_core::quote::{next_version, QuoteStatus};
use handoff_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::RepoError;
use crate::models::quote::{CreateQuote, QuoteAttachment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, vendor_org_id, created_by, project_id, room_id, selection_id, \
    file_url, file_name, total_cents, currency, lead_time_days, terms, version, supersedes_id, \
    status, expires_at, line_items, created_at, updated_at";

/// Unique index that forbids two quotes superseding the same quote.
const SUPERSEDES_UNIQUE: &str = "uq_quote_attachments_supersedes_id";

/// Provides quote creation, supersession, and chain queries.
pub struct QuoteRepo;

impl QuoteRepo {
    /// Create a quote for `vendor_org_id`.
    ///
    /// With `supersedes_id`, the superseded quote is locked, must belong to
    /// the same organization and must not already have a successor. The new
    /// quote gets `version = superseded.version + 1` and inherits the
    /// superseded quote's project when none is given. A quote travelling
    /// with a pending handoff cannot be superseded until that handoff is
    /// claimed or expires.
    pub async fn create(
        pool: &PgPool,
        vendor_org_id: DbId,
        created_by: DbId,
        input: &CreateQuote,
    ) -> Result<QuoteAttachment, RepoError> {
        let mut tx = pool.begin().await?;

        let (version, project_id) = match input.supersedes_id {
            None => (next_version(None), input.project_id),
            Some(prev_id) => {
                let query =
                    format!("SELECT {COLUMNS} FROM quote_attachments WHERE id = $1 FOR UPDATE");
                let prev = sqlx::query_as::<_, QuoteAttachment>(&query)
                    .bind(prev_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "QuoteAttachment",
                        id: prev_id,
                    })?;

                if prev.vendor_org_id != vendor_org_id {
                    return Err(CoreError::Forbidden(
                        "Only the issuing organization may supersede this quote".into(),
                    )
                    .into());
                }

                let successor: Option<(DbId,)> =
                    sqlx::query_as("SELECT id FROM quote_attachments WHERE supersedes_id = $1")
                        .bind(prev_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if let Some((successor_id,)) = successor {
                    return Err(CoreError::Conflict(format!(
                        "Quote {prev_id} is already superseded by quote {successor_id}"
                    ))
                    .into());
                }

                if let Some(visit_id) = Self::pending_handoff_visit(&mut *tx, prev_id).await? {
                    return Err(CoreError::Conflict(format!(
                        "Quote {prev_id} travels with pending handoff {visit_id}"
                    ))
                    .into());
                }

                if let (Some(given), Some(existing)) = (input.project_id, prev.project_id) {
                    if given != existing {
                        return Err(CoreError::Validation(
                            "A superseding quote must stay in the same project".into(),
                        )
                        .into());
                    }
                }

                (next_version(Some(prev.version)), input.project_id.or(prev.project_id))
            }
        };

        let query = format!(
            "INSERT INTO quote_attachments
                (vendor_org_id, created_by, project_id, room_id, selection_id, file_url, file_name,
                 total_cents, currency, lead_time_days, terms, version, supersedes_id, status,
                 expires_at, line_items)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     COALESCE($16, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, QuoteAttachment>(&query)
            .bind(vendor_org_id)
            .bind(created_by)
            .bind(project_id)
            .bind(input.room_id)
            .bind(input.selection_id)
            .bind(&input.file_url)
            .bind(&input.file_name)
            .bind(input.total_cents)
            .bind(&input.currency)
            .bind(input.lead_time_days)
            .bind(&input.terms)
            .bind(version)
            .bind(input.supersedes_id)
            .bind(QuoteStatus::Draft.as_str())
            .bind(input.expires_at)
            .bind(&input.line_items)
            .fetch_one(&mut *tx)
            .await;

        let quote = match inserted {
            Ok(quote) => quote,
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(SUPERSEDES_UNIQUE) =>
            {
                return Err(CoreError::Conflict(
                    "This quote was superseded by a concurrent request".into(),
                )
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(quote)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QuoteAttachment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quote_attachments WHERE id = $1");
        sqlx::query_as::<_, QuoteAttachment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every quote in the project plus all of their ancestors.
    ///
    /// Ancestors may predate the project (a chain started on a pending
    /// handoff), so they are pulled in through `supersedes_id` regardless of
    /// their own `project_id`. With `vendor_scope`, only chains issued by one
    /// of those organizations are returned.
    pub async fn list_chain_members_for_project(
        pool: &PgPool,
        project_id: DbId,
        vendor_scope: Option<&[DbId]>,
    ) -> Result<Vec<QuoteAttachment>, sqlx::Error> {
        let query = format!(
            "WITH RECURSIVE chain AS (
                SELECT {COLUMNS} FROM quote_attachments
                WHERE project_id = $1
                  AND ($2::BIGINT[] IS NULL OR vendor_org_id = ANY($2))
                UNION
                SELECT q.id, q.vendor_org_id, q.created_by, q.project_id, q.room_id, q.selection_id,
                       q.file_url, q.file_name, q.total_cents, q.currency, q.lead_time_days, q.terms,
                       q.version, q.supersedes_id, q.status, q.expires_at, q.line_items,
                       q.created_at, q.updated_at
                FROM quote_attachments q
                JOIN chain c ON q.id = c.supersedes_id
             )
             SELECT {COLUMNS} FROM chain"
        );
        sqlx::query_as::<_, QuoteAttachment>(&query)
            .bind(project_id)
            .bind(vendor_scope)
            .fetch_all(pool)
            .await
    }

    /// Whether another quote already supersedes `quote_id`.
    pub async fn has_successor(pool: &PgPool, quote_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM quote_attachments WHERE supersedes_id = $1)",
        )
        .bind(quote_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// The unclaimed, unexpired visit whose package carries `quote_id`, if any.
    pub async fn pending_handoff_visit<'e>(
        executor: impl PgExecutor<'e>,
        quote_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT v.id
             FROM handoff_packages p
             JOIN vendor_visits v ON v.id = p.visit_id
             WHERE p.quote_attachment_id = $1
               AND v.project_id IS NULL
               AND (v.expires_at IS NULL OR v.expires_at > NOW())
             LIMIT 1",
        )
        .bind(quote_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Home a still-unattached quote on a project and mark it sent.
    ///
    /// Returns `false` when the quote is already attached elsewhere.
    pub async fn attach_to_project<'e>(
        executor: impl PgExecutor<'e>,
        quote_id: DbId,
        project_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quote_attachments SET project_id = $2, status = $3
             WHERE id = $1 AND project_id IS NULL",
        )
        .bind(quote_id)
        .bind(project_id)
        .bind(QuoteStatus::Sent.as_str())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
