//! Repository for vendor visits and their handoff packages.

use handoff_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::visit::{
    HandoffPackage, HandoffPackageItem, MaterializableItem, NewVisit, OutboxEntry, VendorVisit,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, vendor_user_id, vendor_org_id, designer_email, note, expires_at, \
    project_id, claimed_by, claimed_at, created_at, updated_at";

const PACKAGE_COLUMNS: &str =
    "id, visit_id, vendor_org_id, designer_email, source_project_id, quote_attachment_id, created_at";

const ITEM_COLUMNS: &str =
    "id, package_id, position, product_id, product_name, description, finish, quantity, note, image_url";

/// Provides issuance and lookup of handoff visits.
pub struct VisitRepo;

impl VisitRepo {
    /// Insert a visit, its package, and every line item in one transaction.
    ///
    /// Items keep their submitted order through `position`.
    pub async fn issue(
        pool: &PgPool,
        new: &NewVisit<'_>,
    ) -> Result<(VendorVisit, HandoffPackage), sqlx::Error> {
        let input = new.input;
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO vendor_visits
                (token, vendor_user_id, vendor_org_id, designer_email, note, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let visit = sqlx::query_as::<_, VendorVisit>(&query)
            .bind(&new.token)
            .bind(new.vendor_user_id)
            .bind(new.vendor_org_id)
            .bind(&new.designer_email)
            .bind(&input.note)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO handoff_packages
                (visit_id, vendor_org_id, designer_email, source_project_id, quote_attachment_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PACKAGE_COLUMNS}"
        );
        let package = sqlx::query_as::<_, HandoffPackage>(&query)
            .bind(visit.id)
            .bind(new.vendor_org_id)
            .bind(&new.designer_email)
            .bind(input.source_project_id)
            .bind(input.quote_attachment_id)
            .fetch_one(&mut *tx)
            .await?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO handoff_package_items
                    (package_id, position, product_id, product_name, description, finish,
                     quantity, note, image_url)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(package.id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.description)
            .bind(&item.finish)
            .bind(item.quantity())
            .bind(&item.note)
            .bind(&item.image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((visit, package))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VendorVisit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendor_visits WHERE id = $1");
        sqlx::query_as::<_, VendorVisit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<VendorVisit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendor_visits WHERE token = $1");
        sqlx::query_as::<_, VendorVisit>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_package_by_visit<'e>(
        executor: impl PgExecutor<'e>,
        visit_id: DbId,
    ) -> Result<Option<HandoffPackage>, sqlx::Error> {
        let query = format!("SELECT {PACKAGE_COLUMNS} FROM handoff_packages WHERE visit_id = $1");
        sqlx::query_as::<_, HandoffPackage>(&query)
            .bind(visit_id)
            .fetch_optional(executor)
            .await
    }

    /// Line items of a package in submitted order.
    pub async fn list_items(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Vec<HandoffPackageItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM handoff_package_items
             WHERE package_id = $1
             ORDER BY position"
        );
        sqlx::query_as::<_, HandoffPackageItem>(&query)
            .bind(package_id)
            .fetch_all(pool)
            .await
    }

    /// Line items joined with whatever catalog rows still exist.
    pub async fn list_materializable_items<'e>(
        executor: impl PgExecutor<'e>,
        package_id: DbId,
    ) -> Result<Vec<MaterializableItem>, sqlx::Error> {
        sqlx::query_as::<_, MaterializableItem>(
            "SELECT i.position, i.product_name, i.description, i.finish, i.quantity, i.note,
                    i.image_url, p.name AS catalog_name, p.description AS catalog_description,
                    p.image_url AS catalog_image_url
             FROM handoff_package_items i
             LEFT JOIN products p ON p.id = i.product_id
             WHERE i.package_id = $1
             ORDER BY i.position",
        )
        .bind(package_id)
        .fetch_all(executor)
        .await
    }

    /// The vendor's most recently issued visits with their destination.
    pub async fn list_outbox(
        pool: &PgPool,
        vendor_user_id: DbId,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        sqlx::query_as::<_, OutboxEntry>(
            "SELECT v.id AS visit_id, v.token, v.designer_email AS recipient_email,
                    v.created_at, v.expires_at, v.project_id AS destination_project_id,
                    p.title AS destination_project_title, v.claimed_at
             FROM vendor_visits v
             LEFT JOIN projects p ON p.id = v.project_id
             WHERE v.vendor_user_id = $1
             ORDER BY v.created_at DESC, v.id DESC
             LIMIT $2",
        )
        .bind(vendor_user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
