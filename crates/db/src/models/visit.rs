//! Vendor visit, handoff package, and outbox models.

use handoff_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `vendor_visits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorVisit {
    pub id: DbId,
    pub token: String,
    pub vendor_user_id: DbId,
    pub vendor_org_id: DbId,
    pub designer_email: String,
    pub note: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub project_id: Option<DbId>,
    pub claimed_by: Option<DbId>,
    pub claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `handoff_packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HandoffPackage {
    pub id: DbId,
    pub visit_id: DbId,
    pub vendor_org_id: DbId,
    pub designer_email: String,
    pub source_project_id: Option<DbId>,
    pub quote_attachment_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A row from the `handoff_package_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HandoffPackageItem {
    pub id: DbId,
    pub package_id: DbId,
    pub position: i32,
    pub product_id: Option<DbId>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub finish: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

/// One line item as submitted by the vendor.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPackageItem {
    pub product_id: Option<DbId>,
    #[validate(length(max = 300))]
    pub product_name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub finish: Option<String>,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

impl NewPackageItem {
    pub fn quantity(&self) -> i32 {
        self.quantity.unwrap_or(1)
    }
}

/// DTO for issuing a handoff visit together with its package.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVisit {
    #[validate(email)]
    pub recipient_email: String,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewPackageItem>,
    /// An existing quote owned by the vendor's organization.
    pub quote_attachment_id: Option<DbId>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    pub expires_at: Option<Timestamp>,
    /// The vendor-side project this handoff was prepared in.
    pub source_project_id: Option<DbId>,
    /// Issue on behalf of this organization; defaults to the caller's first.
    pub organization_id: Option<DbId>,
}

/// Everything needed to insert a visit and its package in one transaction.
#[derive(Debug, Clone)]
pub struct NewVisit<'a> {
    pub token: String,
    pub vendor_user_id: DbId,
    pub vendor_org_id: DbId,
    /// Already normalized.
    pub designer_email: String,
    pub input: &'a CreateVisit,
}

/// A row of the vendor outbox listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEntry {
    pub visit_id: DbId,
    pub token: String,
    pub recipient_email: String,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub destination_project_id: Option<DbId>,
    pub destination_project_title: Option<String>,
    pub claimed_at: Option<Timestamp>,
}

/// A package item joined with the live catalog row it references, if any.
#[derive(Debug, Clone, FromRow)]
pub struct MaterializableItem {
    pub position: i32,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub finish: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
    pub image_url: Option<String>,
    pub catalog_name: Option<String>,
    pub catalog_description: Option<String>,
    pub catalog_image_url: Option<String>,
}
