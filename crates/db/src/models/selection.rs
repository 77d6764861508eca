//! Selection entity model and DTOs.

use handoff_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `selections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Selection {
    pub id: DbId,
    pub project_id: DbId,
    pub room_id: Option<DbId>,
    pub product_name: String,
    pub description: Option<String>,
    pub vendor_name: Option<String>,
    pub finish: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub vendor_rep_id: Option<DbId>,
    pub vendor_org_id: Option<DbId>,
    pub source_visit_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a selection by hand.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSelection {
    pub room_id: Option<DbId>,
    #[validate(length(min = 1, max = 300))]
    pub product_name: String,
    pub description: Option<String>,
    pub vendor_name: Option<String>,
    pub finish: Option<String>,
    /// Defaults to 1.
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub note: Option<String>,
    pub photo_url: Option<String>,
}

/// DTO for updating a selection. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSelection {
    pub room_id: Option<DbId>,
    #[validate(length(min = 1, max = 300))]
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub finish: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub note: Option<String>,
    pub photo_url: Option<String>,
}

/// Who a new selection is attributed to.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attribution {
    pub vendor_rep_id: Option<DbId>,
    pub vendor_org_id: Option<DbId>,
}
