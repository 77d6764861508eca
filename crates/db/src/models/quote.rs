//! Quote attachment model and DTOs.

use handoff_core::quote::{validate_currency, ChainLink};
use handoff_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `quote_attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuoteAttachment {
    pub id: DbId,
    pub vendor_org_id: DbId,
    pub created_by: DbId,
    pub project_id: Option<DbId>,
    pub room_id: Option<DbId>,
    pub selection_id: Option<DbId>,
    pub file_url: String,
    pub file_name: String,
    pub total_cents: i64,
    pub currency: String,
    pub lead_time_days: Option<i32>,
    pub terms: Option<String>,
    pub version: i32,
    pub supersedes_id: Option<DbId>,
    pub status: String,
    pub expires_at: Option<Timestamp>,
    pub line_items: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ChainLink for QuoteAttachment {
    fn id(&self) -> DbId {
        self.id
    }

    fn supersedes_id(&self) -> Option<DbId> {
        self.supersedes_id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// DTO for creating a quote, optionally superseding an earlier one.
///
/// The file itself lives in object storage; only its reference is stored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuote {
    /// `None` while the quote only travels with a pending handoff.
    pub project_id: Option<DbId>,
    pub room_id: Option<DbId>,
    pub selection_id: Option<DbId>,
    #[validate(url)]
    pub file_url: String,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(range(min = 0))]
    pub total_cents: i64,
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    #[validate(range(min = 0))]
    pub lead_time_days: Option<i32>,
    #[validate(length(max = 2000))]
    pub terms: Option<String>,
    pub supersedes_id: Option<DbId>,
    pub expires_at: Option<Timestamp>,
    /// Line-item-level pricing; stored verbatim.
    #[serde(default)]
    pub line_items: Option<serde_json::Value>,
}
