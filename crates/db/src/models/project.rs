//! Project entity model and DTOs.

use handoff_core::access::Ownership;
use handoff_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    /// `project` or `spec_sheet`.
    pub kind: String,
    pub owner_id: Option<DbId>,
    pub designer_id: Option<DbId>,
    pub design_org_id: Option<DbId>,
    pub handoff_invited_at: Option<Timestamp>,
    pub handoff_claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn ownership(&self) -> Ownership {
        Ownership {
            owner_id: self.owner_id,
            designer_id: self.designer_id,
        }
    }
}

/// DTO for creating a new project. The caller becomes its owner.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub design_org_id: Option<DbId>,
}
