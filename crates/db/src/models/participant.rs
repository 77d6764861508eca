//! Project participant (access grant) model and DTOs.

use handoff_core::access::{Grantee, ParticipantGrant, Role, Side};
use handoff_core::error::CoreError;
use handoff_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectParticipant {
    pub id: DbId,
    pub project_id: DbId,
    pub organization_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub side: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectParticipant {
    /// Decode the stored columns into a typed grant.
    pub fn to_grant(&self) -> Result<ParticipantGrant, CoreError> {
        Ok(ParticipantGrant {
            grantee: Grantee::from_columns(self.organization_id, self.user_id)?,
            role: self.role.parse()?,
            side: self.side.parse()?,
        })
    }
}

/// DTO for granting (or re-granting) project access.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantParticipant {
    pub grantee: Grantee,
    pub side: Side,
    pub role: Role,
}
