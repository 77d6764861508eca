//! Project access resolution.
//!
//! A caller reaches a project in one of three ways, checked in order:
//!
//! 1. Direct ownership: `projects.owner_id` or `projects.designer_id` equals
//!    the caller. Always `OWNER` on the `DESIGNER` side; no participant row
//!    is needed.
//! 2. A participant grant addressed to the caller's user id.
//! 3. A participant grant addressed to one of the caller's *active*
//!    organization memberships.
//!
//! Every handler goes through [`resolve_access`] (via the api crate's
//! `access` module) instead of comparing ownership columns itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Role / Side
// ---------------------------------------------------------------------------

/// Privilege level of a grant. Ordered so that `Owner > Editor > Viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    Editor,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Editor => "EDITOR",
            Role::Owner => "OWNER",
        }
    }

    /// `OWNER` and `EDITOR` may mutate project data.
    pub fn can_edit(self) -> bool {
        matches!(self, Role::Owner | Role::Editor)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Role::Owner),
            "EDITOR" => Ok(Role::Editor),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: OWNER, EDITOR, VIEWER"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party a grant represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Designer,
    Vendor,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Designer => "DESIGNER",
            Side::Vendor => "VENDOR",
        }
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DESIGNER" => Ok(Side::Designer),
            "VENDOR" => Ok(Side::Vendor),
            other => Err(CoreError::Validation(format!(
                "Invalid side '{other}'. Must be one of: DESIGNER, VENDOR"
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grantee
// ---------------------------------------------------------------------------

/// The party a participant row grants access to: exactly one user or one
/// organization.
///
/// Serialized externally tagged: `{"user": 7}` or `{"organization": 3}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grantee {
    User(DbId),
    #[serde(rename = "organization")]
    Org(DbId),
}

impl Grantee {
    /// Rebuild a grantee from the nullable `(organization_id, user_id)` column pair.
    pub fn from_columns(
        organization_id: Option<DbId>,
        user_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        match (organization_id, user_id) {
            (Some(org), None) => Ok(Grantee::Org(org)),
            (None, Some(user)) => Ok(Grantee::User(user)),
            (org, user) => Err(CoreError::Internal(format!(
                "Participant row must name exactly one grantee \
                 (organization_id={org:?}, user_id={user:?})"
            ))),
        }
    }

    pub fn user_id(self) -> Option<DbId> {
        match self {
            Grantee::User(id) => Some(id),
            Grantee::Org(_) => None,
        }
    }

    pub fn organization_id(self) -> Option<DbId> {
        match self {
            Grantee::Org(id) => Some(id),
            Grantee::User(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution inputs / output
// ---------------------------------------------------------------------------

/// The direct-ownership columns of a project.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ownership {
    pub owner_id: Option<DbId>,
    pub designer_id: Option<DbId>,
}

/// One participant row, already decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantGrant {
    pub grantee: Grantee,
    pub role: Role,
    pub side: Side,
}

/// How the caller obtained access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessVia {
    DirectOwner,
    User,
    Org(DbId),
}

/// `{role, side}` as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessSummary {
    pub role: Role,
    pub side: Side,
}

/// A resolved, non-empty access decision for one caller on one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAccess {
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: Role,
    pub side: Side,
    pub via: AccessVia,
    /// The caller's active organization ids at resolution time.
    pub org_ids: Vec<DbId>,
}

/// Resolve the caller's access to a project, or `None`.
///
/// A grant addressed to the user wins over organization grants; among
/// several organization grants the strongest role wins.
pub fn resolve_access(
    project_id: DbId,
    caller_id: DbId,
    ownership: Ownership,
    participants: &[ParticipantGrant],
    caller_org_ids: Vec<DbId>,
) -> Option<ProjectAccess> {
    if ownership.owner_id == Some(caller_id) || ownership.designer_id == Some(caller_id) {
        return Some(ProjectAccess {
            project_id,
            user_id: caller_id,
            role: Role::Owner,
            side: Side::Designer,
            via: AccessVia::DirectOwner,
            org_ids: caller_org_ids,
        });
    }

    let user_grant = participants
        .iter()
        .find(|p| p.grantee == Grantee::User(caller_id))
        .map(|p| (p, AccessVia::User));

    let chosen = user_grant.or_else(|| {
        participants
            .iter()
            .filter_map(|p| match p.grantee {
                Grantee::Org(org) if caller_org_ids.contains(&org) => {
                    Some((p, AccessVia::Org(org)))
                }
                _ => None,
            })
            .max_by_key(|(p, _)| p.role)
    })?;

    let (grant, via) = chosen;
    Some(ProjectAccess {
        project_id,
        user_id: caller_id,
        role: grant.role,
        side: grant.side,
        via,
        org_ids: caller_org_ids,
    })
}

/// Turn a resolution result into a view check.
pub fn require_view(access: Option<ProjectAccess>) -> Result<ProjectAccess, CoreError> {
    access.ok_or_else(|| CoreError::Forbidden("You do not have access to this project".into()))
}

impl ProjectAccess {
    pub fn summary(&self) -> AccessSummary {
        AccessSummary {
            role: self.role,
            side: self.side,
        }
    }

    pub fn can_edit(&self) -> bool {
        self.role.can_edit()
    }

    /// Fails `Forbidden` unless the role is `OWNER` or `EDITOR`.
    pub fn require_edit(self) -> Result<Self, CoreError> {
        if self.can_edit() {
            Ok(self)
        } else {
            Err(CoreError::Forbidden(
                "Editor or Owner access to this project is required".into(),
            ))
        }
    }

    /// Fails `Forbidden` unless the role is `OWNER`.
    pub fn require_owner(self) -> Result<Self, CoreError> {
        if self.role == Role::Owner {
            Ok(self)
        } else {
            Err(CoreError::Forbidden(
                "Owner access to this project is required".into(),
            ))
        }
    }

    /// Organizations whose attributed rows a vendor-side caller may see.
    ///
    /// `None` means unrestricted (designer side).
    pub fn vendor_scope(&self) -> Option<&[DbId]> {
        match self.side {
            Side::Designer => None,
            Side::Vendor => Some(&self.org_ids),
        }
    }

    /// Whether a row attributed to `vendor_org_id` is visible to this caller.
    ///
    /// Vendor-side callers only see rows attributed to one of their own
    /// organizations; unattributed rows belong to the designer.
    pub fn sees_attribution(&self, vendor_org_id: Option<DbId>) -> bool {
        match self.vendor_scope() {
            None => true,
            Some(orgs) => vendor_org_id.is_some_and(|org| orgs.contains(&org)),
        }
    }

    /// `Forbidden` variant of [`sees_attribution`](Self::sees_attribution).
    pub fn require_attribution(&self, vendor_org_id: Option<DbId>) -> Result<(), CoreError> {
        if self.sees_attribution(vendor_org_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "This item belongs to another party".into(),
            ))
        }
    }

    /// Organization to stamp on rows a vendor-side caller creates.
    pub fn attribution_org(&self) -> Option<DbId> {
        match (self.side, self.via) {
            (Side::Designer, _) => None,
            (Side::Vendor, AccessVia::Org(org)) => Some(org),
            (Side::Vendor, _) => self.org_ids.first().copied(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(grantee: Grantee, role: Role, side: Side) -> ParticipantGrant {
        ParticipantGrant {
            grantee,
            role,
            side,
        }
    }

    #[test]
    fn direct_owner_wins_without_participants() {
        let ownership = Ownership {
            owner_id: Some(1),
            designer_id: None,
        };
        let access = resolve_access(10, 1, ownership, &[], vec![]).unwrap();
        assert_eq!(access.role, Role::Owner);
        assert_eq!(access.side, Side::Designer);
        assert_eq!(access.via, AccessVia::DirectOwner);
    }

    #[test]
    fn direct_designer_is_owner() {
        let ownership = Ownership {
            owner_id: Some(2),
            designer_id: Some(3),
        };
        let access = resolve_access(10, 3, ownership, &[], vec![]).unwrap();
        assert_eq!(access.summary(), AccessSummary { role: Role::Owner, side: Side::Designer });
    }

    #[test]
    fn direct_ownership_beats_weaker_participant_row() {
        let ownership = Ownership {
            owner_id: Some(1),
            designer_id: None,
        };
        let rows = [grant(Grantee::User(1), Role::Viewer, Side::Vendor)];
        let access = resolve_access(10, 1, ownership, &rows, vec![]).unwrap();
        assert_eq!(access.role, Role::Owner);
    }

    #[test]
    fn user_grant_resolves() {
        let rows = [grant(Grantee::User(5), Role::Editor, Side::Designer)];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![]).unwrap();
        assert_eq!(access.role, Role::Editor);
        assert_eq!(access.via, AccessVia::User);
    }

    #[test]
    fn org_grant_requires_active_membership() {
        let rows = [grant(Grantee::Org(40), Role::Editor, Side::Vendor)];
        assert!(resolve_access(10, 5, Ownership::default(), &rows, vec![41]).is_none());

        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![40]).unwrap();
        assert_eq!(access.side, Side::Vendor);
        assert_eq!(access.via, AccessVia::Org(40));
    }

    #[test]
    fn user_grant_preferred_over_org_grant() {
        let rows = [
            grant(Grantee::Org(40), Role::Owner, Side::Vendor),
            grant(Grantee::User(5), Role::Viewer, Side::Designer),
        ];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![40]).unwrap();
        assert_eq!(access.role, Role::Viewer);
        assert_eq!(access.side, Side::Designer);
    }

    #[test]
    fn strongest_org_grant_wins() {
        let rows = [
            grant(Grantee::Org(40), Role::Viewer, Side::Vendor),
            grant(Grantee::Org(41), Role::Editor, Side::Vendor),
        ];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![40, 41]).unwrap();
        assert_eq!(access.role, Role::Editor);
        assert_eq!(access.via, AccessVia::Org(41));
    }

    #[test]
    fn no_match_is_none_and_view_is_forbidden() {
        let rows = [grant(Grantee::User(6), Role::Owner, Side::Designer)];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![]);
        assert!(access.is_none());
        assert!(matches!(require_view(access), Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn viewer_cannot_edit() {
        let rows = [grant(Grantee::User(5), Role::Viewer, Side::Designer)];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![]).unwrap();
        assert!(matches!(access.require_edit(), Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn editor_is_not_owner() {
        let rows = [grant(Grantee::User(5), Role::Editor, Side::Designer)];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![]).unwrap();
        let access = access.require_edit().unwrap();
        assert!(access.require_owner().is_err());
    }

    #[test]
    fn vendor_sees_only_own_attribution() {
        let rows = [grant(Grantee::Org(40), Role::Editor, Side::Vendor)];
        let access = resolve_access(10, 5, Ownership::default(), &rows, vec![40]).unwrap();
        assert!(access.sees_attribution(Some(40)));
        assert!(!access.sees_attribution(Some(41)));
        assert!(!access.sees_attribution(None));
        assert!(access.require_attribution(Some(41)).is_err());
        assert_eq!(access.attribution_org(), Some(40));
    }

    #[test]
    fn designer_sees_everything() {
        let ownership = Ownership {
            owner_id: Some(1),
            designer_id: None,
        };
        let access = resolve_access(10, 1, ownership, &[], vec![]).unwrap();
        assert!(access.sees_attribution(Some(99)));
        assert!(access.sees_attribution(None));
        assert_eq!(access.vendor_scope(), None);
        assert_eq!(access.attribution_org(), None);
    }

    #[test]
    fn grantee_from_columns() {
        assert_eq!(Grantee::from_columns(Some(3), None).unwrap(), Grantee::Org(3));
        assert_eq!(Grantee::from_columns(None, Some(4)).unwrap(), Grantee::User(4));
        assert!(Grantee::from_columns(None, None).is_err());
        assert!(Grantee::from_columns(Some(3), Some(4)).is_err());
    }

    #[test]
    fn grantee_json_shape() {
        let user: Grantee = serde_json::from_str(r#"{"user": 7}"#).unwrap();
        assert_eq!(user, Grantee::User(7));
        let org: Grantee = serde_json::from_str(r#"{"organization": 3}"#).unwrap();
        assert_eq!(org, Grantee::Org(3));
    }

    #[test]
    fn role_and_side_parse() {
        assert_eq!("EDITOR".parse::<Role>().unwrap(), Role::Editor);
        assert!("editor".parse::<Role>().is_err());
        assert_eq!("VENDOR".parse::<Side>().unwrap(), Side::Vendor);
        assert!("BUYER".parse::<Side>().is_err());
        assert!(Role::Owner > Role::Editor && Role::Editor > Role::Viewer);
    }
}
