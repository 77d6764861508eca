//! Vendor handoff visits: token issuance, claim preconditions, and
//! destination selection.
//!
//! A visit moves `ISSUED -> CLAIMED` exactly once. `EXPIRED` and `INVALID`
//! are never stored; they are computed each time a token is presented.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a visit token in alphanumeric characters (~190 bits).
pub const VISIT_TOKEN_LENGTH: usize = 32;

/// Maximum number of line items in a single package.
pub const MAX_PACKAGE_ITEMS: usize = 500;

/// Title used for `new` destinations when nothing better is known.
pub const DEFAULT_PROJECT_TITLE: &str = "Untitled Project";

/// Path prefix of the recipient-facing claim page.
pub const CLAIM_PATH: &str = "/handoff";

// ---------------------------------------------------------------------------
// Tokens and identity
// ---------------------------------------------------------------------------

/// Generate a URL-safe, high-entropy visit token.
pub fn generate_visit_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(VISIT_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Build the link a recipient opens to claim a handoff.
pub fn claim_link(base_url: &str, token: &str) -> String {
    format!("{}{CLAIM_PATH}/{token}", base_url.trim_end_matches('/'))
}

/// Canonical form used to store and compare recipient emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The caller must be the exact recipient the visit was addressed to.
///
/// The message names the intended address only; it says nothing about
/// whether that address has an account.
pub fn ensure_recipient(caller_email: &str, designer_email: &str) -> Result<(), CoreError> {
    if normalize_email(caller_email) == normalize_email(designer_email) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "This handoff was sent to {}. Sign in with that email address to claim it.",
            normalize_email(designer_email)
        )))
    }
}

// ---------------------------------------------------------------------------
// Visit state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitState {
    Issued,
    Claimed,
    Expired,
}

/// Compute the state of a visit at `now`.
///
/// A claimed visit stays claimed even after its expiry passes.
pub fn visit_state(
    expires_at: Option<Timestamp>,
    project_id: Option<DbId>,
    now: Timestamp,
) -> VisitState {
    if project_id.is_some() {
        VisitState::Claimed
    } else if expires_at.is_some_and(|at| at <= now) {
        VisitState::Expired
    } else {
        VisitState::Issued
    }
}

/// Fail unless the visit can still be claimed.
///
/// Expiry is checked before claim state: an expired link reports
/// `VisitExpired` even if it was never claimed.
pub fn ensure_claimable(
    expires_at: Option<Timestamp>,
    project_id: Option<DbId>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if expires_at.is_some_and(|at| at <= now) {
        return Err(CoreError::VisitExpired);
    }
    if project_id.is_some() {
        return Err(CoreError::AlreadyClaimed);
    }
    Ok(())
}

/// An explicit expiry supplied at issue time must be in the future.
pub fn validate_expiry(expires_at: Option<Timestamp>, now: Timestamp) -> Result<(), CoreError> {
    match expires_at {
        Some(at) if at <= now => Err(CoreError::Validation(
            "expires_at must be in the future".into(),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Destinations
// ---------------------------------------------------------------------------

/// Stored discriminator for projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Project,
    SpecSheet,
}

impl ProjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectKind::Project => "project",
            ProjectKind::SpecSheet => "spec_sheet",
        }
    }
}

impl FromStr for ProjectKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(ProjectKind::Project),
            "spec_sheet" => Ok(ProjectKind::SpecSheet),
            other => Err(CoreError::Validation(format!("Invalid project kind '{other}'"))),
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a claimed handoff lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Existing(DbId),
    New,
    SpecSheet,
}

impl Destination {
    /// Parse the wire `choice` plus its optional project id.
    pub fn parse(choice: &str, existing_project_id: Option<DbId>) -> Result<Self, CoreError> {
        match choice {
            "existing" => existing_project_id.map(Destination::Existing).ok_or_else(|| {
                CoreError::InvalidChoice(
                    "existing_project_id is required for choice 'existing'".into(),
                )
            }),
            "new" => Ok(Destination::New),
            "specsheet" => Ok(Destination::SpecSheet),
            other => Err(CoreError::InvalidChoice(format!(
                "Unknown choice '{other}'. Must be one of: existing, new, specsheet"
            ))),
        }
    }

    /// The kind of project a fresh destination is created as.
    pub fn new_project_kind(self) -> Option<ProjectKind> {
        match self {
            Destination::Existing(_) => None,
            Destination::New => Some(ProjectKind::Project),
            Destination::SpecSheet => Some(ProjectKind::SpecSheet),
        }
    }
}

/// Title for a freshly created destination project.
///
/// `new` prefers the recipient's requested name, then the vendor's source
/// project title. Spec sheets always carry a dated label.
pub fn destination_title(
    kind: ProjectKind,
    requested_name: Option<&str>,
    source_title: Option<&str>,
    now: Timestamp,
) -> String {
    let non_blank = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    match kind {
        ProjectKind::Project => non_blank(requested_name)
            .or_else(|| non_blank(source_title))
            .unwrap_or_else(|| DEFAULT_PROJECT_TITLE.to_string()),
        ProjectKind::SpecSheet => match non_blank(requested_name) {
            Some(name) => format!("Spec Sheet: {name} ({})", now.format("%Y-%m-%d")),
            None => format!("Spec Sheet ({})", now.format("%Y-%m-%d")),
        },
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// The fields of a package line item that determine whether it is usable.
pub struct LineItemFields<'a> {
    pub product_id: Option<DbId>,
    pub product_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub quantity: i32,
}

/// Validate one line item; `index` is used only for the message.
pub fn validate_line_item(index: usize, item: &LineItemFields<'_>) -> Result<(), CoreError> {
    let has_text = |s: Option<&str>| s.is_some_and(|s| !s.trim().is_empty());
    if item.product_id.is_none() && !has_text(item.product_name) && !has_text(item.description) {
        return Err(CoreError::Validation(format!(
            "items[{index}]: a product reference, name, or description is required"
        )));
    }
    if item.quantity < 1 {
        return Err(CoreError::Validation(format!(
            "items[{index}]: quantity must be at least 1, got {}",
            item.quantity
        )));
    }
    Ok(())
}

/// A package needs something to hand off.
pub fn validate_package_shape(item_count: usize, has_quote: bool) -> Result<(), CoreError> {
    if item_count == 0 && !has_quote {
        return Err(CoreError::Validation(
            "A handoff must include at least one item or a quote".into(),
        ));
    }
    if item_count > MAX_PACKAGE_ITEMS {
        return Err(CoreError::Validation(format!(
            "A handoff may include at most {MAX_PACKAGE_ITEMS} items, got {item_count}"
        )));
    }
    Ok(())
}

/// Name copied onto a materialized selection.
///
/// The live catalog name wins; a product that no longer exists falls back
/// to the name and description captured when the package was built.
pub fn materialized_name(
    catalog_name: Option<&str>,
    item_name: Option<&str>,
    item_description: Option<&str>,
) -> String {
    [catalog_name, item_name, item_description]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Unnamed item")
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
