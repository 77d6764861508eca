//! Platform role names carried in the identity token.
//!
//! These are account-wide capabilities, unrelated to the per-project
//! [`Role`](crate::access::Role) a participant grant carries.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_DESIGNER: &str = "designer";
pub const ROLE_VENDOR: &str = "vendor";

/// Returns `true` if the platform role may issue handoffs and author quotes.
pub fn has_vendor_capability(role: &str) -> bool {
    role == ROLE_VENDOR || role == ROLE_ADMIN
}
