//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the caller from a JWT Bearer token.
//! - [`rbac::RequireVendor`]: requires the platform vendor capability.

pub mod auth;
pub mod rbac;
