//! Domain layer for project access control and vendor-to-designer handoffs.
//!
//! Everything here is pure: no database, no HTTP. The `db` crate persists
//! what these modules decide and the `api` crate wires both together.

pub mod access;
pub mod error;
pub mod handoff;
pub mod pagination;
pub mod quote;
pub mod roles;
pub mod types;
