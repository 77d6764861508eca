//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - Where the entity is mutable, an update DTO with all-`Option` fields

pub mod event;
pub mod organization;
pub mod participant;
pub mod project;
pub mod quote;
pub mod room;
pub mod selection;
pub mod user;
pub mod visit;
