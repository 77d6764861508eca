//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.

pub mod event_repo;
pub mod handoff_repo;
pub mod organization_repo;
pub mod participant_repo;
pub mod project_repo;
pub mod quote_repo;
pub mod room_repo;
pub mod selection_repo;
pub mod user_repo;
pub mod visit_repo;

pub use event_repo::EventRepo;
pub use handoff_repo::{ClaimOutcome, ClaimPlan, DestinationPlan, HandoffRepo};
pub use organization_repo::OrganizationRepo;
pub use participant_repo::ParticipantRepo;
pub use project_repo::ProjectRepo;
pub use quote_repo::QuoteRepo;
pub use room_repo::RoomRepo;
pub use selection_repo::SelectionRepo;
pub use user_repo::UserRepo;
pub use visit_repo::VisitRepo;
