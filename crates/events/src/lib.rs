//! Event bus and notification delivery for the handoff service.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`EventPersistence`]: background task writing every event to the
//!   `events` table.
//! - [`delivery`]: outbound email for handoff invitations.

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, HandoffInvite};
pub use persistence::EventPersistence;
