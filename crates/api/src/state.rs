use std::sync::Arc;

use handoff_events::{EmailDelivery, EventBus};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: handoff_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Domain events are published here after their transaction commits.
    pub event_bus: Arc<EventBus>,
    /// `None` when SMTP is not configured; invitations are then not mailed.
    pub email: Option<Arc<EmailDelivery>>,
}
