//! Shared query parameter types.

use serde::Deserialize;

/// `?limit=` for list endpoints. Clamped by the handler via `clamp_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
