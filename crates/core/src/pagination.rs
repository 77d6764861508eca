//! Limit clamping shared by list endpoints.

/// Default page size for the vendor outbox.
pub const DEFAULT_OUTBOX_LIMIT: i64 = 20;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}
