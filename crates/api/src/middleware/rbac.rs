//! Platform role extractors.
//!
//! Project-level permissions are resolved by [`crate::access`]; these only
//! gate account-wide capabilities.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use handoff_core::error::CoreError;
use handoff_core::roles::has_vendor_capability;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `vendor` (or `admin`) platform role. Rejects with 403.
///
/// ```ignore
/// async fn issue(RequireVendor(user): RequireVendor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireVendor(pub AuthUser);

impl FromRequestParts<AppState> for RequireVendor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_vendor_capability(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Vendor role required".into(),
            )));
        }
        Ok(RequireVendor(user))
    }
}
