//! Handlers for quotes and project quote chains.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use handoff_core::access::Side;
use handoff_core::error::CoreError;
use handoff_core::quote::group_into_chains;
use handoff_core::types::DbId;
use handoff_db::models::quote::{CreateQuote, QuoteAttachment};
use handoff_db::repositories::{OrganizationRepo, QuoteRepo, RoomRepo, SelectionRepo};
use handoff_events::bus::QUOTE_CREATED;
use handoff_events::PlatformEvent;
use serde_json::json;
use validator::Validate;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireVendor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/quotes
///
/// The issuing organization is the superseded quote's organization when
/// superseding, else the caller's vendor grant on the target project, else
/// the caller's oldest active membership.
pub async fn create(
    State(state): State<AppState>,
    RequireVendor(user): RequireVendor,
    Json(input): Json<CreateQuote>,
) -> AppResult<(StatusCode, Json<DataResponse<QuoteAttachment>>)> {
    input.validate()?;
    let orgs = OrganizationRepo::active_org_ids(&state.pool, user.user_id).await?;

    let mut project_org = None;
    if let Some(project_id) = input.project_id {
        let (_, access) = access::assert_edit(&state.pool, user.user_id, project_id).await?;
        if access.side == Side::Vendor {
            project_org = access.attribution_org();
        }
    } else if input.room_id.is_some() || input.selection_id.is_some() {
        return Err(CoreError::Validation(
            "room_id and selection_id require project_id".into(),
        )
        .into());
    }

    if let (Some(project_id), Some(room_id)) = (input.project_id, input.room_id) {
        if !RoomRepo::belongs_to_project(&state.pool, project_id, room_id).await? {
            return Err(CoreError::Validation(format!(
                "room_id {room_id} does not belong to project {project_id}"
            ))
            .into());
        }
    }
    if let (Some(project_id), Some(selection_id)) = (input.project_id, input.selection_id) {
        if SelectionRepo::find_by_id(&state.pool, project_id, selection_id)
            .await?
            .is_none()
        {
            return Err(CoreError::Validation(format!(
                "selection_id {selection_id} does not belong to project {project_id}"
            ))
            .into());
        }
    }

    let superseded_org = match input.supersedes_id {
        Some(prev_id) => QuoteRepo::find_by_id(&state.pool, prev_id)
            .await?
            .map(|q| q.vendor_org_id)
            .filter(|org| orgs.contains(org)),
        None => None,
    };

    let vendor_org_id = superseded_org
        .or(project_org)
        .or_else(|| orgs.first().copied())
        .ok_or_else(|| {
            CoreError::Forbidden(
                "Creating a quote requires an active organization membership".into(),
            )
        })?;

    let quote = QuoteRepo::create(&state.pool, vendor_org_id, user.user_id, &input).await?;

    tracing::info!(
        quote_id = quote.id,
        version = quote.version,
        supersedes_id = ?quote.supersedes_id,
        "Quote created"
    );
    state.event_bus.publish(
        PlatformEvent::new(QUOTE_CREATED)
            .with_source("quote_attachment", quote.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "vendor_org_id": quote.vendor_org_id,
                "project_id": quote.project_id,
                "version": quote.version,
                "supersedes_id": quote.supersedes_id,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: quote })))
}

/// GET /api/v1/quotes/{id}
///
/// Visible to members of the issuing organization, and to viewers of the
/// quote's project subject to vendor-side scoping.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuoteAttachment>>> {
    let quote = QuoteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "QuoteAttachment",
            id,
        })?;

    let orgs = OrganizationRepo::active_org_ids(&state.pool, user.user_id).await?;
    if !orgs.contains(&quote.vendor_org_id) {
        let project_id = quote
            .project_id
            .ok_or_else(|| CoreError::Forbidden("You do not have access to this quote".into()))?;
        let (_, access) = access::assert_view(&state.pool, user.user_id, project_id).await?;
        access.require_attribution(Some(quote.vendor_org_id))?;
    }

    Ok(Json(DataResponse { data: quote }))
}

/// GET /api/v1/projects/{id}/quotes
///
/// Chains are head-first; the first quote of each chain is current.
pub async fn list_chains(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Vec<QuoteAttachment>>>>> {
    let (_, access) = access::assert_view(&state.pool, user.user_id, project_id).await?;
    let quotes =
        QuoteRepo::list_chain_members_for_project(&state.pool, project_id, access.vendor_scope())
            .await?;
    Ok(Json(DataResponse {
        data: group_into_chains(quotes),
    }))
}
