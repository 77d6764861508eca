//! Handlers for vendor handoffs: issue, outbox, validate, and claim.
//!
//! Claim preconditions are checked in a fixed order so the recipient gets
//! the most specific answer: unknown token, wrong recipient, expired,
//! already claimed, then an invalid destination choice. The claim itself is
//! a single transaction in [`HandoffRepo::claim`]; stamping the vendor's
//! source project and publishing events run afterwards as post-commit hooks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use handoff_core::access::AccessVia;
use handoff_core::error::CoreError;
use handoff_core::handoff::{
    claim_link, destination_title, ensure_claimable, ensure_recipient, generate_visit_token,
    normalize_email, validate_expiry, validate_line_item, validate_package_shape, visit_state,
    Destination, LineItemFields, ProjectKind, VisitState,
};
use handoff_core::pagination::{clamp_limit, DEFAULT_OUTBOX_LIMIT};
use handoff_core::types::{DbId, Timestamp};
use handoff_db::models::quote::QuoteAttachment;
use handoff_db::models::visit::{CreateVisit, HandoffPackageItem, NewVisit, OutboxEntry};
use handoff_db::repositories::{
    ClaimPlan, DestinationPlan, HandoffRepo, OrganizationRepo, ProjectRepo, QuoteRepo, VisitRepo,
};
use handoff_events::bus::{HANDOFF_CLAIMED, HANDOFF_ISSUED};
use handoff_events::{HandoffInvite, PlatformEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireVendor;
use crate::post_commit::PostCommit;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct IssuedHandoff {
    pub visit_id: DbId,
    pub token: String,
    pub claim_link: String,
    pub expires_at: Option<Timestamp>,
}

/// What the recipient sees before claiming.
#[derive(Debug, Serialize)]
pub struct HandoffView {
    pub visit_id: DbId,
    pub recipient_email: String,
    pub vendor_name: Option<String>,
    pub note: Option<String>,
    pub state: VisitState,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub items: Vec<HandoffPackageItem>,
    pub quote: Option<QuoteAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    /// `existing`, `new`, or `specsheet`.
    pub choice: String,
    pub existing_project_id: Option<DbId>,
    pub new_project_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub destination_project_id: DbId,
    pub selections_attached_count: usize,
    pub created_project: bool,
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// POST /api/v1/handoffs
pub async fn issue(
    State(state): State<AppState>,
    RequireVendor(user): RequireVendor,
    Json(input): Json<CreateVisit>,
) -> AppResult<(StatusCode, Json<DataResponse<IssuedHandoff>>)> {
    input.validate()?;
    for (index, item) in input.items.iter().enumerate() {
        validate_line_item(
            index,
            &LineItemFields {
                product_id: item.product_id,
                product_name: item.product_name.as_deref(),
                description: item.description.as_deref(),
                quantity: item.quantity(),
            },
        )?;
    }
    validate_package_shape(input.items.len(), input.quote_attachment_id.is_some())?;
    validate_expiry(input.expires_at, Utc::now())?;

    let orgs = OrganizationRepo::active_org_ids(&state.pool, user.user_id).await?;
    let vendor_org_id = match input.organization_id {
        Some(org) if orgs.contains(&org) => org,
        Some(_) => {
            return Err(CoreError::Forbidden(
                "You are not an active member of that organization".into(),
            )
            .into())
        }
        None => orgs.first().copied().ok_or_else(|| {
            CoreError::Forbidden(
                "Issuing a handoff requires an active organization membership".into(),
            )
        })?,
    };

    if let Some(quote_id) = input.quote_attachment_id {
        let quote = QuoteRepo::find_by_id(&state.pool, quote_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "QuoteAttachment",
                id: quote_id,
            })?;
        if quote.vendor_org_id != vendor_org_id {
            return Err(CoreError::Forbidden(
                "The quote belongs to a different organization".into(),
            )
            .into());
        }
        if quote.project_id.is_some() {
            return Err(CoreError::Conflict(
                "The quote is already attached to a project".into(),
            )
            .into());
        }
        if QuoteRepo::has_successor(&state.pool, quote_id).await? {
            return Err(CoreError::Conflict("The quote has been superseded".into()).into());
        }
        if let Some(visit_id) = QuoteRepo::pending_handoff_visit(&state.pool, quote_id).await? {
            return Err(CoreError::Conflict(format!(
                "The quote already travels with pending handoff {visit_id}"
            ))
            .into());
        }
    }

    if let Some(source_project_id) = input.source_project_id {
        access::assert_edit(&state.pool, user.user_id, source_project_id).await?;
    }

    let designer_email = normalize_email(&input.recipient_email);
    let (visit, _package) = VisitRepo::issue(
        &state.pool,
        &NewVisit {
            token: generate_visit_token(),
            vendor_user_id: user.user_id,
            vendor_org_id,
            designer_email: designer_email.clone(),
            input: &input,
        },
    )
    .await?;

    tracing::info!(
        visit_id = visit.id,
        vendor_org_id,
        items = input.items.len(),
        "Handoff issued"
    );

    let link = claim_link(&state.config.public_base_url, &visit.token);

    let mut hooks = PostCommit::new();
    if let Some(source_project_id) = input.source_project_id {
        let pool = state.pool.clone();
        hooks.push("stamp_handoff_invited", async move {
            ProjectRepo::stamp_handoff_invited(&pool, source_project_id).await
        });
    }
    hooks.run().await;

    state.event_bus.publish(
        PlatformEvent::new(HANDOFF_ISSUED)
            .with_source("vendor_visit", visit.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "vendor_org_id": vendor_org_id,
                "items": input.items.len(),
                "quote_attachment_id": input.quote_attachment_id,
                "source_project_id": input.source_project_id,
            })),
    );

    if let Some(email) = state.email.clone() {
        let pool = state.pool.clone();
        let invite_link = link.clone();
        let note = visit.note.clone();
        let expires_at = visit.expires_at;
        let item_count = input.items.len();
        tokio::spawn(async move {
            let vendor_name = match OrganizationRepo::find_by_id(&pool, vendor_org_id).await {
                Ok(Some(org)) => org.name,
                _ => "A vendor".to_string(),
            };
            let invite = HandoffInvite {
                to: designer_email,
                claim_link: invite_link,
                vendor_name,
                note,
                item_count,
                expires_at,
            };
            if let Err(e) = email.send_handoff_invite(&invite).await {
                tracing::warn!(error = %e, "Failed to send handoff invitation");
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IssuedHandoff {
                visit_id: visit.id,
                token: visit.token,
                claim_link: link,
                expires_at: visit.expires_at,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// GET /api/v1/handoffs/outbox?limit=
pub async fn outbox(
    State(state): State<AppState>,
    RequireVendor(user): RequireVendor,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<OutboxEntry>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_OUTBOX_LIMIT, state.config.outbox_max_limit);
    let entries = VisitRepo::list_outbox(&state.pool, user.user_id, limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

/// GET /api/v1/handoffs/{token}
///
/// Public and read-only; possession of the token is the credential.
pub async fn validate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<HandoffView>>> {
    let visit = VisitRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(CoreError::VisitNotFound)?;
    let now = Utc::now();
    ensure_claimable(visit.expires_at, visit.project_id, now)?;

    let package = VisitRepo::find_package_by_visit(&state.pool, visit.id).await?;
    let (items, quote) = match &package {
        Some(package) => {
            let items = VisitRepo::list_items(&state.pool, package.id).await?;
            let quote = match package.quote_attachment_id {
                Some(quote_id) => QuoteRepo::find_by_id(&state.pool, quote_id).await?,
                None => None,
            };
            (items, quote)
        }
        None => (Vec::new(), None),
    };
    let vendor_name = OrganizationRepo::find_by_id(&state.pool, visit.vendor_org_id)
        .await?
        .map(|org| org.name);

    Ok(Json(DataResponse {
        data: HandoffView {
            visit_id: visit.id,
            recipient_email: visit.designer_email,
            vendor_name,
            note: visit.note,
            state: visit_state(visit.expires_at, visit.project_id, now),
            created_at: visit.created_at,
            expires_at: visit.expires_at,
            items,
            quote,
        },
    }))
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// POST /api/v1/handoffs/{token}/claim
pub async fn claim(
    State(state): State<AppState>,
    user: AuthUser,
    Path(token): Path<String>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<Json<DataResponse<ClaimResponse>>> {
    let visit = VisitRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(CoreError::VisitNotFound)?;
    ensure_recipient(&user.email, &visit.designer_email)?;
    ensure_claimable(visit.expires_at, visit.project_id, Utc::now())?;

    let destination = match Destination::parse(&input.choice, input.existing_project_id)? {
        Destination::Existing(project_id) => {
            let (_, access) = access::assert_edit(&state.pool, user.user_id, project_id).await?;
            // Org-level access stays org-level so vendor-side scoping holds.
            let claimer_grant = match access.via {
                AccessVia::Org(_) => None,
                AccessVia::DirectOwner | AccessVia::User => Some((access.side, access.role)),
            };
            DestinationPlan::Existing {
                project_id,
                claimer_grant,
            }
        }
        fresh => {
            let kind = fresh.new_project_kind().ok_or_else(|| {
                CoreError::InvalidChoice(format!("Choice '{}' names no project", input.choice))
            })?;
            let name = input.new_project_name.as_deref();
            fresh_destination(&state, visit.id, kind, name).await?
        }
    };

    let visit_id = visit.id;
    let outcome = HandoffRepo::claim(
        &state.pool,
        &ClaimPlan {
            visit,
            claimer_id: user.user_id,
            destination,
        },
    )
    .await?;

    tracing::info!(
        visit_id,
        project_id = outcome.project_id,
        selections = outcome.selections_attached,
        created_project = outcome.created_project,
        "Handoff claimed"
    );

    let mut hooks = PostCommit::new();
    if let Some(source_project_id) = outcome.source_project_id {
        let pool = state.pool.clone();
        hooks.push("stamp_handoff_claimed", async move {
            ProjectRepo::stamp_handoff_claimed(&pool, source_project_id).await
        });
    }
    let bus = state.event_bus.clone();
    let event = PlatformEvent::new(HANDOFF_CLAIMED)
        .with_source("vendor_visit", visit_id)
        .with_actor(user.user_id)
        .with_payload(json!({
            "project_id": outcome.project_id,
            "selections": outcome.selections_attached,
            "quote_attachment_id": outcome.quote_attachment_id,
            "created_project": outcome.created_project,
        }));
    hooks.push("publish_handoff_claimed", async move {
        bus.publish(event);
        Ok::<_, std::convert::Infallible>(())
    });
    hooks.run().await;

    Ok(Json(DataResponse {
        data: ClaimResponse {
            destination_project_id: outcome.project_id,
            selections_attached_count: outcome.selections_attached,
            created_project: outcome.created_project,
        },
    }))
}

/// Plan a freshly created destination, titled from the recipient's
/// requested name or the vendor's source project.
async fn fresh_destination(
    state: &AppState,
    visit_id: DbId,
    kind: ProjectKind,
    requested_name: Option<&str>,
) -> AppResult<DestinationPlan> {
    let source_project_id = VisitRepo::find_package_by_visit(&state.pool, visit_id)
        .await?
        .and_then(|package| package.source_project_id);
    let source_title = match source_project_id {
        Some(id) => ProjectRepo::find_by_id(&state.pool, id).await?.map(|p| p.title),
        None => None,
    };
    Ok(DestinationPlan::Create {
        title: destination_title(kind, requested_name, source_title.as_deref(), Utc::now()),
        kind,
    })
}
