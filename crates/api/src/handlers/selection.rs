//! Handlers for `/projects/{id}/selections`.
//!
//! Vendor-side callers only ever see or touch selections attributed to one
//! of their own organizations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use handoff_core::access::Side;
use handoff_core::error::CoreError;
use handoff_core::types::DbId;
use handoff_db::models::selection::{Attribution, CreateSelection, Selection, UpdateSelection};
use handoff_db::repositories::{RoomRepo, SelectionRepo};
use handoff_db::DbPool;
use handoff_events::bus::SELECTION_CREATED;
use handoff_events::PlatformEvent;
use serde_json::json;
use validator::Validate;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_room(pool: &DbPool, project_id: DbId, room_id: Option<DbId>) -> AppResult<()> {
    if let Some(room_id) = room_id {
        if !RoomRepo::belongs_to_project(pool, project_id, room_id).await? {
            return Err(CoreError::Validation(format!(
                "room_id {room_id} does not belong to project {project_id}"
            ))
            .into());
        }
    }
    Ok(())
}

async fn load(pool: &DbPool, project_id: DbId, id: DbId) -> AppResult<Selection> {
    SelectionRepo::find_by_id(pool, project_id, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Selection",
                id,
            }
            .into()
        })
}

/// GET /api/v1/projects/{id}/selections
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Selection>>>> {
    let (_, access) = access::assert_view(&state.pool, user.user_id, project_id).await?;
    let selections =
        SelectionRepo::list_by_project(&state.pool, project_id, access.vendor_scope()).await?;
    Ok(Json(DataResponse { data: selections }))
}

/// POST /api/v1/projects/{id}/selections
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateSelection>,
) -> AppResult<(StatusCode, Json<DataResponse<Selection>>)> {
    input.validate()?;
    let (_, access) = access::assert_edit(&state.pool, user.user_id, project_id).await?;
    ensure_room(&state.pool, project_id, input.room_id).await?;

    let attribution = match access.side {
        Side::Designer => Attribution::default(),
        Side::Vendor => Attribution {
            vendor_rep_id: Some(user.user_id),
            vendor_org_id: access.attribution_org(),
        },
    };
    let selection = SelectionRepo::create(&state.pool, project_id, &input, attribution).await?;

    state.event_bus.publish(
        PlatformEvent::new(SELECTION_CREATED)
            .with_source("selection", selection.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "project_id": project_id })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: selection })))
}

/// PUT /api/v1/projects/{id}/selections/{sid}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSelection>,
) -> AppResult<Json<DataResponse<Selection>>> {
    input.validate()?;
    let (_, access) = access::assert_edit(&state.pool, user.user_id, project_id).await?;
    let existing = load(&state.pool, project_id, id).await?;
    access.require_attribution(existing.vendor_org_id)?;
    ensure_room(&state.pool, project_id, input.room_id).await?;

    let selection = SelectionRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Selection",
            id,
        })?;
    Ok(Json(DataResponse { data: selection }))
}

/// DELETE /api/v1/projects/{id}/selections/{sid}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let (_, access) = access::assert_edit(&state.pool, user.user_id, project_id).await?;
    let existing = load(&state.pool, project_id, id).await?;
    access.require_attribution(existing.vendor_org_id)?;

    if SelectionRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Selection",
            id,
        }
        .into())
    }
}
