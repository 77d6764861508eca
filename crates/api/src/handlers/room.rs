//! Handlers for `/projects/{id}/rooms`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use handoff_core::types::DbId;
use handoff_db::models::room::{CreateRoom, Room};
use handoff_db::repositories::RoomRepo;
use validator::Validate;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/rooms
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Room>>>> {
    access::assert_view(&state.pool, user.user_id, project_id).await?;
    let rooms = RoomRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// POST /api/v1/projects/{id}/rooms
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<DataResponse<Room>>)> {
    input.validate()?;
    access::assert_edit(&state.pool, user.user_id, project_id).await?;
    let room = RoomRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}
