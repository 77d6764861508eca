//! Repository for the `rooms` table.

use handoff_core::types::DbId;
use sqlx::PgPool;

use crate::models::room::{CreateRoom, Room};

const COLUMNS: &str = "id, project_id, name, created_at, updated_at";

pub struct RoomRepo;

impl RoomRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateRoom,
    ) -> Result<Room, sqlx::Error> {
        let query =
            format!("INSERT INTO rooms (project_id, name) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Room>(&query)
            .bind(project_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE project_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Room>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `room_id` belongs to `project_id`.
    pub async fn belongs_to_project(
        pool: &PgPool,
        project_id: DbId,
        room_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM rooms WHERE id = $1 AND project_id = $2)")
                .bind(room_id)
                .bind(project_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
