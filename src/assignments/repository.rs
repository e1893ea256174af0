use chrono::Utc;
use sqlx::SqlitePool;

use crate::assignments::models::Assignment;

/// Repository for assignment records
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: SqlitePool,
}

impl AssignmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new assignment owned by `created_by`
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        created_by: i64,
    ) -> Result<Assignment, sqlx::Error> {
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (title, description, created_by, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, description, created_by, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Assignment>, sqlx::Error> {
        sqlx::query_as::<_, Assignment>(
            "SELECT id, title, description, created_by, created_at FROM assignments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All assignments, newest first
    pub async fn list(&self) -> Result<Vec<Assignment>, sqlx::Error> {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, title, description, created_by, created_at
            FROM assignments
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
