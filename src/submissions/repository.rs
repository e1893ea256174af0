use chrono::Utc;
use sqlx::SqlitePool;

use crate::submissions::models::{NewSubmission, Submission};

/// Repository for submission records
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: SqlitePool,
}

impl SubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewSubmission) -> Result<Submission, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions
                (assignment_id, student_id, file_key, original_filename, comment, size_bytes, sha256, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, assignment_id, student_id, file_key, original_filename, comment, size_bytes, sha256, submitted_at
            "#,
        )
        .bind(new.assignment_id)
        .bind(new.student_id)
        .bind(&new.file_key)
        .bind(&new.original_filename)
        .bind(&new.comment)
        .bind(new.size_bytes)
        .bind(&new.sha256)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, assignment_id, student_id, file_key, original_filename, comment, size_bytes, sha256, submitted_at
            FROM submissions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Every submission for an assignment, oldest first
    pub async fn list_for_assignment(&self, assignment_id: i64) -> Result<Vec<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, assignment_id, student_id, file_key, original_filename, comment, size_bytes, sha256, submitted_at
            FROM submissions
            WHERE assignment_id = ?
            ORDER BY submitted_at, id
            "#,
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await
    }
}
