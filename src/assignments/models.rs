use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Assignment posted by a teacher; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "HW1")]
    pub title: String,
    #[schema(example = "Implement a linked list")]
    pub description: String,
    /// Id of the teacher who created the assignment
    #[schema(example = 1)]
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /assignments/create
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    #[schema(example = "HW1")]
    pub title: String,
    #[validate(length(min = 1, max = 10000), custom = "validate_not_blank")]
    #[schema(example = "Implement a linked list")]
    pub description: String,
}
