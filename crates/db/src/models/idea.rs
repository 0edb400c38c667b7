//! Idea entity model and DTOs.

use boardroom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full idea row from the `ideas` table.
///
/// `branch_name` and `pr_number` are NULL until an execution succeeds, at
/// which point both are written in the same statement (the table CHECK
/// constraint rejects one without the other).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Idea {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub status: String,
    pub branch_name: Option<String>,
    pub pr_number: Option<i64>,
    pub created_at: Timestamp,
}

/// DTO for creating a new idea. Status always starts at `proposed`.
#[derive(Debug)]
pub struct CreateIdea {
    pub title: String,
    pub description: String,
    pub created_by: String,
}
