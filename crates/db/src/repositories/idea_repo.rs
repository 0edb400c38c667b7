//! Repository for the `ideas` table.
//!
//! Lifecycle transitions are single-statement conditional updates: the
//! `WHERE id = $1 AND status = <expected>` clause makes each transition a
//! compare-and-set, so two concurrent callers cannot both move the same
//! idea. A `None` return means the row was missing or not in the expected
//! state; callers disambiguate with [`IdeaRepo::find_by_id`].

use boardroom_core::idea::IdeaStatus;
use boardroom_core::types::DbId;
use sqlx::PgPool;

use crate::models::idea::{CreateIdea, Idea};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, created_by, status, branch_name, pr_number, created_at";

/// Provides CRUD and lifecycle-transition operations for ideas.
pub struct IdeaRepo;

impl IdeaRepo {
    /// Insert a new idea in the `proposed` state, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateIdea) -> Result<Idea, sqlx::Error> {
        let query = format!(
            "INSERT INTO ideas (title, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find an idea by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas WHERE id = $1");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all ideas, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Idea>(&query).fetch_all(pool).await
    }

    /// Transition `proposed -> approved`.
    ///
    /// Returns `None` if the idea does not exist or is not currently
    /// `proposed` -- the update is conditional and never touches rows in
    /// any other state.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "UPDATE ideas SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(IdeaStatus::Approved.as_str())
            .bind(IdeaStatus::Proposed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim an idea for execution (`approved -> executing`).
    ///
    /// This is the mutual-exclusion gate for concurrent execute calls: of
    /// two racing callers, exactly one gets the row back and proceeds to
    /// the remote orchestration; the other sees `None`.
    pub async fn begin_execution(pool: &PgPool, id: DbId) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "UPDATE ideas SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(IdeaStatus::Executing.as_str())
            .bind(IdeaStatus::Approved.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Release a claim taken by [`IdeaRepo::begin_execution`] after a failed
    /// orchestration run (`executing -> approved`).
    ///
    /// Guarded on `branch_name IS NULL` so a completed execution (branch and
    /// PR recorded) can never be rolled back by a stale caller. Returns
    /// `true` if the claim was released.
    pub async fn abort_execution(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ideas SET status = $2
             WHERE id = $1 AND status = $3 AND branch_name IS NULL",
        )
        .bind(id)
        .bind(IdeaStatus::Approved.as_str())
        .bind(IdeaStatus::Executing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the outcome of a successful execution: branch name and pull
    /// request number, written together in one statement while the idea
    /// holds the `executing` claim.
    pub async fn record_pull_request(
        pool: &PgPool,
        id: DbId,
        branch_name: &str,
        pr_number: i64,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "UPDATE ideas SET branch_name = $2, pr_number = $3
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(branch_name)
            .bind(pr_number)
            .bind(IdeaStatus::Executing.as_str())
            .fetch_optional(pool)
            .await
    }
}
