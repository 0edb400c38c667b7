//! Idea lifecycle handlers: propose, list, approve, execute.
//!
//! Approve and execute both rely on the repository's conditional updates
//! for correctness under concurrency. The handlers never read-then-write a
//! status; they attempt the transition and interpret a miss afterwards
//! (missing row vs. wrong state vs. lost race).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use boardroom_core::error::CoreError;
use boardroom_core::idea::{ensure_approvable, ensure_executable, validate_files,
    validate_proposal, FileChange};
use boardroom_core::types::DbId;
use boardroom_db::models::idea::{CreateIdea, Idea};
use boardroom_db::repositories::idea_repo::IdeaRepo;
use serde::{Deserialize, Serialize};

use crate::engine::ChangeExecutor;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProposeIdeaRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteIdeaRequest {
    pub files: Vec<FileChange>,
    /// Optional commit message; defaults to one derived from the idea title.
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteIdeaResponse {
    #[serde(flatten)]
    pub idea: Idea,
    pub pr_url: String,
}

/// `POST /api/v1/ideas` -- propose a new idea (any authenticated user).
pub async fn propose(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<ProposeIdeaRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Idea>>)> {
    validate_proposal(&payload.title, &payload.description).map_err(AppError::Core)?;

    let idea = IdeaRepo::create(
        &state.pool,
        &CreateIdea {
            title: payload.title,
            description: payload.description,
            created_by: user.email,
        },
    )
    .await?;

    tracing::info!(idea_id = idea.id, created_by = %idea.created_by, "Idea proposed");

    Ok((StatusCode::CREATED, Json(DataResponse::new(idea))))
}

/// `GET /api/v1/ideas` -- list all ideas, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<Idea>>>> {
    let ideas = IdeaRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(ideas)))
}

/// `POST /api/v1/ideas/{id}/approve` -- approve a proposed idea (admin only).
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Idea>>> {
    match IdeaRepo::approve(&state.pool, id).await? {
        Some(idea) => {
            tracing::info!(idea_id = idea.id, approved_by = %admin.email, "Idea approved");
            Ok(Json(DataResponse::new(idea)))
        }
        None => Err(transition_miss(&state, id, ensure_approvable).await?),
    }
}

/// `POST /api/v1/ideas/{id}/execute` -- run an approved idea's file changes
/// against the remote repository (any authenticated user).
///
/// Claims the idea (`approved -> executing`) before touching the remote, so
/// concurrent execute calls for the same idea cannot both run. On remote
/// failure the claim is released and the idea returns to `approved`.
pub async fn execute(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(payload): Json<ExecuteIdeaRequest>,
) -> AppResult<Json<DataResponse<ExecuteIdeaResponse>>> {
    if payload.files.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "at least one file change is required".into(),
        )));
    }
    validate_files(&payload.files).map_err(AppError::Core)?;

    let claimed = match IdeaRepo::begin_execution(&state.pool, id).await? {
        Some(idea) => idea,
        None => return Err(transition_miss(&state, id, ensure_executable).await?),
    };

    tracing::info!(
        idea_id = claimed.id,
        executed_by = %user.email,
        files = payload.files.len(),
        "Execution started"
    );

    let executor = ChangeExecutor::new(state.github.as_ref());
    let outcome = match executor
        .run(&claimed, &payload.files, payload.message.as_deref())
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            // Release the claim so the idea is executable again. The guard
            // inside abort_execution keeps a recorded outcome intact.
            if !IdeaRepo::abort_execution(&state.pool, id).await? {
                tracing::warn!(idea_id = id, "Execution claim was not released");
            }
            return Err(AppError::Upstream(err));
        }
    };

    let idea = IdeaRepo::record_pull_request(
        &state.pool,
        id,
        &outcome.branch_name,
        outcome.pr_number,
    )
    .await?
    .ok_or_else(|| {
        AppError::InternalError(format!(
            "idea {id} lost its execution claim before the outcome was recorded"
        ))
    })?;

    tracing::info!(
        idea_id = idea.id,
        branch = %outcome.branch_name,
        pr_number = outcome.pr_number,
        "Execution completed"
    );

    Ok(Json(DataResponse::new(ExecuteIdeaResponse {
        idea,
        pr_url: outcome.pr_url,
    })))
}

/// Diagnose why a conditional transition returned no row.
///
/// Re-reads the idea: a missing row is 404; a row in the wrong state maps
/// through the supplied guard to 409; a row that now passes the guard means
/// a concurrent caller won the race between our update and this read.
async fn transition_miss(
    state: &AppState,
    id: DbId,
    guard: fn(&str) -> Result<(), CoreError>,
) -> Result<AppError, AppError> {
    let idea = IdeaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Idea",
            id,
        }))?;

    match guard(&idea.status) {
        Err(err) => Ok(AppError::Core(err)),
        Ok(()) => Ok(AppError::Core(CoreError::Conflict(
            "idea was transitioned by a concurrent request".into(),
        ))),
    }
}
