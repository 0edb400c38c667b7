//! Idea lifecycle state machine and execution-input validation.
//!
//! The lifecycle is `proposed -> approved -> executing -> (done | rejected)`.
//! Every transition has exactly one legal source state; attempting it from
//! any other state is a [`CoreError::PreconditionFailed`], never a silent
//! no-op. `done` and `rejected` are representable terminal states but no
//! operation in this crate family sets them yet.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Lifecycle status of an idea. Stored as lowercase TEXT in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Proposed,
    Approved,
    Executing,
    Done,
    Rejected,
}

impl IdeaStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Proposed => "proposed",
            IdeaStatus::Approved => "approved",
            IdeaStatus::Executing => "executing",
            IdeaStatus::Done => "done",
            IdeaStatus::Rejected => "rejected",
        }
    }

    /// Parse a stored status string. Returns `None` for unknown values,
    /// which can only appear if the database CHECK constraint is bypassed.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "proposed" => Some(IdeaStatus::Proposed),
            "approved" => Some(IdeaStatus::Approved),
            "executing" => Some(IdeaStatus::Executing),
            "done" => Some(IdeaStatus::Done),
            "rejected" => Some(IdeaStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file to write on the execution branch. Transient: carried by an
/// execution request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path, e.g. `src/health.rs`.
    pub path: String,
    /// Full replacement content for the file.
    pub content: String,
}

/// Guard for the `proposed -> approved` transition.
pub fn ensure_approvable(status: &str) -> Result<(), CoreError> {
    match IdeaStatus::parse(status) {
        Some(IdeaStatus::Proposed) => Ok(()),
        _ => Err(CoreError::PreconditionFailed(format!(
            "idea can only be approved while proposed (current status: {status})"
        ))),
    }
}

/// Guard for the `approved -> executing` transition.
pub fn ensure_executable(status: &str) -> Result<(), CoreError> {
    match IdeaStatus::parse(status) {
        Some(IdeaStatus::Approved) => Ok(()),
        _ => Err(CoreError::PreconditionFailed(format!(
            "idea must be approved before execution (current status: {status})"
        ))),
    }
}

/// Validate the inputs of a new proposal.
pub fn validate_proposal(title: &str, description: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "description must not be empty".into(),
        ));
    }
    Ok(())
}

/// Validate the file set of an execution request.
///
/// Paths must be non-empty, repository-relative, and must not traverse
/// upward. Content is unrestricted.
pub fn validate_files(files: &[FileChange]) -> Result<(), CoreError> {
    for file in files {
        if file.path.trim().is_empty() {
            return Err(CoreError::Validation("file path must not be empty".into()));
        }
        if file.path.starts_with('/') {
            return Err(CoreError::Validation(format!(
                "file path must be relative: {}",
                file.path
            )));
        }
        if file.path.split('/').any(|segment| segment == "..") {
            return Err(CoreError::Validation(format!(
                "file path must not contain '..': {}",
                file.path
            )));
        }
    }
    Ok(())
}

/// Generate the branch name for one execution attempt.
///
/// The 6-hex-char suffix is drawn fresh on every call so re-executing an
/// idea after a failed attempt cannot collide with the branch the earlier
/// attempt may have left behind on the remote.
pub fn execution_branch_name(idea_id: DbId) -> String {
    let suffix: [u8; 3] = rand::rng().random();
    format!(
        "agent/{}-{:02x}{:02x}{:02x}",
        idea_id, suffix[0], suffix[1], suffix[2]
    )
}
