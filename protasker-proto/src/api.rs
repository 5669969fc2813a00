//! REST contract shared by the client and the server: route paths, the
//! error body, and title validation.

use serde::{Deserialize, Serialize};

use crate::project::ProjectId;
use crate::task::TaskId;

/// Maximum allowed title length in characters, for tasks and projects.
pub const MAX_TITLE_LENGTH: usize = 256;

/// JSON body carried by every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub msg: String,
}

impl ErrorBody {
    /// Wraps a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Reasons a title is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title is empty or whitespace.
    #[error("title is required")]
    TitleEmpty,
    /// Title exceeds [`MAX_TITLE_LENGTH`].
    #[error("title too long (max {MAX_TITLE_LENGTH} characters)")]
    TitleTooLong,
}

/// Checks a task or project title.
///
/// # Errors
///
/// Returns [`ValidationError::TitleEmpty`] for a blank title and
/// [`ValidationError::TitleTooLong`] when it has more than
/// [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

/// Route paths, relative to the API root (`.../api`).
pub mod paths {
    use super::{ProjectId, TaskId};

    /// `projects`
    pub const PROJECTS: &str = "projects";

    /// `tasks`
    pub const TASKS: &str = "tasks";

    /// `projects/{id}`
    #[must_use]
    pub fn project(id: &ProjectId) -> String {
        format!("projects/{id}")
    }

    /// `tasks/{projectId}` (list). Same shape as [`task`].
    #[must_use]
    pub fn project_tasks(id: &ProjectId) -> String {
        format!("tasks/{id}")
    }

    /// `tasks/{id}` (patch, delete)
    #[must_use]
    pub fn task(id: &TaskId) -> String {
        format!("tasks/{id}")
    }
}
