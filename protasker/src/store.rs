//! Task store abstraction.
//!
//! Defines the [`TaskStore`] trait that every backend must satisfy. The
//! production implementation is [`crate::http::HttpTaskStore`]; tests use
//! in-process fakes or a real server bound to a loopback port.

use protasker_proto::project::{CreateProjectRequest, Project, ProjectId};
use protasker_proto::task::{CreateTaskRequest, Task, TaskId, TaskStatus};

use crate::session::Session;

/// Errors a store call can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The session is missing, expired, or not allowed to act.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The addressed task or project does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server refused the request for another reason.
    #[error("request rejected ({status}): {msg}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided reason.
        msg: String,
    },

    /// The server could not be reached or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether this error means the session must be discarded.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Async access to persisted projects and tasks.
///
/// Every call carries the caller's [`Session`]; implementations never
/// cache credentials.
pub trait TaskStore: Send + Sync {
    /// Lists the caller's projects, newest first.
    fn list_projects(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Vec<Project>, StoreError>> + Send;

    /// Creates a project owned by the caller.
    fn create_project(
        &self,
        session: &Session,
        req: &CreateProjectRequest,
    ) -> impl std::future::Future<Output = Result<Project, StoreError>> + Send;

    /// Deletes a project and all of its tasks.
    fn delete_project(
        &self,
        session: &Session,
        id: &ProjectId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Lists a project's tasks, newest first.
    fn list_tasks(
        &self,
        session: &Session,
        project: &ProjectId,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Creates a task. The server places it in `todo`.
    fn create_task(
        &self,
        session: &Session,
        req: &CreateTaskRequest,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Sets a task's status.
    fn update_status(
        &self,
        session: &Session,
        id: &TaskId,
        status: TaskStatus,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Deletes a task.
    fn delete_task(
        &self,
        session: &Session,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
