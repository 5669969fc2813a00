//! REST routes for projects and tasks.
//!
//! Every route except `/health` requires a bearer token (see
//! [`crate::auth`]). Errors are always returned as an [`ErrorBody`] JSON
//! document.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use protasker_proto::api::{ErrorBody, validate_title};
use protasker_proto::project::{CreateProjectRequest, Project, ProjectId, UserId};
use protasker_proto::task::{CreateTaskRequest, Task, TaskId, UpdateStatusRequest};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthUser, TokenTable};
use crate::store::DocumentStore;

/// Shared state handed to every handler.
pub struct AppState {
    /// Project and task documents.
    pub store: DocumentStore,
    /// Known bearer tokens.
    pub tokens: TokenTable,
}

impl AppState {
    /// Creates state with an empty store and the given tokens.
    #[must_use]
    pub fn new(tokens: TokenTable) -> Self {
        Self {
            store: DocumentStore::new(),
            tokens,
        }
    }
}

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller may not act on the resource.
    #[error("{0}")]
    Unauthorized(String),
    /// Resource does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Request body failed validation.
    #[error("{0}")]
    BadRequest(String),
    /// Unexpected server fault.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

type SharedState = Arc<AppState>;

/// Body returned by the delete routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted {
    msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_tasks: Option<usize>,
}

// ── Router ────────────────────────────────────────────────────────────

/// Builds the API router without state.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/{id}", delete(delete_project))
        .route("/api/tasks", axum::routing::post(create_task))
        .route(
            "/api/tasks/{id}",
            get(list_tasks).patch(update_task_status).delete(delete_task),
        )
        .route("/health", get(health_check))
}

/// Builds the full application: routes, state, and CORS.
pub fn app(state: SharedState) -> Router {
    api_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// ── Helpers ───────────────────────────────────────────────────────────

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("{what} not found")))
}

/// Loads a project the caller is a member of.
async fn member_project(
    state: &AppState,
    id: &ProjectId,
    user: &UserId,
) -> Result<Project, ApiError> {
    let project = state
        .store
        .get_project(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    if !project.is_member(user) {
        return Err(ApiError::Unauthorized("User not authorized".to_string()));
    }
    Ok(project)
}

/// Loads a task whose project the caller is a member of.
async fn member_task(state: &AppState, id: &TaskId, user: &UserId) -> Result<Task, ApiError> {
    let task = state
        .store
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let authorized = state
        .store
        .get_project(&task.project_id)
        .await
        .is_some_and(|p| p.is_member(user));
    if !authorized {
        return Err(ApiError::Unauthorized("User not authorized".to_string()));
    }
    Ok(task)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_projects(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Json<Vec<Project>> {
    Json(state.store.list_projects_for(&user).await)
}

async fn create_project(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(req) = payload?;
    validate_title(&req.title).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let project = state.store.create_project(&user, req).await;
    tracing::info!(project_id = %project.id, owner = %user, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

async fn delete_project(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id: ProjectId = parse_id(&id, "Project")?;
    member_project(&state, &id, &user).await?;
    let removed = state
        .store
        .delete_project(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    tracing::info!(project_id = %id, removed_tasks = removed, "project deleted");
    Ok(Json(Deleted {
        msg: "Project deleted",
        deleted_tasks: Some(removed),
    }))
}

async fn create_task(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(req) = payload?;
    validate_title(&req.title).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let allowed = state
        .store
        .get_project(&req.project_id)
        .await
        .is_some_and(|p| p.is_member(&user));
    if !allowed {
        return Err(ApiError::Unauthorized(
            "Not authorized to add tasks to this project".to_string(),
        ));
    }

    // The project can vanish between the check and the insert.
    let task = state
        .store
        .create_task(req)
        .await
        .ok_or_else(|| ApiError::Internal("Project disappeared".to_string()))?;
    tracing::info!(task_id = %task.id, project_id = %task.project_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "Project")?;
    member_project(&state, &project_id, &user).await?;
    Ok(Json(state.store.list_tasks(&project_id).await))
}

async fn update_task_status(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id: TaskId = parse_id(&id, "Task")?;
    let Json(req) = payload?;
    let before = member_task(&state, &id, &user).await?;
    let task = state
        .store
        .update_task_status(&id, req.status)
        .await
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    tracing::debug!(task_id = %id, from = %before.status, to = %task.status, "task status updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id: TaskId = parse_id(&id, "Task")?;
    member_task(&state, &id, &user).await?;
    state
        .store
        .delete_task(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    tracing::info!(task_id = %id, "task deleted");
    Ok(Json(Deleted {
        msg: "Task removed",
        deleted_tasks: None,
    }))
}

// ── Server ────────────────────────────────────────────────────────────

/// Starts the API server with fresh state and the given tokens.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    tokens: TokenTable,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(AppState::new(tokens))).await
}

/// Starts the API server with pre-built [`AppState`].
///
/// Returns the bound address (useful when binding port 0) and the join
/// handle of the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: SharedState,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;
    let router = app(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "api server error");
        }
    });

    Ok((bound_addr, handle))
}
