//! HTTP implementation of [`TaskStore`] over the `ProTasker` REST API.

use std::time::Duration;

use protasker_proto::api::{ErrorBody, paths};
use protasker_proto::project::{CreateProjectRequest, Project, ProjectId};
use protasker_proto::task::{CreateTaskRequest, Task, TaskId, TaskStatus, UpdateStatusRequest};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::session::Session;
use crate::store::{StoreError, TaskStore};

/// Errors building an [`HttpTaskStore`].
#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    /// The API root is not a valid absolute URL.
    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API root cannot carry a path (e.g. `mailto:`).
    #[error("API url cannot be a base: {0}")]
    NotABase(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Talks to the REST API rooted at a base URL such as
/// `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpTaskStore {
    /// Creates a store for the API rooted at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpStoreError`] if the URL is invalid or the client cannot
    /// be built.
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, HttpStoreError> {
        let mut base = Url::parse(api_url)?;
        if base.cannot_be_a_base() {
            return Err(HttpStoreError::NotABase(api_url.to_string()));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpStoreError::Client(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// The normalised API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session: &Session,
    ) -> Result<RequestBuilder, StoreError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| StoreError::Network(format!("bad request url {path}: {e}")))?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(session.token()))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let msg = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.msg)
            .unwrap_or(text);
        tracing::debug!(status = status.as_u16(), %msg, "api call failed");
        Err(map_status(status, msg))
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, StoreError> {
        Self::send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Maps a non-2xx status to the error the rest of the client reasons about.
fn map_status(status: StatusCode, msg: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(msg),
        StatusCode::NOT_FOUND => StoreError::NotFound(msg),
        other => StoreError::Rejected {
            status: other.as_u16(),
            msg,
        },
    }
}

impl TaskStore for HttpTaskStore {
    async fn list_projects(&self, session: &Session) -> Result<Vec<Project>, StoreError> {
        let req = self.request(Method::GET, paths::PROJECTS, session)?;
        Self::send_json(req).await
    }

    async fn create_project(
        &self,
        session: &Session,
        req: &CreateProjectRequest,
    ) -> Result<Project, StoreError> {
        let builder = self.request(Method::POST, paths::PROJECTS, session)?.json(req);
        Self::send_json(builder).await
    }

    async fn delete_project(&self, session: &Session, id: &ProjectId) -> Result<(), StoreError> {
        let req = self.request(Method::DELETE, &paths::project(id), session)?;
        Self::send(req).await.map(|_| ())
    }

    async fn list_tasks(
        &self,
        session: &Session,
        project: &ProjectId,
    ) -> Result<Vec<Task>, StoreError> {
        let req = self.request(Method::GET, &paths::project_tasks(project), session)?;
        Self::send_json(req).await
    }

    async fn create_task(
        &self,
        session: &Session,
        req: &CreateTaskRequest,
    ) -> Result<Task, StoreError> {
        let builder = self.request(Method::POST, paths::TASKS, session)?.json(req);
        Self::send_json(builder).await
    }

    async fn update_status(
        &self,
        session: &Session,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let builder = self
            .request(Method::PATCH, &paths::task(id), session)?
            .json(&UpdateStatusRequest { status });
        Self::send_json(builder).await
    }

    async fn delete_task(&self, session: &Session, id: &TaskId) -> Result<(), StoreError> {
        let req = self.request(Method::DELETE, &paths::task(id), session)?;
        Self::send(req).await.map(|_| ())
    }
}
