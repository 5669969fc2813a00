//! Shared in-memory task store for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use protasker::session::Session;
use protasker::store::{StoreError, TaskStore};
use protasker_proto::project::{CreateProjectRequest, Project, ProjectId, ProjectStatus, UserId};
use protasker_proto::task::{CreateTaskRequest, Priority, Task, TaskId, TaskStatus};

#[derive(Default)]
struct FakeState {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    clock: u64,
    fail_updates: usize,
    fail_lists: usize,
    expired: bool,
    update_calls: Vec<(TaskId, TaskStatus)>,
    list_calls: usize,
}

/// A `TaskStore` that keeps everything in memory and can be told to fail.
///
/// Clones share state, so a test can keep a handle after giving one away.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project and returns it.
    pub fn add_project(&self, title: &str) -> Project {
        let mut state = self.state.lock();
        state.clock += 1;
        let project = Project {
            id: ProjectId::new(),
            title: title.to_string(),
            description: None,
            owner: UserId::new("alice"),
            members: vec![UserId::new("alice")],
            status: ProjectStatus::Active,
            created_at: state.clock,
        };
        state.projects.push(project.clone());
        project
    }

    /// Adds a task with the given status and returns it.
    pub fn add_task(&self, project: &ProjectId, title: &str, status: TaskStatus) -> Task {
        let mut state = self.state.lock();
        state.clock += 1;
        let task = Task {
            id: TaskId::new(),
            project_id: project.clone(),
            title: title.to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            assigned_to: None,
            due_date: None,
            created_at: state.clock,
        };
        state.tasks.push(task.clone());
        task
    }

    pub fn fail_next_updates(&self, n: usize) {
        self.state.lock().fail_updates = n;
    }

    pub fn fail_next_lists(&self, n: usize) {
        self.state.lock().fail_lists = n;
    }

    /// Makes every following call answer 401.
    pub fn expire_session(&self) {
        self.state.lock().expired = true;
    }

    /// Server-side view of a project's tasks, newest first.
    pub fn tasks(&self, project: &ProjectId) -> Vec<Task> {
        let state = self.state.lock();
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.project_id == *project)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    pub fn status_of(&self, id: &TaskId) -> Option<TaskStatus> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| t.id == *id)
            .map(|t| t.status)
    }

    pub fn update_calls(&self) -> Vec<(TaskId, TaskStatus)> {
        self.state.lock().update_calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.state.lock().expired {
            return Err(StoreError::Unauthorized("Token is not valid".to_string()));
        }
        Ok(())
    }
}

impl TaskStore for FakeStore {
    async fn list_projects(&self, _session: &Session) -> Result<Vec<Project>, StoreError> {
        self.check()?;
        Ok(self.state.lock().projects.clone())
    }

    async fn create_project(
        &self,
        _session: &Session,
        req: &CreateProjectRequest,
    ) -> Result<Project, StoreError> {
        self.check()?;
        let mut project = self.add_project(&req.title);
        project.description.clone_from(&req.description);
        Ok(project)
    }

    async fn delete_project(&self, _session: &Session, id: &ProjectId) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        let before = state.projects.len();
        state.projects.retain(|p| p.id != *id);
        if state.projects.len() == before {
            return Err(StoreError::NotFound("Project not found".to_string()));
        }
        state.tasks.retain(|t| t.project_id != *id);
        Ok(())
    }

    async fn list_tasks(
        &self,
        _session: &Session,
        project: &ProjectId,
    ) -> Result<Vec<Task>, StoreError> {
        self.check()?;
        {
            let mut state = self.state.lock();
            state.list_calls += 1;
            if state.fail_lists > 0 {
                state.fail_lists -= 1;
                return Err(StoreError::Network("connection reset".to_string()));
            }
        }
        Ok(self.tasks(project))
    }

    async fn create_task(
        &self,
        _session: &Session,
        req: &CreateTaskRequest,
    ) -> Result<Task, StoreError> {
        self.check()?;
        let mut task = self.add_task(&req.project_id, &req.title, TaskStatus::Todo);
        task.priority = req.priority;
        let mut state = self.state.lock();
        if let Some(stored) = state.tasks.iter_mut().find(|t| t.id == task.id) {
            stored.priority = req.priority;
        }
        Ok(task)
    }

    async fn update_status(
        &self,
        _session: &Session,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        state.update_calls.push((id.clone(), status));
        if state.fail_updates > 0 {
            state.fail_updates -= 1;
            return Err(StoreError::Rejected {
                status: 500,
                msg: "Server Error".to_string(),
            });
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| StoreError::NotFound("Task not found".to_string()))?;
        task.status = status;
        Ok(task.clone())
    }

    async fn delete_task(&self, _session: &Session, id: &TaskId) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != *id);
        if state.tasks.len() == before {
            return Err(StoreError::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}
