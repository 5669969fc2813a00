//! In-memory document store for projects and tasks.
//!
//! The [`DocumentStore`] holds every project and task behind a single
//! [`RwLock`]. Projects own their tasks: deleting a project removes all of
//! its tasks in the same critical section, so no task ever outlives its
//! project.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use protasker_proto::project::{CreateProjectRequest, Project, ProjectId, ProjectStatus, UserId};
use protasker_proto::task::{CreateTaskRequest, Task, TaskId, TaskStatus};
use tokio::sync::RwLock;

/// A stored document plus its insertion sequence.
///
/// The sequence breaks ties between documents created within the same
/// millisecond so that newest-first listings are stable.
#[derive(Debug, Clone)]
struct Stored<T> {
    doc: T,
    seq: u64,
}

#[derive(Debug, Default)]
struct Collections {
    projects: HashMap<ProjectId, Stored<Project>>,
    tasks: HashMap<TaskId, Stored<Task>>,
    next_seq: u64,
}

impl Collections {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Thread-safe in-memory project/task store.
pub struct DocumentStore {
    inner: RwLock<Collections>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the current timestamp in milliseconds since epoch.
fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}

/// Sorts stored documents newest-first and strips the bookkeeping.
fn newest_first<T: Clone>(mut docs: Vec<&Stored<T>>, created_at: impl Fn(&T) -> u64) -> Vec<T> {
    docs.sort_by(|a, b| {
        created_at(&b.doc)
            .cmp(&created_at(&a.doc))
            .then(b.seq.cmp(&a.seq))
    });
    docs.into_iter().map(|s| s.doc.clone()).collect()
}

impl DocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    /// Creates a project owned by `owner`, who also becomes its only member.
    pub async fn create_project(&self, owner: &UserId, req: CreateProjectRequest) -> Project {
        let project = Project {
            id: ProjectId::new(),
            title: req.title,
            description: req.description,
            owner: owner.clone(),
            members: vec![owner.clone()],
            status: ProjectStatus::Active,
            created_at: now_ms(),
        };
        let mut inner = self.inner.write().await;
        let seq = inner.bump();
        inner.projects.insert(
            project.id.clone(),
            Stored {
                doc: project.clone(),
                seq,
            },
        );
        project
    }

    /// Lists the projects `user` is a member of, newest first.
    pub async fn list_projects_for(&self, user: &UserId) -> Vec<Project> {
        let inner = self.inner.read().await;
        let visible = inner
            .projects
            .values()
            .filter(|p| p.doc.is_member(user))
            .collect();
        newest_first(visible, |p| p.created_at)
    }

    /// Looks up a project by id.
    pub async fn get_project(&self, id: &ProjectId) -> Option<Project> {
        let inner = self.inner.read().await;
        inner.projects.get(id).map(|p| p.doc.clone())
    }

    /// Deletes a project together with all of its tasks.
    ///
    /// Returns the number of tasks removed, or `None` if the project did not
    /// exist.
    pub async fn delete_project(&self, id: &ProjectId) -> Option<usize> {
        let mut inner = self.inner.write().await;
        inner.projects.remove(id)?;
        let before = inner.tasks.len();
        inner.tasks.retain(|_, t| t.doc.project_id != *id);
        Some(before - inner.tasks.len())
    }

    /// Creates a task in the `todo` column.
    ///
    /// Returns `None` if the project does not exist; the caller is expected
    /// to have checked membership already.
    pub async fn create_task(&self, req: CreateTaskRequest) -> Option<Task> {
        let mut inner = self.inner.write().await;
        if !inner.projects.contains_key(&req.project_id) {
            return None;
        }
        let task = Task {
            id: TaskId::new(),
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            status: TaskStatus::Todo,
            priority: req.priority,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
            created_at: now_ms(),
        };
        let seq = inner.bump();
        inner.tasks.insert(
            task.id.clone(),
            Stored {
                doc: task.clone(),
                seq,
            },
        );
        Some(task)
    }

    /// Lists the tasks of a project, newest first.
    pub async fn list_tasks(&self, project_id: &ProjectId) -> Vec<Task> {
        let inner = self.inner.read().await;
        let tasks = inner
            .tasks
            .values()
            .filter(|t| t.doc.project_id == *project_id)
            .collect();
        newest_first(tasks, |t| t.created_at)
    }

    /// Looks up a task by id.
    pub async fn get_task(&self, id: &TaskId) -> Option<Task> {
        let inner = self.inner.read().await;
        inner.tasks.get(id).map(|t| t.doc.clone())
    }

    /// Moves a task to another column, returning the updated task.
    pub async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Option<Task> {
        let mut inner = self.inner.write().await;
        let stored = inner.tasks.get_mut(id)?;
        stored.doc.status = status;
        Some(stored.doc.clone())
    }

    /// Deletes a task, returning it if it existed.
    pub async fn delete_task(&self, id: &TaskId) -> Option<Task> {
        let mut inner = self.inner.write().await;
        inner.tasks.remove(id).map(|t| t.doc)
    }

    /// Number of stored tasks across all projects.
    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }
}
