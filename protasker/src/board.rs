//! Board state: the open project's tasks, partitioned into status columns.
//!
//! [`BoardState`] is the single source of truth the UI renders from. It
//! never talks to the network; the reconciler and the app mutate it in
//! response to user actions and store results.

use std::collections::HashSet;

use protasker_proto::project::ProjectId;
use protasker_proto::task::{Task, TaskId, TaskStatus};

/// One rendered column: a status and its tasks in display order.
#[derive(Debug)]
pub struct Column<'a> {
    /// The status every task in this column has.
    pub status: TaskStatus,
    /// Tasks in creation order, newest first, after filtering.
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    /// Number of visible tasks in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is visible in the column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// In-memory task set of the open project.
#[derive(Debug, Default, Clone)]
pub struct BoardState {
    project_id: Option<ProjectId>,
    /// Newest first. Ids are unique.
    tasks: Vec<Task>,
    filter: String,
}

impl BoardState {
    /// Creates an empty board with no project open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to another project, dropping every task and the filter.
    pub fn open(&mut self, project_id: ProjectId) {
        self.project_id = Some(project_id);
        self.tasks.clear();
        self.filter.clear();
    }

    /// Closes the board.
    pub fn close(&mut self) {
        self.project_id = None;
        self.tasks.clear();
        self.filter.clear();
    }

    /// The project this board shows.
    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Replaces the whole task set.
    ///
    /// Tasks are ordered newest first by `created_at`; equal timestamps keep
    /// their incoming order. A repeated id keeps only its first occurrence.
    pub fn load(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.tasks = tasks;
    }

    /// Moves one task to `status`.
    ///
    /// Returns `false` when the task is unknown or already has that status.
    pub fn apply_status(&mut self, id: &TaskId, status: TaskStatus) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == *id) {
            Some(task) if task.status != status => {
                task.status = status;
                true
            }
            _ => false,
        }
    }

    /// Removes one task, returning it.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == *id)?;
        Some(self.tasks.remove(idx))
    }

    /// Adds a freshly created task at the front.
    ///
    /// A task with the same id is replaced.
    pub fn insert(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
    }

    /// Looks up a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Current status of a task.
    #[must_use]
    pub fn status_of(&self, id: &TaskId) -> Option<TaskStatus> {
        self.get(id).map(|t| t.status)
    }

    /// All tasks, newest first, ignoring the filter.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks, ignoring the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the board holds no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Sets the search filter. Blank clears it.
    pub fn set_filter(&mut self, query: &str) {
        query.trim().clone_into(&mut self.filter);
    }

    /// The active search filter (empty when none).
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn matches(&self, task: &Task) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        task.title.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// The four columns in fixed status order.
    #[must_use]
    pub fn columns(&self) -> [Column<'_>; 4] {
        TaskStatus::ALL.map(|status| Column {
            status,
            tasks: self
                .tasks
                .iter()
                .filter(|t| t.status == status && self.matches(t))
                .collect(),
        })
    }
}
