//! Networking coordinator for wiring the TUI to the async task store.
//!
//! This module bridges the synchronous TUI event loop (crossterm poll-based)
//! with an async [`TaskStore`]. A background tokio task receives
//! [`NetCommand`]s and answers each with one [`NetEvent`].
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── NetEvent ───  tokio background tasks
//!                     ─── NetCommand →
//! ```
//!
//! Each command runs in its own task, so a slow request never delays the
//! next one. Requests are not cancellable; results arrive in completion
//! order and carry enough context (tickets, ids) to be applied out of order.

use std::sync::Arc;

use protasker_proto::project::{CreateProjectRequest, Project, ProjectId};
use protasker_proto::task::{CreateTaskRequest, Task, TaskId};
use tokio::sync::mpsc;

use crate::reconcile::{MoveTicket, ResyncTicket};
use crate::session::Session;
use crate::store::{StoreError, TaskStore};

/// Commands sent from the TUI main loop to the networking background task.
#[derive(Debug)]
pub enum NetCommand {
    /// Fetch the caller's projects.
    LoadProjects {
        /// Credentials.
        session: Session,
    },
    /// Create a project.
    CreateProject {
        /// Credentials.
        session: Session,
        /// Title and description.
        req: CreateProjectRequest,
    },
    /// Delete a project and its tasks.
    DeleteProject {
        /// Credentials.
        session: Session,
        /// Project to delete.
        id: ProjectId,
    },
    /// Fetch a project's tasks for opening its board.
    LoadTasks {
        /// Credentials.
        session: Session,
        /// Project to load.
        project_id: ProjectId,
        /// Latest move sequence when the list was requested.
        issued_at_seq: u64,
    },
    /// Create a task.
    CreateTask {
        /// Credentials.
        session: Session,
        /// Task fields.
        req: CreateTaskRequest,
    },
    /// Persist an optimistic status change.
    UpdateStatus {
        /// Credentials.
        session: Session,
        /// The move being persisted.
        ticket: MoveTicket,
    },
    /// Reload the board after a failed status change.
    Resync {
        /// Credentials.
        session: Session,
        /// The reload being performed.
        ticket: ResyncTicket,
    },
    /// Delete a task.
    DeleteTask {
        /// Credentials.
        session: Session,
        /// Task to delete.
        id: TaskId,
    },
    /// Gracefully shut down the networking task.
    Shutdown,
}

/// Events sent from the networking background tasks to the TUI main loop.
#[derive(Debug)]
pub enum NetEvent {
    /// Answer to [`NetCommand::LoadProjects`].
    ProjectsLoaded(Result<Vec<Project>, StoreError>),
    /// Answer to [`NetCommand::CreateProject`].
    ProjectCreated(Result<Project, StoreError>),
    /// Answer to [`NetCommand::DeleteProject`].
    ProjectDeleted {
        /// The project that was targeted.
        id: ProjectId,
        /// Whether it worked.
        result: Result<(), StoreError>,
    },
    /// Answer to [`NetCommand::LoadTasks`].
    TasksLoaded {
        /// The project that was loaded.
        project_id: ProjectId,
        /// Copied from the request.
        issued_at_seq: u64,
        /// Its tasks, newest first.
        result: Result<Vec<Task>, StoreError>,
    },
    /// Answer to [`NetCommand::CreateTask`].
    TaskCreated(Result<Task, StoreError>),
    /// Answer to [`NetCommand::UpdateStatus`].
    StatusPersisted {
        /// The move this result belongs to.
        ticket: MoveTicket,
        /// The stored task on success.
        result: Result<Task, StoreError>,
    },
    /// Answer to [`NetCommand::Resync`].
    Resynced {
        /// The reload this result belongs to.
        ticket: ResyncTicket,
        /// The server's task list.
        result: Result<Vec<Task>, StoreError>,
    },
    /// Answer to [`NetCommand::DeleteTask`].
    TaskDeleted {
        /// The task that was targeted.
        id: TaskId,
        /// Whether it worked.
        result: Result<(), StoreError>,
    },
}

/// Configuration for the networking layer.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,
}

/// Default channel capacity for commands and events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Spawn the networking background task and return channel handles.
///
/// Must be called from within a tokio runtime.
pub fn spawn_net<S>(store: S, config: &NetConfig) -> (mpsc::Sender<NetCommand>, mpsc::Receiver<NetEvent>)
where
    S: TaskStore + 'static,
{
    let capacity = config.channel_capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<NetCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<NetEvent>(capacity);

    tokio::spawn(command_handler(Arc::new(store), cmd_rx, evt_tx));

    (cmd_tx, evt_rx)
}

/// Background task: dispatch each command to its own task.
async fn command_handler<S>(
    store: Arc<S>,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    evt_tx: mpsc::Sender<NetEvent>,
) where
    S: TaskStore + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        if matches!(cmd, NetCommand::Shutdown) {
            tracing::info!("net command handler shutting down");
            break;
        }
        let store = Arc::clone(&store);
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            let Some(event) = execute(store.as_ref(), cmd).await else {
                return;
            };
            if evt_tx.send(event).await.is_err() {
                tracing::debug!("TUI dropped event receiver");
            }
        });
    }
}

/// Runs one command against the store.
async fn execute<S: TaskStore>(store: &S, cmd: NetCommand) -> Option<NetEvent> {
    let event = match cmd {
        NetCommand::LoadProjects { session } => {
            NetEvent::ProjectsLoaded(store.list_projects(&session).await)
        }
        NetCommand::CreateProject { session, req } => {
            NetEvent::ProjectCreated(store.create_project(&session, &req).await)
        }
        NetCommand::DeleteProject { session, id } => {
            let result = store.delete_project(&session, &id).await;
            NetEvent::ProjectDeleted { id, result }
        }
        NetCommand::LoadTasks {
            session,
            project_id,
            issued_at_seq,
        } => {
            let result = store.list_tasks(&session, &project_id).await;
            NetEvent::TasksLoaded {
                project_id,
                issued_at_seq,
                result,
            }
        }
        NetCommand::CreateTask { session, req } => {
            NetEvent::TaskCreated(store.create_task(&session, &req).await)
        }
        NetCommand::UpdateStatus { session, ticket } => {
            let result = store
                .update_status(&session, ticket.task_id(), ticket.target())
                .await;
            NetEvent::StatusPersisted { ticket, result }
        }
        NetCommand::Resync { session, ticket } => {
            let result = store.list_tasks(&session, ticket.project_id()).await;
            NetEvent::Resynced { ticket, result }
        }
        NetCommand::DeleteTask { session, id } => {
            let result = store.delete_task(&session, &id).await;
            NetEvent::TaskDeleted { id, result }
        }
        NetCommand::Shutdown => return None,
    };
    Some(event)
}
