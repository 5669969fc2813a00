//! Application state and event handling.
//!
//! [`App`] owns everything the UI renders. Input handlers never block: any
//! work that needs the server is returned as a [`NetCommand`] for the
//! caller to dispatch, and the answer comes back through
//! [`App::apply_net_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use protasker_proto::api::validate_title;
use protasker_proto::project::{CreateProjectRequest, Project, ProjectId};
use protasker_proto::task::{CreateTaskRequest, Priority, TaskId, TaskStatus};
use ratatui::layout::Rect;

use crate::board::BoardState;
use crate::drag::{DragController, DragOutcome, MoveIntent, Point};
use crate::net::{NetCommand, NetEvent};
use crate::reconcile::{PersistOutcome, Reconciler, ResyncOutcome};
use crate::session::{AuthState, Session};
use crate::store::StoreError;
use crate::ui::layout::{self, BoardLayout};

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The project list.
    Projects,
    /// A project's board.
    Board,
}

/// Input field of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    /// Title line.
    #[default]
    Title,
    /// Description line.
    Description,
    /// Priority selector (task form only).
    Priority,
}

/// "New project" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Focused field.
    pub field: FormField,
    /// Validation message from the last submit.
    pub error: Option<String>,
}

/// "New task" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Selected priority.
    pub priority: Priority,
    /// Focused field.
    pub field: FormField,
    /// Validation message from the last submit.
    pub error: Option<String>,
}

/// What a delete confirmation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A project and all of its tasks.
    Project {
        /// Project id.
        id: ProjectId,
        /// Shown in the dialog.
        title: String,
    },
    /// A single task.
    Task {
        /// Task id.
        id: TaskId,
        /// Shown in the dialog.
        title: String,
    },
}

impl DeleteTarget {
    /// The question asked.
    #[must_use]
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::Project { .. } => "Delete project and all its tasks?",
            Self::Task { .. } => "Delete Task?",
        }
    }
}

/// The overlay currently capturing input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    /// No overlay.
    #[default]
    None,
    /// Creating a project.
    NewProject(ProjectForm),
    /// Creating a task on the open board.
    NewTask(TaskForm),
    /// Waiting for a yes/no on a delete.
    ConfirmDelete(DeleteTarget),
    /// Editing the board search filter.
    Search,
    /// A blocking message that must be dismissed.
    Notice(String),
}

/// Main application state.
pub struct App {
    /// Current credentials.
    pub auth: AuthState,
    /// Active screen.
    pub view: View,
    /// The caller's projects, in server order plus newly created at the end.
    pub projects: Vec<Project>,
    /// Index into `projects`.
    pub selected_project: usize,
    /// The open project's tasks.
    pub board: BoardState,
    /// The selected card, if any.
    pub selected_task: Option<TaskId>,
    /// Mouse drag gesture.
    pub drag: DragController,
    /// Optimistic status bookkeeping.
    pub reconciler: Reconciler,
    /// Overlay capturing input.
    pub modal: Modal,
    /// Raw search input; the board holds the trimmed filter.
    pub search: String,
    /// Whether a list request is outstanding.
    pub loading: bool,
    /// Transient, non-blocking status line text.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// chrono format for due dates.
    pub date_format: String,
    viewport: Rect,
}

impl App {
    /// Creates the app for the given session state.
    #[must_use]
    pub fn new(auth: AuthState, drag_activation_distance: f64) -> Self {
        Self {
            auth,
            view: View::Projects,
            projects: Vec::new(),
            selected_project: 0,
            board: BoardState::new(),
            selected_task: None,
            drag: DragController::new(drag_activation_distance),
            reconciler: Reconciler::new(),
            modal: Modal::None,
            search: String::new(),
            loading: false,
            status: None,
            should_quit: false,
            date_format: "%b %d".to_string(),
            viewport: Rect::default(),
        }
    }

    /// Sets the due date format.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// The first request to send after start-up.
    pub fn startup_command(&mut self) -> Option<NetCommand> {
        let session = self.session()?;
        self.loading = true;
        Some(NetCommand::LoadProjects { session })
    }

    /// Records the terminal area so mouse hit-testing matches the last frame.
    pub const fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    /// The terminal area last drawn.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    fn session(&self) -> Option<Session> {
        self.auth.session().cloned()
    }

    /// The project whose board is open.
    #[must_use]
    pub fn open_project(&self) -> Option<&Project> {
        let id = self.board.project_id()?;
        self.projects.iter().find(|p| p.id == *id)
    }

    /// Card and column geometry for the current viewport.
    #[must_use]
    pub fn board_layout(&self) -> BoardLayout {
        let (content, _) = layout::screen(self.viewport);
        layout::board_layout(content, &self.board)
    }

    // ── Keyboard ──────────────────────────────────────────────────────

    /// Handle a key press.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<NetCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }
        if self.modal != Modal::None {
            return self.handle_modal_key(key);
        }
        if !self.auth.is_authenticated() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return None;
        }
        match self.view {
            View::Projects => self.handle_projects_key(key),
            View::Board => self.handle_board_key(key),
        }
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_project = self.selected_project.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_project + 1 < self.projects.len() {
                    self.selected_project += 1;
                }
            }
            KeyCode::Enter => return self.open_selected_project(),
            KeyCode::Char('n') => self.modal = Modal::NewProject(ProjectForm::default()),
            KeyCode::Char('d') => {
                if let Some(p) = self.projects.get(self.selected_project) {
                    self.modal = Modal::ConfirmDelete(DeleteTarget::Project {
                        id: p.id.clone(),
                        title: p.title.clone(),
                    });
                }
            }
            KeyCode::Char('r') => return self.startup_command(),
            KeyCode::Char('L') => self.logout(None),
            _ => {}
        }
        None
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc if self.drag.cancel() => {}
            KeyCode::Esc => self.close_board(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left if shift => return self.move_selected(TaskStatus::prev),
            KeyCode::Right if shift => return self.move_selected(TaskStatus::next),
            KeyCode::Char('<') => return self.move_selected(TaskStatus::prev),
            KeyCode::Char('>') => return self.move_selected(TaskStatus::next),
            KeyCode::Left | KeyCode::Char('h') => self.select_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.select_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_row(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_row(1),
            KeyCode::Char('n') => self.modal = Modal::NewTask(TaskForm::default()),
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task.as_ref().and_then(|id| self.board.get(id)) {
                    self.modal = Modal::ConfirmDelete(DeleteTarget::Task {
                        id: task.id.clone(),
                        title: task.title.clone(),
                    });
                }
            }
            KeyCode::Char('/') => self.modal = Modal::Search,
            KeyCode::Char('r') => return self.reload_board(),
            _ => {}
        }
        None
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<NetCommand> {
        match std::mem::take(&mut self.modal) {
            Modal::None => None,
            Modal::Notice(msg) => {
                if !matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.modal = Modal::Notice(msg);
                }
                None
            }
            Modal::ConfirmDelete(target) => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => self.confirm_delete(target),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => None,
                _ => {
                    self.modal = Modal::ConfirmDelete(target);
                    None
                }
            },
            Modal::Search => {
                match key.code {
                    KeyCode::Esc => self.search.clear(),
                    KeyCode::Enter => {}
                    KeyCode::Backspace => {
                        self.search.pop();
                        self.modal = Modal::Search;
                    }
                    KeyCode::Char(c) => {
                        self.search.push(c);
                        self.modal = Modal::Search;
                    }
                    _ => self.modal = Modal::Search,
                }
                self.board.set_filter(&self.search);
                self.ensure_selection_visible();
                None
            }
            Modal::NewProject(mut form) => match key.code {
                KeyCode::Esc => None,
                KeyCode::Enter => self.submit_project(form),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                    form.field = match form.field {
                        FormField::Title => FormField::Description,
                        _ => FormField::Title,
                    };
                    self.modal = Modal::NewProject(form);
                    None
                }
                code => {
                    let target = match form.field {
                        FormField::Title => &mut form.title,
                        _ => &mut form.description,
                    };
                    edit_text(target, code);
                    self.modal = Modal::NewProject(form);
                    None
                }
            },
            Modal::NewTask(mut form) => match key.code {
                KeyCode::Esc => None,
                KeyCode::Enter => self.submit_task(form),
                KeyCode::Tab | KeyCode::Down => {
                    form.field = match form.field {
                        FormField::Title => FormField::Description,
                        FormField::Description => FormField::Priority,
                        FormField::Priority => FormField::Title,
                    };
                    self.modal = Modal::NewTask(form);
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form.field = match form.field {
                        FormField::Title => FormField::Priority,
                        FormField::Description => FormField::Title,
                        FormField::Priority => FormField::Description,
                    };
                    self.modal = Modal::NewTask(form);
                    None
                }
                code => {
                    match form.field {
                        FormField::Title => edit_text(&mut form.title, code),
                        FormField::Description => edit_text(&mut form.description, code),
                        FormField::Priority => {
                            if matches!(code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                                form.priority = form.priority.cycle();
                            }
                        }
                    }
                    self.modal = Modal::NewTask(form);
                    None
                }
            },
        }
    }

    // ── Mouse ─────────────────────────────────────────────────────────

    /// Handle a mouse event.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<NetCommand> {
        if self.modal != Modal::None || !self.auth.is_authenticated() {
            return None;
        }
        let at = Point::new(f64::from(mouse.column), f64::from(mouse.row));
        match self.view {
            View::Projects => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    let (content, _) = layout::screen(self.viewport);
                    let hit = layout::project_at(content, self.projects.len(), mouse.column, mouse.row);
                    if let Some(idx) = hit {
                        if idx == self.selected_project {
                            return self.open_selected_project();
                        }
                        self.selected_project = idx;
                    }
                }
                None
            }
            View::Board => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let geometry = self.board_layout();
                    for (status, rect) in TaskStatus::ALL.into_iter().zip(geometry.columns) {
                        self.drag.set_region(status, layout::to_drag_rect(rect));
                    }
                    if let Some(slot) = geometry.card_at(mouse.column, mouse.row) {
                        self.drag.pointer_down(
                            slot.task_id.clone(),
                            slot.status,
                            layout::to_drag_rect(slot.rect),
                            at,
                        );
                    }
                    None
                }
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    self.drag.pointer_move(at);
                    None
                }
                MouseEventKind::Up(MouseButton::Left) => match self.drag.pointer_up(at) {
                    DragOutcome::Moved(intent) => {
                        self.selected_task = Some(intent.task_id.clone());
                        self.move_task(&intent)
                    }
                    DragOutcome::Clicked(id) => {
                        self.selected_task = Some(id);
                        None
                    }
                    DragOutcome::Dropped | DragOutcome::Ignored => None,
                },
                _ => None,
            },
        }
    }

    /// Abandons any drag in progress (focus lost).
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // ── Actions ───────────────────────────────────────────────────────

    /// Applies a move optimistically and returns the request persisting it.
    pub fn move_task(&mut self, intent: &MoveIntent) -> Option<NetCommand> {
        let session = self.session()?;
        let ticket = self.reconciler.begin(&mut self.board, intent)?;
        Some(NetCommand::UpdateStatus { session, ticket })
    }

    fn move_selected(&mut self, step: fn(TaskStatus) -> Option<TaskStatus>) -> Option<NetCommand> {
        let id = self.selected_task.clone()?;
        let from = self.board.status_of(&id)?;
        let to = step(from)?;
        self.move_task(&MoveIntent {
            task_id: id,
            from,
            to,
        })
    }

    fn open_selected_project(&mut self) -> Option<NetCommand> {
        let session = self.session()?;
        let project_id = self.projects.get(self.selected_project)?.id.clone();
        self.drag.cancel();
        self.drag.clear_regions();
        self.reconciler.reset();
        self.board.open(project_id.clone());
        self.search.clear();
        self.selected_task = None;
        self.view = View::Board;
        self.loading = true;
        tracing::info!(project_id = %project_id, "opening board");
        Some(NetCommand::LoadTasks {
            session,
            project_id,
            issued_at_seq: self.reconciler.latest_seq(),
        })
    }

    fn reload_board(&mut self) -> Option<NetCommand> {
        let session = self.session()?;
        let project_id = self.board.project_id()?.clone();
        self.loading = true;
        Some(NetCommand::LoadTasks {
            session,
            project_id,
            issued_at_seq: self.reconciler.latest_seq(),
        })
    }

    fn close_board(&mut self) {
        self.drag.cancel();
        self.drag.clear_regions();
        self.reconciler.reset();
        self.board.close();
        self.search.clear();
        self.selected_task = None;
        self.view = View::Projects;
    }

    fn submit_project(&mut self, mut form: ProjectForm) -> Option<NetCommand> {
        if let Err(e) = validate_title(&form.title) {
            form.error = Some(e.to_string());
            self.modal = Modal::NewProject(form);
            return None;
        }
        let session = self.session()?;
        let description = form.description.trim();
        let req = CreateProjectRequest {
            title: form.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        };
        Some(NetCommand::CreateProject { session, req })
    }

    fn submit_task(&mut self, mut form: TaskForm) -> Option<NetCommand> {
        if let Err(e) = validate_title(&form.title) {
            form.error = Some(e.to_string());
            self.modal = Modal::NewTask(form);
            return None;
        }
        let session = self.session()?;
        let project_id = self.board.project_id()?.clone();
        let description = form.description.trim();
        let mut req = CreateTaskRequest::new(project_id, form.title.trim());
        req.description = (!description.is_empty()).then(|| description.to_string());
        req.priority = form.priority;
        Some(NetCommand::CreateTask { session, req })
    }

    fn confirm_delete(&mut self, target: DeleteTarget) -> Option<NetCommand> {
        let session = self.session()?;
        match target {
            DeleteTarget::Project { id, .. } => Some(NetCommand::DeleteProject { session, id }),
            DeleteTarget::Task { id, .. } => Some(NetCommand::DeleteTask { session, id }),
        }
    }

    /// Discards the session and returns to the logged-out screen.
    pub fn logout(&mut self, notice: Option<String>) {
        tracing::info!("session discarded");
        self.auth.logout();
        self.close_board();
        self.projects.clear();
        self.selected_project = 0;
        self.loading = false;
        self.modal = notice.map_or(Modal::None, Modal::Notice);
    }

    fn fail(&mut self, context: &str, err: &StoreError) {
        self.loading = false;
        if err.is_auth() {
            self.logout(Some("Session expired. Please log in again.".to_string()));
        } else {
            tracing::warn!(error = %err, "{context}");
            self.modal = Modal::Notice(format!("{context}: {err}"));
        }
    }

    fn next_resync(&mut self) -> Option<NetCommand> {
        let session = self.session()?;
        let ticket = self.reconciler.resync_due(&self.board)?;
        Some(NetCommand::Resync { session, ticket })
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Column and row of the selected card among visible cards.
    #[must_use]
    pub fn selected_position(&self) -> Option<(usize, usize)> {
        let id = self.selected_task.as_ref()?;
        self.board
            .columns()
            .iter()
            .enumerate()
            .find_map(|(c, col)| col.tasks.iter().position(|t| t.id == *id).map(|r| (c, r)))
    }

    fn select_first(&mut self) {
        self.selected_task = self
            .board
            .columns()
            .iter()
            .find_map(|col| col.tasks.first().map(|t| t.id.clone()));
    }

    fn ensure_selection_visible(&mut self) {
        if self.selected_position().is_none() {
            self.select_first();
        }
    }

    fn select_column(&mut self, dir: isize) {
        let Some((col, row)) = self.selected_position() else {
            self.select_first();
            return;
        };
        let columns = self.board.columns();
        let mut next = col;
        loop {
            let Some(candidate) = next.checked_add_signed(dir).filter(|c| *c < columns.len())
            else {
                return;
            };
            next = candidate;
            let tasks = &columns[next].tasks;
            if let Some(task) = tasks.get(row.min(tasks.len().saturating_sub(1))) {
                self.selected_task = Some(task.id.clone());
                return;
            }
        }
    }

    fn select_row(&mut self, dir: isize) {
        let Some((col, row)) = self.selected_position() else {
            self.select_first();
            return;
        };
        let columns = self.board.columns();
        let tasks = &columns[col].tasks;
        if let Some(task) = row.checked_add_signed(dir).and_then(|r| tasks.get(r)) {
            self.selected_task = Some(task.id.clone());
        }
    }

    /// Settles a command that never reached the networking task.
    ///
    /// A dropped status change still counts as failed so the reconciler
    /// does not wait on it forever.
    pub fn command_dropped(&mut self, cmd: NetCommand, reason: &str) {
        let err = StoreError::Network(reason.to_string());
        match cmd {
            NetCommand::UpdateStatus { ticket, .. } => {
                self.reconciler.complete(&ticket, Err(err));
            }
            NetCommand::Resync { ticket, .. } => {
                self.reconciler.resync_failed(&ticket, &err);
            }
            _ => {}
        }
        self.loading = false;
        self.status = Some(format!("{reason}, press r to reload"));
    }

    // ── Network results ───────────────────────────────────────────────

    /// Applies a result from the networking task.
    ///
    /// Returns a follow-up request when one is needed (a board reload).
    pub fn apply_net_event(&mut self, event: NetEvent) -> Option<NetCommand> {
        match event {
            NetEvent::ProjectsLoaded(Ok(projects)) => {
                self.loading = false;
                self.projects = projects;
                self.selected_project = self
                    .selected_project
                    .min(self.projects.len().saturating_sub(1));
                None
            }
            NetEvent::ProjectCreated(Ok(project)) => {
                self.status = Some(format!("Created project \"{}\"", project.title));
                self.projects.push(project);
                self.selected_project = self.projects.len() - 1;
                None
            }
            NetEvent::ProjectDeleted { id, result: Ok(()) } => {
                self.projects.retain(|p| p.id != id);
                self.selected_project = self
                    .selected_project
                    .min(self.projects.len().saturating_sub(1));
                if self.board.project_id() == Some(&id) {
                    self.close_board();
                }
                self.status = Some("Project deleted".to_string());
                None
            }
            NetEvent::TasksLoaded {
                project_id,
                issued_at_seq,
                result: Ok(tasks),
            } => {
                if self.board.project_id() != Some(&project_id) {
                    tracing::debug!(project_id = %project_id, "ignoring tasks for closed board");
                    return None;
                }
                if !self.reconciler.accept_list(issued_at_seq) {
                    return self.next_resync();
                }
                self.loading = false;
                self.board.load(tasks);
                self.ensure_selection_visible();
                None
            }
            NetEvent::TaskCreated(Ok(task)) => {
                if self.board.project_id() == Some(&task.project_id) {
                    self.selected_task = Some(task.id.clone());
                    self.board.insert(task);
                }
                None
            }
            NetEvent::StatusPersisted { ticket, result } => {
                match self.reconciler.complete(&ticket, result) {
                    PersistOutcome::Committed | PersistOutcome::NeedsResync => self.next_resync(),
                    PersistOutcome::Unauthenticated => {
                        self.logout(Some("Session expired. Please log in again.".to_string()));
                        None
                    }
                }
            }
            NetEvent::Resynced { ticket, result } => {
                let outcome = match result {
                    Ok(tasks) => self.reconciler.apply_resync(&mut self.board, &ticket, tasks),
                    Err(e) => self.reconciler.resync_failed(&ticket, &e),
                };
                match outcome {
                    ResyncOutcome::Applied => {
                        self.loading = false;
                        self.ensure_selection_visible();
                        None
                    }
                    ResyncOutcome::Discarded => self.next_resync(),
                    ResyncOutcome::Failed(msg) => {
                        self.loading = false;
                        self.modal = Modal::Notice(msg);
                        None
                    }
                    ResyncOutcome::Unauthenticated => {
                        self.logout(Some("Session expired. Please log in again.".to_string()));
                        None
                    }
                }
            }
            NetEvent::TaskDeleted { id, result: Ok(()) } => {
                self.board.remove(&id);
                if self.selected_task.as_ref() == Some(&id) {
                    self.selected_task = None;
                    self.select_first();
                }
                None
            }
            NetEvent::ProjectsLoaded(Err(e)) => {
                self.fail("Could not load projects", &e);
                None
            }
            NetEvent::ProjectCreated(Err(e)) => {
                self.fail("Could not create project", &e);
                None
            }
            NetEvent::ProjectDeleted { result: Err(e), .. } => {
                self.fail("Could not delete project", &e);
                None
            }
            NetEvent::TasksLoaded { result: Err(e), .. } => {
                self.fail("Could not load tasks", &e);
                None
            }
            NetEvent::TaskCreated(Err(e)) => {
                self.fail("Could not create task", &e);
                None
            }
            NetEvent::TaskDeleted { result: Err(e), .. } => {
                self.fail("Could not delete task", &e);
                None
            }
        }
    }
}

/// Applies a key to a single-line text input.
fn edit_text(target: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => target.push(c),
        KeyCode::Backspace => {
            target.pop();
        }
        _ => {}
    }
}
