//! Optimistic status changes and resync on failure.
//!
//! A move is a two-phase operation:
//!
//! 1. [`Reconciler::begin`] applies the new status to the board at once and
//!    hands back a [`MoveTicket`] for the status request.
//! 2. [`Reconciler::complete`] takes the request's result. Success needs
//!    nothing further; failure schedules a full reload of the board.
//!
//! Every ticket carries a number from one monotonic counter. A reload is
//! only started once no status request is outstanding, and its result is
//! thrown away if another move began after the reload was issued, so a
//! stale list can never overwrite a newer optimistic change.

use std::collections::BTreeSet;

use protasker_proto::project::ProjectId;
use protasker_proto::task::{Task, TaskId, TaskStatus};

use crate::board::BoardState;
use crate::drag::MoveIntent;
use crate::session::Session;
use crate::store::{StoreError, TaskStore};

/// An issued status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTicket {
    task_id: TaskId,
    target: TaskStatus,
    previous: TaskStatus,
    seq: u64,
}

impl MoveTicket {
    /// Task being moved.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Status requested.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }

    /// Status before the optimistic change.
    #[must_use]
    pub const fn previous(&self) -> TaskStatus {
        self.previous
    }

    /// Position in the global move order.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// An issued board reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncTicket {
    project_id: ProjectId,
    issued_at_seq: u64,
}

impl ResyncTicket {
    /// Project whose tasks are being reloaded.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Latest move sequence when the reload was issued.
    #[must_use]
    pub const fn issued_at_seq(&self) -> u64 {
        self.issued_at_seq
    }
}

/// Result of a status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The server accepted the new status.
    Committed,
    /// The request failed; a reload is now pending.
    NeedsResync,
    /// The session was rejected and must be discarded.
    Unauthenticated,
}

/// Result of a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// The board now mirrors the server.
    Applied,
    /// A newer move or another project made the result stale.
    Discarded,
    /// The reload itself failed; the board is left as it was.
    Failed(String),
    /// The session was rejected and must be discarded.
    Unauthenticated,
}

/// Outcome of a full [`on_move_intent`] cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveCycle {
    /// The intent changed nothing, so no request was sent.
    Unchanged,
    /// The request succeeded.
    Committed,
    /// The request failed and a reload ran.
    Resynced(ResyncOutcome),
    /// The session was rejected.
    Unauthenticated,
}

/// Bookkeeping for in-flight status requests and pending reloads.
#[derive(Debug, Default)]
pub struct Reconciler {
    latest_seq: u64,
    in_flight: BTreeSet<u64>,
    needs_resync: bool,
    resync_in_flight: bool,
}

impl Reconciler {
    /// Creates a reconciler with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `intent` to the board and issues a ticket for its request.
    ///
    /// Returns `None` when the board did not change (unknown task, or the
    /// task already has the target status); no request must be sent then.
    pub fn begin(&mut self, board: &mut BoardState, intent: &MoveIntent) -> Option<MoveTicket> {
        let previous = board.status_of(&intent.task_id)?;
        if !board.apply_status(&intent.task_id, intent.to) {
            return None;
        }
        self.latest_seq += 1;
        self.in_flight.insert(self.latest_seq);
        tracing::debug!(
            task_id = %intent.task_id,
            from = %previous,
            to = %intent.to,
            seq = self.latest_seq,
            "optimistic status change"
        );
        Some(MoveTicket {
            task_id: intent.task_id.clone(),
            target: intent.to,
            previous,
            seq: self.latest_seq,
        })
    }

    /// Records the result of a status request.
    pub fn complete(
        &mut self,
        ticket: &MoveTicket,
        result: Result<Task, StoreError>,
    ) -> PersistOutcome {
        self.in_flight.remove(&ticket.seq);
        match result {
            Ok(_) => PersistOutcome::Committed,
            Err(e) if e.is_auth() => {
                tracing::warn!(task_id = %ticket.task_id, "status change rejected: session invalid");
                PersistOutcome::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(
                    task_id = %ticket.task_id,
                    seq = ticket.seq,
                    error = %e,
                    "status change failed; board will be reloaded"
                );
                self.needs_resync = true;
                PersistOutcome::NeedsResync
            }
        }
    }

    /// Issues a reload if one is pending and nothing blocks it.
    ///
    /// A reload waits until every status request has completed and until
    /// any previous reload has finished.
    pub fn resync_due(&mut self, board: &BoardState) -> Option<ResyncTicket> {
        if !self.needs_resync || self.resync_in_flight || !self.in_flight.is_empty() {
            return None;
        }
        let project_id = board.project_id()?.clone();
        self.needs_resync = false;
        self.resync_in_flight = true;
        Some(ResyncTicket {
            project_id,
            issued_at_seq: self.latest_seq,
        })
    }

    /// Loads a reload's result into the board unless it is stale.
    pub fn apply_resync(
        &mut self,
        board: &mut BoardState,
        ticket: &ResyncTicket,
        tasks: Vec<Task>,
    ) -> ResyncOutcome {
        self.resync_in_flight = false;
        if board.project_id() != Some(&ticket.project_id) {
            return ResyncOutcome::Discarded;
        }
        if self.latest_seq > ticket.issued_at_seq {
            // A move started after this list was requested; reload again
            // once it settles.
            tracing::debug!(
                issued_at = ticket.issued_at_seq,
                latest = self.latest_seq,
                "discarding stale resync"
            );
            self.needs_resync = true;
            return ResyncOutcome::Discarded;
        }
        board.load(tasks);
        tracing::info!(project_id = %ticket.project_id, tasks = board.len(), "board resynced");
        ResyncOutcome::Applied
    }

    /// Decides whether a task list requested at `issued_at_seq` may replace
    /// the board.
    ///
    /// A list is refused when a move started after it was requested or a
    /// status request is still outstanding; a reload is scheduled instead.
    pub fn accept_list(&mut self, issued_at_seq: u64) -> bool {
        if self.latest_seq > issued_at_seq || !self.in_flight.is_empty() {
            tracing::debug!(
                issued_at = issued_at_seq,
                latest = self.latest_seq,
                in_flight = self.in_flight.len(),
                "discarding stale task list"
            );
            self.needs_resync = true;
            return false;
        }
        true
    }

    /// Records a failed reload. The board is left untouched.
    pub fn resync_failed(&mut self, ticket: &ResyncTicket, err: &StoreError) -> ResyncOutcome {
        self.resync_in_flight = false;
        if err.is_auth() {
            return ResyncOutcome::Unauthenticated;
        }
        tracing::error!(project_id = %ticket.project_id, error = %err, "board resync failed");
        ResyncOutcome::Failed(format!("Could not refresh the board: {err}"))
    }

    /// Drops any pending reload (project closed or session discarded).
    ///
    /// Outstanding status requests stay tracked until they complete.
    pub fn reset(&mut self) {
        self.needs_resync = false;
        self.resync_in_flight = false;
    }

    /// Number of status requests awaiting a result.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a reload is pending or running.
    #[must_use]
    pub const fn resync_pending(&self) -> bool {
        self.needs_resync || self.resync_in_flight
    }

    /// Sequence number of the most recent move.
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.latest_seq
    }
}

/// Runs one move to completion against `store`.
///
/// Applies the change, sends the status request and, if it fails, reloads
/// the board from a fresh task list.
pub async fn on_move_intent<S: TaskStore>(
    store: &S,
    session: &Session,
    board: &mut BoardState,
    reconciler: &mut Reconciler,
    intent: &MoveIntent,
) -> MoveCycle {
    let Some(ticket) = reconciler.begin(board, intent) else {
        return MoveCycle::Unchanged;
    };

    let result = store
        .update_status(session, ticket.task_id(), ticket.target())
        .await;
    match reconciler.complete(&ticket, result) {
        PersistOutcome::Committed => return MoveCycle::Committed,
        PersistOutcome::Unauthenticated => return MoveCycle::Unauthenticated,
        PersistOutcome::NeedsResync => {}
    }

    let Some(resync) = reconciler.resync_due(board) else {
        return MoveCycle::Resynced(ResyncOutcome::Discarded);
    };
    let outcome = match store.list_tasks(session, resync.project_id()).await {
        Ok(tasks) => reconciler.apply_resync(board, &resync, tasks),
        Err(e) => reconciler.resync_failed(&resync, &e),
    };
    if outcome == ResyncOutcome::Unauthenticated {
        MoveCycle::Unauthenticated
    } else {
        MoveCycle::Resynced(outcome)
    }
}
