//! Integration tests for optimistic status changes.
//!
//! Drives `BoardState` + `Reconciler` against an in-memory store and checks:
//! - a successful move leaves board and store agreeing
//! - a rejected move is rolled back by reloading the server's list
//! - a failed reload leaves the optimistic board in place and reports it
//! - reloads wait for every in-flight move, whatever order they finish in
//! - a reload older than the latest move is discarded and reissued

mod common;

use common::FakeStore;
use protasker::board::BoardState;
use protasker::drag::MoveIntent;
use protasker::reconcile::{MoveCycle, PersistOutcome, Reconciler, ResyncOutcome, on_move_intent};
use protasker::session::Session;
use protasker::store::TaskStore;
use protasker_proto::project::Project;
use protasker_proto::task::{Task, TaskStatus};

fn session() -> Session {
    Session::new("t-alice")
}

fn intent(task: &Task, from: TaskStatus, to: TaskStatus) -> MoveIntent {
    MoveIntent {
        task_id: task.id.clone(),
        from,
        to,
    }
}

/// A store with one project holding a todo and a review task, and a board
/// loaded from it.
async fn setup() -> (FakeStore, Project, BoardState, Task, Task) {
    let store = FakeStore::new();
    let project = store.add_project("Launch");
    let todo = store.add_task(&project.id, "write docs", TaskStatus::Todo);
    let review = store.add_task(&project.id, "check copy", TaskStatus::Review);
    let mut board = BoardState::new();
    board.open(project.id.clone());
    board.load(store.list_tasks(&session(), &project.id).await.unwrap());
    (store, project, board, todo, review)
}

#[tokio::test]
async fn successful_move_is_committed() {
    let (store, _, mut board, todo, _) = setup().await;
    let mut rec = Reconciler::new();

    let cycle = on_move_intent(
        &store,
        &session(),
        &mut board,
        &mut rec,
        &intent(&todo, TaskStatus::Todo, TaskStatus::InProgress),
    )
    .await;

    assert_eq!(cycle, MoveCycle::Committed);
    assert_eq!(board.status_of(&todo.id), Some(TaskStatus::InProgress));
    assert_eq!(store.status_of(&todo.id), Some(TaskStatus::InProgress));
    assert_eq!(rec.in_flight(), 0);
    assert!(!rec.resync_pending());
}

#[tokio::test]
async fn rejected_move_is_rolled_back_from_server() {
    let (store, project, mut board, todo, _) = setup().await;
    let mut rec = Reconciler::new();
    store.fail_next_updates(1);

    let cycle = on_move_intent(
        &store,
        &session(),
        &mut board,
        &mut rec,
        &intent(&todo, TaskStatus::Todo, TaskStatus::Done),
    )
    .await;

    assert_eq!(cycle, MoveCycle::Resynced(ResyncOutcome::Applied));
    assert_eq!(board.status_of(&todo.id), Some(TaskStatus::Todo));
    assert_eq!(board.tasks(), &store.tasks(&project.id)[..]);
    assert_eq!(store.list_calls(), 2, "initial load plus one reload");
}

#[tokio::test]
async fn failed_reload_keeps_board_and_reports() {
    let (store, _, mut board, todo, _) = setup().await;
    let mut rec = Reconciler::new();
    store.fail_next_updates(1);
    store.fail_next_lists(1);

    let cycle = on_move_intent(
        &store,
        &session(),
        &mut board,
        &mut rec,
        &intent(&todo, TaskStatus::Todo, TaskStatus::Done),
    )
    .await;

    let MoveCycle::Resynced(ResyncOutcome::Failed(msg)) = cycle else {
        panic!("expected failed reload, got {cycle:?}");
    };
    assert!(msg.starts_with("Could not refresh the board"), "{msg}");
    assert_eq!(board.status_of(&todo.id), Some(TaskStatus::Done));
    assert!(!rec.resync_pending());
}

#[tokio::test]
async fn expired_session_during_move() {
    let (store, _, mut board, todo, _) = setup().await;
    let mut rec = Reconciler::new();
    store.expire_session();

    let cycle = on_move_intent(
        &store,
        &session(),
        &mut board,
        &mut rec,
        &intent(&todo, TaskStatus::Todo, TaskStatus::Done),
    )
    .await;
    assert_eq!(cycle, MoveCycle::Unauthenticated);
}

#[tokio::test]
async fn move_to_same_column_sends_nothing() {
    let (store, _, mut board, _, review) = setup().await;
    let mut rec = Reconciler::new();
    let cycle = on_move_intent(
        &store,
        &session(),
        &mut board,
        &mut rec,
        &intent(&review, TaskStatus::Review, TaskStatus::Review),
    )
    .await;
    assert_eq!(cycle, MoveCycle::Unchanged);
    assert!(store.update_calls().is_empty());
}

#[tokio::test]
async fn reload_waits_for_out_of_order_completions() {
    let (store, project, mut board, todo, review) = setup().await;
    let mut rec = Reconciler::new();

    let first = rec
        .begin(&mut board, &intent(&todo, TaskStatus::Todo, TaskStatus::InProgress))
        .unwrap();
    let second = rec
        .begin(&mut board, &intent(&review, TaskStatus::Review, TaskStatus::Done))
        .unwrap();
    assert_eq!(rec.in_flight(), 2);

    // The second request fails first.
    store.fail_next_updates(1);
    let r2 = store
        .update_status(&session(), second.task_id(), second.target())
        .await;
    assert_eq!(rec.complete(&second, r2), PersistOutcome::NeedsResync);
    assert!(rec.resync_due(&board).is_none(), "first move still in flight");

    // Then the first one succeeds.
    let r1 = store
        .update_status(&session(), first.task_id(), first.target())
        .await;
    assert_eq!(rec.complete(&first, r1), PersistOutcome::Committed);

    let ticket = rec.resync_due(&board).expect("reload due once all settled");
    let tasks = store.list_tasks(&session(), ticket.project_id()).await.unwrap();
    assert_eq!(rec.apply_resync(&mut board, &ticket, tasks), ResyncOutcome::Applied);

    assert_eq!(board.status_of(&todo.id), Some(TaskStatus::InProgress));
    assert_eq!(board.status_of(&review.id), Some(TaskStatus::Review));
    assert_eq!(board.tasks(), &store.tasks(&project.id)[..]);
}

#[tokio::test]
async fn stale_reload_is_discarded_and_reissued() {
    let (store, _, mut board, todo, review) = setup().await;
    let mut rec = Reconciler::new();

    store.fail_next_updates(1);
    let failed = rec
        .begin(&mut board, &intent(&todo, TaskStatus::Todo, TaskStatus::Done))
        .unwrap();
    let r = store
        .update_status(&session(), failed.task_id(), failed.target())
        .await;
    rec.complete(&failed, r);
    let reload = rec.resync_due(&board).unwrap();
    let snapshot = store.list_tasks(&session(), reload.project_id()).await.unwrap();

    // A new move starts before the reload result is applied.
    let later = rec
        .begin(&mut board, &intent(&review, TaskStatus::Review, TaskStatus::Done))
        .unwrap();
    assert_eq!(
        rec.apply_resync(&mut board, &reload, snapshot),
        ResyncOutcome::Discarded
    );
    assert_eq!(board.status_of(&review.id), Some(TaskStatus::Done), "newer move kept");
    assert!(rec.resync_due(&board).is_none(), "waits for the newer move");

    let r = store
        .update_status(&session(), later.task_id(), later.target())
        .await;
    rec.complete(&later, r);
    let again = rec.resync_due(&board).expect("reload reissued");
    let tasks = store.list_tasks(&session(), again.project_id()).await.unwrap();
    assert_eq!(rec.apply_resync(&mut board, &again, tasks), ResyncOutcome::Applied);
    assert_eq!(board.status_of(&todo.id), Some(TaskStatus::Todo));
    assert_eq!(board.status_of(&review.id), Some(TaskStatus::Done));
}

#[tokio::test]
async fn reload_for_closed_project_is_ignored() {
    let (store, _, mut board, todo, _) = setup().await;
    let mut rec = Reconciler::new();
    store.fail_next_updates(1);
    let ticket = rec
        .begin(&mut board, &intent(&todo, TaskStatus::Todo, TaskStatus::Done))
        .unwrap();
    let r = store
        .update_status(&session(), ticket.task_id(), ticket.target())
        .await;
    rec.complete(&ticket, r);
    let reload = rec.resync_due(&board).unwrap();

    let other = store.add_project("Other");
    board.open(other.id.clone());
    let tasks = store.list_tasks(&session(), reload.project_id()).await.unwrap();
    assert_eq!(rec.apply_resync(&mut board, &reload, tasks), ResyncOutcome::Discarded);
    assert!(board.is_empty());
}
