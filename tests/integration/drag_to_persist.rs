//! Integration tests for the drag gesture feeding status persistence.
//!
//! Uses the same screen geometry as the TUI to place cards and columns,
//! then drives `DragController` with pointer events and hands any resulting
//! intent to `on_move_intent`:
//! - dragging past the threshold and dropping on another column persists
//! - a short press is a click and sends nothing
//! - dropping back on the source column sends nothing
//! - cancelling (focus lost, Escape) sends nothing
//! - releasing outside every column still lands on the nearest one

mod common;

use common::FakeStore;
use protasker::board::BoardState;
use protasker::drag::{DragController, DragOutcome, Point};
use protasker::reconcile::{MoveCycle, Reconciler, on_move_intent};
use protasker::session::Session;
use protasker::store::TaskStore;
use protasker::ui::layout::{self, BoardLayout};
use protasker_proto::task::{Task, TaskStatus};
use ratatui::layout::Rect;

struct Harness {
    store: FakeStore,
    board: BoardState,
    drag: DragController,
    geometry: BoardLayout,
    task: Task,
}

async fn harness() -> Harness {
    let store = FakeStore::new();
    let project = store.add_project("Launch");
    let task = store.add_task(&project.id, "drag me", TaskStatus::Todo);
    let mut board = BoardState::new();
    board.open(project.id.clone());
    board
        .load(store.list_tasks(&Session::new("t"), &project.id).await.unwrap());

    let geometry = layout::board_layout(Rect::new(0, 0, 120, 30), &board);
    let mut drag = DragController::new(8.0);
    for (status, rect) in TaskStatus::ALL.into_iter().zip(geometry.columns) {
        drag.set_region(status, layout::to_drag_rect(rect));
    }
    Harness {
        store,
        board,
        drag,
        geometry,
        task,
    }
}

impl Harness {
    fn card_center(&self) -> Point {
        let rect = self.geometry.card_rect(&self.task.id).unwrap();
        layout::to_drag_rect(rect).center()
    }

    fn column_center(&self, status: TaskStatus) -> Point {
        layout::to_drag_rect(self.geometry.columns[status.index()]).center()
    }

    fn press(&mut self) -> Point {
        let at = self.card_center();
        let rect = self.geometry.card_rect(&self.task.id).unwrap();
        assert!(self.drag.pointer_down(
            self.task.id.clone(),
            TaskStatus::Todo,
            layout::to_drag_rect(rect),
            at,
        ));
        at
    }

    async fn settle(&mut self, outcome: DragOutcome) -> Option<MoveCycle> {
        let DragOutcome::Moved(intent) = outcome else {
            return None;
        };
        let mut rec = Reconciler::new();
        Some(
            on_move_intent(
                &self.store,
                &Session::new("t"),
                &mut self.board,
                &mut rec,
                &intent,
            )
            .await,
        )
    }
}

#[tokio::test]
async fn drag_across_columns_persists() {
    let mut h = harness().await;
    h.press();
    let target = h.column_center(TaskStatus::Review);
    h.drag.pointer_move(Point::new(target.x, h.card_center().y));
    assert!(h.drag.is_dragging());
    assert_eq!(h.drag.hovered_column(), Some(TaskStatus::Review));

    let outcome = h.drag.pointer_up(Point::new(target.x, h.card_center().y));
    let DragOutcome::Moved(ref intent) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    assert_eq!(intent.from, TaskStatus::Todo);
    assert_eq!(intent.to, TaskStatus::Review);

    assert_eq!(h.settle(outcome).await, Some(MoveCycle::Committed));
    assert_eq!(h.board.status_of(&h.task.id), Some(TaskStatus::Review));
    assert_eq!(h.store.status_of(&h.task.id), Some(TaskStatus::Review));
    assert!(!h.drag.is_dragging());
}

#[tokio::test]
async fn short_press_is_a_click() {
    let mut h = harness().await;
    let at = h.press();
    h.drag.pointer_move(Point::new(at.x + 3.0, at.y + 2.0));
    assert!(!h.drag.is_dragging());
    let outcome = h.drag.pointer_up(Point::new(at.x + 3.0, at.y + 2.0));
    assert_eq!(outcome, DragOutcome::Clicked(h.task.id.clone()));
    assert_eq!(h.settle(outcome).await, None);
    assert!(h.store.update_calls().is_empty());
}

#[tokio::test]
async fn drop_on_source_column_sends_nothing() {
    let mut h = harness().await;
    let at = h.press();
    // Straight down, far enough to activate but within the todo column.
    h.drag.pointer_move(Point::new(at.x, at.y + 10.0));
    assert!(h.drag.is_dragging());
    let outcome = h.drag.pointer_up(Point::new(at.x, at.y + 10.0));
    assert_eq!(outcome, DragOutcome::Dropped);
    assert!(h.store.update_calls().is_empty());
    assert_eq!(h.board.status_of(&h.task.id), Some(TaskStatus::Todo));
}

#[tokio::test]
async fn cancel_mid_drag_sends_nothing() {
    let mut h = harness().await;
    h.press();
    let target = h.column_center(TaskStatus::Done);
    h.drag.pointer_move(target);
    assert!(h.drag.cancel());
    assert_eq!(h.drag.pointer_up(target), DragOutcome::Ignored);
    assert!(h.store.update_calls().is_empty());
}

#[tokio::test]
async fn release_outside_columns_uses_nearest() {
    let mut h = harness().await;
    let at = h.press();
    // Far to the right of the board, level with the card.
    let outside = Point::new(500.0, at.y);
    h.drag.pointer_move(outside);
    let outcome = h.drag.pointer_up(outside);
    let DragOutcome::Moved(ref intent) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    assert_eq!(intent.to, TaskStatus::Done);
    assert_eq!(h.settle(outcome).await, Some(MoveCycle::Committed));
    assert_eq!(h.store.status_of(&h.task.id), Some(TaskStatus::Done));
}
