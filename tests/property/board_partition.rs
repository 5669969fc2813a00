//! Property tests for the board state.
//!
//! After any sequence of loads, moves, inserts and removals:
//! 1. With no filter, the four columns partition the task set exactly.
//! 2. Each column lists its tasks newest first.
//! 3. A filter only ever hides tasks, never moves or duplicates them.

use std::collections::HashSet;

use proptest::prelude::*;
use protasker::board::BoardState;
use protasker_proto::project::ProjectId;
use protasker_proto::task::{Priority, Task, TaskId, TaskStatus};

#[derive(Debug, Clone)]
enum Op {
    Load(Vec<(u8, TaskStatus, u64)>),
    Move(usize, TaskStatus),
    Insert(u8, TaskStatus, u64),
    Remove(usize),
    Filter(String),
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec((0u8..16, arb_status(), 0u64..50), 0..12).prop_map(Op::Load),
        (0usize..16, arb_status()).prop_map(|(i, s)| Op::Move(i, s)),
        (0u8..16, arb_status(), 0u64..50).prop_map(|(k, s, t)| Op::Insert(k, s, t)),
        (0usize..16).prop_map(Op::Remove),
        "[a-c ]{0,3}".prop_map(Op::Filter),
    ]
}

/// Sixteen stable ids so generated tasks can collide.
fn ids() -> Vec<TaskId> {
    (0..16).map(|_| TaskId::new()).collect()
}

fn make(ids: &[TaskId], key: u8, status: TaskStatus, created_at: u64) -> Task {
    Task {
        id: ids[usize::from(key)].clone(),
        project_id: ProjectId::new(),
        title: format!("{}{}", ["a", "b", "c"][usize::from(key) % 3], key),
        description: None,
        status,
        priority: Priority::Medium,
        assigned_to: None,
        due_date: None,
        created_at,
    }
}

fn apply(board: &mut BoardState, ids: &[TaskId], op: &Op) {
    match op {
        Op::Load(tasks) => board.load(
            tasks
                .iter()
                .map(|(k, s, t)| make(ids, *k, *s, *t))
                .collect(),
        ),
        Op::Move(i, status) => {
            if let Some(id) = board.tasks().get(*i).map(|t| t.id.clone()) {
                board.apply_status(&id, *status);
            }
        }
        Op::Insert(k, s, t) => board.insert(make(ids, *k, *s, *t)),
        Op::Remove(i) => {
            if let Some(id) = board.tasks().get(*i).map(|t| t.id.clone()) {
                board.remove(&id);
            }
        }
        Op::Filter(q) => board.set_filter(q),
    }
}

proptest! {
    #[test]
    fn columns_partition_the_board(ops in prop::collection::vec(arb_op(), 0..40)) {
        let ids = ids();
        let mut board = BoardState::new();
        for op in &ops {
            apply(&mut board, &ids, op);
        }

        let unique: HashSet<_> = board.tasks().iter().map(|t| t.id.clone()).collect();
        prop_assert_eq!(unique.len(), board.len(), "ids must stay unique");

        let filter = board.filter().to_string();
        board.set_filter("");
        let columns = board.columns();
        let total: usize = columns.iter().map(|c| c.len()).sum();
        prop_assert_eq!(total, board.len());

        for column in &columns {
            for task in &column.tasks {
                prop_assert_eq!(task.status, column.status);
            }
            // Relative order matches the board's newest-first order.
            let positions: Vec<usize> = column
                .tasks
                .iter()
                .map(|t| board.tasks().iter().position(|b| b.id == t.id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        let all: Vec<Vec<TaskId>> = columns
            .iter()
            .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
            .collect();
        board.set_filter(&filter);
        for (column, full) in board.columns().iter().zip(&all) {
            let visible: Vec<TaskId> = column.tasks.iter().map(|t| t.id.clone()).collect();
            let mut rest = full.iter();
            for id in &visible {
                prop_assert!(rest.any(|f| f == id), "filtered column must be a subsequence");
            }
        }
    }

    #[test]
    fn load_orders_newest_first(tasks in prop::collection::vec((0u8..16, arb_status(), 0u64..50), 0..16)) {
        let ids = ids();
        let mut board = BoardState::new();
        board.load(tasks.iter().map(|(k, s, t)| make(&ids, *k, *s, *t)).collect());
        prop_assert!(board.tasks().windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
