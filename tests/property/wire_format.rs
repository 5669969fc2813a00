//! Property tests for the shared wire types.
//!
//! Covers:
//! 1. Status and priority wire names parse back and nothing else parses.
//! 2. Column navigation (`next`/`prev`) walks the fixed order.
//! 3. Title validation accepts exactly the non-blank titles within the limit.
//! 4. Tasks serialize with the field names the REST API uses.

use proptest::prelude::*;
use protasker_proto::api::{MAX_TITLE_LENGTH, ValidationError, validate_title};
use protasker_proto::project::ProjectId;
use protasker_proto::task::{Priority, Task, TaskId, TaskStatus};
use uuid::Uuid;

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(vec![Priority::Low, Priority::Medium, Priority::High])
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        any::<u128>(),
        any::<u128>(),
        "[a-zA-Z0-9 ]{1,40}",
        arb_status(),
        arb_priority(),
        any::<u64>(),
    )
        .prop_map(|(id, project, title, status, priority, created_at)| Task {
            id: TaskId::from_uuid(Uuid::from_u128(id)),
            project_id: ProjectId::from_uuid(Uuid::from_u128(project)),
            title,
            description: None,
            status,
            priority,
            assigned_to: None,
            due_date: None,
            created_at,
        })
}

proptest! {
    #[test]
    fn status_wire_name_parses_back(status in arb_status()) {
        prop_assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        prop_assert_eq!(status.to_string(), status.as_str());
    }

    #[test]
    fn unknown_status_never_parses(s in "\\PC{0,16}") {
        let known = TaskStatus::ALL.iter().any(|st| st.as_str() == s);
        prop_assert_eq!(s.parse::<TaskStatus>().is_ok(), known);
    }

    #[test]
    fn unknown_priority_never_parses(s in "\\PC{0,16}") {
        let known = matches!(s.as_str(), "low" | "medium" | "high");
        prop_assert_eq!(s.parse::<Priority>().is_ok(), known);
    }

    #[test]
    fn priority_cycle_has_period_three(p in arb_priority()) {
        prop_assert_ne!(p.cycle(), p);
        prop_assert_eq!(p.cycle().cycle().cycle(), p);
    }

    #[test]
    fn next_and_prev_are_inverse(status in arb_status()) {
        if let Some(n) = status.next() {
            prop_assert_eq!(n.prev(), Some(status));
            prop_assert_eq!(n.index(), status.index() + 1);
        } else {
            prop_assert_eq!(status, TaskStatus::Done);
        }
        if let Some(p) = status.prev() {
            prop_assert_eq!(p.next(), Some(status));
        } else {
            prop_assert_eq!(status, TaskStatus::Todo);
        }
    }

    #[test]
    fn blank_titles_are_rejected(title in "[ \t\n]{0,20}") {
        prop_assert_eq!(validate_title(&title), Err(ValidationError::TitleEmpty));
    }

    #[test]
    fn title_limit_is_in_characters(len in 1usize..=MAX_TITLE_LENGTH + 20) {
        let title = "é".repeat(len);
        let result = validate_title(&title);
        if len <= MAX_TITLE_LENGTH {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(ValidationError::TitleTooLong));
        }
    }

    #[test]
    fn task_json_uses_api_field_names(task in arb_task()) {
        let value = serde_json::to_value(&task).unwrap();
        let id = task.id.to_string();
        let project_id = task.project_id.to_string();
        prop_assert_eq!(value["_id"].as_str(), Some(id.as_str()));
        prop_assert_eq!(value["projectId"].as_str(), Some(project_id.as_str()));
        prop_assert_eq!(value["status"].as_str(), Some(task.status.as_str()));
        prop_assert_eq!(value["priority"].as_str(), Some(task.priority.as_str()));
        prop_assert_eq!(value["createdAt"].as_u64(), Some(task.created_at));
        prop_assert!(value.get("description").is_none());

        let back: Task = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back, task);
    }
}
