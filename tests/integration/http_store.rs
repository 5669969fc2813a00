//! Integration tests for the REST task store.
//!
//! Runs the real API server on a loopback port and drives it through
//! `HttpTaskStore`, checking that:
//! - projects and tasks go through their full lifecycle
//! - lists come back newest first
//! - HTTP failures map onto the right `StoreError` kinds
//! - deleting a project removes its tasks

use std::time::Duration;

use protasker::http::HttpTaskStore;
use protasker::session::Session;
use protasker::store::{StoreError, TaskStore};
use protasker_proto::project::{CreateProjectRequest, ProjectId, UserId};
use protasker_proto::task::{CreateTaskRequest, Priority, TaskId, TaskStatus};
use protasker_server::auth::TokenTable;

/// Start the API server in-process and return a store pointed at it.
async fn start_api() -> (HttpTaskStore, tokio::task::JoinHandle<()>) {
    let tokens = TokenTable::from_pairs([("t-alice", "alice"), ("t-bob", "bob")]);
    let (addr, handle) = protasker_server::api::start_server("127.0.0.1:0", tokens)
        .await
        .expect("failed to start api server");
    let store = HttpTaskStore::new(&format!("http://{addr}/api"), Duration::from_secs(5))
        .expect("valid url");
    (store, handle)
}

fn alice() -> Session {
    Session::new("t-alice")
}

fn bob() -> Session {
    Session::new("t-bob")
}

fn project_req(title: &str) -> CreateProjectRequest {
    CreateProjectRequest {
        title: title.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn project_and_task_lifecycle() {
    let (store, _handle) = start_api().await;

    let project = store
        .create_project(&alice(), &project_req("Launch"))
        .await
        .unwrap();
    assert_eq!(project.title, "Launch");
    assert_eq!(project.owner, UserId::new("alice"));
    assert_eq!(project.members, vec![UserId::new("alice")]);

    let projects = store.list_projects(&alice()).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, project.id);

    let mut req = CreateTaskRequest::new(project.id.clone(), "Write docs");
    req.priority = Priority::High;
    let first = store.create_task(&alice(), &req).await.unwrap();
    assert_eq!(first.status, TaskStatus::Todo);
    assert_eq!(first.priority, Priority::High);
    assert_eq!(first.project_id, project.id);

    let second = store
        .create_task(&alice(), &CreateTaskRequest::new(project.id.clone(), "Ship"))
        .await
        .unwrap();
    assert_eq!(second.priority, Priority::Medium);

    let tasks = store.list_tasks(&alice(), &project.id).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec![second.id.clone(), first.id.clone()], "newest first");

    let moved = store
        .update_status(&alice(), &first.id, TaskStatus::Review)
        .await
        .unwrap();
    assert_eq!(moved.status, TaskStatus::Review);
    assert_eq!(moved.title, "Write docs");

    store.delete_task(&alice(), &second.id).await.unwrap();
    let tasks = store.list_tasks(&alice(), &project.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Review);
}

#[tokio::test]
async fn deleting_project_removes_its_tasks() {
    let (store, _handle) = start_api().await;
    let project = store
        .create_project(&alice(), &project_req("Temp"))
        .await
        .unwrap();
    let task = store
        .create_task(&alice(), &CreateTaskRequest::new(project.id.clone(), "gone soon"))
        .await
        .unwrap();

    store.delete_project(&alice(), &project.id).await.unwrap();

    assert!(store.list_projects(&alice()).await.unwrap().is_empty());
    let err = store
        .update_status(&alice(), &task.id, TaskStatus::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    let err = store.list_tasks(&alice(), &project.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let (store, _handle) = start_api().await;
    let err = store
        .list_projects(&Session::new("nope"))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Unauthorized("Token is not valid".to_string()));
    assert!(err.is_auth());
}

#[tokio::test]
async fn projects_are_private_to_members() {
    let (store, _handle) = start_api().await;
    let project = store
        .create_project(&alice(), &project_req("Secret"))
        .await
        .unwrap();

    assert!(store.list_projects(&bob()).await.unwrap().is_empty());

    let err = store.list_tasks(&bob(), &project.id).await.unwrap_err();
    assert!(err.is_auth(), "got {err:?}");

    let err = store
        .create_task(&bob(), &CreateTaskRequest::new(project.id.clone(), "Sneaky"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Unauthorized("Not authorized to add tasks to this project".to_string())
    );
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (store, _handle) = start_api().await;
    let err = store
        .update_status(&alice(), &TaskId::new(), TaskStatus::Done)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound("Task not found".to_string()));

    let err = store
        .delete_project(&alice(), &ProjectId::new())
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound("Project not found".to_string()));
}

#[tokio::test]
async fn blank_title_is_rejected_by_server() {
    let (store, _handle) = start_api().await;
    let err = store
        .create_project(&alice(), &project_req("   "))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Rejected {
            status: 400,
            msg: "title is required".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store =
        HttpTaskStore::new(&format!("http://{addr}/api"), Duration::from_secs(2)).unwrap();
    let err = store.list_projects(&alice()).await.unwrap_err();
    assert!(matches!(err, StoreError::Network(_)), "got {err:?}");
    assert!(!err.is_auth());
}
