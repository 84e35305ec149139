mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::{create_task, create_user, init_app, memory_state, send};
use taskboard::models::TaskWithOwner;

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let user = create_user(&app, "crud_user@example.com").await;
    let user_id = user["id"].as_str().unwrap();

    // 1. Create Task
    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({
            "title": "CRUD Task 1 Original",
            "description": "Initial description",
            "userId": user_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: TaskWithOwner = test::read_body_json(resp).await;
    assert_eq!(created.task.title, "CRUD Task 1 Original");
    assert_eq!(created.task.description.as_deref(), Some("Initial description"));
    assert!(!created.task.completed);
    assert_eq!(created.task.user_id.to_string(), user_id);
    assert_eq!(created.user.email, "crud_user@example.com");
    let task_id = created.task.id;

    // 2. Get Task by ID
    let req = test::TestRequest::get()
        .uri(&format!("/api/task/{}", task_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TaskWithOwner = test::read_body_json(resp).await;
    assert_eq!(fetched, created);

    // 3. Update Task
    let req = test::TestRequest::put()
        .uri(&format!("/api/task/{}", task_id))
        .set_json(json!({ "title": "CRUD Task 1 Updated", "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TaskWithOwner = test::read_body_json(resp).await;
    assert_eq!(updated.task.id, task_id);
    assert_eq!(updated.task.title, "CRUD Task 1 Updated");
    assert!(updated.task.completed);
    assert_eq!(updated.task.description.as_deref(), Some("Initial description"));
    assert_eq!(updated.task.created_at, created.task.created_at);

    // 4. Get All Tasks
    create_task(&app, user_id, "CRUD Task 2").await;
    let req = test::TestRequest::get().uri("/api/task").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<TaskWithOwner> = test::read_body_json(resp).await;
    assert_eq!(tasks.len(), 2);
    assert!(tasks
        .iter()
        .any(|t| t.task.id == task_id && t.task.title == "CRUD Task 1 Updated"));

    // 5. Delete Task, twice
    let req = test::TestRequest::delete()
        .uri(&format!("/api/task/{}", task_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/task/{}", task_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));

    let req = test::TestRequest::get()
        .uri(&format!("/api/task/{}", task_id))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_log::test(actix_rt::test)]
async fn test_task_owner_summary_shape() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let user = create_user(&app, "owner@example.com").await;
    let task = create_task(&app, user["id"].as_str().unwrap(), "Shape check").await;

    assert_eq!(task["userId"], user["id"]);
    assert_eq!(task["completed"], false);
    assert!(task["createdAt"].is_string());
    assert_eq!(
        task["user"],
        json!({ "id": user["id"], "email": "owner@example.com", "name": "Test User" })
    );
}

#[test_log::test(actix_rt::test)]
async fn test_create_task_for_missing_user() {
    let (state, store) = memory_state();
    let app = init_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "title": "x", "userId": Uuid::new_v4().to_string() }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "title": "x", "userId": "nonexistent" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    assert_eq!(store.task_count().await, 0);
}

#[test_log::test(actix_rt::test)]
async fn test_create_task_validation() {
    let (state, store) = memory_state();
    let app = init_app(state).await;
    let user = create_user(&app, "validator@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "title": "", "userId": user["id"] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["title"][0]["message"], "Title is required");

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "userId": user["id"] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["title"][0]["code"], "required");
    assert_eq!(body["details"]["title"][0]["message"], "Required");

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "title": "No owner" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].get("title").is_none());
    assert_eq!(body["details"].as_object().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/task")
        .set_json(json!({ "title": "Typed", "completed": "yes", "userId": user["id"] }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.task_count().await, 0);
}

#[test_log::test(actix_rt::test)]
async fn test_get_task_unknown_ids() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/task/{}", Uuid::new_v4()))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));

    let req = test::TestRequest::get().uri("/api/task/abc").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));
}

#[test_log::test(actix_rt::test)]
async fn test_get_tasks_by_user() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let busy = create_user(&app, "busy@example.com").await;
    let idle = create_user(&app, "idle@example.com").await;
    let busy_id = busy["id"].as_str().unwrap();
    create_task(&app, busy_id, "One").await;
    create_task(&app, busy_id, "Two").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/task/user/{}", busy_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["One", "Two"]);
    assert_eq!(body[0]["user"]["email"], "busy@example.com");

    for user_id in [
        idle["id"].as_str().unwrap().to_string(),
        Uuid::new_v4().to_string(),
        "not-a-uuid".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/task/user/{}", user_id))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}

#[test_log::test(actix_rt::test)]
async fn test_update_task_partial_and_errors() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let user = create_user(&app, "editor@example.com").await;
    let task = create_task(&app, user["id"].as_str().unwrap(), "Draft").await;
    let task_id = task["id"].as_str().unwrap();

    // Only `completed` changes
    let req = test::TestRequest::put()
        .uri(&format!("/api/task/{}", task_id))
        .set_json(json!({ "completed": true }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Draft");
    assert_eq!(body["description"], "Initial description");
    assert_eq!(body["completed"], true);
    assert_eq!(body["user"]["id"], user["id"]);

    // Empty body is a no-op update
    let req = test::TestRequest::put()
        .uri(&format!("/api/task/{}", task_id))
        .set_json(json!({}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/task/{}", task_id))
        .set_json(json!({ "title": "" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");

    let req = test::TestRequest::put()
        .uri(&format!("/api/task/{}", Uuid::new_v4()))
        .set_json(json!({ "title": "Ghost" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));
}

#[test_log::test(actix_rt::test)]
async fn test_root_and_unmatched_routes() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API is running");
    assert_eq!(body["status"], "OK");

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found", "path": "/api/projects" }));

    let req = test::TestRequest::patch().uri("/api/task").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/api/task");
}

#[test_log::test(actix_rt::test)]
async fn test_trailing_slash_is_ignored() {
    let (state, _store) = memory_state();
    let app = init_app(state).await;

    let user = create_user(&app, "slash@example.com").await;
    let user_id = user["id"].as_str().unwrap();
    create_task(&app, user_id, "Slashed").await;

    let req = test::TestRequest::get().uri("/api/user/").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get().uri("/api/task/").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Slashed");

    let req = test::TestRequest::get()
        .uri(&format!("/api/task/user/{}/", user_id))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/task/")
        .set_json(json!({ "title": "Posted", "userId": user_id }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
}
