mod common;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, init_app, send, seed_user, test_state};

async fn create_task<S, B>(app: &S, token: &str, payload: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(token))
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Create failed. Body: {}", body);
    body["data"].clone()
}

fn task_payload(title: &str, start: &str, priority: i16, status: &str) -> Value {
    json!({
        "title": title,
        "startTime": start,
        "priority": priority,
        "status": status
    })
}

#[actix_rt::test]
async fn test_create_task_is_owned_by_caller() {
    let state = test_state();
    let app = init_app!(state);
    let (user_id, token) = seed_user(&state, "owner@example.com").await;

    let mut payload = task_payload("Write report", "2024-06-10T09:00:00Z", 3, "pending");
    payload["userId"] = json!(Uuid::new_v4());
    payload["estimatedTime"] = json!(45);

    let task = create_task(&app, &token, payload).await;
    assert_eq!(task["userId"], json!(user_id));
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["priority"], 3);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["estimatedTime"], 45);
    assert_eq!(task["endTime"], Value::Null);
    assert!(Uuid::parse_str(task["id"].as_str().unwrap()).is_ok());
}

#[actix_rt::test]
async fn test_create_task_rejects_bad_input() {
    let state = test_state();
    let app = init_app!(state);
    let (_, token) = seed_user(&state, "picky@example.com").await;

    let test_cases = vec![
        json!({ "startTime": "2024-06-10T09:00:00Z", "priority": 3, "status": "pending" }),
        json!({ "title": "No start", "priority": 3, "status": "pending" }),
        json!({ "title": "No priority", "startTime": "2024-06-10T09:00:00Z", "status": "pending" }),
        json!({ "title": "No status", "startTime": "2024-06-10T09:00:00Z", "priority": 3 }),
        task_payload("Too urgent", "2024-06-10T09:00:00Z", 6, "pending"),
        task_payload("Unknown status", "2024-06-10T09:00:00Z", 3, "archived"),
        json!({
            "title": "Backwards",
            "startTime": "2024-06-10T09:00:00Z",
            "endTime": "2024-06-10T08:00:00Z",
            "priority": 3,
            "status": "pending"
        }),
    ];

    for payload in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "Payload {} should be rejected. Body: {}",
            payload,
            body
        );
        assert_eq!(body["success"], false);
    }

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn test_list_filters_and_sorts() {
    let state = test_state();
    let app = init_app!(state);
    let (_, token) = seed_user(&state, "lister@example.com").await;
    let (_, other_token) = seed_user(&state, "neighbour@example.com").await;

    create_task(&app, &token, task_payload("early", "2024-06-10T08:00:00Z", 3, "pending")).await;
    create_task(&app, &token, task_payload("late", "2024-06-10T12:00:00Z", 3, "pending")).await;
    create_task(&app, &token, task_payload("done", "2024-06-10T13:00:00Z", 3, "finished")).await;
    create_task(&app, &token, task_payload("urgent", "2024-06-10T14:00:00Z", 5, "pending")).await;
    create_task(
        &app,
        &other_token,
        task_payload("not mine", "2024-06-10T15:00:00Z", 3, "pending"),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/tasks?priority=3&status=pending&sortBy=startTime&order=desc")
        .append_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["late", "early"]);

    // Without options: all of the caller's tasks in creation order
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["early", "late", "done", "urgent"]);
    assert_eq!(body["message"], "Found 4 task(s).");

    // Empty values mean "not given"
    let req = test::TestRequest::get()
        .uri("/api/tasks?priority=&status=&sortBy=&order=")
        .append_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"][0]["title"], "early");

    let req = test::TestRequest::get()
        .uri("/api/tasks?status=finished&sortBy=&order=")
        .append_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "done");

    let req = test::TestRequest::get()
        .uri("/api/tasks?priority=high")
        .append_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_update_and_delete_are_owner_scoped() {
    let state = test_state();
    let app = init_app!(state);
    let (_, owner_token) = seed_user(&state, "alice@example.com").await;
    let (_, intruder_token) = seed_user(&state, "mallory@example.com").await;

    let task = create_task(
        &app,
        &owner_token,
        task_payload("Private", "2024-06-10T09:00:00Z", 2, "pending"),
    )
    .await;
    let task_uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    // Someone else's task is indistinguishable from a missing one
    let req = test::TestRequest::put()
        .uri(&task_uri)
        .append_header(bearer(&intruder_token))
        .set_json(json!({ "status": "finished" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found.");

    let req = test::TestRequest::delete()
        .uri(&task_uri)
        .append_header(bearer(&intruder_token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid changes are rejected the same way whoever owns the id
    for token in [&owner_token, &intruder_token] {
        let req = test::TestRequest::put()
            .uri(&task_uri)
            .append_header(bearer(token))
            .set_json(json!({ "priority": 9 }))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", Uuid::new_v4()))
        .append_header(bearer(&owner_token))
        .set_json(json!({ "status": "finished" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/tasks/not-a-uuid")
        .append_header(bearer(&owner_token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Empty update
    let req = test::TestRequest::put()
        .uri(&task_uri)
        .append_header(bearer(&owner_token))
        .set_json(json!({}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Owner updates
    let req = test::TestRequest::put()
        .uri(&task_uri)
        .append_header(bearer(&owner_token))
        .set_json(json!({ "status": "finished", "endTime": "2024-06-10T09:40:00Z" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
    assert_eq!(body["data"]["status"], "finished");
    assert_eq!(body["data"]["title"], "Private");
    assert_eq!(body["data"]["priority"], 2);

    // Owner deletes
    let req = test::TestRequest::delete()
        .uri(&task_uri)
        .append_header(bearer(&owner_token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let req = test::TestRequest::delete()
        .uri(&task_uri)
        .append_header(bearer(&owner_token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_dashboard_stats() {
    let state = test_state();
    let app = init_app!(state);
    let (_, token) = seed_user(&state, "stats@example.com").await;
    let (_, other_token) = seed_user(&state, "other-stats@example.com").await;

    create_task(
        &app,
        &token,
        json!({
            "title": "Ongoing",
            "startTime": "2024-06-10T10:00:00Z",
            "endTime": "2024-06-10T10:30:00Z",
            "priority": 2,
            "status": "pending"
        }),
    )
    .await;
    create_task(
        &app,
        &token,
        json!({
            "title": "Done",
            "startTime": "2024-06-10T09:00:00Z",
            "endTime": "2024-06-10T09:20:00Z",
            "priority": 2,
            "status": "finished"
        }),
    )
    .await;
    create_task(
        &app,
        &other_token,
        task_payload("Someone else's", "2024-06-10T09:00:00Z", 5, "pending"),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/tasks/dashboard-stats")
        .append_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
    assert_eq!(
        body,
        json!({
            "totalTasks": 2,
            "completedPercentage": 50.0,
            "avgTimePerTask": 20.0,
            "pendingTaskSummary": {
                "totalPendingTasks": 1,
                "totalTimeLapsed": 30.0,
                "totalTimeLeft": 60.0
            },
            "taskPrioritySummary": {
                "2": { "pending": 1, "timeLapsed": 30.0, "timeLeft": 60.0 }
            }
        })
    );
}

#[actix_rt::test]
async fn test_dashboard_stats_without_tasks() {
    let state = test_state();
    let app = init_app!(state);
    let (_, token) = seed_user(&state, "idle@example.com").await;

    let req = test::TestRequest::get()
        .uri("/api/tasks/dashboard-stats")
        .append_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTasks"], 0);
    assert_eq!(body["completedPercentage"], 0.0);
    assert_eq!(body["avgTimePerTask"], 0.0);
    assert_eq!(body["pendingTaskSummary"]["totalPendingTasks"], 0);
    assert_eq!(body["taskPrioritySummary"], json!({}));
}
