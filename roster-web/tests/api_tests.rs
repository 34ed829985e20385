//! Integration tests for the roster-web API endpoints
//!
//! Each test gets a fresh in-memory database and drives the router
//! directly with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use roster_common::auth;
use roster_common::db::init::init_in_memory;
use roster_web::{build_router, AppState};

async fn setup() -> (axum::Router, AppState) {
    let pool = init_in_memory().await.expect("in-memory database");
    auth::init_auth_password(&pool).await.expect("password bootstrap");
    let state = AppState::new(pool);
    (build_router(state.clone()), state)
}

fn request(method: &str, uri: &str, session: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("roster_session={token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn person_body(name: &str, gender: &str) -> Value {
    json!({ "name": name, "gender": gender })
}

fn task_body(id: &str, date: &str, conductor: &str, assistant: Option<&str>) -> Value {
    let mut assignments = vec![json!({
        "personId": conductor, "role": "Conductor", "status": "assigned"
    })];
    if let Some(a) = assistant {
        assignments.push(json!({ "personId": a, "role": "Assistant", "status": "assigned" }));
    }
    json!({ "id": id, "taskDate": date, "assignments": assignments })
}

// ============================================================================
// Health and authentication
// ============================================================================

#[tokio::test]
async fn health_endpoint_needs_no_auth() {
    let (app, _) = setup().await;

    let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "roster-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn protected_routes_reject_missing_session() {
    let (app, _) = setup().await;

    let response = app.oneshot(request("GET", "/api/db", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "password": "wrong" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_working_session_cookie() {
    let (app, _) = setup().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "password": "1234" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    let token = cookie
        .split(';')
        .next()
        .and_then(|kv| kv.split_once('='))
        .map(|(_, v)| v.to_string())
        .expect("token value");

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    let response = app
        .clone()
        .oneshot(request("POST", "/api/auth/logout", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// People
// ============================================================================

#[tokio::test]
async fn person_creation_assigns_sequential_ids() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/people",
            Some(&token),
            Some(person_body("Anna", "F")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["person"]["id"], "p_001");
    assert_eq!(body["person"]["gender"], "F");

    let response = app
        .oneshot(request(
            "POST",
            "/api/people",
            Some(&token),
            Some(person_body("Bart", "M")),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["person"]["id"], "p_002");
}

#[tokio::test]
async fn duplicate_person_name_is_a_bad_request() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    app.clone()
        .oneshot(request(
            "POST",
            "/api/people",
            Some(&token),
            Some(person_body("Anna Lee", "F")),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            "POST",
            "/api/people",
            Some(&token),
            Some(person_body("  ANNA   lee ", "F")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn deleting_a_person_cascades_into_tasks() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    for (name, _) in [("Anna", "p_001"), ("Bart", "p_002")] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/people",
                Some(&token),
                Some(person_body(name, "M")),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(task_body("t_0001", "2024-01-01", "p_001", Some("p_002"))),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/people/p_002", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["people"].as_array().unwrap().len(), 1);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["conductorId"], "p_001");
    assert_eq!(tasks[0]["assistantId"], Value::Null);
}

// ============================================================================
// Tasks and status
// ============================================================================

#[tokio::test]
async fn task_without_assignee_is_rejected() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    let response = app
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "id": "t_0001", "taskDate": "2024-01-01" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["message"], "INVALID_DATA");
}

#[tokio::test]
async fn task_level_status_applies_to_every_assignment() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    for name in ["Anna", "Bart"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/people",
                Some(&token),
                Some(person_body(name, "M")),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(task_body("t_0001", "2024-01-01", "p_001", Some("p_002"))),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks/status",
            Some(&token),
            Some(json!({ "taskId": "t_0001", "status": "done" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let task = &body["tasks"][0];
    assert_eq!(task["status"], "done");
    for a in task["assignments"].as_array().unwrap() {
        assert_eq!(a["status"], "done");
    }
}

#[tokio::test]
async fn status_for_unknown_task_is_not_found() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    let response = app
        .oneshot(request(
            "POST",
            "/api/tasks/status",
            Some(&token),
            Some(json!({ "taskId": "t_404", "status": "done" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assignment_level_status_leaves_conductor_projection_alone() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    for name in ["Anna", "Bart"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/people",
                Some(&token),
                Some(person_body(name, "M")),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(task_body("t_0001", "2024-01-01", "p_001", Some("p_002"))),
        ))
        .await
        .unwrap();

    // Assistant-only edit: the projected status still follows the conductor
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks/status",
            Some(&token),
            Some(json!({ "taskId": "t_0001", "status": "confirmed", "personId": "p_002" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["tasks"][0]["status"], "assigned");
}

// ============================================================================
// Snapshot replace
// ============================================================================

#[tokio::test]
async fn snapshot_replace_prunes_orphaned_tasks() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    for name in ["Anna", "Bart"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/people",
                Some(&token),
                Some(person_body(name, "M")),
            ))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(task_body("t_0001", "2024-01-01", "p_001", Some("p_002"))),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    let mut snapshot = extract_json(response.into_body()).await;

    // Drop Bart from the payload and replace wholesale
    let people = snapshot["people"].as_array_mut().unwrap();
    people.retain(|p| p["id"] == "p_001");
    let payload = json!({ "people": snapshot["people"], "tasks": snapshot["tasks"] });

    let response = app
        .clone()
        .oneshot(request("PUT", "/api/db", Some(&token), Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/db", Some(&token), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let task = &body["tasks"][0];
    assert_eq!(task["conductorId"], "p_001");
    assert_eq!(task["assistantId"], Value::Null);
    assert_eq!(task["assignments"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Partner recommendations
// ============================================================================

#[tokio::test]
async fn partners_endpoint_ranks_candidates() {
    let (app, state) = setup().await;
    let token = state.issue_session();

    for name in ["Anna", "Beth", "Cara"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/people",
                Some(&token),
                Some(person_body(name, "F")),
            ))
            .await
            .unwrap();
    }
    // Beth conducted with Anna before; Cara has no history (tier 1)
    app.clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(task_body("t_0001", "2024-01-01", "p_002", Some("p_001"))),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/people/p_001/partners?mode=matching",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let names: Vec<&str> = body["partners"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cara", "Beth"]);

    let response = app
        .oneshot(request(
            "GET",
            "/api/people/p_404/partners",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
