//! REST surface tests driven through the router with `tower::oneshot`.

mod support;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use support::{task_body, transaction_body, TestEnv};
use tower::ServiceExt;
use trk::config::IdentityConfig;
use trk::model::{calculate_streak, today};

async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    Ok((status, value))
}

fn get(path: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

fn with_body(method: &str, path: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(path: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(path);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn root_route_reports_alive() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (status, body) = send(&router, get("/", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Tracker API is running".to_string()));
    Ok(())
}

#[tokio::test]
async fn collection_starts_empty_then_reflects_creates() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (status, body) = send(&router, get("/api/tasks", Some("alice"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = send(
        &router,
        with_body("POST", "/api/tasks", Some("alice"), &task_body("ship it")),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "ship it");
    assert_eq!(created["userId"], "alice");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(created["createdAt"].as_i64().is_some());

    let (_, listed) = send(&router, get("/api/tasks", Some("alice"))).await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0], created);
    Ok(())
}

#[tokio::test]
async fn validation_failures_return_400_with_error_body() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (status, body) = send(
        &router,
        with_body("POST", "/api/tasks", Some("alice"), &json!({"completed": true})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let (status, _) = send(
        &router,
        with_body(
            "POST",
            "/api/tasks",
            Some("alice"),
            &json!({"title": "x", "priority": "urgent"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        with_body(
            "POST",
            "/api/finance",
            Some("alice"),
            &transaction_body(-5.0, "expense", "food", "2026-02-01"),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_merges_and_missing_records_are_404() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (_, created) = send(
        &router,
        with_body("POST", "/api/tasks", Some("alice"), &task_body("draft")),
    )
    .await?;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &router,
        with_body(
            "PUT",
            &format!("/api/tasks/{id}"),
            Some("alice"),
            &json!({"completed": true}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], json!(true));
    assert_eq!(updated["title"], "draft");

    let (status, body) = send(
        &router,
        with_body(
            "PUT",
            "/api/tasks/nonexistent",
            Some("alice"),
            &json!({"completed": true}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn another_users_record_reads_as_not_found() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (_, created) = send(
        &router,
        with_body("POST", "/api/tasks", Some("alice"), &task_body("private")),
    )
    .await?;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        with_body(
            "PUT",
            &format!("/api/tasks/{id}"),
            Some("bob"),
            &json!({"title": "stolen"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, delete(&format!("/api/tasks/{id}"), Some("bob"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs) = send(&router, get("/api/tasks", Some("bob"))).await?;
    assert_eq!(bobs, json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_returns_success_body_then_404() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let (_, created) = send(
        &router,
        with_body("POST", "/api/tasks", Some("alice"), &task_body("done soon")),
    )
    .await?;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, delete(&format!("/api/tasks/{id}"), Some("alice"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, _) = send(&router, delete(&format!("/api/tasks/{id}"), Some("alice"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn missing_header_defaults_to_the_shared_scope() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    send(
        &router,
        with_body("POST", "/api/tasks", None, &task_body("anonymous")),
    )
    .await?;

    // A second header-less session sees the same shared bucket.
    let (_, listed) = send(&router, get("/api/tasks", None)).await?;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["userId"], "shared");

    // Scoped users do not.
    let (_, scoped) = send(&router, get("/api/tasks", Some("alice"))).await?;
    assert_eq!(scoped, json!([]));
    Ok(())
}

#[tokio::test]
async fn required_identity_rejects_headerless_requests() -> Result<()> {
    let env = TestEnv::new();
    let identity = IdentityConfig {
        required: true,
        ..IdentityConfig::default()
    };
    let router = env.router_with_identity(env.memory_backend(), identity);

    let (status, body) = send(&router, get("/api/tasks", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().is_some());

    let (status, _) = send(&router, get("/api/tasks", Some("alice"))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn habit_create_overrides_client_supplied_streak() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let now = today();
    let dates = vec![
        now.format("%Y-%m-%d").to_string(),
        (now - chrono::Duration::days(1)).format("%Y-%m-%d").to_string(),
    ];
    let expected = calculate_streak(&dates, now);

    let (status, created) = send(
        &router,
        with_body(
            "POST",
            "/api/habits",
            Some("alice"),
            &json!({
                "title": "hydrate",
                "frequency": ["Daily"],
                "completedDates": dates,
                "streak": 42,
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["streak"], json!(expected));
    Ok(())
}

#[tokio::test]
async fn every_kind_serves_the_same_contract() -> Result<()> {
    let env = TestEnv::new();
    let router = env.router(env.memory_backend());

    let bodies = [
        ("/api/tasks", task_body("t")),
        ("/api/habits", json!({"title": "h", "frequency": ["Mon"]})),
        (
            "/api/finance",
            transaction_body(10.0, "income", "salary", "2026-02-01"),
        ),
        (
            "/api/planner",
            json!({"title": "p", "day": "Friday", "startHour": 9, "duration": 1, "category": "Study"}),
        ),
        ("/api/goals", json!({"title": "g", "category": "health"})),
        ("/api/mood", json!({"date": "2026-02-01", "rating": 7})),
        (
            "/api/workouts",
            json!({"date": "2026-02-01", "exerciseName": "Running", "duration": 30}),
        ),
        (
            "/api/study",
            json!({
                "startTime": 1_770_000_000_000_i64,
                "endTime": 1_770_001_500_000_i64,
                "duration": 25,
                "type": "pomodoro",
            }),
        ),
    ];

    for (path, body) in bodies {
        let (status, created) = send(&router, with_body("POST", path, Some("alice"), &body)).await?;
        assert_eq!(status, StatusCode::CREATED, "POST {path}");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = send(&router, get(path, Some("alice"))).await?;
        assert_eq!(status, StatusCode::OK, "GET {path}");
        assert_eq!(listed.as_array().unwrap().len(), 1, "GET {path}");

        let (status, _) = send(&router, delete(&format!("{path}/{id}"), Some("alice"))).await?;
        assert_eq!(status, StatusCode::OK, "DELETE {path}");
    }
    Ok(())
}

#[tokio::test]
async fn contract_holds_on_durable_backends() -> Result<()> {
    let env = TestEnv::new();
    for backend in [env.document_backend(), env.workbook_backend()] {
        let router = env.router(backend);

        let (status, created) = send(
            &router,
            with_body("POST", "/api/tasks", Some("alice"), &task_body("durable")),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&router, get("/api/tasks", Some("alice"))).await?;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &router,
            with_body(
                "PUT",
                &format!("/api/tasks/{id}"),
                Some("alice"),
                &json!({"completed": true}),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], json!(true));

        let (status, _) = send(&router, delete(&format!("/api/tasks/{id}"), Some("alice"))).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}
