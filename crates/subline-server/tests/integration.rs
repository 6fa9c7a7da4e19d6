use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::json;
use subline_core::config::Config;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn memory_app() -> axum::Router {
    subline_server::build_router(subline_server::AppState::in_memory(Config::default()))
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn seed_activities(app: &axum::Router) {
    let (status, json) = post_json(
        app.clone(),
        "/api/activities",
        json!([
            {"id": 1, "title": "Ep 1", "scheduledDate": "2024-05-01"},
            {"id": 2, "title": "Ep 2", "scheduledDate": "2024-05-02"},
            {"Id": 3, "name": "Ep 3", "date": "2024-05-03"},
            {"id": 4, "title": "Ep 4", "scheduledDate": "2024-06-10"}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["imported"], 4);
}

fn may() -> serde_json::Value {
    json!({"fromDate": "2024-05-01", "toDate": "2024-05-31"})
}

fn assign_body(users: serde_json::Value, count: serde_json::Value) -> serde_json::Value {
    let mut body = may();
    body["userIds"] = users;
    body["count"] = count;
    body
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let (status, json) = get(memory_app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

// ---------------------------------------------------------------------------
// VTT
// ---------------------------------------------------------------------------

#[tokio::test]
async fn parse_returns_segments_in_order() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n\n00:00:03.500 --> 00:00:05.000\nWorld\n";
    let (status, json) = post_json(memory_app(), "/api/vtt/parse", json!({ "content": content })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["segments"][0]["startTime"], "00:00:01.000");
    assert_eq!(json["segments"][0]["endTime"], "00:00:03.000");
    assert_eq!(json["segments"][0]["text"], "Hello");
    assert_eq!(json["segments"][1]["text"], "World");
}

#[tokio::test]
async fn parse_without_cues_is_404() {
    let (status, json) = post_json(
        memory_app(),
        "/api/vtt/parse",
        json!({ "content": "WEBVTT\n\nno timings here\n" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "no segments found");
}

#[tokio::test]
async fn build_applies_translation_overrides() {
    let body = json!({
        "segments": [
            {"startTime": "00:00:01.000", "endTime": "00:00:02.000", "text": "Hi"},
            {"startTime": "00:00:02.000", "endTime": "00:00:03.000", "text": "Bye", "translatedText": "Adiós"}
        ],
        "translations": {"0": "Hola"}
    });
    let (status, json) = post_json(memory_app(), "/api/vtt/build", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["content"],
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHola\n\n00:00:02.000 --> 00:00:03.000\nAdiós\n"
    );
}

#[tokio::test]
async fn build_numbered_prefixes_indices() {
    let body = json!({
        "segments": [{"startTime": "00:00:01.000", "endTime": "00:00:02.000", "text": "Hi"}],
        "numbered": true
    });
    let (status, json) = post_json(memory_app(), "/api/vtt/build", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["content"], "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHi\n");
}

#[tokio::test]
async fn build_rejects_inverted_timestamps() {
    let body = json!({
        "segments": [{"startTime": "00:00:05.000", "endTime": "00:00:02.000", "text": "x"}]
    });
    let (status, json) = post_json(memory_app(), "/api/vtt/build", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("segment 0"));
}

#[tokio::test]
async fn translate_sets_one_segment() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nOne\n\n00:00:02.000 --> 00:00:03.000\nTwo\n";
    let (status, json) = post_json(
        memory_app(),
        "/api/vtt/translate",
        json!({ "content": content, "index": 1, "text": "Deux" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["segments"][1]["translatedText"], "Deux");
    assert!(json["segments"][0].get("translatedText").is_none());
    assert!(json["content"].as_str().unwrap().ends_with("00:00:02.000 --> 00:00:03.000\nDeux\n"));
}

#[tokio::test]
async fn translate_out_of_range_is_404() {
    let content = "00:00:01.000 --> 00:00:02.000\nOne\n";
    let (status, _) = post_json(
        memory_app(),
        "/api/vtt/translate",
        json!({ "content": content, "index": 3, "text": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn activities_list_filters_by_range() {
    let app = memory_app();
    seed_activities(&app).await;

    let (status, json) = get(app.clone(), "/api/activities?from=2024-05-01&to=2024-05-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[2]["title"], "Ep 3");

    let (status, json) = get(app.clone(), "/api/activities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 4);

    let (status, _) = get(app, "/api/activities?from=2024-05-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_import_is_400() {
    let (status, _) = post_json(memory_app(), "/api/activities", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_fans_out_and_excludes_on_next_call() {
    let app = memory_app();
    seed_activities(&app).await;

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!([1, 2]), json!(2)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["assigned"], 4);

    let (_, records) = get(app.clone(), "/api/users/2/assignments").await;
    let items: Vec<i64> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["itemId"].as_i64().unwrap())
        .collect();
    assert_eq!(items, vec![1, 2]);

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!([3]), json!(5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["assigned"], 1);

    let (status, json) = post_json(app, "/api/assignments", assign_body(json!([3]), json!(1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "no activities available for assignment");
}

#[tokio::test]
async fn assign_validation_errors_are_400_with_distinct_messages() {
    let app = memory_app();
    seed_activities(&app).await;

    let (status, json) =
        post_json(app.clone(), "/api/assignments", assign_body(json!([]), json!(1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "at least one user required");

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        json!({"userIds": [1], "count": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "from/to date required");

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!([1]), json!("many")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("invalid count"));

    let (status, _) =
        post_json(app, "/api/assignments", assign_body(json!([1]), json!(0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_assignment_bodies_are_400_with_error_json() {
    let app = memory_app();
    seed_activities(&app).await;

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!("x"), json!(1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request body"));

    let (status, json) = post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!([1]), json!(true)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("invalid count"));

    let (status, json) = post_json(app.clone(), "/api/activities", json!({"id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    // Nothing was assigned by the rejected requests.
    let (_, records) = get(app, "/api/users/1/assignments").await;
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assignment_status_can_be_updated() {
    let app = memory_app();
    seed_activities(&app).await;
    post_json(
        app.clone(),
        "/api/assignments",
        assign_body(json!([5]), json!(1)),
    )
    .await;

    let (status, json) = send(
        app.clone(),
        "PUT",
        "/api/users/5/assignments/1",
        Some(json!({"status": "working"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "working");

    let (status, _) = send(
        app.clone(),
        "PUT",
        "/api/users/5/assignments/1",
        Some(json!({"status": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app,
        "PUT",
        "/api/users/5/assignments/2",
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn count_above_configured_limit_is_rejected() {
    let mut config = Config::default();
    config.assignment.max_count = 2;
    let app = subline_server::build_router(subline_server::AppState::in_memory(config));
    seed_activities(&app).await;

    let (status, _) = post_json(app, "/api/assignments", assign_body(json!([1]), json!(3))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn persistent_state_survives_router_rebuild() {
    let dir = TempDir::new().unwrap();
    {
        let app = subline_server::build_router(subline_server::AppState::open(dir.path()).unwrap());
        seed_activities(&app).await;
        let (status, _) = post_json(app, "/api/assignments", assign_body(json!([1]), json!(3))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let app = subline_server::build_router(subline_server::AppState::open(dir.path()).unwrap());
    let (status, json) = get(app.clone(), "/api/users/1/assignments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (status, _) = post_json(app, "/api/assignments", assign_body(json!([2]), json!(1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
