use super::*;
use axum::{body, body::Body, http::Request, response::Response};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let api = ApiContext {
        storage: storage.clone(),
    };
    let app = build_router(Arc::new(AppState { api }), 4 * 1024);
    (app, storage)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn note_crud_round_trip() {
    let (app, _storage) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/notes",
            serde_json::json!({ "title": " first " }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Note = read_json(response).await;
    assert_eq!(created.title, "first");

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/notes/{}", created.id),
            serde_json::json!({ "title": "renamed" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let renamed: Note = read_json(response).await;
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.title, "renamed");

    let response = app
        .clone()
        .oneshot(
            Request::get("/notes")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let notes: Vec<Note> = read_json(response).await;
    assert_eq!(notes, vec![renamed]);

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/notes/{}", created.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::delete(format!("/notes/{}", created.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn blank_title_is_rejected_with_api_error_body() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/projects",
            serde_json::json!({ "name": "   " }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "name required");
    assert!(storage.list_projects().await.expect("projects").is_empty());
}

#[tokio::test]
async fn todo_delete_is_soft() {
    let (app, storage) = test_app().await;
    let todo = storage.create_todo("laundry").await.expect("todo");

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/todos/{}", todo.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get("/todos")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let todos: Vec<Todo> = read_json(response).await;
    assert!(todos.is_empty());

    let tombstone = storage
        .load_todo_any_state(todo.id)
        .await
        .expect("load")
        .expect("row kept");
    assert!(tombstone.deleted);
}

#[tokio::test]
async fn todo_patch_with_deleted_flag_echoes_tombstone() {
    let (app, storage) = test_app().await;
    let todo = storage.create_todo("dishes").await.expect("todo");

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/todos/{}", todo.id),
            serde_json::json!({ "deleted": true }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let echoed: Todo = read_json(response).await;
    assert_eq!(echoed.id, todo.id);
    assert!(echoed.deleted);
}

#[tokio::test]
async fn malformed_project_id_is_a_validation_error() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(
            Request::delete("/projects/not-a-uuid")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, storage) = test_app().await;
    let payload = serde_json::json!({ "title": "x".repeat(8 * 1024) }).to_string();
    let request = Request::post("/notes")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(storage.list_notes().await.expect("notes").is_empty());
}
