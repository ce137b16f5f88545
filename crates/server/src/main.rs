use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use server_api::{
    create_note, create_project, create_todo, delete_note, delete_project, delete_todo,
    list_notes, list_projects, list_todos, update_note, update_project, update_todo, ApiContext,
};
use shared::{
    domain::{Note, NoteId, Project, ProjectId, Todo, TodoId},
    error::{ApiError, ErrorCode},
    protocol::{NewNote, NewProject, NewTodo, NotePatch, ProjectPatch, TodoPatch},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type ApiFailure = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/notes", get(http_list_notes).post(http_create_note))
        .route(
            "/notes/:note_id",
            patch(http_update_note).delete(http_delete_note),
        )
        .route("/todos", get(http_list_todos).post(http_create_todo))
        .route(
            "/todos/:todo_id",
            patch(http_update_todo).delete(http_delete_todo),
        )
        .route(
            "/projects",
            get(http_list_projects).post(http_create_project),
        )
        .route(
            "/projects/:project_id",
            patch(http_update_project).delete(http_delete_project),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> ApiFailure {
    (status_for(err.code), Json(err))
}

fn parse_project_id(raw: &str) -> Result<ProjectId, ApiFailure> {
    raw.parse::<ProjectId>().map_err(|_| {
        reject(ApiError::new(
            ErrorCode::Validation,
            format!("invalid project id '{raw}'"),
        ))
    })
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            warn!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

async fn http_list_notes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Note>>, ApiFailure> {
    let notes = list_notes(&state.api).await.map_err(reject)?;
    Ok(Json(notes))
}

async fn http_create_note(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NewNote>,
) -> Result<(StatusCode, Json<Note>), ApiFailure> {
    let note = create_note(&state.api, draft).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn http_update_note(
    State(state): State<Arc<AppState>>,
    Path(note_id): Path<i64>,
    Json(patch): Json<NotePatch>,
) -> Result<Json<Note>, ApiFailure> {
    let note = update_note(&state.api, NoteId(note_id), patch)
        .await
        .map_err(reject)?;
    Ok(Json(note))
}

async fn http_delete_note(
    State(state): State<Arc<AppState>>,
    Path(note_id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    delete_note(&state.api, NoteId(note_id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Todo>>, ApiFailure> {
    let todos = list_todos(&state.api).await.map_err(reject)?;
    Ok(Json(todos))
}

async fn http_create_todo(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    let todo = create_todo(&state.api, draft).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn http_update_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<i64>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>, ApiFailure> {
    let todo = update_todo(&state.api, TodoId(todo_id), patch)
        .await
        .map_err(reject)?;
    Ok(Json(todo))
}

/// Todos never leave the table; this is the same soft delete a
/// `{"deleted": true}` patch performs.
async fn http_delete_todo(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    delete_todo(&state.api, TodoId(todo_id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, ApiFailure> {
    let projects = list_projects(&state.api).await.map_err(reject)?;
    Ok(Json(projects))
}

async fn http_create_project(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiFailure> {
    let project = create_project(&state.api, draft).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn http_update_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiFailure> {
    let project_id = parse_project_id(&project_id)?;
    let project = update_project(&state.api, project_id, patch)
        .await
        .map_err(reject)?;
    Ok(Json(project))
}

async fn http_delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let project_id = parse_project_id(&project_id)?;
    delete_project(&state.api, project_id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
