use shared::{
    domain::{Note, NoteId, Project, ProjectId, Todo, TodoId},
    error::{ApiError, ErrorCode, ValidationError},
    protocol::{NewNote, NewProject, NewTodo, NotePatch, ProjectPatch, TodoPatch},
    resource::{validate_title, Notes, Projects, Resource, Todos},
};
use storage::Storage;
use tracing::error;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_notes(ctx: &ApiContext) -> Result<Vec<Note>, ApiError> {
    ctx.storage.list_notes().await.map_err(internal)
}

pub async fn create_note(ctx: &ApiContext, draft: NewNote) -> Result<Note, ApiError> {
    let draft = Notes::validate_draft(&draft)?;
    ctx.storage
        .create_note(&draft.title)
        .await
        .map_err(internal)
}

pub async fn update_note(
    ctx: &ApiContext,
    note_id: NoteId,
    patch: NotePatch,
) -> Result<Note, ApiError> {
    let Some(title) = patch.title else {
        return Err(ValidationError::EmptyPatch.into());
    };
    let title = validate_title(Notes::TITLE_FIELD, &title)?;
    ctx.storage
        .rename_note(note_id, &title)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("note", note_id))
}

pub async fn delete_note(ctx: &ApiContext, note_id: NoteId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_note(note_id).await.map_err(internal)?;
    if !removed {
        return Err(not_found("note", note_id));
    }
    Ok(())
}

pub async fn list_todos(ctx: &ApiContext) -> Result<Vec<Todo>, ApiError> {
    ctx.storage.list_todos().await.map_err(internal)
}

pub async fn create_todo(ctx: &ApiContext, draft: NewTodo) -> Result<Todo, ApiError> {
    let draft = Todos::validate_draft(&draft)?;
    ctx.storage
        .create_todo(&draft.title)
        .await
        .map_err(internal)
}

/// Applies a partial todo update. `deleted: true` soft-deletes the row and
/// echoes its tombstone; a title in the same patch is applied first.
pub async fn update_todo(
    ctx: &ApiContext,
    todo_id: TodoId,
    patch: TodoPatch,
) -> Result<Todo, ApiError> {
    if patch.title.is_none() && patch.deleted.is_none() {
        return Err(ValidationError::EmptyPatch.into());
    }
    if patch.deleted == Some(false) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "restoring deleted todos is not supported",
        ));
    }

    let title = patch
        .title
        .as_deref()
        .map(|raw| validate_title(Todos::TITLE_FIELD, raw))
        .transpose()?;

    let mut current = None;
    if let Some(title) = title {
        current = Some(
            ctx.storage
                .rename_todo(todo_id, &title)
                .await
                .map_err(internal)?
                .ok_or_else(|| not_found("todo", todo_id))?,
        );
    }

    if patch.deleted == Some(true) {
        delete_todo(ctx, todo_id).await?;
        return ctx
            .storage
            .load_todo_any_state(todo_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found("todo", todo_id));
    }

    current.ok_or_else(|| not_found("todo", todo_id))
}

pub async fn delete_todo(ctx: &ApiContext, todo_id: TodoId) -> Result<(), ApiError> {
    let removed = ctx
        .storage
        .soft_delete_todo(todo_id)
        .await
        .map_err(internal)?;
    if !removed {
        return Err(not_found("todo", todo_id));
    }
    Ok(())
}

pub async fn list_projects(ctx: &ApiContext) -> Result<Vec<Project>, ApiError> {
    ctx.storage.list_projects().await.map_err(internal)
}

pub async fn create_project(ctx: &ApiContext, draft: NewProject) -> Result<Project, ApiError> {
    let draft = Projects::validate_draft(&draft)?;
    ctx.storage
        .create_project(&draft.name)
        .await
        .map_err(internal)
}

pub async fn update_project(
    ctx: &ApiContext,
    project_id: ProjectId,
    patch: ProjectPatch,
) -> Result<Project, ApiError> {
    let Some(name) = patch.name else {
        return Err(ValidationError::EmptyPatch.into());
    };
    let name = validate_title(Projects::TITLE_FIELD, &name)?;
    ctx.storage
        .rename_project(project_id, &name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("project", project_id))
}

pub async fn delete_project(ctx: &ApiContext, project_id: ProjectId) -> Result<(), ApiError> {
    let removed = ctx
        .storage
        .delete_project(project_id)
        .await
        .map_err(internal)?;
    if !removed {
        return Err(not_found("project", project_id));
    }
    Ok(())
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("{kind} {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "storage operation failed");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
