use super::*;

async fn setup() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext { storage }
}

#[tokio::test]
async fn create_note_trims_title() {
    let ctx = setup().await;
    let note = create_note(
        &ctx,
        NewNote {
            title: "  groceries  ".into(),
        },
    )
    .await
    .expect("note");
    assert_eq!(note.title, "groceries");
}

#[tokio::test]
async fn blank_project_name_is_a_validation_error() {
    let ctx = setup().await;
    let err = create_project(&ctx, NewProject { name: "   ".into() })
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "name required");
    assert!(list_projects(&ctx).await.expect("projects").is_empty());
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let ctx = setup().await;
    let note = create_note(&ctx, NewNote { title: "a".into() })
        .await
        .expect("note");
    let err = update_note(&ctx, note.id, NotePatch::default())
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "missing fields");
}

#[tokio::test]
async fn updating_missing_note_is_not_found() {
    let ctx = setup().await;
    let err = update_note(
        &ctx,
        NoteId(404),
        NotePatch {
            title: Some("x".into()),
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let ctx = setup().await;
    let project = create_project(&ctx, NewProject { name: "p".into() })
        .await
        .expect("project");
    delete_project(&ctx, project.id).await.expect("delete");
    let err = delete_project(&ctx, project.id)
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn todo_patch_with_deleted_flag_soft_deletes() {
    let ctx = setup().await;
    let todo = create_todo(&ctx, NewTodo { title: "t".into() })
        .await
        .expect("todo");

    let tombstone = update_todo(
        &ctx,
        todo.id,
        TodoPatch {
            title: None,
            deleted: Some(true),
        },
    )
    .await
    .expect("soft delete");
    assert!(tombstone.deleted);
    assert!(list_todos(&ctx).await.expect("todos").is_empty());
}

#[tokio::test]
async fn todo_patch_can_rename() {
    let ctx = setup().await;
    let todo = create_todo(&ctx, NewTodo { title: "old".into() })
        .await
        .expect("todo");
    let renamed = update_todo(
        &ctx,
        todo.id,
        TodoPatch {
            title: Some(" new ".into()),
            deleted: None,
        },
    )
    .await
    .expect("rename");
    assert_eq!(renamed.title, "new");
    assert!(!renamed.deleted);
}

#[tokio::test]
async fn todo_restore_is_rejected() {
    let ctx = setup().await;
    let todo = create_todo(&ctx, NewTodo { title: "t".into() })
        .await
        .expect("todo");
    let err = update_todo(
        &ctx,
        todo.id,
        TodoPatch {
            title: None,
            deleted: Some(false),
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
}
