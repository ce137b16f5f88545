use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Note, NoteId, Project, ProjectId, Todo, TodoId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, title, created_at FROM notes ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(note_from_row).collect())
    }

    pub async fn create_note(&self, title: &str) -> Result<Note> {
        let row = sqlx::query(
            "INSERT INTO notes (title, created_at) VALUES (?, ?) RETURNING id, title, created_at",
        )
        .bind(title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert note")?;
        Ok(note_from_row(&row))
    }

    pub async fn rename_note(&self, note_id: NoteId, title: &str) -> Result<Option<Note>> {
        let row = sqlx::query(
            "UPDATE notes SET title = ? WHERE id = ? RETURNING id, title, created_at",
        )
        .bind(title)
        .bind(note_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(note_from_row))
    }

    pub async fn delete_note(&self, note_id: NoteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Live todos only; soft-deleted rows stay in the table but never list.
    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(
            "SELECT id, title, deleted, created_at
             FROM todos
             WHERE deleted = 0
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(todo_from_row).collect())
    }

    pub async fn create_todo(&self, title: &str) -> Result<Todo> {
        let row = sqlx::query(
            "INSERT INTO todos (title, deleted, created_at) VALUES (?, 0, ?)
             RETURNING id, title, deleted, created_at",
        )
        .bind(title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert todo")?;
        Ok(todo_from_row(&row))
    }

    pub async fn rename_todo(&self, todo_id: TodoId, title: &str) -> Result<Option<Todo>> {
        let row = sqlx::query(
            "UPDATE todos SET title = ? WHERE id = ? AND deleted = 0
             RETURNING id, title, deleted, created_at",
        )
        .bind(title)
        .bind(todo_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(todo_from_row))
    }

    pub async fn soft_delete_todo(&self, todo_id: TodoId) -> Result<bool> {
        let result = sqlx::query("UPDATE todos SET deleted = 1 WHERE id = ? AND deleted = 0")
            .bind(todo_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn load_todo_any_state(&self, todo_id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query("SELECT id, title, deleted, created_at FROM todos WHERE id = ?")
            .bind(todo_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(todo_from_row))
    }

    /// Drops soft-deleted todos for good. Returns the number of rows removed.
    pub async fn purge_deleted_todos(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE deleted = 1")
            .execute(&self.pool)
            .await?;
        debug!(rows = result.rows_affected(), "purged soft-deleted todos");
        Ok(result.rows_affected())
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(
            "SELECT id, name, created_at FROM projects ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(project_from_row).collect()
    }

    pub async fn create_project(&self, name: &str) -> Result<Project> {
        let project_id = ProjectId::new_v4();
        let row = sqlx::query(
            "INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)
             RETURNING id, name, created_at",
        )
        .bind(project_id.to_string())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert project")?;
        project_from_row(&row)
    }

    pub async fn rename_project(&self, project_id: ProjectId, name: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            "UPDATE projects SET name = ? WHERE id = ? RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(project_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    pub async fn delete_project(&self, project_id: ProjectId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn note_from_row(r: &SqliteRow) -> Note {
    Note {
        id: NoteId(r.get::<i64, _>(0)),
        title: r.get::<String, _>(1),
        created_at: r.get::<DateTime<Utc>, _>(2),
    }
}

fn todo_from_row(r: &SqliteRow) -> Todo {
    Todo {
        id: TodoId(r.get::<i64, _>(0)),
        title: r.get::<String, _>(1),
        deleted: r.get::<bool, _>(2),
        created_at: r.get::<DateTime<Utc>, _>(3),
    }
}

fn project_from_row(r: &SqliteRow) -> Result<Project> {
    let raw_id = r.get::<String, _>(0);
    let id = raw_id
        .parse::<ProjectId>()
        .with_context(|| format!("corrupt project id '{raw_id}'"))?;
    Ok(Project {
        id,
        name: r.get::<String, _>(1),
        created_at: r.get::<DateTime<Utc>, _>(2),
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
