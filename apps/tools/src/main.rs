use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::resource::{validate_title, Notes, Projects, Resource, Todos};
use storage::Storage;

/// Seeds and maintains the server database directly, bypassing the HTTP API.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/server.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateNote { title: String },
    CreateTodo { title: String },
    CreateProject { name: String },
    /// Permanently removes todos that were soft-deleted.
    PurgeDeletedTodos,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateNote { title } => {
            let title = validate_title(Notes::TITLE_FIELD, &title)?;
            let note = storage.create_note(&title).await?;
            println!("created note_id={}", note.id);
        }
        Command::CreateTodo { title } => {
            let title = validate_title(Todos::TITLE_FIELD, &title)?;
            let todo = storage.create_todo(&title).await?;
            println!("created todo_id={}", todo.id);
        }
        Command::CreateProject { name } => {
            let name = validate_title(Projects::TITLE_FIELD, &name)?;
            let project = storage.create_project(&name).await?;
            println!("created project_id={}", project.id);
        }
        Command::PurgeDeletedTodos => {
            let purged = storage.purge_deleted_todos().await?;
            println!("purged {purged} soft-deleted todos");
        }
    }

    Ok(())
}
