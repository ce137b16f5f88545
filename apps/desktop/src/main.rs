use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpRemoteStore, ResourceView};
use shared::{
    domain::Record,
    protocol::DEFAULT_SERVER_URL,
    resource::{Notes, Projects, Resource, Todos},
};
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Print rows as JSON lines instead of a table.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    collection: Collection,
}

#[derive(Subcommand, Debug)]
enum Collection {
    Notes {
        #[command(subcommand)]
        action: Action,
    },
    Todos {
        #[command(subcommand)]
        action: Action,
    },
    Projects {
        #[command(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand, Debug)]
enum Action {
    List,
    Add { title: String },
    Rename { id: String, title: String },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    match args.collection {
        Collection::Notes { action } => run::<Notes>(&args.server_url, action, args.json).await,
        Collection::Todos { action } => run::<Todos>(&args.server_url, action, args.json).await,
        Collection::Projects { action } => {
            run::<Projects>(&args.server_url, action, args.json).await
        }
    }
}

async fn run<R: Resource>(server_url: &str, action: Action, json: bool) -> Result<()> {
    let view = ResourceView::new(HttpRemoteStore::<R>::new(server_url)?);

    // Loaded up front so rename and delete work against the current rows.
    let count = view.reload().await?;
    info!(collection = R::COLLECTION, count, "loaded collection");

    match action {
        Action::List => {}
        Action::Add { title } => {
            let record = view.create(R::draft(&title)).await?;
            println!("created {} {}", R::COLLECTION, record.id());
        }
        Action::Rename { id, title } => {
            let id = parse_id::<R>(&id)?;
            let record = view.rename(&id, &title).await?;
            println!("renamed {} {} to '{}'", R::COLLECTION, id, record.title());
        }
        Action::Delete { id } => {
            let id = parse_id::<R>(&id)?;
            view.delete(&id).await?;
            println!("deleted {} {}", R::COLLECTION, id);
        }
    }

    print_rows(view.snapshot().await.items(), json)
}

fn parse_id<R: Resource>(raw: &str) -> Result<<R::Record as Record>::Id> {
    raw.parse()
        .with_context(|| format!("invalid {} id '{raw}'", R::COLLECTION))
}

fn print_rows<T: Record>(rows: &[T], json: bool) -> Result<()> {
    for row in rows {
        if json {
            println!("{}", serde_json::to_string(row)?);
        } else {
            println!(
                "{}\t{}\t{}",
                row.id(),
                row.created_at().to_rfc3339(),
                row.title()
            );
        }
    }
    Ok(())
}
