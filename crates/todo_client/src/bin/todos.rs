use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use todo_client::{TodoListView, TodosApi};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todos", about = "Manage your to-do list from the terminal")]
struct Cli {
    /// Base URL of the deployed to-do API
    #[arg(long, env = "TODO_API_ENDPOINT")]
    endpoint: String,
    /// Identity token sent as the bearer credential
    #[arg(long, env = "TODO_ID_TOKEN", hide_env_values = true)]
    token: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every todo
    List,
    /// Show todos whose name equals the keyword exactly
    Search { keyword: String },
    /// Create a todo (due in one week unless --due is given)
    Add {
        name: String,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Flip the done flag of a todo
    Toggle { todo_id: String },
    /// Delete a todo
    Delete { todo_id: String },
    /// Upload a file as the todo's attachment
    Attach { todo_id: String, file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = TodosApi::new(cli.endpoint, cli.token);
    let mut view = TodoListView::new();

    let succeeded = match cli.command {
        Commands::List => view.refresh(&api),
        Commands::Search { keyword } => view.search(&api, &keyword),
        Commands::Add { name, due } => {
            view.refresh(&api) && view.create(&api, &name, due.as_deref())
        }
        Commands::Toggle { todo_id } => view.refresh(&api) && view.toggle(&api, &todo_id),
        Commands::Delete { todo_id } => view.refresh(&api) && view.remove(&api, &todo_id),
        Commands::Attach { todo_id, file } => match fs::read(&file) {
            Ok(body) => view.attach(&api, &todo_id, body) && view.refresh(&api),
            Err(error) => {
                eprintln!("failed to read '{}': {error}", file.display());
                exit(1);
            }
        },
    };

    if !succeeded {
        if let Some(message) = &view.last_error {
            eprintln!("{message}");
        }
        exit(1);
    }

    println!("{}", view.render());
}
