//! Command-line demo for the todo list.
//!
//! Loads the configured endpoint, then runs a scripted add / toggle /
//! rename / remove sequence and prints the list after each step.
//! Set `TODO_OFFLINE=1` to use built-in sample data instead of the network.
//! Settings may also come from a `.env` file in the working directory.

use std::sync::Arc;
use std::time::Duration;
use todolist::mocks::{sample_items, StaticTodoSource};
use todolist::{
    HttpTodoSource, LoadStatus, TodoAction, TodoConfig, TodoEnvironment, TodoReducer, TodoSource,
    TodoState,
};
use todolist_core::environment::{MonotonicIds, SystemClock};
use todolist_runtime::Store;
use tracing_subscriber::EnvFilter;

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

fn print_rows(state: &TodoState) {
    for row in state.rows() {
        let status = if row.completed { "✓" } else { " " };
        let marker = if row.editing { " (editing)" } else { "" };
        println!("  [{status}] #{:<5} {}{marker}", row.id, row.display_title);
    }
    println!("  {}/{} completed", state.completed_count(), state.count());
}

async fn show(store: &TodoStore, heading: &str) {
    println!("\n{heading}");
    store.state(print_rows).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load .env file
    let _ = dotenvy::dotenv();

    let config = TodoConfig::from_env()?;
    let source: Arc<dyn TodoSource> = if std::env::var_os("TODO_OFFLINE").is_some() {
        tracing::info!("Using offline sample data");
        Arc::new(StaticTodoSource::new(sample_items(15)))
    } else {
        tracing::info!(url = %config.source_url, "Using remote source");
        Arc::new(HttpTodoSource::from_config(&config)?)
    };

    let env = TodoEnvironment::new(source, Arc::new(MonotonicIds::default()), Arc::new(SystemClock))
        .with_settings(config.load_settings());
    let store = Store::new(TodoState::new(), TodoReducer::new(), env);

    println!("=== Todo List ===");

    let mut handle = store.send(TodoAction::Load).await?;
    handle.wait_with_timeout(config.load_budget()).await?;

    let state = store.state(Clone::clone).await;
    if let LoadStatus::Failed { reason } = &state.load {
        println!("\nLoad failed ({reason}); continuing with an empty list");
    }
    show(&store, "Loaded:").await;

    store
        .send(TodoAction::SetComposer {
            text: "Write the quarterly report".to_string(),
        })
        .await?;
    store.send(TodoAction::SubmitComposer).await?;
    show(&store, "After adding an item:").await;

    let ids: Vec<_> = store.state(|s| s.items.iter().map(|t| t.id).collect()).await;

    if let Some(&first) = ids.first() {
        store.send(TodoAction::Toggle { id: first }).await?;
        show(&store, "After completing the new item:").await;
    }

    if let Some(&second) = ids.get(1) {
        store.send(TodoAction::BeginEdit { id: second }).await?;
        store
            .send(TodoAction::SetDraft {
                text: "Renamed from the demo".to_string(),
            })
            .await?;
        show(&store, "While renaming:").await;
        store.send(TodoAction::CommitEdit).await?;
        show(&store, "After renaming:").await;
    }

    if let Some(&third) = ids.get(2) {
        store.send(TodoAction::Remove { id: third }).await?;
        show(&store, "After removing an item:").await;
    }

    store.send(TodoAction::Unmount).await?;
    store.shutdown(Duration::from_secs(5)).await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
