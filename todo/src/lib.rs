//! State for a todo list screen.
//!
//! The list is loaded once from a remote JSON endpoint (the first ten items,
//! deduplicated by id) and then edited locally: add, toggle, rename and
//! remove. Nothing is written back; the state lives as long as its store.
//!
//! - `types`: items, list state, render rows and the `TodoAction` enum
//! - `reducer`: the transitions, plus load result handling
//! - `source`: the `TodoSource` seam and its HTTP implementation
//! - `config`: environment-driven settings
//! - `mocks`: in-memory sources
//!
//! # Quick Start
//!
//! ```no_run
//! use todolist::{
//!     HttpTodoSource, TodoAction, TodoConfig, TodoEnvironment, TodoReducer, TodoState,
//! };
//! use todolist_core::environment::{MonotonicIds, SystemClock};
//! use todolist_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TodoConfig::from_env()?;
//! let env = TodoEnvironment::new(
//!     Arc::new(HttpTodoSource::from_config(&config)?),
//!     Arc::new(MonotonicIds::default()),
//!     Arc::new(SystemClock),
//! )
//! .with_settings(config.load_settings());
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load, and wait for the fetch to finish
//! let mut handle = store.send(TodoAction::Load).await?;
//! handle.wait().await;
//!
//! store
//!     .send(TodoAction::Add { title: "Buy milk".to_string() })
//!     .await?;
//!
//! for row in store.state(|s| s.rows()).await {
//!     println!("[{}] {}", if row.completed { "x" } else { " " }, row.display_title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod mocks;
pub mod reducer;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigError, LoadSettings, StaleLoadPolicy, TodoConfig};
pub use reducer::{normalize_loaded, TodoEnvironment, TodoReducer};
pub use source::{HttpTodoSource, SourceError, TodoSource};
pub use types::{LoadStatus, TodoAction, TodoId, TodoItem, TodoRow, TodoState, DEFAULT_USER_ID};
