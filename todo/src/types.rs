//! Domain types for the todo list.
//!
//! A list is an ordered sequence of items plus a single editing cursor.
//! Items arrive from a remote source on load and are then changed locally;
//! nothing is written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todolist_macros::Action;

/// Owner recorded on items created locally
pub const DEFAULT_USER_ID: i64 = 1;

/// Identifier of a todo item, unique within one list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw identifier
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item, in the remote wire shape
/// (`{"userId": 1, "id": 1, "title": "...", "completed": false}`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Owner id; carried through, never interpreted
    pub user_id: i64,
    /// Unique identifier
    pub id: TodoId,
    /// Label shown to the user
    pub title: String,
    /// Whether the item is done
    pub completed: bool,
}

impl TodoItem {
    /// Creates an open item
    #[must_use]
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            user_id: DEFAULT_USER_ID,
            id,
            title: title.into(),
            completed: false,
        }
    }
}

/// Where the list is in its load lifecycle
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadStatus {
    /// Nothing requested yet, or the request was cancelled
    #[default]
    Idle,
    /// A request is in flight
    Pending {
        /// Generation of the in-flight request
        generation: u64,
        /// List revision when the request was issued
        since_revision: u64,
    },
    /// The last request was applied
    Loaded {
        /// When the result was applied
        at: DateTime<Utc>,
        /// Items kept after truncation and dedupe
        count: usize,
    },
    /// The last request arrived after local changes and was not applied
    Stale {
        /// Generation of the discarded request
        generation: u64,
    },
    /// The last request failed
    Failed {
        /// Transport or decode error, for diagnostics only
        reason: String,
    },
}

impl LoadStatus {
    /// True while a request is in flight
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// State of one todo list
///
/// Snapshots are plain values: clone one out of the store to render it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Items in display order; newest local additions first
    pub items: Vec<TodoItem>,
    /// Item currently open for renaming
    pub editing_id: Option<TodoId>,
    /// In-progress title for the item under edit
    pub draft_title: String,
    /// In-progress title for a new item
    pub composer: String,
    /// Load lifecycle
    pub load: LoadStatus,
    /// Number of loads issued so far
    pub load_generation: u64,
    /// Number of local changes made to `items`
    pub revision: u64,
    /// False once the owning screen went away
    pub mounted: bool,
}

impl Default for TodoState {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoState {
    /// Creates an empty, mounted list
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            editing_id: None,
            draft_title: String::new(),
            composer: String::new(),
            load: LoadStatus::Idle,
            load_generation: 0,
            revision: 0,
            mounted: true,
        }
    }

    /// Creates a mounted list holding `items` as given
    #[must_use]
    pub fn with_items(items: Vec<TodoItem>) -> Self {
        Self {
            items,
            ..Self::new()
        }
    }

    /// Returns the number of items
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.completed).count()
    }

    /// Returns an item by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Returns a mutable item by ID
    pub fn get_mut(&mut self, id: TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|t| t.id == id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn exists(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is the item open for renaming
    #[must_use]
    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing_id == Some(id)
    }

    /// Highest id in the list
    #[must_use]
    pub fn max_id(&self) -> Option<TodoId> {
        self.items.iter().map(|t| t.id).max()
    }

    /// Render model: one row per item, in display order
    ///
    /// The row under edit shows the draft instead of the stored title.
    #[must_use]
    pub fn rows(&self) -> Vec<TodoRow> {
        self.items
            .iter()
            .map(|item| {
                let editing = self.is_editing(item.id);
                TodoRow {
                    id: item.id,
                    display_title: if editing {
                        self.draft_title.clone()
                    } else {
                        item.title.clone()
                    },
                    completed: item.completed,
                    editing,
                }
            })
            .collect()
    }

    pub(crate) fn clear_editing(&mut self) {
        self.editing_id = None;
        self.draft_title.clear();
    }
}

/// One rendered list row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoRow {
    /// Item id, for wiring the row's controls
    pub id: TodoId,
    /// Text to show
    pub display_title: String,
    /// Whether the item is done
    pub completed: bool,
    /// Whether the row shows an edit field and a save control
    pub editing: bool,
}

/// Every input the list reacts to
///
/// Commands come from the user; events are fed back by the load effect.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Fetch the list from the configured source
    #[command]
    Load,

    /// Prepend a new item
    #[command]
    Add {
        /// Title of the new item
        title: String,
    },

    /// Replace the new-item text
    #[command]
    SetComposer {
        /// Current text field contents
        text: String,
    },

    /// Add the composed item and clear the text field
    #[command]
    SubmitComposer,

    /// Flip completion of an item
    #[command]
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Open an item for renaming
    #[command]
    BeginEdit {
        /// Item to rename
        id: TodoId,
    },

    /// Replace the draft title of the item under edit
    #[command]
    SetDraft {
        /// Current edit field contents
        text: String,
    },

    /// Store the draft as the item's title
    #[command]
    CommitEdit,

    /// Close the edit without storing the draft
    #[command]
    CancelEdit,

    /// Delete an item
    #[command]
    Remove {
        /// Item to delete
        id: TodoId,
    },

    /// The owning screen went away; drop in-flight results
    #[command]
    Unmount,

    // ========== Events ==========
    /// The source returned a list
    #[event]
    LoadSucceeded {
        /// Generation of the request
        generation: u64,
        /// Items as returned
        items: Vec<TodoItem>,
    },

    /// The source failed
    #[event]
    LoadFailed {
        /// Generation of the request
        generation: u64,
        /// Error description
        reason: String,
    },
}
