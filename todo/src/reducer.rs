//! Reducer logic for the todo list.
//!
//! Every transition is total: unknown ids and out-of-place commands leave
//! the state as it was. Loading is the only operation with an effect; its
//! result comes back as `LoadSucceeded` or `LoadFailed` and is checked
//! against the load generation and list revision before it is applied.

use crate::config::{LoadSettings, StaleLoadPolicy};
use crate::source::TodoSource;
use crate::types::{LoadStatus, TodoAction, TodoId, TodoItem, TodoState};
use std::collections::HashSet;
use std::sync::Arc;
use todolist_core::{
    async_effect,
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec, SmallVec,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Where loads fetch from
    pub source: Arc<dyn TodoSource>,
    /// Proposes ids for new items
    pub ids: Arc<dyn IdGenerator>,
    /// Timestamps applied loads
    pub clock: Arc<dyn Clock>,
    /// How load results are applied
    pub settings: LoadSettings,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with default load settings
    #[must_use]
    pub fn new(
        source: Arc<dyn TodoSource>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            ids,
            clock,
            settings: LoadSettings::default(),
        }
    }

    /// Replace the load settings
    #[must_use]
    pub const fn with_settings(mut self, settings: LoadSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Keep the first `limit` items, then drop repeated ids keeping the first
/// occurrence
///
/// Truncation happens before dedupe, so the result can be shorter than
/// `limit` even when more unique items were available.
#[must_use]
pub fn normalize_loaded(items: Vec<TodoItem>, limit: usize) -> Vec<TodoItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .take(limit)
        .filter(|item| seen.insert(item.id))
        .collect()
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Picks an id not used by any item
    ///
    /// Generator proposals that collide are skipped. A generator that keeps
    /// colliding falls back to one past the highest id in the list, or to the
    /// lowest free positive id when the highest is `i64::MAX`.
    fn allocate_id(state: &TodoState, ids: &dyn IdGenerator) -> TodoId {
        for _ in 0..=state.count() {
            let candidate = TodoId::new(ids.next_id());
            if !state.exists(candidate) {
                return candidate;
            }
            tracing::debug!(id = %candidate, "Skipping id already in use");
        }

        if let Some(next) = state.max_id().and_then(|max| max.get().checked_add(1)) {
            return TodoId::new(next);
        }

        // A list holds fewer than i64::MAX items, so a free id always exists
        let used: HashSet<TodoId> = state.items.iter().map(|t| t.id).collect();
        (1..=i64::MAX)
            .map(TodoId::new)
            .find(|id| !used.contains(id))
            .unwrap_or(TodoId::new(0))
    }

    /// Prepends a new item unless `title` is blank. Returns whether it did.
    fn add_item(state: &mut TodoState, title: String, env: &TodoEnvironment) -> bool {
        if title.trim().is_empty() {
            tracing::debug!("Ignoring add with blank title");
            return false;
        }

        let id = Self::allocate_id(state, env.ids.as_ref());
        state.items.insert(0, TodoItem::new(id, title));
        state.revision += 1;
        tracing::debug!(%id, count = state.count(), "Added todo");
        true
    }

    fn start_load(state: &mut TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        if !state.mounted {
            tracing::debug!("Ignoring load after unmount");
            return SmallVec::new();
        }

        state.load_generation += 1;
        let generation = state.load_generation;
        if let LoadStatus::Pending {
            generation: previous,
            ..
        } = state.load
        {
            tracing::debug!(previous, generation, "Superseding pending load");
        }
        state.load = LoadStatus::Pending {
            generation,
            since_revision: state.revision,
        };
        tracing::info!(generation, "Loading todos");

        let fetch = env.source.fetch_todos();
        smallvec![async_effect! {
            match fetch.await {
                Ok(items) => Some(TodoAction::LoadSucceeded { generation, items }),
                Err(error) => Some(TodoAction::LoadFailed {
                    generation,
                    reason: error.to_string(),
                }),
            }
        }]
    }

    /// Revision recorded by the pending load, if `generation` is the one
    /// in flight
    fn pending_revision(state: &TodoState, generation: u64) -> Option<u64> {
        match state.load {
            LoadStatus::Pending {
                generation: pending,
                since_revision,
            } if pending == generation => Some(since_revision),
            _ => None,
        }
    }

    fn apply_loaded(
        state: &mut TodoState,
        generation: u64,
        items: Vec<TodoItem>,
        env: &TodoEnvironment,
    ) {
        let Some(since_revision) = Self::pending_revision(state, generation) else {
            tracing::debug!(
                generation,
                current = state.load_generation,
                "Dropping superseded or cancelled load result"
            );
            return;
        };

        if state.revision != since_revision {
            match env.settings.stale_policy {
                StaleLoadPolicy::Reject => {
                    tracing::warn!(
                        generation,
                        local_changes = state.revision - since_revision,
                        "Load result arrived after local changes; keeping local list"
                    );
                    state.load = LoadStatus::Stale { generation };
                    return;
                },
                StaleLoadPolicy::Overwrite => {
                    tracing::warn!(
                        generation,
                        local_changes = state.revision - since_revision,
                        "Load result arrived after local changes; overwriting local list"
                    );
                },
            }
        }

        let received = items.len();
        state.items = normalize_loaded(items, env.settings.limit);
        state.clear_editing();
        state.load = LoadStatus::Loaded {
            at: env.clock.now(),
            count: state.count(),
        };
        tracing::info!(generation, received, kept = state.count(), "Loaded todos");
    }

    fn record_failure(state: &mut TodoState, generation: u64, reason: String) {
        if Self::pending_revision(state, generation).is_none() {
            tracing::debug!(generation, %reason, "Dropping failure of superseded or cancelled load");
            return;
        }

        tracing::error!(generation, %reason, "Failed to load todos");
        state.load = LoadStatus::Failed { reason };
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::Load => return Self::start_load(state, env),

            TodoAction::Add { title } => {
                Self::add_item(state, title, env);
            },

            TodoAction::SetComposer { text } => state.composer = text,

            TodoAction::SubmitComposer => {
                let title = state.composer.clone();
                if Self::add_item(state, title, env) {
                    state.composer.clear();
                }
            },

            TodoAction::Toggle { id } => {
                if let Some(item) = state.get_mut(id) {
                    item.completed = !item.completed;
                    state.revision += 1;
                }
            },

            TodoAction::BeginEdit { id } => {
                if let Some(title) = state.get(id).map(|item| item.title.clone()) {
                    state.editing_id = Some(id);
                    state.draft_title = title;
                }
            },

            TodoAction::SetDraft { text } => {
                if state.editing_id.is_some() {
                    state.draft_title = text;
                }
            },

            TodoAction::CommitEdit => {
                let Some(id) = state.editing_id else {
                    return SmallVec::new();
                };
                let draft = std::mem::take(&mut state.draft_title);
                if let Some(item) = state.get_mut(id) {
                    item.title = draft;
                    state.revision += 1;
                } else {
                    tracing::debug!(%id, "Edited todo no longer exists");
                }
                state.clear_editing();
            },

            TodoAction::CancelEdit => state.clear_editing(),

            TodoAction::Remove { id } => {
                let before = state.count();
                state.items.retain(|item| item.id != id);
                if state.count() != before {
                    state.revision += 1;
                    if state.is_editing(id) {
                        state.clear_editing();
                    }
                }
            },

            TodoAction::Unmount => {
                state.mounted = false;
                if let LoadStatus::Pending { generation, .. } = state.load {
                    tracing::debug!(generation, "Cancelling pending load");
                    state.load = LoadStatus::Idle;
                }
            },

            // ========== Events ==========
            TodoAction::LoadSucceeded { generation, items } => {
                Self::apply_loaded(state, generation, items, env);
            },

            TodoAction::LoadFailed { generation, reason } => {
                Self::record_failure(state, generation, reason);
            },
        }

        SmallVec::new()
    }
}
