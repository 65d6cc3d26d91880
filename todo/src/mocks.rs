//! In-memory [`TodoSource`] implementations for tests and offline runs.

use crate::source::{SourceError, TodoSource};
use crate::types::{TodoId, TodoItem};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Builds `count` items with ids `1..=count`, the shape the public demo API
/// returns
#[must_use]
pub fn sample_items(count: usize) -> Vec<TodoItem> {
    (1..=count)
        .map(|n| {
            let id = i64::try_from(n).unwrap_or(i64::MAX);
            TodoItem {
                user_id: 1,
                id: TodoId::new(id),
                title: format!("sample todo {n}"),
                completed: n % 3 == 0,
            }
        })
        .collect()
}

/// Always returns the same list, optionally after a delay
#[derive(Clone, Debug)]
pub struct StaticTodoSource {
    items: Vec<TodoItem>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl StaticTodoSource {
    /// Returns `items` immediately
    #[must_use]
    pub fn new(items: Vec<TodoItem>) -> Self {
        Self {
            items,
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait `latency` before answering
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of fetches started so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TodoSource for StaticTodoSource {
    fn fetch_todos(&self) -> BoxFuture<'static, Result<Vec<TodoItem>, SourceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.clone();
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(items)
        })
    }
}

/// Always fails with the same error
#[derive(Clone, Debug)]
pub struct FailingTodoSource {
    error: SourceError,
}

impl FailingTodoSource {
    /// Fails every fetch with `error`
    #[must_use]
    pub const fn new(error: SourceError) -> Self {
        Self { error }
    }
}

impl Default for FailingTodoSource {
    fn default() -> Self {
        Self::new(SourceError::RequestFailed("connection refused".to_string()))
    }
}

impl TodoSource for FailingTodoSource {
    fn fetch_todos(&self) -> BoxFuture<'static, Result<Vec<TodoItem>, SourceError>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

type ScriptedResponse = (Duration, Result<Vec<TodoItem>, SourceError>);

/// Answers each fetch with the next scripted response
///
/// Each response carries its own latency, so overlapping loads can be made
/// to resolve out of order. Fetches past the end of the script fail.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTodoSource {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
}

impl ScriptedTodoSource {
    /// Creates a source with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response delivered after `latency`
    #[must_use]
    pub fn then_items(self, latency: Duration, items: Vec<TodoItem>) -> Self {
        self.push((latency, Ok(items)));
        self
    }

    /// Queue a failure delivered after `latency`
    #[must_use]
    pub fn then_error(self, latency: Duration, error: SourceError) -> Self {
        self.push((latency, Err(error)));
        self
    }

    /// Responses not yet handed out
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn push(&self, response: ScriptedResponse) {
        self.lock().push_back(response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ScriptedResponse>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoSource for ScriptedTodoSource {
    fn fetch_todos(&self) -> BoxFuture<'static, Result<Vec<TodoItem>, SourceError>> {
        let (latency, result) = self.lock().pop_front().unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(SourceError::RequestFailed("script exhausted".to_string())),
            )
        });
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_counts_calls() {
        let source = StaticTodoSource::new(sample_items(3));

        let items = source.fetch_todos().await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = FailingTodoSource::default();
        let err = source.fetch_todos().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_scripted_source_in_order_then_exhausted() {
        let source = ScriptedTodoSource::new()
            .then_items(Duration::ZERO, sample_items(1))
            .then_error(Duration::ZERO, SourceError::Decode("eof".into()));

        assert_eq!(source.remaining(), 2);
        assert_eq!(source.fetch_todos().await.unwrap().len(), 1);
        assert_eq!(
            source.fetch_todos().await.unwrap_err(),
            SourceError::Decode("eof".into())
        );
        assert!(matches!(
            source.fetch_todos().await,
            Err(SourceError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_sample_items_ids() {
        let ids: Vec<i64> = sample_items(4).iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
