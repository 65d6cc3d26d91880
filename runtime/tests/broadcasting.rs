//! Integration tests for Store action broadcasting
//!
//! Effects that resolve asynchronously (like a network load) are observed by
//! subscribing to the actions they feed back.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use todolist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use todolist_runtime::{Store, StoreError};

#[derive(Debug, Clone, PartialEq)]
enum FetchAction {
    /// Start a fetch tagged with a request id
    Fetch { request: u64, fail: bool },
    /// Fetch resolved
    Fetched { request: u64, rows: usize },
    /// Fetch failed
    FetchFailed { request: u64, reason: String },
}

#[derive(Debug, Clone, Default)]
struct FetchState {
    in_flight: Vec<u64>,
    rows: usize,
    failures: usize,
}

#[derive(Clone)]
struct FetchEnvironment {
    latency: Duration,
}

#[derive(Clone)]
struct FetchReducer;

impl Reducer for FetchReducer {
    type State = FetchState;
    type Action = FetchAction;
    type Environment = FetchEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FetchAction::Fetch { request, fail } => {
                state.in_flight.push(request);
                let latency = env.latency;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(latency).await;
                    if fail {
                        Some(FetchAction::FetchFailed {
                            request,
                            reason: "connection reset".to_string(),
                        })
                    } else {
                        Some(FetchAction::Fetched { request, rows: 10 })
                    }
                }))]
            },
            FetchAction::Fetched { request, rows } => {
                state.in_flight.retain(|r| *r != request);
                state.rows = rows;
                SmallVec::new()
            },
            FetchAction::FetchFailed { request, .. } => {
                state.in_flight.retain(|r| *r != request);
                state.failures += 1;
                SmallVec::new()
            },
        }
    }
}

fn store(latency: Duration) -> Store<FetchState, FetchAction, FetchEnvironment, FetchReducer> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Store::new(FetchState::default(), FetchReducer, FetchEnvironment { latency })
}

#[tokio::test]
async fn test_send_and_wait_for_success() {
    let store = store(Duration::from_millis(5));

    let result = store
        .send_and_wait_for(
            FetchAction::Fetch {
                request: 1,
                fail: false,
            },
            |a| matches!(a, FetchAction::Fetched { request: 1, .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(result, FetchAction::Fetched { request: 1, rows: 10 });
}

#[tokio::test]
async fn test_send_and_wait_for_failure_terminal() {
    let store = store(Duration::from_millis(5));

    let result = store
        .send_and_wait_for(
            FetchAction::Fetch {
                request: 7,
                fail: true,
            },
            |a| {
                matches!(
                    a,
                    FetchAction::Fetched { request: 7, .. }
                        | FetchAction::FetchFailed { request: 7, .. }
                )
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert!(matches!(result, FetchAction::FetchFailed { request: 7, .. }));
}

#[tokio::test]
async fn test_send_and_wait_for_timeout() {
    let store = store(Duration::from_millis(500));

    let result = store
        .send_and_wait_for(
            FetchAction::Fetch {
                request: 2,
                fail: false,
            },
            |a| matches!(a, FetchAction::Fetched { .. }),
            Duration::from_millis(20),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn test_subscriber_sees_only_effect_actions() {
    let store = store(Duration::from_millis(1));
    let mut rx = store.subscribe_actions();

    let mut handle = store
        .send(FetchAction::Fetch {
            request: 3,
            fail: false,
        })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    let observed = rx.recv().await.unwrap();
    assert_eq!(observed, FetchAction::Fetched { request: 3, rows: 10 });
    assert!(rx.try_recv().is_err());

    let state = store.state(Clone::clone).await;
    assert!(state.in_flight.is_empty());
    assert_eq!(state.rows, 10);
}

#[tokio::test]
async fn test_local_actions_not_blocked_by_pending_effect() {
    let store = store(Duration::from_millis(50));

    let mut slow = store
        .send(FetchAction::Fetch {
            request: 4,
            fail: true,
        })
        .await
        .unwrap();

    // A second action is reduced while the first effect is still pending
    let _ = store
        .send(FetchAction::Fetched {
            request: 99,
            rows: 3,
        })
        .await
        .unwrap();
    assert_eq!(store.state(|s| s.rows).await, 3);
    assert_eq!(store.state(|s| s.in_flight.clone()).await, vec![4]);

    slow.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
    assert_eq!(store.state(|s| s.failures).await, 1);
}
