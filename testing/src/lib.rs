//! # Todolist Testing
//!
//! Testing utilities and helpers for the todolist reducer architecture.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::Add { title: "Buy milk".into() })
//!     .then_state(|state| assert_eq!(state.count(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todolist_core::environment::{Clock, IdGenerator};

/// Ergonomic testing utilities for reducers
pub mod reducer_test;

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::FixedClock;
    /// use todolist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// Id generator that proposes a scripted sequence, then counts upward
    /// from the last scripted value, holding at `i64::MAX`
    ///
    /// Scripting lets tests force collisions with ids already in state.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::ScriptedIds;
    /// use todolist_core::environment::IdGenerator;
    ///
    /// let ids = ScriptedIds::new([5, 5, 9]);
    /// assert_eq!(ids.next_id(), 5);
    /// assert_eq!(ids.next_id(), 5);
    /// assert_eq!(ids.next_id(), 9);
    /// assert_eq!(ids.next_id(), 10);
    /// ```
    #[derive(Debug)]
    pub struct ScriptedIds {
        inner: Mutex<(VecDeque<i64>, i64)>,
    }

    impl ScriptedIds {
        /// Create a generator that proposes `script` in order
        #[must_use]
        pub fn new(script: impl IntoIterator<Item = i64>) -> Self {
            Self {
                inner: Mutex::new((script.into_iter().collect(), 0)),
            }
        }
    }

    impl IdGenerator for ScriptedIds {
        fn next_id(&self) -> i64 {
            let mut inner = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let (script, last) = &mut *inner;
            let next = script.pop_front().unwrap_or_else(|| last.saturating_add(1));
            *last = next;
            next
        }
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, ScriptedIds};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_scripted_ids_continue_after_script() {
        let ids = ScriptedIds::new([3]);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.next_id(), 4);
        assert_eq!(ids.next_id(), 5);
    }

    #[test]
    fn test_scripted_ids_hold_at_max() {
        let ids = ScriptedIds::new([i64::MAX]);
        assert_eq!(ids.next_id(), i64::MAX);
        assert_eq!(ids.next_id(), i64::MAX);
    }

    #[test]
    fn test_empty_script_starts_at_one() {
        let ids = ScriptedIds::new(Vec::<i64>::new());
        assert_eq!(ids.next_id(), 1);
    }
}
