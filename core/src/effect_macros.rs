//! Declarative macro for ergonomic effect construction
//!
//! Removes the boilerplate of building the boxed-and-pinned `Effect::Future`
//! in reducers.

/// Create an `Effect::Future` from an async block
///
/// The body is moved into an `async move` block and must evaluate to
/// `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use todolist_core::async_effect;
///
/// async_effect! {
///     match source.fetch_todos().await {
///         Ok(items) => Some(TodoAction::LoadSucceeded { generation, items }),
///         Err(error) => Some(TodoAction::LoadFailed { generation, reason: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Fetched { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let value = 42;
        let effect = async_effect! {
            Some(TestAction::Fetched { value })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds Effect::Future");
        };
        assert_eq!(
            tokio_test::block_on(fut),
            Some(TestAction::Fetched { value: 42 })
        );
    }

    #[test]
    fn test_async_effect_macro_without_action() {
        let effect: Effect<TestAction> = async_effect! { None };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds Effect::Future");
        };
        assert_eq!(tokio_test::block_on(fut), None);
    }
}
