//! Handler isolation and bounded fan-out

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::application::errors::CommandError;

/// Run one handler invocation in its own task.
///
/// Panics, errors and (when `timeout` is set) overruns are all reported as a
/// `CommandError`; nothing escapes to the caller's task. A timed out
/// invocation is aborted.
pub async fn run_isolated<F>(timeout: Option<Duration>, work: F) -> Result<(), CommandError>
where
    F: Future<Output = Result<(), CommandError>> + Send + 'static,
{
    let mut handle = tokio::spawn(work);

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return Err(CommandError::Timeout(limit));
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(CommandError::Panicked(panic_message(err.into_panic()))),
        Err(err) => Err(CommandError::ExecutionFailed(err.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f` over every item with at most `limit` units in flight.
///
/// Results come back in input order. A failing unit does not cancel its
/// siblings; callers decide what to do with each individual `Err`.
pub async fn fan_out<I, T, R, E, F, Fut>(limit: usize, items: I, f: F) -> Vec<Result<R, E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    stream::iter(items)
        .map(f)
        .buffered(limit.max(1))
        .collect()
        .await
}
