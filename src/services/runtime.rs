//! Task Spawning
//!
//! Background work (scope observers, fire-and-forget persistence) runs on the
//! ambient tokio runtime owned by the host application. Nothing here creates a
//! runtime of its own.

use std::future::Future;
use tokio::task::JoinHandle;

/// Spawn a task with a name (for debugging)
///
/// Must be called from within a tokio runtime.
pub fn spawn_named<F>(name: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::debug!("Spawning task: {}", name);
    tokio::spawn(async move {
        future.await;
        tracing::debug!("Task completed: {}", name);
    })
}
