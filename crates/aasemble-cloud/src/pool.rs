//! Worker pools for fanning out independent remote calls

use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};

/// Runs a batch of independent tasks
///
/// Results come back in the order the tasks were given. How many tasks run
/// at once is up to the pool.
pub trait WorkerPool: Send + Sync {
    fn map<'a, T: Send + 'a>(&'a self, tasks: Vec<BoxFuture<'a, T>>) -> BoxFuture<'a, Vec<T>>;
}

/// Runs at most `limit` tasks concurrently
#[derive(Debug, Clone, Copy)]
pub struct BoundedPool {
    limit: usize,
}

impl BoundedPool {
    pub const DEFAULT_LIMIT: usize = 8;

    /// A `limit` of zero is treated as one
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for BoundedPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

impl WorkerPool for BoundedPool {
    fn map<'a, T: Send + 'a>(&'a self, tasks: Vec<BoxFuture<'a, T>>) -> BoxFuture<'a, Vec<T>> {
        Box::pin(stream::iter(tasks).buffered(self.limit).collect())
    }
}

/// Runs tasks one after another
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePool;

impl WorkerPool for InlinePool {
    fn map<'a, T: Send + 'a>(&'a self, tasks: Vec<BoxFuture<'a, T>>) -> BoxFuture<'a, Vec<T>> {
        Box::pin(async move {
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                results.push(task.await);
            }
            results
        })
    }
}
