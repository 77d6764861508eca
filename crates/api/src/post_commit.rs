//! Best-effort work that runs after a transaction has committed.
//!
//! Each hook runs on its own task, so an error or a panic in one never
//! affects the others or the response already decided by the caller.
//! Failures are logged and dropped.

use std::fmt::Display;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

type Hook = BoxFuture<'static, Result<(), String>>;

/// An ordered list of named, independently fault-isolated hooks.
#[derive(Default)]
pub struct PostCommit {
    hooks: Vec<(&'static str, Hook)>,
}

impl PostCommit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a hook. Nothing runs until [`run`](Self::run).
    pub fn push<F, T, E>(&mut self, name: &'static str, hook: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Display,
    {
        let hook = async move { hook.await.map(|_| ()).map_err(|e| e.to_string()) }.boxed();
        self.hooks.push((name, hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook to completion, in order. Returns how many succeeded.
    pub async fn run(self) -> usize {
        let mut succeeded = 0;
        for (name, hook) in self.hooks {
            match tokio::spawn(hook).await {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(error)) => {
                    tracing::warn!(hook = name, %error, "Post-commit hook failed");
                }
                Err(join_error) => {
                    tracing::error!(hook = name, error = %join_error, "Post-commit hook panicked");
                }
            }
        }
        succeeded
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn failing_hook_does_not_stop_the_rest() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut hooks = PostCommit::new();

        let c = Arc::clone(&counter);
        hooks.push("first", async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        });
        hooks.push("broken", async { Err::<(), _>("boom") });
        hooks.push("panics", async {
            if true {
                panic!("hook panic");
            }
            Ok::<(), String>(())
        });
        let c = Arc::clone(&counter);
        hooks.push("last", async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        });

        assert_eq!(hooks.len(), 4);
        assert_eq!(hooks.run().await, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_list_runs_nothing() {
        let hooks = PostCommit::new();
        assert!(hooks.is_empty());
        assert_eq!(hooks.run().await, 0);
    }
}
