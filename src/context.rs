// ABOUTME: Cloneable cancellation token with parent-to-child propagation
// ABOUTME: Every store and manager operation races its work against the caller's token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Cancelling a token cancels every child derived from it; cancelling a
//! child leaves its parent untouched. Tokens are cheap to clone and all
//! clones observe the same state.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    state: watch::Sender<bool>,
    parent: Option<CancellationToken>,
}

/// Cancellation signal shared between a caller and the work it started
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a root token
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state,
                parent: None,
            }),
        }
    }

    /// Derive a token that is cancelled whenever this one is
    #[must_use]
    pub fn child_token(&self) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancel this token and all of its children
    pub fn cancel(&self) {
        self.inner.state.send_replace(true);
    }

    /// Whether this token or any ancestor has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.state.borrow()
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(Self::is_cancelled)
    }

    /// Resolve once this token or any ancestor is cancelled
    pub fn cancelled(&self) -> BoxFuture<'_, ()> {
        async move {
            let mut own = self.inner.state.subscribe();
            match &self.inner.parent {
                Some(parent) => {
                    tokio::select! {
                        _ = own.wait_for(|cancelled| *cancelled) => {}
                        () = parent.cancelled() => {}
                    }
                }
                None => {
                    // The sender lives as long as `self`, so this only returns on cancel
                    let _ = own.wait_for(|cancelled| *cancelled).await;
                }
            }
        }
        .boxed()
    }

    /// Run `future` to completion unless the token is cancelled first
    ///
    /// Returns `None` when cancellation won the race.
    pub async fn run_until_cancelled<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancelled() => None,
            output = future => Some(output),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_child_follows_parent() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        let grandchild = child.child_token();
        assert!(!grandchild.is_cancelled());

        parent.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_child_does_not_cancel_parent() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        let waiter = tokio::spawn(async move { child.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        parent.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_until_cancelled() {
        let token = CancellationToken::new();
        assert_eq!(token.run_until_cancelled(async { 7 }).await, Some(7));

        token.cancel();
        assert_eq!(token.run_until_cancelled(async { 7 }).await, None);
    }
}
