// ABOUTME: Disjunctive (OR) queries over a store that only supports conjunctive filters
// ABOUTME: Runs each query concurrently inside one transaction and merges results into a stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # OR Engine
//!
//! [`or`] starts up to `concurrency` workers. Each worker takes the next
//! query nobody has started yet, runs it through the transaction and sends
//! the decoded documents into its own bounded channel. The returned
//! [`OrStream`] merges those channels.
//!
//! Caveats callers rely on:
//!
//! - Results are a union without global ordering; a document matching two
//!   queries is yielded twice.
//! - Each query's own orders and limit are honoured, but no global limit is
//!   applied to the merged output.
//! - The first error ends the stream. Workers are told to stop and nothing
//!   is yielded afterwards.
//! - Cancelling the caller's token, or dropping the stream, stops all workers.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::{select_all, SelectAll, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use super::{CollectionRef, Document, Transaction};
use crate::constants::{DEFAULT_OR_BUFFER_SIZE, DEFAULT_OR_CONCURRENCY};
use crate::context::CancellationToken;
use crate::errors::{AppError, AppResult};
use crate::query::Query;

/// Tuning knobs for the OR engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrOptions {
    /// Maximum number of queries running at once (at least 1)
    pub concurrency: usize,
    /// Capacity of each worker's result buffer (0 behaves as 1)
    pub buffer_size: usize,
}

impl Default for OrOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_OR_CONCURRENCY,
            buffer_size: DEFAULT_OR_BUFFER_SIZE,
        }
    }
}

impl OrOptions {
    /// Options with the given concurrency and buffer size
    #[must_use]
    pub const fn new(concurrency: usize, buffer_size: usize) -> Self {
        Self {
            concurrency,
            buffer_size,
        }
    }
}

type Pending = Arc<Mutex<VecDeque<Query>>>;

/// Run `queries` against `collection` and stream the union of their results
///
/// Each document is turned into a fresh `T` by `decoder`. With no queries the
/// stream is empty. Must be called from within a Tokio runtime.
pub fn or<Tx, T, D>(
    ctx: &CancellationToken,
    options: OrOptions,
    tx: &Tx,
    collection: &CollectionRef,
    queries: Vec<Query>,
    decoder: D,
) -> OrStream<T>
where
    Tx: Transaction,
    T: Send + 'static,
    D: Fn(Document) -> AppResult<T> + Send + Sync + 'static,
{
    let workers = options.concurrency.max(1).min(queries.len());
    let capacity = options.buffer_size.max(1);
    let internal = ctx.child_token();
    debug!(
        collection = collection.name(),
        queries = queries.len(),
        workers,
        "Starting OR query"
    );

    let pending: Pending = Arc::new(Mutex::new(VecDeque::from(queries)));
    let decoder = Arc::new(decoder);

    let receivers = (0..workers).map(|worker| {
        let (sender, receiver) = mpsc::channel(capacity);
        tokio::spawn(run_worker(
            worker,
            tx.clone(),
            collection.clone(),
            Arc::clone(&pending),
            Arc::clone(&decoder),
            internal.clone(),
            sender,
        ));
        ReceiverStream::new(receiver)
    });

    OrStream {
        merged: select_all(receivers),
        caller: ctx.clone(),
        internal,
        finished: false,
    }
}

/// [`or`] decoding each document with serde
pub fn or_deserialize<Tx, T>(
    ctx: &CancellationToken,
    options: OrOptions,
    tx: &Tx,
    collection: &CollectionRef,
    queries: Vec<Query>,
) -> OrStream<T>
where
    Tx: Transaction,
    T: DeserializeOwned + Send + 'static,
{
    or(ctx, options, tx, collection, queries, |document: Document| {
        document.data_to::<T>().map_err(AppError::from)
    })
}

async fn run_worker<Tx, T, D>(
    worker: usize,
    tx: Tx,
    collection: CollectionRef,
    pending: Pending,
    decoder: Arc<D>,
    token: CancellationToken,
    sender: mpsc::Sender<AppResult<T>>,
) where
    Tx: Transaction,
    T: Send + 'static,
    D: Fn(Document) -> AppResult<T> + Send + Sync + 'static,
{
    while !token.is_cancelled() {
        let Some(query) = pending.lock().await.pop_front() else {
            break;
        };
        let mut documents = tx.documents(&collection, &query);

        loop {
            let next = tokio::select! {
                () = token.cancelled() => return,
                next = documents.next() => next,
            };
            let Some(result) = next else {
                break;
            };

            let item = match result {
                Ok(document) => decoder(document),
                Err(e) => Err(AppError::from(e)),
            };
            let failed = item.is_err();
            let delivered = tokio::select! {
                () = token.cancelled() => return,
                sent = sender.send(item) => sent.is_ok(),
            };
            if failed {
                debug!(worker, "OR query worker failed, stopping remaining queries");
                token.cancel();
                return;
            }
            if !delivered {
                // Receiver dropped
                return;
            }
        }
    }
}

/// Merged result stream of an OR query
///
/// Yields `Ok` items until every query is exhausted, or a single `Err`
/// after which it only yields `None`.
pub struct OrStream<T> {
    merged: SelectAll<ReceiverStream<AppResult<T>>>,
    caller: CancellationToken,
    internal: CancellationToken,
    finished: bool,
}

impl<T> OrStream<T> {
    fn fail(&mut self, error: AppError) -> Poll<Option<AppResult<T>>> {
        self.finished = true;
        self.internal.cancel();
        Poll::Ready(Some(Err(error)))
    }
}

impl<T> Stream for OrStream<T> {
    type Item = AppResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        if this.caller.is_cancelled() {
            return this.fail(AppError::cancelled());
        }

        match this.merged.poll_next_unpin(cx) {
            Poll::Ready(Some(Err(error))) => this.fail(error),
            // Workers exit without sending when the caller cancels
            Poll::Ready(None) if this.caller.is_cancelled() => this.fail(AppError::cancelled()),
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl<T> Drop for OrStream<T> {
    fn drop(&mut self) {
        self.internal.cancel();
    }
}
