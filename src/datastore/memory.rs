// ABOUTME: In-memory document store with serialized, atomic transactions
// ABOUTME: Reference backend for tests and local development, honoring Firestore transaction rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Transactions hold the store lock from `begin` until `commit` or
//! `rollback`, so they never interleave. Writes are buffered in the
//! transaction and applied in one step on commit; a read issued after the
//! first buffered write fails with [`DatastoreError::ReadAfterWrite`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::{
    filter, CollectionRef, Document, DocumentRef, DocumentStore, DocumentStream, Transaction,
};
use crate::context::CancellationToken;
use crate::errors::DatastoreError;
use crate::query::Query;

/// Collection name -> document id -> fields
type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Shared in-process document store
///
/// Cloning shares the underlying collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw document outside any transaction
    ///
    /// Waits for the running transaction, if any, to finish.
    pub async fn insert_raw(&self, collection: &str, id: &str, data: Value) {
        self.collections
            .lock()
            .await
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
    }

    /// Committed documents of a collection, ordered by id
    pub async fn snapshot(&self, collection: &str) -> Vec<Document> {
        let collection_ref = CollectionRef::new(collection);
        self.collections
            .lock()
            .await
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| Document {
                        reference: collection_ref.doc(id.clone()),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self, ctx: &CancellationToken) -> Result<Self::Tx, DatastoreError> {
        let guard = ctx
            .run_until_cancelled(Arc::clone(&self.collections).lock_owned())
            .await
            .ok_or(DatastoreError::Cancelled)?;
        Ok(InMemoryTransaction {
            state: Arc::new(Mutex::new(TxState {
                snapshot: Some(guard),
                writes: Vec::new(),
            })),
        })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), DatastoreError> {
        let mut state = tx.state.lock().await;
        let mut collections = state
            .snapshot
            .take()
            .ok_or(DatastoreError::TransactionClosed)?;

        let applied = state.writes.len();
        for write in state.writes.drain(..) {
            match write {
                Write::Set(doc, data) => {
                    collections
                        .entry(doc.collection().to_owned())
                        .or_default()
                        .insert(doc.id().to_owned(), data);
                }
                Write::Delete(doc) => {
                    if let Some(documents) = collections.get_mut(doc.collection()) {
                        documents.remove(doc.id());
                    }
                }
            }
        }
        debug!(writes = applied, "Committed in-memory transaction");
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), DatastoreError> {
        let mut state = tx.state.lock().await;
        let released = state
            .snapshot
            .take()
            .ok_or(DatastoreError::TransactionClosed)?;
        state.writes.clear();
        drop(released);
        debug!("Rolled back in-memory transaction");
        Ok(())
    }
}

#[derive(Debug)]
enum Write {
    Set(DocumentRef, Value),
    Delete(DocumentRef),
}

#[derive(Debug)]
struct TxState {
    snapshot: Option<OwnedMutexGuard<Collections>>,
    writes: Vec<Write>,
}

impl TxState {
    fn open(&self) -> Result<&Collections, DatastoreError> {
        self.snapshot
            .as_deref()
            .ok_or(DatastoreError::TransactionClosed)
    }

    fn readable(&self) -> Result<&Collections, DatastoreError> {
        let collections = self.open()?;
        if self.writes.is_empty() {
            Ok(collections)
        } else {
            Err(DatastoreError::ReadAfterWrite)
        }
    }

    /// Existence as seen by this transaction, buffered writes included
    fn exists(&self, doc: &DocumentRef) -> Result<bool, DatastoreError> {
        let collections = self.open()?;
        let buffered = self.writes.iter().rev().find_map(|write| match write {
            Write::Set(target, _) if target == doc => Some(true),
            Write::Delete(target) if target == doc => Some(false),
            _ => None,
        });
        Ok(buffered.unwrap_or_else(|| {
            collections
                .get(doc.collection())
                .is_some_and(|documents| documents.contains_key(doc.id()))
        }))
    }
}

/// Transaction handle of [`InMemoryStore`]
#[derive(Debug, Clone)]
pub struct InMemoryTransaction {
    state: Arc<Mutex<TxState>>,
}

impl InMemoryTransaction {
    async fn run_query(
        &self,
        collection: &CollectionRef,
        query: &Query,
    ) -> Result<Vec<Document>, DatastoreError> {
        filter::validate(query)?;
        let state = self.state.lock().await;
        let mut documents: Vec<Document> = state
            .readable()?
            .get(collection.name())
            .map(|stored| {
                stored
                    .iter()
                    .filter(|(_, data)| filter::matches_all(data, query))
                    .map(|(id, data)| Document {
                        reference: collection.doc(id.clone()),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(state);

        filter::apply_orders(&mut documents, &query.orders, |doc: &Document| &doc.data);
        if let Some(limit) = query.effective_limit() {
            documents.truncate(limit);
        }
        Ok(documents)
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn get(&self, doc: &DocumentRef) -> Result<Option<Document>, DatastoreError> {
        let state = self.state.lock().await;
        let data = state
            .readable()?
            .get(doc.collection())
            .and_then(|documents| documents.get(doc.id()))
            .cloned();
        Ok(data.map(|data| Document {
            reference: doc.clone(),
            data,
        }))
    }

    fn documents(&self, collection: &CollectionRef, query: &Query) -> DocumentStream {
        let tx = self.clone();
        let collection = collection.clone();
        let query = query.clone();

        stream::once(async move { tx.run_query(&collection, &query).await })
            .flat_map(|result| {
                let items: Vec<Result<Document, DatastoreError>> = match result {
                    Ok(documents) => documents.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed()
    }

    async fn set(&self, doc: &DocumentRef, data: Value) -> Result<(), DatastoreError> {
        let mut state = self.state.lock().await;
        state.open()?;
        state.writes.push(Write::Set(doc.clone(), data));
        Ok(())
    }

    async fn create(&self, doc: &DocumentRef, data: Value) -> Result<(), DatastoreError> {
        let mut state = self.state.lock().await;
        if state.exists(doc)? {
            return Err(DatastoreError::AlreadyExists(doc.path()));
        }
        state.writes.push(Write::Set(doc.clone(), data));
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), DatastoreError> {
        let mut state = self.state.lock().await;
        state.open()?;
        state.writes.push(Write::Delete(doc.clone()));
        Ok(())
    }
}
