// ABOUTME: Document store abstraction with transactional reads and buffered writes
// ABOUTME: Defines the store/transaction traits, references, and the run_transaction helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Document Store Layer
//!
//! Managers talk to the database only through [`DocumentStore`] and its
//! [`Transaction`] type. A transaction follows Firestore rules: every read
//! happens before the first write, and writes become visible atomically on
//! commit.
//!
//! [`run_transaction`] is the single entry point used by the managers. It
//! commits when the closure succeeds, rolls back when it fails, and gives up
//! with a cancellation error if the caller's token fires first. It never
//! retries.

use std::future::Future;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::DOCUMENT_ID_LENGTH;
use crate::context::CancellationToken;
use crate::errors::{AppError, AppResult, DatastoreError};
use crate::query::Query;

/// Predicate evaluation and ordering over JSON documents
pub mod filter;

/// In-process store with serialized transactions
pub mod memory;

/// Disjunctive queries over a conjunctive store
pub mod or_query;

pub use or_query::{or, or_deserialize, OrOptions, OrStream};

/// Stream of documents returned by a query
pub type DocumentStream = BoxStream<'static, Result<Document, DatastoreError>>;

/// Reference to a named collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    name: String,
}

impl CollectionRef {
    /// Reference the collection with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Collection name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference a document of this collection by id
    pub fn doc(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef {
            collection: self.name.clone(),
            id: id.into(),
        }
    }

    /// Reference a new document under a random 20-character alphanumeric id
    #[must_use]
    pub fn new_doc(&self) -> DocumentRef {
        let id: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DOCUMENT_ID_LENGTH)
            .map(char::from)
            .collect();
        self.doc(id)
    }
}

/// Reference to a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    collection: String,
    id: String,
}

impl DocumentRef {
    /// Owning collection name
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `collection/id` path used in log and error messages
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

/// Snapshot of a stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where the document lives
    pub reference: DocumentRef,
    /// Stored fields
    pub data: Value,
}

impl Document {
    /// Document id
    #[must_use]
    pub fn id(&self) -> &str {
        self.reference.id()
    }

    /// Decode the stored fields into `T`
    ///
    /// # Errors
    /// Returns [`DatastoreError::Decode`] if the fields do not match `T`
    pub fn data_to<T: DeserializeOwned>(&self) -> Result<T, DatastoreError> {
        T::deserialize(&self.data).map_err(|e| DatastoreError::Decode {
            document: self.reference.path(),
            reason: e.to_string(),
        })
    }
}

/// Operations available inside a transaction
///
/// Handles are cheap to clone; all clones share the same transaction so
/// concurrent queries can run against one snapshot.
#[async_trait]
pub trait Transaction: Clone + Send + Sync + 'static {
    /// Read a document by reference, `None` if it does not exist
    async fn get(&self, doc: &DocumentRef) -> Result<Option<Document>, DatastoreError>;

    /// Stream the documents of `collection` matching `query`
    fn documents(&self, collection: &CollectionRef, query: &Query) -> DocumentStream;

    /// Create or overwrite a document
    async fn set(&self, doc: &DocumentRef, data: Value) -> Result<(), DatastoreError>;

    /// Create a document, failing if it already exists
    async fn create(&self, doc: &DocumentRef, data: Value) -> Result<(), DatastoreError>;

    /// Delete a document; deleting a missing document succeeds
    async fn delete(&self, doc: &DocumentRef) -> Result<(), DatastoreError>;
}

/// A document database supporting conjunctive queries and transactions
#[async_trait]
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Transaction handle type
    type Tx: Transaction;

    /// Reference a collection by name
    fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef::new(name)
    }

    /// Begin a transaction, waiting for the store if needed
    async fn begin(&self, ctx: &CancellationToken) -> Result<Self::Tx, DatastoreError>;

    /// Apply the buffered writes of `tx` atomically
    async fn commit(&self, tx: Self::Tx) -> Result<(), DatastoreError>;

    /// Discard the buffered writes of `tx`
    async fn rollback(&self, tx: Self::Tx) -> Result<(), DatastoreError>;
}

/// Run `work` inside a transaction on `store`
///
/// # Errors
/// Returns the closure's error after rolling back, a cancellation error if
/// `ctx` fires before the closure finishes, or the store's commit failure
pub async fn run_transaction<S, F, Fut, T>(
    store: &S,
    ctx: &CancellationToken,
    work: F,
) -> AppResult<T>
where
    S: DocumentStore,
    F: FnOnce(S::Tx) -> Fut + Send,
    Fut: Future<Output = AppResult<T>> + Send,
    T: Send,
{
    if ctx.is_cancelled() {
        return Err(AppError::cancelled());
    }
    let tx = store.begin(ctx).await?;

    match ctx.run_until_cancelled(work(tx.clone())).await {
        Some(Ok(value)) => {
            store.commit(tx).await?;
            Ok(value)
        }
        Some(Err(error)) => {
            debug!(code = ?error.code, "Rolling back transaction: {error}");
            discard(store, tx).await;
            Err(error)
        }
        None => {
            debug!("Transaction cancelled by caller");
            discard(store, tx).await;
            Err(AppError::cancelled())
        }
    }
}

async fn discard<S: DocumentStore>(store: &S, tx: S::Tx) {
    if let Err(e) = store.rollback(tx).await {
        warn!("Transaction rollback failed: {e}");
    }
}
