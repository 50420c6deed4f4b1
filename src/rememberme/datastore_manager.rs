// ABOUTME: TokenManager implementation on top of any DocumentStore
// ABOUTME: Each operation runs exactly one query inside exactly one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use super::TokenManager;
use crate::config::WebappConfig;
use crate::constants::token_fields;
use crate::context::CancellationToken;
use crate::datastore::{run_transaction, CollectionRef, DocumentRef, DocumentStore, Transaction};
use crate::errors::{AppError, AppResult};
use crate::models::Token;
use crate::query::{Operator, Query};

/// Remember-me tokens stored as documents of one collection
#[derive(Debug, Clone)]
pub struct DatastoreTokenManager<S> {
    store: S,
    collection: CollectionRef,
}

impl<S: DocumentStore> DatastoreTokenManager<S> {
    /// Manage tokens stored in `collection` of `store`
    pub fn new(store: S, collection: &str) -> Self {
        let collection = store.collection(collection);
        Self { store, collection }
    }

    /// Manage tokens stored in the configured token collection
    pub fn from_config(store: S, config: &WebappConfig) -> Self {
        Self::new(store, &config.collections.tokens)
    }

    /// Collection holding the tokens
    #[must_use]
    pub const fn collection(&self) -> &CollectionRef {
        &self.collection
    }

    fn identity_query(token: &Token) -> Query {
        Query::new()
            .where_eq(token_fields::USERNAME, token.username.as_str())
            .where_eq(token_fields::IDENTIFIER, token.identifier.as_str())
    }

    /// Delete every document matching `query` in one transaction
    async fn delete_matching(&self, ctx: &CancellationToken, query: Query) -> AppResult<usize> {
        let collection = self.collection.clone();
        run_transaction(&self.store, ctx, |tx| async move {
            let targets: Vec<DocumentRef> = tx
                .documents(&collection, &query)
                .map_ok(|document| document.reference)
                .try_collect()
                .await?;
            for target in &targets {
                tx.delete(target).await?;
            }
            Ok(targets.len())
        })
        .await
    }
}

#[async_trait]
impl<S: DocumentStore> TokenManager for DatastoreTokenManager<S> {
    #[instrument(skip_all, fields(username = %token.username, identifier = %token.identifier))]
    async fn add(&self, ctx: &CancellationToken, token: Token) -> AppResult<Token> {
        let now = Utc::now().timestamp();
        let token = Token {
            revoked: false,
            created: now,
            last_used: now,
            ..token
        };
        let data = serde_json::to_value(&token)?;
        let query = Self::identity_query(&token);
        let collection = self.collection.clone();

        run_transaction(&self.store, ctx, |tx| async move {
            let mut existing = tx.documents(&collection, &query);
            if existing.next().await.transpose()?.is_some() {
                return Err(AppError::duplicate_token());
            }
            drop(existing);
            tx.create(&collection.new_doc(), data).await?;
            Ok(())
        })
        .await?;

        info!("Remember-me token added");
        Ok(token)
    }

    #[instrument(skip_all, fields(username = %token.username, identifier = %token.identifier))]
    async fn validate(&self, ctx: &CancellationToken, token: &Token) -> AppResult<Token> {
        let query = Self::identity_query(token)
            .where_eq(token_fields::REVOKED, false)
            .limit(1);
        let collection = self.collection.clone();

        let validated = run_transaction(&self.store, ctx, |tx| async move {
            let mut matches = tx.documents(&collection, &query);
            let Some(document) = matches.next().await.transpose()? else {
                return Err(AppError::invalid_token());
            };
            drop(matches);

            let mut stored: Token = document.data_to()?;
            stored.last_used = Utc::now().timestamp().max(stored.created);
            tx.set(&document.reference, serde_json::to_value(&stored)?)
                .await?;
            Ok(stored)
        })
        .await?;

        debug!(last_used = validated.last_used, "Remember-me token validated");
        Ok(validated)
    }

    #[instrument(skip_all, fields(username = %token.username, identifier = %token.identifier))]
    async fn revoke(&self, ctx: &CancellationToken, token: &Token) -> AppResult<Token> {
        let query = Self::identity_query(token).limit(1);
        let collection = self.collection.clone();

        let revoked = run_transaction(&self.store, ctx, |tx| async move {
            let mut matches = tx.documents(&collection, &query);
            let Some(document) = matches.next().await.transpose()? else {
                return Err(AppError::token_not_found());
            };
            drop(matches);

            let mut stored: Token = document.data_to()?;
            stored.revoked = true;
            tx.set(&document.reference, serde_json::to_value(&stored)?)
                .await?;
            Ok(stored)
        })
        .await?;

        info!("Remember-me token revoked");
        Ok(revoked)
    }

    #[instrument(skip_all, fields(username = %token.username, identifier = %token.identifier))]
    async fn delete(&self, ctx: &CancellationToken, token: &Token) -> AppResult<()> {
        let deleted = self
            .delete_matching(ctx, Self::identity_query(token))
            .await?;
        debug!(deleted, "Remember-me token deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn purge(
        &self,
        ctx: &CancellationToken,
        username: &str,
        cutoff: DateTime<Utc>,
    ) -> AppResult<usize> {
        let query = Query::new()
            .where_eq(token_fields::USERNAME, username)
            .filter(
                token_fields::LAST_USED,
                Operator::LessThanOrEqual,
                cutoff.timestamp(),
            );
        let purged = self.delete_matching(ctx, query).await?;
        info!(purged, "Purged remember-me tokens");
        Ok(purged)
    }
}
