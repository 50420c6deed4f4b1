// ABOUTME: UserManager implementation on top of any DocumentStore
// ABOUTME: Uses the OR engine to detect duplicates across the unique user fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use super::{UserManager, UserStream};
use crate::config::WebappConfig;
use crate::constants::user_fields;
use crate::context::CancellationToken;
use crate::datastore::{
    or, run_transaction, CollectionRef, Document, DocumentStore, OrOptions, Transaction,
};
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::query::Query;

/// Turn a stored document into a [`User`], taking the uid from the document id
fn decode_user(document: Document) -> AppResult<User> {
    let mut user: User = document.data_to()?;
    user.uid = document.id().to_owned();
    Ok(user)
}

/// Users stored as documents of one collection, keyed by uid
#[derive(Debug, Clone)]
pub struct DatastoreUserManager<S> {
    store: S,
    collection: CollectionRef,
    or_options: OrOptions,
}

impl<S: DocumentStore> DatastoreUserManager<S> {
    /// Manage users stored in `collection` of `store`
    pub fn new(store: S, collection: &str) -> Self {
        let collection = store.collection(collection);
        Self {
            store,
            collection,
            or_options: OrOptions::default(),
        }
    }

    /// Manage users stored in the configured user collection, with the
    /// configured OR engine settings
    pub fn from_config(store: S, config: &WebappConfig) -> Self {
        Self::new(store, &config.collections.users).with_or_options(config.or_options())
    }

    /// Override the OR engine settings used by `add` and `find`
    #[must_use]
    pub const fn with_or_options(mut self, or_options: OrOptions) -> Self {
        self.or_options = or_options;
        self
    }

    /// One query per non-empty unique field
    fn uniqueness_queries(user: &User) -> Vec<Query> {
        [
            (user_fields::USERNAME, &user.username),
            (user_fields::EMAIL, &user.email),
            (user_fields::PHONE_NUMBER, &user.phone_number),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(field, value)| Query::new().where_eq(field, value.as_str()).limit(1))
        .collect()
    }
}

#[async_trait]
impl<S: DocumentStore> UserManager for DatastoreUserManager<S> {
    #[instrument(skip_all, fields(username = %user.username))]
    async fn add(&self, ctx: &CancellationToken, user: User) -> AppResult<User> {
        let queries = Self::uniqueness_queries(&user);
        if queries.is_empty() {
            return Err(AppError::invalid_input(
                "User needs a username, email or phone number",
            ));
        }
        let data = serde_json::to_value(&user)?;
        let collection = self.collection.clone();
        let options = self.or_options;
        let or_ctx = ctx.clone();

        let uid = run_transaction(&self.store, ctx, |tx| async move {
            let mut clashes = or(&or_ctx, options, &tx, &collection, queries, decode_user);
            if let Some(existing) = clashes.next().await.transpose()? {
                debug!(uid = %existing.uid, "User clashes with an existing record");
                return Err(AppError::duplicate_user());
            }
            drop(clashes);

            let doc = collection.new_doc();
            tx.create(&doc, data).await?;
            Ok(doc.id().to_owned())
        })
        .await?;

        info!(%uid, "User added");
        Ok(User { uid, ..user })
    }

    fn find(&self, ctx: &CancellationToken, queries: Vec<Query>) -> UserStream {
        if queries.is_empty() {
            return stream::empty().boxed();
        }

        let store = self.store.clone();
        let collection = self.collection.clone();
        let options = self.or_options;
        let ctx = ctx.clone();

        // Results are collected and the transaction committed before the
        // first item is yielded, so callers may use the manager while reading
        let found = async move {
            let or_ctx = ctx.clone();
            let outcome = run_transaction(&store, &ctx, |tx| async move {
                if queries.len() == 1 {
                    tx.documents(&collection, &queries[0])
                        .map(|result| result.map_err(AppError::from).and_then(decode_user))
                        .try_collect::<Vec<User>>()
                        .await
                } else {
                    or(&or_ctx, options, &tx, &collection, queries, decode_user)
                        .try_collect::<Vec<User>>()
                        .await
                }
            })
            .await;

            match outcome {
                Ok(users) => {
                    debug!(count = users.len(), "Find completed");
                    users.into_iter().map(Ok).collect::<Vec<AppResult<User>>>()
                }
                Err(error) => vec![Err(error)],
            }
        };

        stream::once(found).flat_map(stream::iter).boxed()
    }

    #[instrument(skip_all, fields(uid = %user.uid))]
    async fn update(&self, ctx: &CancellationToken, user: User) -> AppResult<User> {
        if user.uid.is_empty() {
            return Err(AppError::invalid_input("User uid is required for update"));
        }
        let data = serde_json::to_value(&user)?;
        let doc = self.collection.doc(user.uid.as_str());

        run_transaction(&self.store, ctx, |tx| async move {
            if tx.get(&doc).await?.is_none() {
                return Err(AppError::user_not_found());
            }
            tx.set(&doc, data).await?;
            Ok(())
        })
        .await?;

        info!("User updated");
        Ok(user)
    }

    #[instrument(skip(self, ctx))]
    async fn get(&self, ctx: &CancellationToken, uid: &str) -> AppResult<User> {
        let doc = self.collection.doc(uid);
        run_transaction(&self.store, ctx, |tx| async move {
            tx.get(&doc)
                .await?
                .ok_or_else(AppError::user_not_found)
                .and_then(decode_user)
        })
        .await
    }
}
