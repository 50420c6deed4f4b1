// ABOUTME: User directory management with uniqueness across username, email, and phone number
// ABOUTME: Defines the UserManager interface and re-exports the document-store implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::context::CancellationToken;
use crate::errors::AppResult;
use crate::models::User;
use crate::query::Query;

/// Document-store backed user manager
pub mod datastore_manager;

pub use datastore_manager::DatastoreUserManager;

/// Stream of users produced by [`UserManager::find`]
pub type UserStream = BoxStream<'static, AppResult<User>>;

/// Directory operations over user records
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Insert a user after checking that no stored user shares its username,
    /// email or phone number; the returned user carries its new uid
    ///
    /// # Errors
    /// `ResourceAlreadyExists` on a uniqueness clash, `InvalidInput` when the
    /// user has none of the unique fields set
    async fn add(&self, ctx: &CancellationToken, user: User) -> AppResult<User>;

    /// Stream users matching any of `queries`
    ///
    /// A single query keeps its orders and limit. Several queries are merged
    /// without global ordering. Matches are read and the transaction closed
    /// before the first item is yielded. A failure arrives as the only item.
    fn find(&self, ctx: &CancellationToken, queries: Vec<Query>) -> UserStream;

    /// Overwrite the stored record identified by `user.uid`
    ///
    /// # Errors
    /// `ResourceNotFound` if no user has that uid
    async fn update(&self, ctx: &CancellationToken, user: User) -> AppResult<User>;

    /// Fetch a user by uid
    ///
    /// # Errors
    /// `ResourceNotFound` if no user has that uid
    async fn get(&self, ctx: &CancellationToken, uid: &str) -> AppResult<User>;
}
