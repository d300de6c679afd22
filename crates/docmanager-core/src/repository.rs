//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Time-sensitive queries take
//! `now` from the caller so that expiry math follows a single clock.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DocManagerResult;
use crate::models::{
    activity_log::{ActivityLog, CreateActivityLog},
    password_reset::{CreatePasswordReset, PasswordReset},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = DocManagerResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DocManagerResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = DocManagerResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = DocManagerResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = DocManagerResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = DocManagerResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Password reset tokens
// ---------------------------------------------------------------------------

pub trait PasswordResetRepository: Send + Sync {
    /// Mark every unused token of `input.user_id` as used at `now`, then
    /// store the new token. Both writes commit in one transaction.
    fn issue(
        &self,
        input: CreatePasswordReset,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<PasswordReset>> + Send;

    /// Find an unused token with `expires_at > now` by its hash.
    fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<Option<PasswordReset>>> + Send;

    /// All unused, unexpired tokens belonging to a user.
    fn find_valid_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<Vec<PasswordReset>>> + Send;

    /// Number of tokens issued to a user with `created_at > since`.
    fn count_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<u64>> + Send;

    /// Bulk mark-used of every unused token for a user. Returns the
    /// number of rows touched.
    fn invalidate_all_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<u64>> + Send;

    /// Atomically claim a valid token, replace the owner's credential
    /// with `password_hash`, and burn every other unused token of that
    /// owner. Returns the owner's ID, or
    /// [`DocManagerError::InvalidOrExpiredToken`](crate::error::DocManagerError::InvalidOrExpiredToken)
    /// with nothing written.
    fn consume(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<Uuid>> + Send;

    /// Delete tokens created before `cutoff`. Returns the count removed.
    fn cleanup_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = DocManagerResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Activity log (append-only)
// ---------------------------------------------------------------------------

pub trait ActivityLogRepository: Send + Sync {
    fn create(
        &self,
        input: CreateActivityLog,
    ) -> impl Future<Output = DocManagerResult<ActivityLog>> + Send;
    /// Newest first.
    fn recent(&self, limit: u64) -> impl Future<Output = DocManagerResult<Vec<ActivityLog>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = DocManagerResult<Vec<ActivityLog>>> + Send;
    fn list_by_document(
        &self,
        document_id: Uuid,
    ) -> impl Future<Output = DocManagerResult<Vec<ActivityLog>>> + Send;
    fn list_by_client(
        &self,
        client_id: Uuid,
    ) -> impl Future<Output = DocManagerResult<Vec<ActivityLog>>> + Send;
    fn count_all(&self) -> impl Future<Output = DocManagerResult<u64>> + Send;
}
