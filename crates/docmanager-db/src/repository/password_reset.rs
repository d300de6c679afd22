//! SurrealDB implementation of [`PasswordResetRepository`].
//!
//! Issuing a token and consuming one are each a single transaction, so
//! a concurrent request can never observe two usable tokens for the
//! same user, nor a changed credential next to a still-valid token.
//!
//! An unused token carries its owner in `pending_user`, which has a
//! unique index; every statement that sets `used_at` also clears it.
//! Two racing issues for one user therefore cannot both commit.

use chrono::{DateTime, Utc};
use docmanager_core::error::{DocManagerError, DocManagerResult};
use docmanager_core::models::password_reset::{CreatePasswordReset, PasswordReset};
use docmanager_core::repository::PasswordResetRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PasswordResetRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PasswordResetRowWithId {
    fn try_into_reset(self) -> Result<PasswordReset, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(PasswordReset {
            id,
            user_id,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

const ISSUE_TX: &str = "\
BEGIN TRANSACTION;
UPDATE password_reset SET used_at = $now, pending_user = NONE \
    WHERE user_id = $user_id AND used_at IS NONE;
CREATE type::record('password_reset', $id) SET \
    user_id = $user_id, \
    pending_user = $user_id, \
    token_hash = $token_hash, \
    expires_at = $expires_at, \
    used_at = NONE, \
    created_at = $created_at;
COMMIT TRANSACTION;
";

/// The claim only succeeds while the token is still unused and
/// unexpired; otherwise the whole transaction is cancelled.
const CONSUME_TX: &str = "\
BEGIN TRANSACTION;
LET $claimed = (UPDATE password_reset SET used_at = $now, pending_user = NONE \
    WHERE token_hash = $token_hash AND used_at IS NONE AND expires_at > $now);
IF array::len($claimed) = 0 { THROW 'invalid_or_expired_token'; };
UPDATE type::record('user', $user_id) SET \
    password_hash = $password_hash, updated_at = time::now();
UPDATE password_reset SET used_at = $now, pending_user = NONE \
    WHERE user_id = $user_id AND used_at IS NONE;
COMMIT TRANSACTION;
";

/// SurrealDB implementation of the password reset token repository.
#[derive(Clone)]
pub struct SurrealPasswordResetRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPasswordResetRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_by_id(&self, id: Uuid) -> DocManagerResult<PasswordReset> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('password_reset', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PasswordResetRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "password_reset".into(),
            id: id_str,
        })?;

        Ok(row.try_into_reset()?)
    }
}

impl<C: Connection> PasswordResetRepository for SurrealPasswordResetRepository<C> {
    async fn issue(
        &self,
        input: CreatePasswordReset,
        now: DateTime<Utc>,
    ) -> DocManagerResult<PasswordReset> {
        let id = Uuid::new_v4();

        self.db
            .query(ISSUE_TX)
            .bind(("id", id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .bind(("created_at", input.created_at))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_by_id(id).await
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DocManagerResult<Option<PasswordReset>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM password_reset \
                 WHERE token_hash = $token_hash \
                 AND used_at IS NONE AND expires_at > $now \
                 LIMIT 1",
            )
            .bind(("token_hash", token_hash.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PasswordResetRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_reset().map_err(Into::into))
            .transpose()
    }

    async fn find_valid_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> DocManagerResult<Vec<PasswordReset>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM password_reset \
                 WHERE user_id = $user_id \
                 AND used_at IS NONE AND expires_at > $now \
                 ORDER BY created_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PasswordResetRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_reset())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn count_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> DocManagerResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM password_reset \
                 WHERE user_id = $user_id AND created_at > $since \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("since", since))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn invalidate_all_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> DocManagerResult<u64> {
        let user_id_str = user_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM password_reset \
                 WHERE user_id = $user_id AND used_at IS NONE GROUP ALL",
            )
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE password_reset SET used_at = $now, pending_user = NONE \
                 WHERE user_id = $user_id AND used_at IS NONE",
            )
            .bind(("user_id", user_id_str))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(total)
    }

    async fn consume(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DocManagerResult<Uuid> {
        let Some(token) = self.find_valid(token_hash, now).await? else {
            return Err(DocManagerError::InvalidOrExpiredToken);
        };

        let outcome = self
            .db
            .query(CONSUME_TX)
            .bind(("token_hash", token_hash.to_string()))
            .bind(("user_id", token.user_id.to_string()))
            .bind(("password_hash", password_hash.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?
            .check();

        if let Err(e) = outcome {
            // Lost a race with another consumer: the token is gone.
            if self.find_valid(token_hash, now).await?.is_none() {
                debug!(user_id = %token.user_id, "Reset token claimed concurrently");
                return Err(DocManagerError::InvalidOrExpiredToken);
            }
            return Err(DbError::Query(e.to_string()).into());
        }

        Ok(token.user_id)
    }

    async fn cleanup_expired(&self, cutoff: DateTime<Utc>) -> DocManagerResult<u64> {
        // Count first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM password_reset \
                 WHERE created_at < $cutoff GROUP ALL",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE password_reset WHERE created_at < $cutoff")
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(total)
    }
}
