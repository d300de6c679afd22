//! SurrealDB implementation of [`ActivityLogRepository`].

use chrono::{DateTime, Utc};
use docmanager_core::error::DocManagerResult;
use docmanager_core::models::activity_log::{ActivityAction, ActivityLog, CreateActivityLog};
use docmanager_core::repository::ActivityLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ActivityLogRowWithId {
    record_id: String,
    user_id: String,
    action: String,
    document_id: Option<String>,
    client_id: Option<String>,
    details: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

impl ActivityLogRowWithId {
    fn try_into_entry(self) -> Result<ActivityLog, DbError> {
        let action: ActivityAction = self
            .action
            .parse()
            .map_err(|e| DbError::Decode(format!("{e}")))?;
        Ok(ActivityLog {
            id: parse_uuid(&self.record_id, "activity")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            action,
            document_id: self
                .document_id
                .as_deref()
                .map(|d| parse_uuid(d, "document"))
                .transpose()?,
            client_id: self
                .client_id
                .as_deref()
                .map(|c| parse_uuid(c, "client"))
                .transpose()?,
            details: self.details,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn into_entries(rows: Vec<ActivityLogRowWithId>) -> Result<Vec<ActivityLog>, DbError> {
    rows.into_iter().map(|row| row.try_into_entry()).collect()
}

/// SurrealDB implementation of the activity (audit) log.
#[derive(Clone)]
pub struct SurrealActivityLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActivityLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ActivityLogRepository for SurrealActivityLogRepository<C> {
    async fn create(&self, input: CreateActivityLog) -> DocManagerResult<ActivityLog> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        self.db
            .query(
                "CREATE type::record('activity_log', $id) SET \
                 user_id = $user_id, \
                 action = $action, \
                 document_id = $document_id, \
                 client_id = $client_id, \
                 details = $details",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("action", input.action.as_str().to_string()))
            .bind(("document_id", input.document_id.map(|d| d.to_string())))
            .bind(("client_id", input.client_id.map(|c| c.to_string())))
            .bind(("details", input.details))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('activity_log', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityLogRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "activity_log".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn recent(&self, limit: u64) -> DocManagerResult<Vec<ActivityLog>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity_log \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityLogRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn list_by_user(&self, user_id: Uuid, limit: u64) -> DocManagerResult<Vec<ActivityLog>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity_log \
                 WHERE user_id = $user_id \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityLogRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn list_by_document(&self, document_id: Uuid) -> DocManagerResult<Vec<ActivityLog>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity_log \
                 WHERE document_id = $document_id \
                 ORDER BY created_at DESC",
            )
            .bind(("document_id", document_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityLogRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn list_by_client(&self, client_id: Uuid) -> DocManagerResult<Vec<ActivityLog>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity_log \
                 WHERE client_id = $client_id \
                 ORDER BY created_at DESC",
            )
            .bind(("client_id", client_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityLogRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn count_all(&self) -> DocManagerResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM activity_log GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
