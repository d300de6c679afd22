//! Database-specific error types and conversions.

use docmanager_core::error::DocManagerError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for DocManagerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DocManagerError::NotFound { entity, id },
            DbError::Hash(msg) => DocManagerError::Crypto(msg),
            other => DocManagerError::Database(other.to_string()),
        }
    }
}
