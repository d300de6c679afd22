//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings and record
//! IDs are the UUID itself, so `type::record('user', $id)` addresses a
//! row directly.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "activity_log",
        sql: SCHEMA_V2,
    },
    Migration {
        version: 3,
        name: "password_reset",
        sql: SCHEMA_V3,
    },
];

// -----------------------------------------------------------------------
// v1: users
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD roles ON TABLE user TYPE array<string> DEFAULT [];
DEFINE FIELD permissions ON TABLE user TYPE option<array<string>>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
";

// -----------------------------------------------------------------------
// v2: activity log
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE TABLE activity_log SCHEMAFULL;
DEFINE FIELD user_id ON TABLE activity_log TYPE string;
DEFINE FIELD action ON TABLE activity_log TYPE string \
    ASSERT $value IN ['upload', 'delete', 'download', 'edit', 'restore', \
    'permanent_delete', 'client_create', 'client_edit', 'client_delete'];
DEFINE FIELD document_id ON TABLE activity_log TYPE option<string>;
DEFINE FIELD client_id ON TABLE activity_log TYPE option<string>;
DEFINE FIELD details ON TABLE activity_log TYPE option<string>;
DEFINE FIELD created_at ON TABLE activity_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_activity_created_at ON TABLE activity_log \
    COLUMNS created_at;
DEFINE INDEX idx_activity_action ON TABLE activity_log COLUMNS action;
DEFINE INDEX idx_activity_user ON TABLE activity_log COLUMNS user_id;
";

// -----------------------------------------------------------------------
// v3: password reset tokens
// -----------------------------------------------------------------------

const SCHEMA_V3: &str = "\
DEFINE TABLE password_reset SCHEMAFULL;
DEFINE FIELD user_id ON TABLE password_reset TYPE string;
DEFINE FIELD pending_user ON TABLE password_reset TYPE option<string>;
DEFINE FIELD token_hash ON TABLE password_reset TYPE string \
    ASSERT string::len($value) = 64;
DEFINE FIELD expires_at ON TABLE password_reset TYPE datetime;
DEFINE FIELD used_at ON TABLE password_reset TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE password_reset TYPE datetime;
DEFINE INDEX idx_password_reset_token ON TABLE password_reset \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_password_reset_user ON TABLE password_reset \
    COLUMNS user_id;
DEFINE INDEX idx_password_reset_pending ON TABLE password_reset \
    COLUMNS pending_user UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
