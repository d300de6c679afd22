//! Connection to the SurrealDB instance that holds DocManager's users,
//! reset tokens and activity log.
//!
//! The server talks to a remote SurrealDB over WebSocket and signs in
//! as root; tests use the embedded `Mem` engine and never go through
//! this module.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

/// Where the DocManager store lives and how to sign in to it.
///
/// Defaults match a local development instance
/// (`surreal start --user root --pass root`).
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the WebSocket endpoint, without scheme.
    pub url: String,
    /// Namespace shared by every DocManager database.
    pub namespace: String,
    /// Database inside the namespace; one per deployment.
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "docmanager".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Handle to the DocManager store. Cloning shares the connection.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket, sign in and select the DocManager namespace
    /// and database. Migrations are not applied here; call
    /// [`run_migrations`](crate::run_migrations) on [`client`](Self::client).
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to DocManager store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        debug!(username = %config.username, "Signed in to SurrealDB");

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(database = %config.database, "DocManager store ready");

        Ok(Self { db })
    }

    /// Client to build repositories from, e.g.
    /// `SurrealUserRepository::new(manager.client().clone())`.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
