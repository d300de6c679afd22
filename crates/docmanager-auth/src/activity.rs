//! Typed audit events on top of [`ActivityLogRepository`].

use docmanager_core::error::DocManagerResult;
use docmanager_core::models::activity_log::{
    ActivityAction, ActivityLog, ClientRef, CreateActivityLog, DocumentRef,
};
use docmanager_core::repository::ActivityLogRepository;
use tracing::debug;
use uuid::Uuid;

pub const RECENT_LIMIT: u64 = 10;
pub const USER_ACTIVITY_LIMIT: u64 = 20;

pub struct ActivityLogger<A: ActivityLogRepository> {
    repo: A,
}

impl<A: ActivityLogRepository> ActivityLogger<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    pub async fn log(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        document_id: Option<Uuid>,
        client_id: Option<Uuid>,
        details: Option<String>,
    ) -> DocManagerResult<ActivityLog> {
        let entry = self
            .repo
            .create(CreateActivityLog {
                user_id,
                action,
                document_id,
                client_id,
                details,
            })
            .await?;
        debug!(user_id = %user_id, action = %action, "Activity recorded");
        Ok(entry)
    }

    async fn log_document(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        document: &DocumentRef,
        verb: &str,
    ) -> DocManagerResult<ActivityLog> {
        self.log(
            user_id,
            action,
            Some(document.id),
            document.client_id,
            Some(format!("{verb}: {}", document.title)),
        )
        .await
    }

    async fn log_client(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        client: &ClientRef,
        verb: &str,
    ) -> DocManagerResult<ActivityLog> {
        self.log(
            user_id,
            action,
            None,
            Some(client.id),
            Some(format!("{verb}: {}", client.name)),
        )
        .await
    }

    pub async fn log_upload(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(user_id, ActivityAction::Upload, document, "Uploaded").await
    }

    pub async fn log_delete(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(user_id, ActivityAction::Delete, document, "Moved to trash").await
    }

    pub async fn log_permanent_delete(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(
            user_id,
            ActivityAction::PermanentDelete,
            document,
            "Permanently deleted",
        )
        .await
    }

    pub async fn log_download(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(user_id, ActivityAction::Download, document, "Downloaded").await
    }

    pub async fn log_restore(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(
            user_id,
            ActivityAction::Restore,
            document,
            "Restored from trash",
        )
        .await
    }

    pub async fn log_edit(
        &self,
        user_id: Uuid,
        document: &DocumentRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_document(user_id, ActivityAction::Edit, document, "Edited").await
    }

    pub async fn log_client_create(
        &self,
        user_id: Uuid,
        client: &ClientRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_client(user_id, ActivityAction::ClientCreate, client, "Created client").await
    }

    pub async fn log_client_edit(
        &self,
        user_id: Uuid,
        client: &ClientRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_client(user_id, ActivityAction::ClientEdit, client, "Edited client").await
    }

    pub async fn log_client_delete(
        &self,
        user_id: Uuid,
        client: &ClientRef,
    ) -> DocManagerResult<ActivityLog> {
        self.log_client(user_id, ActivityAction::ClientDelete, client, "Deleted client").await
    }

    /// Latest entries across all users.
    pub async fn recent(&self) -> DocManagerResult<Vec<ActivityLog>> {
        self.repo.recent(RECENT_LIMIT).await
    }

    pub async fn for_user(&self, user_id: Uuid) -> DocManagerResult<Vec<ActivityLog>> {
        self.repo.list_by_user(user_id, USER_ACTIVITY_LIMIT).await
    }

    pub async fn for_document(&self, document_id: Uuid) -> DocManagerResult<Vec<ActivityLog>> {
        self.repo.list_by_document(document_id).await
    }

    pub async fn for_client(&self, client_id: Uuid) -> DocManagerResult<Vec<ActivityLog>> {
        self.repo.list_by_client(client_id).await
    }

    pub async fn total(&self) -> DocManagerResult<u64> {
        self.repo.count_all().await
    }
}
