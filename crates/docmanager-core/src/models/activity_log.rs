//! Activity (audit) log domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DocManagerError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Upload,
    Delete,
    Download,
    Edit,
    Restore,
    PermanentDelete,
    ClientCreate,
    ClientEdit,
    ClientDelete,
}

impl ActivityAction {
    pub const ALL: [ActivityAction; 9] = [
        ActivityAction::Upload,
        ActivityAction::Delete,
        ActivityAction::Download,
        ActivityAction::Edit,
        ActivityAction::Restore,
        ActivityAction::PermanentDelete,
        ActivityAction::ClientCreate,
        ActivityAction::ClientEdit,
        ActivityAction::ClientDelete,
    ];

    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Upload => "upload",
            ActivityAction::Delete => "delete",
            ActivityAction::Download => "download",
            ActivityAction::Edit => "edit",
            ActivityAction::Restore => "restore",
            ActivityAction::PermanentDelete => "permanent_delete",
            ActivityAction::ClientCreate => "client_create",
            ActivityAction::ClientEdit => "client_edit",
            ActivityAction::ClientDelete => "client_delete",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityAction::Upload => "Uploaded document",
            ActivityAction::Delete => "Moved to trash",
            ActivityAction::Download => "Downloaded document",
            ActivityAction::Edit => "Edited document",
            ActivityAction::Restore => "Restored from trash",
            ActivityAction::PermanentDelete => "Permanently deleted",
            ActivityAction::ClientCreate => "Created client",
            ActivityAction::ClientEdit => "Edited client",
            ActivityAction::ClientDelete => "Deleted client",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = DocManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DocManagerError::Validation {
                message: format!("unknown activity action: {s}"),
            })
    }
}

/// A document as seen by the audit log.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub id: Uuid,
    pub title: String,
    pub client_id: Option<Uuid>,
}

/// A client as seen by the audit log.
#[derive(Debug, Clone)]
pub struct ClientRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub document_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityLog {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub document_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub details: Option<String>,
}
