//! Permission catalog.
//!
//! Every permission key that can exist is declared here, grouped by
//! domain. Keys are dotted `domain.action` strings. The group table is
//! the single source of truth: [`all`] flattens it in declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base role every actor holds implicitly.
pub const ROLE_USER: &str = "ROLE_USER";
/// Privileged role that bypasses every permission check.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

// =============================================================================
// Clients
// =============================================================================

pub const CLIENTS_VIEW_LIST: &str = "clients.view_list";
pub const CLIENTS_VIEW_DETAILS: &str = "clients.view_details";
pub const CLIENTS_CREATE: &str = "clients.create";
pub const CLIENTS_EDIT: &str = "clients.edit";
pub const CLIENTS_DELETE: &str = "clients.delete";
/// UI: documents column in the clients table.
pub const CLIENTS_VIEW_DOCUMENTS_COLUMN: &str = "clients.view_documents_column";
/// UI: actions column in the clients table.
pub const CLIENTS_VIEW_ACTIONS_COLUMN: &str = "clients.view_actions_column";
/// UI: "view" button on each client row.
pub const CLIENTS_VIEW_BUTTON: &str = "clients.view_view_button";

// =============================================================================
// Documents
// =============================================================================

pub const DOCUMENTS_VIEW_LIST: &str = "documents.view_list";
pub const DOCUMENTS_VIEW_DETAILS: &str = "documents.view_details";
pub const DOCUMENTS_CREATE_UPLOAD: &str = "documents.create_upload";
pub const DOCUMENTS_EDIT: &str = "documents.edit";
pub const DOCUMENTS_DELETE: &str = "documents.delete";
pub const DOCUMENTS_DOWNLOAD: &str = "documents.download";

// =============================================================================
// User management
// =============================================================================

pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";
pub const USERS_ASSIGN_ROLES: &str = "users.assign_roles";

/// A named group of permission keys with their human labels.
#[derive(Debug)]
pub struct PermissionGroup {
    pub name: &'static str,
    /// `(key, label)` pairs in declaration order.
    pub permissions: &'static [(&'static str, &'static str)],
}

static GROUPS: &[PermissionGroup] = &[
    PermissionGroup {
        name: "Clients",
        permissions: &[
            (CLIENTS_VIEW_LIST, "View Clients List"),
            (CLIENTS_VIEW_DETAILS, "View Client Details"),
            (CLIENTS_CREATE, "Create Clients"),
            (CLIENTS_EDIT, "Edit Clients"),
            (CLIENTS_DELETE, "Delete Clients"),
            (CLIENTS_VIEW_DOCUMENTS_COLUMN, "See Documents Column"),
            (CLIENTS_VIEW_ACTIONS_COLUMN, "See Actions Column"),
            (CLIENTS_VIEW_BUTTON, "See View Button"),
        ],
    },
    PermissionGroup {
        name: "Documents",
        permissions: &[
            (DOCUMENTS_VIEW_LIST, "View Documents List"),
            (DOCUMENTS_VIEW_DETAILS, "View Document Details"),
            (DOCUMENTS_CREATE_UPLOAD, "Upload Documents"),
            (DOCUMENTS_EDIT, "Edit Documents"),
            (DOCUMENTS_DELETE, "Delete Documents"),
            (DOCUMENTS_DOWNLOAD, "Download Documents"),
        ],
    },
    PermissionGroup {
        name: "User Management",
        permissions: &[
            (USERS_VIEW, "View Users"),
            (USERS_CREATE, "Create Users"),
            (USERS_EDIT, "Edit Users"),
            (USERS_DELETE, "Delete Users"),
            (USERS_ASSIGN_ROLES, "Assign Roles & Permissions"),
        ],
    },
];

static UI_PERMISSIONS: &[&str] = &[
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
];

// =============================================================================
// Presets
// =============================================================================

static READ_ONLY: &[&str] = &[
    CLIENTS_VIEW_LIST,
    CLIENTS_VIEW_DETAILS,
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
    DOCUMENTS_VIEW_LIST,
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_DOWNLOAD,
];

static CLIENT_VIEW_ONLY: &[&str] = &[
    CLIENTS_VIEW_LIST,
    CLIENTS_VIEW_DETAILS,
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
    DOCUMENTS_VIEW_LIST,
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_DOWNLOAD,
];

static LIMITED: &[&str] = &[
    CLIENTS_VIEW_LIST,
    CLIENTS_VIEW_DETAILS,
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
    DOCUMENTS_VIEW_LIST,
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_CREATE_UPLOAD,
    DOCUMENTS_EDIT,
    DOCUMENTS_DOWNLOAD,
];

/// Everything except user management.
static FULL: &[&str] = &[
    CLIENTS_VIEW_LIST,
    CLIENTS_VIEW_DETAILS,
    CLIENTS_CREATE,
    CLIENTS_EDIT,
    CLIENTS_DELETE,
    CLIENTS_VIEW_DOCUMENTS_COLUMN,
    CLIENTS_VIEW_ACTIONS_COLUMN,
    CLIENTS_VIEW_BUTTON,
    DOCUMENTS_VIEW_LIST,
    DOCUMENTS_VIEW_DETAILS,
    DOCUMENTS_CREATE_UPLOAD,
    DOCUMENTS_EDIT,
    DOCUMENTS_DELETE,
    DOCUMENTS_DOWNLOAD,
];

/// A named, immutable preset used to bulk-assign permissions.
#[derive(Debug)]
pub struct PermissionSet {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

static PERMISSION_SETS: &[PermissionSet] = &[
    PermissionSet {
        key: "read_only",
        label: "Read-only",
        description: "Can view lists and details only",
        permissions: READ_ONLY,
    },
    PermissionSet {
        key: "client_view_only",
        label: "Client-view-only",
        description: "Can view clients and documents",
        permissions: CLIENT_VIEW_ONLY,
    },
    PermissionSet {
        key: "limited",
        label: "Limited",
        description: "Can view and upload documents",
        permissions: LIMITED,
    },
    PermissionSet {
        key: "full",
        label: "Full",
        description: "Full access (except user management)",
        permissions: FULL,
    },
    PermissionSet {
        key: "custom",
        label: "Custom",
        description: "Choose individual permissions",
        permissions: &[],
    },
];

/// All permission groups in declaration order.
pub fn groups() -> &'static [PermissionGroup] {
    GROUPS
}

/// Every permission key: group order, then intra-group order.
pub fn all() -> Vec<&'static str> {
    GROUPS
        .iter()
        .flat_map(|g| g.permissions.iter().map(|(key, _)| *key))
        .collect()
}

/// Returns `true` if `key` is declared in the catalog.
pub fn exists(key: &str) -> bool {
    label(key).is_some()
}

/// Human label for a permission key.
pub fn label(key: &str) -> Option<&'static str> {
    GROUPS
        .iter()
        .flat_map(|g| g.permissions.iter())
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

pub fn ui_permissions() -> &'static [&'static str] {
    UI_PERMISSIONS
}

/// Returns `true` for keys that only control column/button visibility.
pub fn is_ui_permission(key: &str) -> bool {
    UI_PERMISSIONS.contains(&key)
}

pub fn permission_sets() -> &'static [PermissionSet] {
    PERMISSION_SETS
}

pub fn permission_set(key: &str) -> Option<&'static PermissionSet> {
    PERMISSION_SETS.iter().find(|s| s.key == key)
}

/// Fallback permissions for an actor with no explicit list.
///
/// Admins get every key, the base role gets the `full` preset, and
/// any other role gets nothing.
pub fn defaults_for_role(role: &str) -> Vec<&'static str> {
    match role {
        ROLE_ADMIN => all(),
        ROLE_USER => FULL.to_vec(),
        _ => Vec::new(),
    }
}

/// Coarse, derived classification of a permission list. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    Admin,
    Full,
    #[serde(rename = "Read-only")]
    ReadOnly,
    Limited,
    #[serde(rename = "None")]
    NoAccess,
}

impl PermissionLevel {
    pub fn label(self) -> &'static str {
        match self {
            PermissionLevel::Admin => "Admin",
            PermissionLevel::Full => "Full",
            PermissionLevel::ReadOnly => "Read-only",
            PermissionLevel::Limited => "Limited",
            PermissionLevel::NoAccess => "None",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a permission list. Check order matters: empty, then full,
/// then read-only, else limited. Never yields [`PermissionLevel::Admin`];
/// that is decided from roles by the caller.
pub fn permission_level<S: AsRef<str>>(permissions: &[S]) -> PermissionLevel {
    if permissions.is_empty() {
        return PermissionLevel::NoAccess;
    }

    let has = |key: &str| permissions.iter().any(|p| p.as_ref() == key);

    let full_clients = has(CLIENTS_CREATE) && has(CLIENTS_EDIT) && has(CLIENTS_DELETE);
    let full_documents =
        has(DOCUMENTS_CREATE_UPLOAD) && has(DOCUMENTS_EDIT) && has(DOCUMENTS_DELETE);
    if full_clients && full_documents {
        return PermissionLevel::Full;
    }

    let view_only_clients = has(CLIENTS_VIEW_LIST)
        && !has(CLIENTS_CREATE)
        && !has(CLIENTS_EDIT)
        && !has(CLIENTS_DELETE);
    if view_only_clients {
        return PermissionLevel::ReadOnly;
    }

    PermissionLevel::Limited
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_follows_group_declaration_order() {
        let keys = all();
        assert_eq!(keys.len(), 19);
        assert_eq!(keys.first(), Some(&CLIENTS_VIEW_LIST));
        assert_eq!(keys[8], DOCUMENTS_VIEW_LIST);
        assert_eq!(keys.last(), Some(&USERS_ASSIGN_ROLES));
    }

    #[test]
    fn group_names_in_order() {
        let names: Vec<_> = groups().iter().map(|g| g.name).collect();
        assert_eq!(names, ["Clients", "Documents", "User Management"]);
    }

    #[test]
    fn keys_are_unique_and_dotted() {
        let keys = all();
        for (i, key) in keys.iter().enumerate() {
            assert!(key.contains('.'), "{key} is not dotted");
            assert!(!keys[i + 1..].contains(key), "{key} declared twice");
        }
    }

    #[test]
    fn presets_only_reference_catalog_keys() {
        for set in permission_sets() {
            for key in set.permissions {
                assert!(exists(key), "{} references unknown {key}", set.key);
            }
        }
        assert!(permission_set("custom").unwrap().permissions.is_empty());
    }

    #[test]
    fn ui_permissions_are_flagged() {
        assert!(is_ui_permission(CLIENTS_VIEW_BUTTON));
        assert!(is_ui_permission(CLIENTS_VIEW_ACTIONS_COLUMN));
        assert!(!is_ui_permission(CLIENTS_VIEW_LIST));
        assert!(!is_ui_permission("nonsense"));
    }

    #[test]
    fn role_defaults() {
        assert_eq!(defaults_for_role(ROLE_ADMIN), all());
        assert_eq!(
            defaults_for_role(ROLE_USER),
            permission_set("full").unwrap().permissions.to_vec()
        );
        assert!(defaults_for_role("ROLE_AUDITOR").is_empty());
    }

    #[test]
    fn level_classification() {
        let empty: [&str; 0] = [];
        assert_eq!(permission_level(&empty), PermissionLevel::NoAccess);
        assert_eq!(permission_level(FULL), PermissionLevel::Full);
        assert_eq!(
            permission_level(&[CLIENTS_VIEW_LIST]),
            PermissionLevel::ReadOnly
        );
        assert_eq!(permission_level(READ_ONLY), PermissionLevel::ReadOnly);
        assert_eq!(permission_level(LIMITED), PermissionLevel::ReadOnly);
        assert_eq!(
            permission_level(&[DOCUMENTS_VIEW_LIST, DOCUMENTS_VIEW_DETAILS]),
            PermissionLevel::Limited
        );
        assert_eq!(
            permission_level(&[CLIENTS_VIEW_LIST, CLIENTS_CREATE]),
            PermissionLevel::Limited
        );
    }

    #[test]
    fn full_requires_both_families() {
        let clients_only = [CLIENTS_CREATE, CLIENTS_EDIT, CLIENTS_DELETE];
        assert_eq!(permission_level(&clients_only), PermissionLevel::Limited);
    }

    #[test]
    fn level_labels() {
        assert_eq!(PermissionLevel::ReadOnly.to_string(), "Read-only");
        assert_eq!(PermissionLevel::NoAccess.to_string(), "None");
    }
}
