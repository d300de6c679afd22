//! User (actor) domain model.
//!
//! Roles are free-form tags; [`ROLE_USER`] is implied and never needs to
//! be stored. The explicit permission list overrides role defaults only
//! when it is non-empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{self, PermissionLevel, ROLE_ADMIN, ROLE_USER};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    /// Never serialized outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Stored roles, without the implied base role.
    pub roles: Vec<String>,
    /// Explicit permission overrides. `None` or empty means role defaults.
    pub permissions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Stored roles plus the base role, deduplicated.
    pub fn effective_roles(&self) -> Vec<String> {
        dedupe(
            self.roles
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(ROLE_USER)),
        )
    }

    pub fn has_role(&self, role: &str) -> bool {
        role == ROLE_USER || self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Admins pass unconditionally and their explicit list is never
    /// consulted. Otherwise a non-empty explicit list is authoritative;
    /// an empty or unset list falls back to the base role defaults.
    pub fn has_permission(&self, key: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        let explicit = self.permissions();
        if explicit.is_empty() {
            return catalog::defaults_for_role(ROLE_USER).contains(&key);
        }

        explicit.iter().any(|p| p == key)
    }

    /// The stored explicit list, or an empty slice when unset.
    pub fn permissions(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or(&[])
    }

    pub fn set_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roles = dedupe(roles);
    }

    pub fn set_permissions<I, S>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.permissions = Some(dedupe(permissions));
    }

    pub fn add_permission(&mut self, key: &str) {
        let list = self.permissions.get_or_insert_with(Vec::new);
        if !list.iter().any(|p| p == key) {
            list.push(key.to_string());
        }
    }

    pub fn remove_permission(&mut self, key: &str) {
        if let Some(list) = self.permissions.as_mut() {
            list.retain(|p| p != key);
        }
    }

    /// Classification of the stored explicit list; admins short-circuit.
    pub fn permission_level(&self) -> PermissionLevel {
        if self.is_admin() {
            return PermissionLevel::Admin;
        }
        catalog::permission_level(self.permissions())
    }
}

/// Deduplicate, keeping the first occurrence of each value.
fn dedupe<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.as_ref();
        if !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: Option<String>,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub roles: Vec<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub username: Option<Option<String>>,
    /// Already-hashed credential.
    pub password_hash: Option<String>,
    pub roles: Option<Vec<String>>,
    /// `Some(None)` resets to role defaults.
    pub permissions: Option<Option<Vec<String>>>,
}
