//! Admin-driven editing of another actor's roles and permissions.

use docmanager_core::catalog::{self, ROLE_USER};
use docmanager_core::error::DocManagerResult;
use docmanager_core::models::user::{UpdateUser, User};
use docmanager_core::repository::UserRepository;
use tracing::info;
use uuid::Uuid;

use crate::error::AuthError;

pub struct AccessEditor<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> AccessEditor<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    /// Replace the roles and explicit permissions of `target_id`.
    ///
    /// The editor must be an admin, may not edit themselves, and may not
    /// edit another admin. The base role is always kept. An empty
    /// `permissions` list is stored as-is and falls back to role
    /// defaults.
    pub async fn update_access(
        &self,
        editor: &User,
        target_id: Uuid,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> DocManagerResult<User> {
        if !editor.is_admin() {
            return Err(AuthError::AccessDenied(catalog::ROLE_ADMIN.to_string()).into());
        }

        if target_id == editor.id {
            return Err(AuthError::SelfEdit.into());
        }

        let mut target = self.user_repo.get_by_id(target_id).await?;
        if target.is_admin() {
            return Err(AuthError::AdminNotEditable.into());
        }

        if let Some(unknown) = permissions.iter().find(|key| !catalog::exists(key)) {
            return Err(AuthError::UnknownPermission(unknown.clone()).into());
        }

        target.set_roles(roles.iter().map(String::as_str).chain([ROLE_USER]));
        target.set_permissions(&permissions);

        let updated = self
            .user_repo
            .update(
                target_id,
                UpdateUser {
                    roles: Some(target.roles),
                    permissions: Some(target.permissions),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            editor_id = %editor.id,
            user_id = %updated.id,
            roles = ?updated.roles,
            permissions = ?updated.permissions,
            "Roles and permissions updated"
        );
        Ok(updated)
    }
}
