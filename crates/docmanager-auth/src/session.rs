//! Per-request actor re-validation and forced logout.
//!
//! The authenticated actor is always re-read from the repository before
//! authorization, so an administrator's revocation applies within the
//! current request.

use docmanager_core::catalog::PermissionLevel;
use docmanager_core::error::{DocManagerError, DocManagerResult};
use docmanager_core::models::user::User;
use docmanager_core::repository::UserRepository;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::registry::VoterRegistry;
use crate::voter::Subject;

pub const ACCESS_REVOKED_MESSAGE: &str =
    "Your access rights have been changed by an administrator. Please log in again.";

/// The authenticated state carried through one request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    actor: Option<User>,
    notices: Vec<String>,
}

impl SecurityContext {
    pub fn authenticated(actor: User) -> Self {
        Self {
            actor: Some(actor),
            notices: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn actor(&self) -> Option<&User> {
        self.actor.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    /// User-facing messages queued for the next response.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Drop the actor and queue `message` for the user.
    pub fn terminate(&mut self, message: &str) {
        self.actor = None;
        self.notices.push(message.to_string());
    }
}

/// Where the caller goes after a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialOutcome {
    /// The actor keeps some access; send them to the home page.
    RedirectHome,
    /// The session was ended; send them to the login page.
    SessionTerminated,
}

pub struct SessionRevalidator<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> SessionRevalidator<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    /// Replace the actor in `ctx` with its current persisted state.
    ///
    /// An actor whose row is gone is logged out. Repository failures
    /// propagate and leave `ctx` untouched; the caller must reject the
    /// request.
    pub async fn refresh(&self, ctx: &mut SecurityContext) -> DocManagerResult<()> {
        let Some(current) = ctx.actor() else {
            return Ok(());
        };
        let user_id = current.id;

        match self.user_repo.get_by_id(user_id).await {
            Ok(fresh) => {
                debug!(
                    user_id = %user_id,
                    old_roles = ?current.roles,
                    new_roles = ?fresh.roles,
                    old_permissions = ?current.permissions,
                    new_permissions = ?fresh.permissions,
                    "Refreshing user from database"
                );
                ctx.actor = Some(fresh);
                Ok(())
            }
            Err(DocManagerError::NotFound { .. }) => {
                info!(user_id = %user_id, "User no longer exists, invalidating session");
                ctx.terminate(ACCESS_REVOKED_MESSAGE);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Boundary handler for a failed authorization check.
    ///
    /// Re-reads the actor; if its permission level is
    /// [`PermissionLevel::NoAccess`] the session is terminated.
    pub async fn handle_access_denied(
        &self,
        ctx: &mut SecurityContext,
        uri: &str,
    ) -> DocManagerResult<DenialOutcome> {
        let was_authenticated = ctx.is_authenticated();
        warn!(
            uri,
            user_id = ?ctx.actor().map(|u| u.id),
            "Access denied"
        );

        self.refresh(ctx).await?;

        let Some(actor) = ctx.actor() else {
            return Ok(if was_authenticated {
                DenialOutcome::SessionTerminated
            } else {
                DenialOutcome::RedirectHome
            });
        };

        let level = actor.permission_level();
        if level == PermissionLevel::NoAccess {
            info!(
                user_id = %actor.id,
                permission_level = %level,
                "User lost all permissions, invalidating session"
            );
            ctx.terminate(ACCESS_REVOKED_MESSAGE);
            return Ok(DenialOutcome::SessionTerminated);
        }

        Ok(DenialOutcome::RedirectHome)
    }

    /// Refresh, check, and run the denial handler when the check fails.
    ///
    /// The original denial is returned either way; the handler's effect
    /// is visible through `ctx`.
    pub async fn authorize(
        &self,
        registry: &VoterRegistry,
        ctx: &mut SecurityContext,
        attribute: &str,
        subject: &Subject,
        uri: &str,
    ) -> DocManagerResult<()> {
        self.refresh(ctx).await?;

        match registry.deny_access_unless_granted(attribute, subject, ctx.actor()) {
            Ok(()) => Ok(()),
            Err(denied @ AuthError::AccessDenied(_)) => {
                self.handle_access_denied(ctx, uri).await?;
                Err(denied.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
