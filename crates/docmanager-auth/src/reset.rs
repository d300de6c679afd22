//! Password reset lifecycle: request, validate, consume, purge.
//!
//! `request_reset` answers every caller with the same payload. Unknown
//! emails, rate-limited actors and failed deliveries are only visible
//! in the logs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use docmanager_core::error::{DocManagerError, DocManagerResult};
use docmanager_core::models::password_reset::CreatePasswordReset;
use docmanager_core::models::user::User;
use docmanager_core::repository::{PasswordResetRepository, UserRepository};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ResetConfig;
use crate::mailer::{LinkBuilder, Mailer, render_reset_email};
use crate::token;

pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists with this email, you will receive a password reset link shortly.";

pub const RESET_SUCCESS_MESSAGE: &str =
    "Your password has been reset successfully. You can now log in with your new password.";

/// Response to a reset request. Identical for every input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequestResponse {
    pub success: bool,
    pub message: String,
}

impl ResetRequestResponse {
    fn generic() -> Self {
        Self {
            success: true,
            message: RESET_REQUESTED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: String,
}

/// Password reset service.
///
/// Generic over repository and delivery implementations so that the
/// auth layer has no dependency on the database crate or a transport.
pub struct PasswordResetService<U, R, M, L>
where
    U: UserRepository,
    R: PasswordResetRepository,
    M: Mailer,
    L: LinkBuilder,
{
    user_repo: U,
    reset_repo: R,
    mailer: M,
    links: L,
    config: ResetConfig,
    clock: Arc<dyn Clock>,
}

impl<U, R, M, L> PasswordResetService<U, R, M, L>
where
    U: UserRepository,
    R: PasswordResetRepository,
    M: Mailer,
    L: LinkBuilder,
{
    pub fn new(user_repo: U, reset_repo: R, mailer: M, links: L, config: ResetConfig) -> Self {
        Self {
            user_repo,
            reset_repo,
            mailer,
            links,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ResetConfig {
        &self.config
    }

    /// Start a reset for `email`.
    ///
    /// Only a failed actor lookup can produce an error; anything that
    /// happens after the actor is known is logged and answered with the
    /// generic response.
    pub async fn request_reset(&self, email: &str) -> DocManagerResult<ResetRequestResponse> {
        let user = match self.user_repo.get_by_email(email).await {
            Ok(user) => user,
            Err(DocManagerError::NotFound { .. }) => {
                info!("Password reset requested for non-existent email");
                return Ok(ResetRequestResponse::generic());
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.issue_for(&user).await {
            error!(user_id = %user.id, error = %e, "Failed to issue password reset token");
        }

        Ok(ResetRequestResponse::generic())
    }

    async fn issue_for(&self, user: &User) -> DocManagerResult<()> {
        let now = self.clock.now();

        let window_start = now - Duration::minutes(self.config.rate_window_minutes);
        let recent = self
            .reset_repo
            .count_created_since(user.id, window_start)
            .await?;
        if recent >= self.config.max_requests_per_window {
            warn!(user_id = %user.id, count = recent, "Password reset rate limit exceeded");
            return Ok(());
        }

        let raw = token::generate_reset_token(self.config.token_bytes);
        let token_hash = token::hash_reset_token(&raw);
        let expires_at = now + Duration::minutes(self.config.token_lifetime_minutes);

        self.reset_repo
            .issue(
                CreatePasswordReset {
                    user_id: user.id,
                    token_hash,
                    expires_at,
                    created_at: now,
                },
                now,
            )
            .await?;

        let link = self.links.reset_link(&raw);
        let message = render_reset_email(&self.config, &user.email, &link);
        if let Err(e) = self.mailer.send(message).await {
            error!(user_id = %user.id, error = %e, "Failed to deliver password reset email");
        }

        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Whether `raw_token` currently names a usable token. Never consumes.
    pub async fn validate_token(&self, raw_token: &str) -> DocManagerResult<bool> {
        let token_hash = token::hash_reset_token(raw_token);
        let found = self
            .reset_repo
            .find_valid(&token_hash, self.clock.now())
            .await?;
        Ok(found.is_some())
    }

    /// Replace the owner's credential with `new_password_hash` and burn
    /// every outstanding token of that owner.
    ///
    /// Unknown, expired and already-used secrets all fail with
    /// [`DocManagerError::InvalidOrExpiredToken`] and write nothing.
    pub async fn reset_password(
        &self,
        raw_token: &str,
        new_password_hash: &str,
    ) -> DocManagerResult<ResetPasswordResponse> {
        let token_hash = token::hash_reset_token(raw_token);

        match self
            .reset_repo
            .consume(&token_hash, new_password_hash, self.clock.now())
            .await
        {
            Ok(user_id) => {
                info!(user_id = %user_id, "Password reset successful");
                Ok(ResetPasswordResponse {
                    success: true,
                    message: RESET_SUCCESS_MESSAGE.to_string(),
                })
            }
            Err(DocManagerError::InvalidOrExpiredToken) => {
                warn!("Invalid or expired password reset token used");
                Err(DocManagerError::InvalidOrExpiredToken)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete token rows older than the retention window.
    pub async fn purge_expired(&self) -> DocManagerResult<u64> {
        purge_expired_tokens(
            &self.reset_repo,
            self.clock.now(),
            self.config.retention_days,
        )
        .await
    }
}

/// Rows created before this instant are past retention.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days)
}

/// Delete every token row created more than `retention_days` before `now`.
///
/// Needs only the token store, so it also runs at startup before any
/// mailer exists.
pub async fn purge_expired_tokens<R: PasswordResetRepository>(
    reset_repo: &R,
    now: DateTime<Utc>,
    retention_days: i64,
) -> DocManagerResult<u64> {
    let removed = reset_repo
        .cleanup_expired(retention_cutoff(now, retention_days))
        .await?;
    info!(count = removed, retention_days, "Purged password reset tokens");
    Ok(removed)
}
