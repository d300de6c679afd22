//! Outbound mail and reset-link collaborators.
//!
//! Delivery is abstracted behind [`Mailer`] so the reset lifecycle has
//! no dependency on a transport. The lifecycle treats every delivery
//! error as non-fatal.

use crate::config::ResetConfig;
use crate::error::AuthError;

pub const RESET_EMAIL_SUBJECT: &str = "Password Reset Request - DocManager";

/// A fully rendered email, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Builds the absolute link that carries a raw reset secret.
pub trait LinkBuilder: Send + Sync {
    fn reset_link(&self, raw_token: &str) -> String;
}

/// `{base_url}{reset_path}/{token}`.
#[derive(Debug, Clone)]
pub struct BaseUrlLinkBuilder {
    base_url: String,
    reset_path: String,
}

impl BaseUrlLinkBuilder {
    pub fn new(base_url: impl Into<String>, reset_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reset_path: reset_path.into(),
        }
    }

    pub fn from_config(config: &ResetConfig) -> Self {
        Self::new(config.base_url.clone(), config.reset_path.clone())
    }
}

impl LinkBuilder for BaseUrlLinkBuilder {
    fn reset_link(&self, raw_token: &str) -> String {
        format!("{}{}/{}", self.base_url, self.reset_path, raw_token)
    }
}

/// Render the reset email for `to`, embedding `link` in both bodies.
pub fn render_reset_email(config: &ResetConfig, to: &str, link: &str) -> EmailMessage {
    let minutes = config.token_lifetime_minutes;

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Password Reset</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .button {{ display: inline-block; padding: 12px 24px; background: #667eea; color: white; text-decoration: none; border-radius: 8px; font-weight: 600; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Password Reset Request</h2>
        <p>Hello,</p>
        <p>We received a request to reset your password. Click the button below to create a new password:</p>
        <p style="text-align: center; margin: 30px 0;">
            <a href="{link}" class="button">Reset Password</a>
        </p>
        <p>Or copy and paste this link in your browser:</p>
        <p style="word-break: break-all; color: #667eea;">{link}</p>
        <p>This link will expire in {minutes} minutes.</p>
        <p>If you didn't request this, please ignore this email or contact support if you have concerns.</p>
        <div class="footer">
            <p>Best regards,<br>The DocManager Team</p>
        </div>
    </div>
</body>
</html>"#
    );

    let text = format!(
        "Password Reset Request

Hello,

We received a request to reset your password. Use the link below to create a new password:

{link}

This link will expire in {minutes} minutes.

If you didn't request this, please ignore this email or contact support if you have concerns.

Best regards,
The DocManager Team"
    );

    EmailMessage {
        from: config.mail_from.clone(),
        to: to.to_string(),
        subject: RESET_EMAIL_SUBJECT.to_string(),
        html,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_appends_token_segment() {
        let links = BaseUrlLinkBuilder::new("https://docs.example.com/", "/reset-password");
        assert_eq!(
            links.reset_link("abc123"),
            "https://docs.example.com/reset-password/abc123"
        );
    }

    #[test]
    fn default_link_uses_localhost() {
        let links = BaseUrlLinkBuilder::from_config(&ResetConfig::default());
        assert_eq!(
            links.reset_link("t"),
            "http://localhost:8000/reset-password/t"
        );
    }

    #[test]
    fn email_carries_link_and_expiry_in_both_bodies() {
        let config = ResetConfig::default();
        let link = "http://localhost:8000/reset-password/deadbeef";
        let email = render_reset_email(&config, "alice@example.com", link);

        assert_eq!(email.from, "noreply@docmanager.com");
        assert_eq!(email.to, "alice@example.com");
        assert_eq!(email.subject, RESET_EMAIL_SUBJECT);
        assert!(email.html.contains(&format!("href=\"{link}\"")));
        assert!(email.text.contains(link));
        assert!(email.html.contains("expire in 30 minutes"));
        assert!(email.text.contains("expire in 30 minutes"));
    }
}
