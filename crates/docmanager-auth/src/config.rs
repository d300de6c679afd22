//! Password reset and password policy configuration.

/// Configuration for the password reset lifecycle.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    /// Raw secret length in bytes (default: 32, hex-encoded to 64 chars).
    pub token_bytes: usize,
    /// Token lifetime in minutes (default: 30).
    pub token_lifetime_minutes: i64,
    /// Max tokens issued per actor within one rate window (default: 3).
    pub max_requests_per_window: u64,
    /// Rolling rate-limit window in minutes (default: 60).
    pub rate_window_minutes: i64,
    /// Age in days after which token rows are purged (default: 7).
    pub retention_days: i64,
    /// Sender address of reset emails.
    pub mail_from: String,
    /// Absolute base URL prepended to the reset path.
    pub base_url: String,
    /// Path of the reset page; the raw token is appended as a segment.
    pub reset_path: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            token_bytes: 32,
            token_lifetime_minutes: 30,
            max_requests_per_window: 3,
            rate_window_minutes: 60,
            retention_days: 7,
            mail_from: "noreply@docmanager.com".into(),
            base_url: "http://localhost:8000".into(),
            reset_path: "/reset-password".into(),
        }
    }
}

/// Complexity rules for new passwords.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }
}
