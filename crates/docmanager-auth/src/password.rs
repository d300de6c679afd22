//! Password verification and complexity policy.
//!
//! Hashing lives with the user store (`docmanager_db::hash_password`).

use argon2::{Argon2, PasswordVerifier};
use docmanager_core::error::FieldError;

use crate::config::PasswordPolicy;
use crate::error::AuthError;

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Check a new password and its confirmation against `policy`.
///
/// Errors are addressed to the `password` and `confirm_password` fields.
/// A blank password reports only the "required" error.
pub fn validate_new_password(
    policy: &PasswordPolicy,
    password: &str,
    confirmation: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required."));
    } else {
        if password.chars().count() < policy.min_length {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} characters.", policy.min_length),
            ));
        }
        if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one uppercase letter.",
            ));
        }
        if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one lowercase letter.",
            ));
        }
        if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one number.",
            ));
        }
    }

    if confirmation.is_empty() {
        errors.push(FieldError::new(
            "confirm_password",
            "Please confirm your password.",
        ));
    } else if password != confirmation {
        errors.push(FieldError::new("confirm_password", "Passwords do not match."));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;

    fn hash_password(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("hashing failed")
            .to_string()
    }

    fn messages(result: Result<(), Vec<FieldError>>) -> Vec<String> {
        result
            .unwrap_err()
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("Hunter22");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Hunter22", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("Hunter22");
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }

    #[test]
    fn strong_matching_password_passes() {
        let policy = PasswordPolicy::default();
        assert!(validate_new_password(&policy, "Secret123", "Secret123").is_ok());
    }

    #[test]
    fn blank_password_reports_required_only() {
        let policy = PasswordPolicy::default();
        let msgs = messages(validate_new_password(&policy, "", "x"));
        assert_eq!(
            msgs,
            vec!["Password is required.", "Passwords do not match."]
        );
    }

    #[test]
    fn weak_password_reports_each_rule() {
        let policy = PasswordPolicy::default();
        let msgs = messages(validate_new_password(&policy, "abc", "abc"));
        assert_eq!(
            msgs,
            vec![
                "Password must be at least 8 characters.",
                "Password must contain at least one uppercase letter.",
                "Password must contain at least one number.",
            ]
        );
    }

    #[test]
    fn confirmation_is_required_and_must_match() {
        let policy = PasswordPolicy::default();
        let missing = validate_new_password(&policy, "Secret123", "").unwrap_err();
        assert_eq!(missing[0].field, "confirm_password");
        assert_eq!(missing[0].message, "Please confirm your password.");

        let mismatch = messages(validate_new_password(&policy, "Secret123", "Secret124"));
        assert_eq!(mismatch, vec!["Passwords do not match."]);
    }
}
