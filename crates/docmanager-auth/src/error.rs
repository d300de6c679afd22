//! Authorization and password reset error types.

use docmanager_core::error::DocManagerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied for attribute {0}")]
    AccessDenied(String),

    #[error("cannot edit admin users; admin accounts have full access by default")]
    AdminNotEditable,

    #[error("you cannot edit your own roles")]
    SelfEdit,

    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for DocManagerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => DocManagerError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::AccessDenied(_) | AuthError::AdminNotEditable | AuthError::SelfEdit => {
                DocManagerError::AuthorizationDenied {
                    reason: err.to_string(),
                }
            }
            AuthError::UnknownPermission(_) => DocManagerError::Validation {
                message: err.to_string(),
            },
            AuthError::Delivery(msg) => DocManagerError::Delivery(msg),
            AuthError::Crypto(msg) => DocManagerError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denials_map_to_forbidden_and_unauthorized() {
        let forbidden: DocManagerError = AuthError::AccessDenied("documents.delete".into()).into();
        assert_eq!(forbidden.code(), "forbidden");

        let unauthorized: DocManagerError = AuthError::Unauthenticated.into();
        assert_eq!(unauthorized.code(), "unauthorized");
    }

    #[test]
    fn unknown_permission_is_a_validation_error() {
        let err: DocManagerError = AuthError::UnknownPermission("documents.fly".into()).into();
        assert!(matches!(err, DocManagerError::Validation { .. }));
        assert!(err.to_string().contains("documents.fly"));
    }
}
