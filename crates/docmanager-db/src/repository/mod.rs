//! SurrealDB repository implementations.

mod activity_log;
mod password_reset;
mod user;

pub use activity_log::SurrealActivityLogRepository;
pub use password_reset::SurrealPasswordResetRepository;
pub use user::{SurrealUserRepository, hash_password};
