//! Domain models for DocManager.
//!
//! Clients, documents and categories are owned by the surrounding web
//! application; only the actor, reset token and audit log live here.

pub mod activity_log;
pub mod password_reset;
pub mod user;
