//! Integration tests for the password reset lifecycle.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use docmanager_auth::clock::{Clock, ManualClock};
use docmanager_auth::config::ResetConfig;
use docmanager_auth::error::AuthError;
use docmanager_auth::mailer::{BaseUrlLinkBuilder, EmailMessage, Mailer};
use docmanager_auth::password;
use docmanager_auth::reset::{
    PasswordResetService, RESET_REQUESTED_MESSAGE, purge_expired_tokens,
};
use docmanager_auth::token;
use docmanager_core::error::DocManagerError;
use docmanager_core::models::user::CreateUser;
use docmanager_core::repository::{PasswordResetRepository, UserRepository};
use docmanager_db::repository::{SurrealPasswordResetRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Raw secret embedded in the most recent email.
    fn last_token(&self) -> String {
        let sent = self.sent();
        let text = &sent.last().expect("no email sent").text;
        let start = text.find("/reset-password/").unwrap() + "/reset-password/".len();
        text[start..start + 64].to_string()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), AuthError> {
        if self.failing {
            return Err(AuthError::Delivery("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

type Service = PasswordResetService<
    SurrealUserRepository<Db>,
    SurrealPasswordResetRepository<Db>,
    RecordingMailer,
    BaseUrlLinkBuilder,
>;

struct Fixture {
    service: Service,
    users: SurrealUserRepository<Db>,
    resets: SurrealPasswordResetRepository<Db>,
    mailer: RecordingMailer,
    clock: Arc<ManualClock>,
    user_id: Uuid,
}

async fn setup_with(mailer: RecordingMailer) -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    docmanager_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let resets = SurrealPasswordResetRepository::new(db.clone());
    let user = users
        .create(CreateUser {
            email: "real@example.com".into(),
            username: Some("real".into()),
            password: "OldSecret1".into(),
            roles: vec![],
            permissions: None,
        })
        .await
        .unwrap();

    let config = ResetConfig::default();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = PasswordResetService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealPasswordResetRepository::new(db),
        mailer.clone(),
        BaseUrlLinkBuilder::from_config(&config),
        config,
    )
    .with_clock(clock.clone());

    Fixture {
        service,
        users,
        resets,
        mailer,
        clock,
        user_id: user.id,
    }
}

async fn setup() -> Fixture {
    setup_with(RecordingMailer::default()).await
}

#[tokio::test]
async fn reset_round_trip_succeeds_exactly_once() {
    let f = setup().await;

    let response = f.service.request_reset("real@example.com").await.unwrap();
    assert!(response.success);
    assert_eq!(response.message, RESET_REQUESTED_MESSAGE);

    let sent = f.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "real@example.com");
    assert_eq!(sent[0].subject, "Password Reset Request - DocManager");

    let raw = f.mailer.last_token();
    assert!(f.service.validate_token(&raw).await.unwrap());

    // Only the hash is persisted.
    let stored = f
        .resets
        .find_valid_by_user(f.user_id, f.clock.now())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token_hash, token::hash_reset_token(&raw));
    assert_ne!(stored[0].token_hash, raw);

    let new_hash = docmanager_db::hash_password("NewSecret1").unwrap();
    let done = f.service.reset_password(&raw, &new_hash).await.unwrap();
    assert!(done.success);

    let user = f.users.get_by_id(f.user_id).await.unwrap();
    assert!(password::verify_password("NewSecret1", &user.password_hash).unwrap());

    let again = f
        .service
        .reset_password(&raw, &new_hash)
        .await
        .unwrap_err();
    assert!(matches!(again, DocManagerError::InvalidOrExpiredToken));
    assert!(!f.service.validate_token(&raw).await.unwrap());
}

#[tokio::test]
async fn new_request_supersedes_previous_token() {
    let f = setup().await;

    f.service.request_reset("real@example.com").await.unwrap();
    let first = f.mailer.last_token();
    f.service.request_reset("real@example.com").await.unwrap();
    let second = f.mailer.last_token();

    assert_ne!(first, second);
    assert!(!f.service.validate_token(&first).await.unwrap());
    assert!(f.service.validate_token(&second).await.unwrap());
}

#[tokio::test]
async fn fourth_request_within_an_hour_is_silently_dropped() {
    let f = setup().await;

    let mut responses = Vec::new();
    for _ in 0..4 {
        responses.push(f.service.request_reset("real@example.com").await.unwrap());
        f.clock.advance(Duration::minutes(5));
    }

    assert!(responses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(f.mailer.sent().len(), 3);

    let issued = f
        .resets
        .count_created_since(f.user_id, f.clock.now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(issued, 3);

    // Once the window has rolled past the first request, a new one is issued.
    f.clock.advance(Duration::minutes(50));
    f.service.request_reset("real@example.com").await.unwrap();
    assert_eq!(f.mailer.sent().len(), 4);
}

#[tokio::test]
async fn unknown_and_known_emails_get_identical_payloads() {
    let f = setup().await;

    let unknown = f
        .service
        .request_reset("nonexistent@x.com")
        .await
        .unwrap();
    let known = f.service.request_reset("real@example.com").await.unwrap();

    assert_eq!(
        serde_json::to_vec(&unknown).unwrap(),
        serde_json::to_vec(&known).unwrap()
    );
    assert_eq!(f.mailer.sent().len(), 1);
}

#[tokio::test]
async fn token_expires_after_thirty_minutes() {
    let f = setup().await;
    f.service.request_reset("real@example.com").await.unwrap();
    let raw = f.mailer.last_token();

    f.clock.advance(Duration::minutes(29));
    assert!(f.service.validate_token(&raw).await.unwrap());

    f.clock.advance(Duration::minutes(2));
    assert!(!f.service.validate_token(&raw).await.unwrap());

    let err = f
        .service
        .reset_password(&raw, "$argon2id$unused")
        .await
        .unwrap_err();
    assert!(matches!(err, DocManagerError::InvalidOrExpiredToken));

    let user = f.users.get_by_id(f.user_id).await.unwrap();
    assert_ne!(user.password_hash, "$argon2id$unused");
}

#[tokio::test]
async fn unknown_token_is_rejected_with_field_error() {
    let f = setup().await;
    let err = f
        .service
        .reset_password(&token::generate_reset_token(32), "$argon2id$x")
        .await
        .unwrap_err();

    let body = err.to_body();
    assert_eq!(body.code, "invalid_or_expired_token");
    assert_eq!(body.errors[0].field, "token");
}

#[tokio::test]
async fn delivery_failure_is_swallowed_and_token_kept() {
    let f = setup_with(RecordingMailer::failing()).await;

    let response = f.service.request_reset("real@example.com").await.unwrap();
    assert!(response.success);
    assert_eq!(response.message, RESET_REQUESTED_MESSAGE);

    let valid = f
        .resets
        .find_valid_by_user(f.user_id, f.clock.now())
        .await
        .unwrap();
    assert_eq!(valid.len(), 1);
}

#[tokio::test]
async fn purge_removes_rows_past_retention() {
    let f = setup().await;
    let start = f.clock.now();

    f.clock.set(start - Duration::days(8));
    f.service.request_reset("real@example.com").await.unwrap();
    f.clock.set(start);
    f.service.request_reset("real@example.com").await.unwrap();

    assert_eq!(f.service.purge_expired().await.unwrap(), 1);
    assert_eq!(f.service.purge_expired().await.unwrap(), 0);
    assert!(f.service.validate_token(&f.mailer.last_token()).await.unwrap());
}

#[tokio::test]
async fn startup_purge_needs_only_the_token_store() {
    let f = setup().await;
    let start = f.clock.now();

    f.clock.set(start - Duration::days(10));
    f.service.request_reset("real@example.com").await.unwrap();
    f.clock.set(start);

    assert_eq!(purge_expired_tokens(&f.resets, start, 30).await.unwrap(), 0);
    assert_eq!(purge_expired_tokens(&f.resets, start, 7).await.unwrap(), 1);
}
