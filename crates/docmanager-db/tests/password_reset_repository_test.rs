//! Integration tests for the password reset token repository using
//! in-memory SurrealDB.

use chrono::{Duration, Utc};
use docmanager_core::error::DocManagerError;
use docmanager_core::models::password_reset::CreatePasswordReset;
use docmanager_core::models::user::CreateUser;
use docmanager_core::repository::{PasswordResetRepository, UserRepository};
use docmanager_db::repository::{SurrealPasswordResetRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

struct Fixture {
    db: Surreal<Db>,
    users: SurrealUserRepository<Db>,
    resets: SurrealPasswordResetRepository<Db>,
    user_id: Uuid,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    docmanager_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let user = users
        .create(CreateUser {
            email: "alice@example.com".into(),
            username: None,
            password: "OldSecret1".into(),
            roles: vec![],
            permissions: None,
        })
        .await
        .unwrap();

    Fixture {
        db: db.clone(),
        users,
        resets: SurrealPasswordResetRepository::new(db),
        user_id: user.id,
    }
}

fn digest(n: u8) -> String {
    format!("{n:064x}")
}

fn token_for(user_id: Uuid, n: u8, created_at: chrono::DateTime<Utc>) -> CreatePasswordReset {
    CreatePasswordReset {
        user_id,
        token_hash: digest(n),
        expires_at: created_at + Duration::minutes(30),
        created_at,
    }
}

#[tokio::test]
async fn issue_supersedes_previous_tokens() {
    let f = setup().await;
    let now = Utc::now();

    let first = f.resets.issue(token_for(f.user_id, 1, now), now).await.unwrap();
    assert!(first.is_valid_at(now));

    let later = now + Duration::minutes(1);
    f.resets
        .issue(token_for(f.user_id, 2, later), later)
        .await
        .unwrap();

    assert!(f.resets.find_valid(&digest(1), later).await.unwrap().is_none());
    assert!(f.resets.find_valid(&digest(2), later).await.unwrap().is_some());

    let valid = f.resets.find_valid_by_user(f.user_id, later).await.unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].token_hash, digest(2));
}

#[tokio::test]
async fn find_valid_respects_expiry() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 3, now), now).await.unwrap();

    let before = now + Duration::minutes(29);
    let after = now + Duration::minutes(31);
    assert!(f.resets.find_valid(&digest(3), before).await.unwrap().is_some());
    assert!(f.resets.find_valid(&digest(3), after).await.unwrap().is_none());
}

#[tokio::test]
async fn consume_updates_credential_exactly_once() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 4, now), now).await.unwrap();

    let owner = f
        .resets
        .consume(&digest(4), "$argon2id$new-hash", now)
        .await
        .unwrap();
    assert_eq!(owner, f.user_id);

    let user = f.users.get_by_id(f.user_id).await.unwrap();
    assert_eq!(user.password_hash, "$argon2id$new-hash");

    let err = f
        .resets
        .consume(&digest(4), "$argon2id$other-hash", now)
        .await
        .unwrap_err();
    assert!(matches!(err, DocManagerError::InvalidOrExpiredToken));

    let user = f.users.get_by_id(f.user_id).await.unwrap();
    assert_eq!(user.password_hash, "$argon2id$new-hash");
}

#[tokio::test]
async fn consume_rejects_unknown_and_expired_tokens() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 5, now), now).await.unwrap();

    let unknown = f
        .resets
        .consume(&digest(99), "$argon2id$x", now)
        .await
        .unwrap_err();
    assert!(matches!(unknown, DocManagerError::InvalidOrExpiredToken));

    let expired = f
        .resets
        .consume(&digest(5), "$argon2id$x", now + Duration::minutes(31))
        .await
        .unwrap_err();
    assert!(matches!(expired, DocManagerError::InvalidOrExpiredToken));

    let user = f.users.get_by_id(f.user_id).await.unwrap();
    assert_ne!(user.password_hash, "$argon2id$x");
}

#[tokio::test]
async fn count_created_since_covers_trailing_window() {
    let f = setup().await;
    let now = Utc::now();

    let old = now - Duration::minutes(90);
    f.resets.issue(token_for(f.user_id, 6, old), old).await.unwrap();
    for n in 7..10 {
        let at = now - Duration::minutes(i64::from(n));
        f.resets.issue(token_for(f.user_id, n, at), at).await.unwrap();
    }

    let recent = f
        .resets
        .count_created_since(f.user_id, now - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(recent, 3);
}

#[tokio::test]
async fn invalidate_all_for_user_burns_unused_tokens() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 10, now), now).await.unwrap();

    let touched = f.resets.invalidate_all_for_user(f.user_id, now).await.unwrap();
    assert_eq!(touched, 1);
    assert!(f.resets.find_valid(&digest(10), now).await.unwrap().is_none());

    let again = f.resets.invalidate_all_for_user(f.user_id, now).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn cleanup_removes_only_old_rows() {
    let f = setup().await;
    let now = Utc::now();

    let stale = now - Duration::days(8);
    f.resets.issue(token_for(f.user_id, 11, stale), stale).await.unwrap();
    f.resets.issue(token_for(f.user_id, 12, now), now).await.unwrap();

    let removed = f
        .resets
        .cleanup_expired(now - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(f.resets.find_valid(&digest(12), now).await.unwrap().is_some());
}

#[tokio::test]
async fn consume_burns_every_other_outstanding_token() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 13, now), now).await.unwrap();

    // A second live row that issue() never got to supersede.
    f.db.query(
        "CREATE type::record('password_reset', $id) SET \
         user_id = $user_id, token_hash = $token_hash, \
         expires_at = $expires_at, created_at = $created_at",
    )
    .bind(("id", Uuid::new_v4().to_string()))
    .bind(("user_id", f.user_id.to_string()))
    .bind(("token_hash", digest(14)))
    .bind(("expires_at", now + Duration::minutes(30)))
    .bind(("created_at", now))
    .await
    .unwrap()
    .check()
    .unwrap();
    assert_eq!(
        f.resets.find_valid_by_user(f.user_id, now).await.unwrap().len(),
        2
    );

    f.resets
        .consume(&digest(13), "$argon2id$new-hash", now)
        .await
        .unwrap();

    assert!(
        f.resets
            .find_valid_by_user(f.user_id, now)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(f.resets.find_valid(&digest(14), now).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_issues_leave_a_single_valid_token() {
    let f = setup().await;
    let now = Utc::now();

    let (first, second) = tokio::join!(
        f.resets.issue(token_for(f.user_id, 15, now), now),
        f.resets.issue(token_for(f.user_id, 16, now), now),
    );
    assert!(first.is_ok() || second.is_ok());

    let valid = f.resets.find_valid_by_user(f.user_id, now).await.unwrap();
    assert_eq!(valid.len(), 1);
}

#[tokio::test]
async fn pending_index_admits_one_live_token_per_user() {
    let f = setup().await;
    let now = Utc::now();
    f.resets.issue(token_for(f.user_id, 17, now), now).await.unwrap();

    let err = f
        .db
        .query(
            "CREATE password_reset SET \
             user_id = $user_id, pending_user = $user_id, token_hash = $token_hash, \
             expires_at = $expires_at, created_at = $created_at",
        )
        .bind(("user_id", f.user_id.to_string()))
        .bind(("token_hash", digest(18)))
        .bind(("expires_at", now + Duration::minutes(30)))
        .bind(("created_at", now))
        .await
        .unwrap()
        .check()
        .unwrap_err();
    assert!(err.to_string().contains("idx_password_reset_pending"));

    // Once the live token is used, a new one may be issued.
    f.resets
        .consume(&digest(17), "$argon2id$new-hash", now)
        .await
        .unwrap();
    f.resets.issue(token_for(f.user_id, 19, now), now).await.unwrap();
    assert!(f.resets.find_valid(&digest(19), now).await.unwrap().is_some());
}
