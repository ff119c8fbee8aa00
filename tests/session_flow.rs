//! End-to-end session flows: signup, login by email and phone, token
//! rotation, deactivation, and the reset queue.

use migration::{Migrator, MigratorTrait};
use nyumba_auth::errors::internal::{AuthFailure, InternalError};
use nyumba_auth::services::auth_service::AuthService;
use nyumba_auth::services::signup_service::{SignupInput, SignupService};
use nyumba_auth::services::token_service::TokenService;
use nyumba_auth::stores::notification_store::NotificationStore;
use nyumba_auth::stores::principal_store::PrincipalStore;
use nyumba_auth::stores::role_store::RoleStore;
use nyumba_auth::types::internal::system_role::SystemRole;
use sea_orm::{Database, DatabaseConnection};

struct Env {
    db: DatabaseConnection,
    auth: AuthService,
    signup: SignupService,
}

async fn env() -> Env {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    let tokens = TokenService::new("integration-jwt-secret", "integration-refresh-secret", 15, 30);
    Env {
        auth: AuthService::new(db.clone(), tokens, "Default123".to_string()),
        signup: SignupService::new(db.clone()),
        db,
    }
}

fn alice() -> SignupInput {
    SignupInput {
        username: "alice".to_string(),
        email: "alice@x.io".to_string(),
        password: "Passw0rd".to_string(),
        confirm_password: "Passw0rd".to_string(),
        first_name: Some("A".to_string()),
        last_name: Some("L".to_string()),
        phone: "+255712345678".to_string(),
        role_hint: "owner".to_string(),
    }
}

#[tokio::test]
async fn owner_signup_then_login() {
    let env = env().await;

    let (user, pair) = env.signup.signup(alice(), &env.auth).await.unwrap();

    let principals = PrincipalStore::new(env.db.clone());
    let profile = principals.get_profile(&user.id).await.unwrap();
    assert!(profile.is_approved);

    let roles = RoleStore::new(env.db.clone());
    assert!(roles
        .has_system_role(&user.id, SystemRole::PropertyOwner)
        .await
        .unwrap());

    // The signup tokens are live immediately
    let bearer = env.auth.verify(&pair.access_token).await.unwrap();
    assert_eq!(bearer.id, user.id);

    let (found, _) = env.auth.login("alice@x.io", "Passw0rd").await.unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn phone_login_accepts_both_forms() {
    let env = env().await;
    env.signup.signup(alice(), &env.auth).await.unwrap();

    env.auth.login("255712345678", "Passw0rd").await.unwrap();
    env.auth.login("+255712345678", "Passw0rd").await.unwrap();

    assert!(matches!(
        env.auth.login("255712345678", "wrongPass1").await,
        Err(InternalError::Authentication(AuthFailure::InvalidCredentials))
    ));
}

#[tokio::test]
async fn refresh_rotation_invalidates_the_consumed_token() {
    let env = env().await;
    env.signup.signup(alice(), &env.auth).await.unwrap();
    let (_, pair0) = env.auth.login("alice@x.io", "Passw0rd").await.unwrap();

    let pair1 = env.auth.refresh(&pair0.refresh_token).await.unwrap();

    assert!(matches!(
        env.auth.refresh(&pair0.refresh_token).await,
        Err(InternalError::Authentication(AuthFailure::InvalidRefresh))
    ));
    env.auth.refresh(&pair1.refresh_token).await.unwrap();
}

#[tokio::test]
async fn deactivation_blocks_login_until_reactivated() {
    let env = env().await;
    let (user, _) = env.signup.signup(alice(), &env.auth).await.unwrap();

    let principals = PrincipalStore::new(env.db.clone());
    principals
        .deactivate(&user.id, "disputed contract", "admin-1")
        .await
        .unwrap();

    match env.auth.login("alice@x.io", "Passw0rd").await {
        Err(InternalError::Authentication(AuthFailure::AccountDeactivated(reason))) => {
            assert!(reason.contains("disputed contract"));
        }
        other => panic!("expected AccountDeactivated, got {:?}", other.err()),
    }

    principals.activate(&user.id, "admin-1").await.unwrap();
    env.auth.login("alice@x.io", "Passw0rd").await.unwrap();
}

#[tokio::test]
async fn deactivation_also_kills_refresh() {
    let env = env().await;
    let (user, _) = env.signup.signup(alice(), &env.auth).await.unwrap();
    let (_, pair) = env.auth.login("alice@x.io", "Passw0rd").await.unwrap();

    let principals = PrincipalStore::new(env.db.clone());
    principals
        .deactivate(&user.id, "disputed contract", "admin-1")
        .await
        .unwrap();

    assert!(matches!(
        env.auth.refresh(&pair.refresh_token).await,
        Err(InternalError::Authentication(AuthFailure::InvalidRefresh))
    ));
}

#[tokio::test]
async fn reset_queue_round_trip() {
    let env = env().await;
    let (user, _) = env.signup.signup(alice(), &env.auth).await.unwrap();

    env.auth.forgot_password("alice@x.io").await.unwrap();
    env.auth.forgot_password("nobody@x.io").await.unwrap();

    let notifications = NotificationStore::new(env.db.clone());
    assert_eq!(notifications.unread_count().await.unwrap(), 1);

    env.auth.admin_reset_password(&user.id, "admin-1").await.unwrap();
    env.auth.login("alice@x.io", "Default123").await.unwrap();

    // Request still unread; the completion record arrives pre-read
    assert_eq!(notifications.unread_count().await.unwrap(), 1);
    assert_eq!(notifications.list().await.unwrap().len(), 2);
}
