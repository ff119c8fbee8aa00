//! Cross-store authorization flows: admin auto-grant, Manager scope,
//! and owner property visibility.

use migration::{Migrator, MigratorTrait};
use nyumba_auth::services::resolver::Resolver;
use nyumba_auth::services::signup_service::{SignupInput, SignupService};
use nyumba_auth::stores::navigation_store::NavigationStore;
use nyumba_auth::stores::principal_store::{NewPrincipal, PrincipalStore};
use nyumba_auth::stores::property_store::PropertyStore;
use nyumba_auth::stores::role_store::RoleStore;
use nyumba_auth::types::db::user;
use nyumba_auth::types::internal::system_role::SystemRole;
use sea_orm::{Database, DatabaseConnection};

struct Env {
    db: DatabaseConnection,
    principals: PrincipalStore,
    roles: RoleStore,
    resolver: Resolver,
}

async fn env() -> Env {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let roles = RoleStore::new(db.clone());
    roles.seed_permission_catalog().await.unwrap();
    NavigationStore::new(db.clone()).seed_defaults().await.unwrap();

    Env {
        principals: PrincipalStore::new(db.clone()),
        resolver: Resolver::new(db.clone()),
        roles,
        db,
    }
}

async fn make_user(env: &Env, username: &str, phone: &str, superuser: bool) -> user::Model {
    env.principals
        .create_principal(NewPrincipal {
            username: username.to_string(),
            email: format!("{}@x.io", username),
            password_hash: "$argon2id$fake".to_string(),
            first_name: None,
            last_name: None,
            phone: phone.to_string(),
            role_hint: "tenant".to_string(),
            is_approved: true,
            approved_by: None,
            is_staff: superuser,
            is_superuser: superuser,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn administrator_role_carries_everything_at_creation() {
    let env = env().await;

    let admin_role = env.roles.create_role("Administrator", Some("all")).await.unwrap();
    let all = env.roles.all_permissions().await.unwrap();
    let granted = env.roles.role_object_permissions(&admin_role.id).await.unwrap();
    assert_eq!(granted, all);

    // A fresh non-superuser principal holding it passes both checks
    let user = make_user(&env, "delegate", "+255712000001", false).await;
    env.roles.assign_role(&user.id, &admin_role.id, None).await.unwrap();

    assert!(env.resolver.may(&user, "user_list").await.unwrap());
    assert!(env
        .resolver
        .may_obj(&user, "properties", "delete_property")
        .await
        .unwrap());
}

#[tokio::test]
async fn navigation_grant_implies_object_permission() {
    let env = env().await;
    let role = env.roles.create_role("Desk", None).await.unwrap();
    env.roles
        .set_role_navigation_items(
            &role.id,
            &["payment_list".to_string(), "complaint_list".to_string()],
        )
        .await
        .unwrap();

    let perms = env.roles.role_object_permissions(&role.id).await.unwrap();
    assert!(perms
        .iter()
        .any(|p| p.app_label == "payments" && p.codename == "view_payment"));
    assert!(perms
        .iter()
        .any(|p| p.app_label == "complaints" && p.codename == "view_complaint"));
}

#[tokio::test]
async fn manager_sees_only_provisioned_users() {
    let env = env().await;
    let signup = SignupService::new(env.db.clone());

    let manager = make_user(&env, "mgr", "+255712000002", false).await;
    let manager_role = env.roles.ensure_system_role(SystemRole::Manager).await.unwrap();
    env.roles.assign_role(&manager.id, &manager_role.id, None).await.unwrap();

    let admin = make_user(&env, "root", "+255712000003", true).await;

    // Owner O created by the manager, O' by the other admin
    signup
        .register_owner(
            SignupInput {
                username: "owner_o".to_string(),
                email: "owner_o@x.io".to_string(),
                password: "Passw0rd".to_string(),
                confirm_password: "Passw0rd".to_string(),
                first_name: None,
                last_name: None,
                phone: "+255712000004".to_string(),
                role_hint: "owner".to_string(),
            },
            &manager.id,
        )
        .await
        .unwrap();
    signup
        .register_owner(
            SignupInput {
                username: "owner_p".to_string(),
                email: "owner_p@x.io".to_string(),
                password: "Passw0rd".to_string(),
                confirm_password: "Passw0rd".to_string(),
                first_name: None,
                last_name: None,
                phone: "+255712000005".to_string(),
                role_hint: "owner".to_string(),
            },
            &admin.id,
        )
        .await
        .unwrap();

    let scope = env.resolver.user_row_filter(&manager).await.unwrap().unwrap();
    let visible = env.principals.search("", Some(scope)).await.unwrap();
    let names: Vec<&str> = visible.iter().map(|u| u.username.as_str()).collect();
    assert!(names.contains(&"owner_o"));
    assert!(!names.contains(&"owner_p"));

    // The admin is unscoped and sees both
    assert!(env.resolver.user_row_filter(&admin).await.unwrap().is_none());
}

#[tokio::test]
async fn tenant_sees_only_active_approved_properties() {
    let env = env().await;
    let properties = PropertyStore::new(env.db.clone());

    let owner = make_user(&env, "owner_q", "+255712000006", false).await;
    let owner_role = env.roles.ensure_system_role(SystemRole::PropertyOwner).await.unwrap();
    env.roles.assign_role(&owner.id, &owner_role.id, None).await.unwrap();

    let tenant = make_user(&env, "tenant_q", "+255712000007", false).await;

    properties
        .add_property(&owner.id, "lodge", "Public Lodge", true, true)
        .await
        .unwrap();
    properties
        .add_property(&owner.id, "lodge", "Hidden Lodge", true, false)
        .await
        .unwrap();
    properties
        .add_property(&owner.id, "lodge", "Closed Lodge", false, true)
        .await
        .unwrap();

    let filter = env.resolver.property_row_filter(&tenant).await.unwrap();
    let visible = properties.list_visible(filter).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Public Lodge");

    // The owner sees all three of their rows
    let filter = env.resolver.property_row_filter(&owner).await.unwrap();
    assert_eq!(properties.list_visible(filter).await.unwrap().len(), 3);
}

#[tokio::test]
async fn owner_management_caps_follow_portfolio() {
    let env = env().await;
    let properties = PropertyStore::new(env.db.clone());

    let owner = make_user(&env, "owner_r", "+255712000008", false).await;
    let owner_role = env.roles.ensure_system_role(SystemRole::PropertyOwner).await.unwrap();
    env.roles.assign_role(&owner.id, &owner_role.id, None).await.unwrap();

    assert!(!env.resolver.may(&owner, "manage_properties").await.unwrap());

    properties
        .add_property(&owner.id, "venue", "Garden Venue", true, true)
        .await
        .unwrap();

    assert!(env.resolver.may(&owner, "manage_properties").await.unwrap());
    assert!(env.resolver.may(&owner, "venue_management").await.unwrap());
    assert!(!env.resolver.may(&owner, "hotel_management").await.unwrap());
}
