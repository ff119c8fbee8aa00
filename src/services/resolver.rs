//! Authorization resolver: answers what a principal may see and do, as a
//! pure function of store state. Never raises on a missing capability;
//! callers translate a `false` into a denial at the HTTP edge.

use crate::errors::internal::InternalError;
use crate::services::navigation_map;
use crate::stores::navigation_store::NavigationStore;
use crate::stores::principal_store::PrincipalStore;
use crate::stores::property_store::PropertyStore;
use crate::stores::role_store::RoleStore;
use crate::types::db::property;
use crate::types::db::role_assignment::{self, Entity as RoleAssignment};
use crate::types::db::user;
use crate::types::internal::permission::ObjectPermission;
use crate::types::internal::system_role::SystemRole;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashSet;

pub struct Resolver {
    db: DatabaseConnection,
    principals: PrincipalStore,
    roles: RoleStore,
    navigation: NavigationStore,
    properties: PropertyStore,
}

impl Resolver {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            principals: PrincipalStore::new(db.clone()),
            roles: RoleStore::new(db.clone()),
            navigation: NavigationStore::new(db.clone()),
            properties: PropertyStore::new(db.clone()),
            db,
        }
    }

    /// The navigation item names the principal may see
    pub async fn nav_caps(&self, principal: &user::Model) -> Result<HashSet<String>, InternalError> {
        if principal.is_superuser {
            return Ok(self
                .navigation
                .list_active()
                .await?
                .into_iter()
                .map(|item| item.name)
                .collect());
        }

        let role_ids: Vec<String> = self
            .roles
            .list_principal_roles(&principal.id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut caps: HashSet<String> = self
            .roles
            .navigation_items_for_roles(&role_ids)
            .await?
            .into_iter()
            .filter(|item| item.is_active)
            .map(|item| item.name)
            .collect();

        if self.holds_owner_role(principal).await? {
            let kinds = self.properties.owned_kinds(&principal.id).await?;
            if !kinds.is_empty() {
                caps.insert(navigation_map::MANAGE_PROPERTIES.to_string());
            }
            for kind in &kinds {
                if let Some((_, item)) = navigation_map::KIND_MANAGEMENT_ITEMS
                    .iter()
                    .find(|(k, _)| k == kind)
                {
                    caps.insert(item.to_string());
                }
            }
        }

        Ok(caps)
    }

    /// The `(app_label, codename)` pairs the principal holds
    pub async fn obj_perms(
        &self,
        principal: &user::Model,
    ) -> Result<HashSet<ObjectPermission>, InternalError> {
        if principal.is_superuser {
            return Ok(self.roles.all_permissions().await?.into_iter().collect());
        }

        let role_ids: Vec<String> = self
            .roles
            .list_principal_roles(&principal.id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        Ok(self
            .roles
            .object_permissions_for_roles(&role_ids)
            .await?
            .into_iter()
            .collect())
    }

    pub async fn may(&self, principal: &user::Model, nav_name: &str) -> Result<bool, InternalError> {
        Ok(self.nav_caps(principal).await?.contains(nav_name))
    }

    pub async fn may_obj(
        &self,
        principal: &user::Model,
        app_label: &str,
        codename: &str,
    ) -> Result<bool, InternalError> {
        if principal.is_superuser {
            return Ok(true);
        }
        Ok(self
            .obj_perms(principal)
            .await?
            .contains(&ObjectPermission::new(app_label, codename)))
    }

    /// Visibility predicate over property rows. `None` means no filter.
    pub async fn property_row_filter(
        &self,
        principal: &user::Model,
    ) -> Result<Option<Condition>, InternalError> {
        if principal.is_staff || principal.is_superuser {
            return Ok(None);
        }
        if self.holds_owner_role(principal).await? {
            // Owners see their own rows, approved or not
            return Ok(Some(
                Condition::all().add(property::Column::OwnerId.eq(principal.id.clone())),
            ));
        }
        Ok(Some(
            Condition::all()
                .add(property::Column::IsActive.eq(true))
                .add(property::Column::IsApproved.eq(true)),
        ))
    }

    /// Visibility predicate over user rows. Managers see only principals
    /// they provisioned (assigned a role to, or approved); everyone else
    /// is unscoped here and gated by object permissions instead.
    pub async fn user_row_filter(
        &self,
        principal: &user::Model,
    ) -> Result<Option<Condition>, InternalError> {
        if principal.is_staff || principal.is_superuser {
            return Ok(None);
        }
        if !self.roles.has_system_role(&principal.id, SystemRole::Manager).await? {
            return Ok(None);
        }

        let provisioned = RoleAssignment::find()
            .filter(role_assignment::Column::AssignedBy.eq(principal.id.clone()))
            .all(&self.db)
            .await?;
        let user_ids: Vec<String> = provisioned.into_iter().map(|a| a.user_id).collect();

        let approved = self.principals.approved_by_ids(&principal.id).await?;

        let mut visible: HashSet<String> = user_ids.into_iter().collect();
        visible.extend(approved);

        Ok(Some(Condition::all().add(
            user::Column::Id.is_in(visible.into_iter().collect::<Vec<_>>()),
        )))
    }

    /// PropertyOwner by role assignment or by profile hint
    async fn holds_owner_role(&self, principal: &user::Model) -> Result<bool, InternalError> {
        if self
            .roles
            .has_system_role(&principal.id, SystemRole::PropertyOwner)
            .await?
        {
            return Ok(true);
        }
        let profile = self.principals.get_profile(&principal.id).await?;
        Ok(profile.role_hint == "owner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::principal_store::NewPrincipal;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    struct Fixture {
        db: DatabaseConnection,
        resolver: Resolver,
        roles: RoleStore,
        principals: PrincipalStore,
        properties: PropertyStore,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let roles = RoleStore::new(db.clone());
        let nav = NavigationStore::new(db.clone());
        roles.seed_permission_catalog().await.unwrap();
        nav.seed_defaults().await.unwrap();

        Fixture {
            resolver: Resolver::new(db.clone()),
            roles,
            principals: PrincipalStore::new(db.clone()),
            properties: PropertyStore::new(db.clone()),
            db,
        }
    }

    async fn make_user(f: &Fixture, username: &str, role_hint: &str, superuser: bool) -> user::Model {
        let phone = format!("+25571{:07}", username.as_bytes().iter().map(|b| *b as u32).sum::<u32>());
        f.principals
            .create_principal(NewPrincipal {
                username: username.to_string(),
                email: format!("{}@x.io", username),
                password_hash: "$argon2id$fake".to_string(),
                first_name: None,
                last_name: None,
                phone,
                role_hint: role_hint.to_string(),
                is_approved: true,
                approved_by: None,
                is_staff: superuser,
                is_superuser: superuser,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_superuser_sees_everything() {
        let f = setup().await;
        let root = make_user(&f, "root", "tenant", true).await;

        let caps = f.resolver.nav_caps(&root).await.unwrap();
        assert_eq!(caps.len(), navigation_map::DEFAULT_NAVIGATION.len());

        assert!(f.resolver.may_obj(&root, "payments", "delete_payment").await.unwrap());
        assert!(f.resolver.property_row_filter(&root).await.unwrap().is_none());
        assert!(f.resolver.user_row_filter(&root).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_union_drives_caps_and_perms() {
        let f = setup().await;
        let user = make_user(&f, "staff_1", "tenant", false).await;

        let a = f.roles.create_role("Desk", None).await.unwrap();
        let b = f.roles.create_role("Accounts", None).await.unwrap();
        f.roles
            .set_role_navigation_items(&a.id, &["user_list".to_string()])
            .await
            .unwrap();
        f.roles
            .set_role_navigation_items(&b.id, &["payment_list".to_string()])
            .await
            .unwrap();
        f.roles.assign_role(&user.id, &a.id, None).await.unwrap();
        f.roles.assign_role(&user.id, &b.id, None).await.unwrap();

        let caps = f.resolver.nav_caps(&user).await.unwrap();
        assert!(caps.contains("user_list"));
        assert!(caps.contains("payment_list"));
        assert!(!caps.contains("complaint_list"));

        assert!(f.resolver.may_obj(&user, "accounts", "view_user").await.unwrap());
        assert!(f.resolver.may_obj(&user, "payments", "view_payment").await.unwrap());
        assert!(!f.resolver.may_obj(&user, "payments", "delete_payment").await.unwrap());
    }

    #[tokio::test]
    async fn test_owner_auto_grant_follows_owned_kinds() {
        let f = setup().await;
        let owner = make_user(&f, "owner_1", "owner", false).await;

        // No properties yet: no management items
        let caps = f.resolver.nav_caps(&owner).await.unwrap();
        assert!(!caps.contains("manage_properties"));

        f.properties
            .add_property(&owner.id, "hotel", "Hotel A", true, true)
            .await
            .unwrap();

        let caps = f.resolver.nav_caps(&owner).await.unwrap();
        assert!(caps.contains("manage_properties"));
        assert!(caps.contains("hotel_management"));
        assert!(!caps.contains("lodge_management"));
    }

    #[tokio::test]
    async fn test_owner_sees_own_unapproved_rows() {
        let f = setup().await;
        let owner = make_user(&f, "owner_2", "owner", false).await;
        let tenant = make_user(&f, "tenant_2", "tenant", false).await;

        f.properties
            .add_property(&owner.id, "house", "Draft House", true, false)
            .await
            .unwrap();

        let owner_filter = f.resolver.property_row_filter(&owner).await.unwrap();
        let visible = f.properties.list_visible(owner_filter).await.unwrap();
        assert_eq!(visible.len(), 1);

        let tenant_filter = f.resolver.property_row_filter(&tenant).await.unwrap();
        let visible = f.properties.list_visible(tenant_filter).await.unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_manager_provenance_scopes_user_rows() {
        let f = setup().await;
        let manager = make_user(&f, "mgr", "tenant", false).await;
        let theirs = make_user(&f, "theirs", "tenant", false).await;
        let other = make_user(&f, "other", "tenant", false).await;

        let manager_role = f.roles.ensure_system_role(SystemRole::Manager).await.unwrap();
        let tenant_role = f.roles.ensure_system_role(SystemRole::Tenant).await.unwrap();
        f.roles.assign_role(&manager.id, &manager_role.id, None).await.unwrap();
        f.roles
            .assign_role(&theirs.id, &tenant_role.id, Some(&manager.id))
            .await
            .unwrap();
        f.roles.assign_role(&other.id, &tenant_role.id, None).await.unwrap();

        let filter = f.resolver.user_row_filter(&manager).await.unwrap().unwrap();
        let visible = f.principals.search("", Some(filter)).await.unwrap();
        let names: Vec<&str> = visible.iter().map(|u| u.username.as_str()).collect();
        assert!(names.contains(&"theirs"));
        assert!(!names.contains(&"other"));
        assert!(!names.contains(&"mgr"));
    }

    #[tokio::test]
    async fn test_manager_sees_users_they_approved() {
        let f = setup().await;
        let manager = make_user(&f, "mgr2", "tenant", false).await;
        let manager_role = f.roles.ensure_system_role(SystemRole::Manager).await.unwrap();
        f.roles.assign_role(&manager.id, &manager_role.id, None).await.unwrap();

        let pending = f
            .principals
            .create_principal(NewPrincipal {
                username: "newbie".to_string(),
                email: "newbie@x.io".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                first_name: None,
                last_name: None,
                phone: "+255787000111".to_string(),
                role_hint: "tenant".to_string(),
                is_approved: false,
                approved_by: None,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        f.principals.approve(&pending.id, &manager.id).await.unwrap();

        let filter = f.resolver.user_row_filter(&manager).await.unwrap().unwrap();
        let visible = f.principals.search("", Some(filter)).await.unwrap();
        assert!(visible.iter().any(|u| u.username == "newbie"));
    }

    #[tokio::test]
    async fn test_missing_capability_returns_false_not_error() {
        let f = setup().await;
        let user = make_user(&f, "plain", "tenant", false).await;
        assert!(!f.resolver.may(&user, "user_list").await.unwrap());
        assert!(!f.resolver.may_obj(&user, "accounts", "view_user").await.unwrap());

        let _ = f.db; // fixture keeps the pool alive for the duration
    }
}
