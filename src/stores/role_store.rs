use crate::errors::internal::{
    classify_unique_violation, DuplicateField, InternalError, ResourceKind,
};
use crate::services::navigation_map;
use crate::types::db::navigation_item::{self, Entity as NavigationItem};
use crate::types::db::permission::{self, Entity as Permission};
use crate::types::db::role::{self, Entity as Role};
use crate::types::db::role_assignment::{self, Entity as RoleAssignment};
use crate::types::db::role_navigation_item::{self, Entity as RoleNavigationItem};
use crate::types::db::role_permission::{self, Entity as RolePermission};
use crate::types::internal::permission::ObjectPermission;
use crate::types::internal::system_role::SystemRole;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Persists roles, their capability bindings, and principal assignments
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a custom role. A role whose case-insensitive name matches
    /// the admin pattern receives every cataloged permission and every
    /// active navigation item, in the same transaction. The rule fires on
    /// creation only.
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<role::Model, InternalError> {
        let txn = self.db.begin().await?;
        let now = Utc::now().timestamp();

        let new_role = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            is_system: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = new_role.insert(&txn).await.map_err(|e| {
            match classify_unique_violation(&e) {
                Some(_) => InternalError::Duplicate(DuplicateField::RoleName),
                None => InternalError::Database(e),
            }
        })?;

        if SystemRole::is_admin_name(name) {
            let all_perms = Permission::find().all(&txn).await?;
            for perm in all_perms {
                role_permission::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    role_id: Set(created.id.clone()),
                    app_label: Set(perm.app_label),
                    codename: Set(perm.codename),
                }
                .insert(&txn)
                .await?;
            }

            let active_items = NavigationItem::find()
                .filter(navigation_item::Column::IsActive.eq(true))
                .all(&txn)
                .await?;
            for item in active_items {
                role_navigation_item::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    role_id: Set(created.id.clone()),
                    navigation_item_id: Set(item.id),
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Look up a seeded well-known role row, creating it on first use
    pub async fn ensure_system_role_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        role: SystemRole,
    ) -> Result<role::Model, InternalError> {
        let name = role.canonical_name();
        if let Some(existing) = Role::find()
            .filter(role::Column::Name.eq(name))
            .one(conn)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now().timestamp();
        let created = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            description: Set(Some(role.default_description().to_string())),
            is_system: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await;

        match created {
            Ok(model) => Ok(model),
            // Lost a creation race; the row exists now
            Err(e) if classify_unique_violation(&e).is_some() => Role::find()
                .filter(role::Column::Name.eq(name))
                .one(conn)
                .await?
                .ok_or(InternalError::Database(e)),
            Err(e) => Err(InternalError::Database(e)),
        }
    }

    pub async fn ensure_system_role(&self, role: SystemRole) -> Result<role::Model, InternalError> {
        self.ensure_system_role_with(&self.db, role).await
    }

    pub async fn get_role(&self, role_id: &str) -> Result<role::Model, InternalError> {
        Role::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::Role))
    }

    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<role::Model>, InternalError> {
        // Apply the alias map first so "Property manager" lands on Manager
        let lookup = match SystemRole::from_name(name) {
            Some(system) => system.canonical_name().to_string(),
            None => name.to_string(),
        };
        Ok(Role::find()
            .filter(role::Column::Name.eq(lookup))
            .one(&self.db)
            .await?)
    }

    pub async fn list_roles(&self) -> Result<Vec<role::Model>, InternalError> {
        Ok(Role::find().order_by_asc(role::Column::Name).all(&self.db).await?)
    }

    /// Rename or re-describe a role. System roles keep their canonical
    /// name; only the description may change.
    pub async fn update_role(
        &self,
        role_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<role::Model, InternalError> {
        let existing = self.get_role(role_id).await?;
        if existing.is_system {
            if let Some(name) = name {
                if name != existing.name {
                    return Err(InternalError::Authorization(
                        crate::errors::internal::AuthzFailure::SuperuserRequired,
                    ));
                }
            }
        }
        let mut active: role::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name.to_string());
        }
        if let Some(description) = description {
            active.description = Set(Some(description.to_string()));
        }
        active.updated_at = Set(Utc::now().timestamp());
        active.update(&self.db).await.map_err(|e| {
            match classify_unique_violation(&e) {
                Some(_) => InternalError::Duplicate(DuplicateField::RoleName),
                None => InternalError::Database(e),
            }
        })
    }

    /// Delete a custom role; assignments and bindings cascade. System
    /// roles cannot be deleted.
    pub async fn delete_role(&self, role_id: &str) -> Result<(), InternalError> {
        let existing = self.get_role(role_id).await?;
        if existing.is_system {
            return Err(InternalError::Authorization(
                crate::errors::internal::AuthzFailure::SuperuserRequired,
            ));
        }
        Role::delete_by_id(role_id).exec(&self.db).await?;
        Ok(())
    }

    /// Replace the role's object-permission set
    pub async fn set_role_object_permissions(
        &self,
        role_id: &str,
        perms: &[ObjectPermission],
    ) -> Result<(), InternalError> {
        self.get_role(role_id).await?;
        let txn = self.db.begin().await?;

        RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;
        for perm in perms {
            role_permission::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                role_id: Set(role_id.to_string()),
                app_label: Set(perm.app_label.clone()),
                codename: Set(perm.codename.clone()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Replace the role's navigation-item set. Every item in the new set
    /// pulls its implied object permissions into the role; removal never
    /// revokes previously implied permissions.
    pub async fn set_role_navigation_items(
        &self,
        role_id: &str,
        item_names: &[String],
    ) -> Result<(), InternalError> {
        self.get_role(role_id).await?;
        let txn = self.db.begin().await?;

        let items = NavigationItem::find()
            .filter(navigation_item::Column::Name.is_in(item_names.iter().map(String::as_str)))
            .all(&txn)
            .await?;
        if items.len() != item_names.len() {
            return Err(InternalError::NotFound(ResourceKind::NavigationItem));
        }

        RoleNavigationItem::delete_many()
            .filter(role_navigation_item::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;
        for item in &items {
            role_navigation_item::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                role_id: Set(role_id.to_string()),
                navigation_item_id: Set(item.id.clone()),
            }
            .insert(&txn)
            .await?;
        }

        // Union the implied permissions into the role's permission set
        let held: Vec<role_permission::Model> = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .all(&txn)
            .await?;
        for item in &items {
            for (app_label, codename) in navigation_map::implied_permissions(&item.name) {
                let already = held
                    .iter()
                    .any(|p| p.app_label == *app_label && p.codename == *codename);
                if !already {
                    role_permission::ActiveModel {
                        id: Set(Uuid::new_v4().to_string()),
                        role_id: Set(role_id.to_string()),
                        app_label: Set(app_label.to_string()),
                        codename: Set(codename.to_string()),
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn role_object_permissions(
        &self,
        role_id: &str,
    ) -> Result<Vec<ObjectPermission>, InternalError> {
        let rows = RolePermission::find()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await?;
        let mut perms: Vec<ObjectPermission> = rows
            .into_iter()
            .map(|r| ObjectPermission::new(r.app_label, r.codename))
            .collect();
        perms.sort();
        perms.dedup();
        Ok(perms)
    }

    pub async fn role_navigation_items(
        &self,
        role_id: &str,
    ) -> Result<Vec<navigation_item::Model>, InternalError> {
        let bindings = RoleNavigationItem::find()
            .filter(role_navigation_item::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await?;
        let item_ids: Vec<String> = bindings.into_iter().map(|b| b.navigation_item_id).collect();
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(NavigationItem::find()
            .filter(navigation_item::Column::Id.is_in(item_ids))
            .order_by_asc(navigation_item::Column::ItemOrder)
            .all(&self.db)
            .await?)
    }

    /// Navigation items bound to any of the given roles, one query per
    /// table rather than one per role
    pub async fn navigation_items_for_roles(
        &self,
        role_ids: &[String],
    ) -> Result<Vec<navigation_item::Model>, InternalError> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let bindings = RoleNavigationItem::find()
            .filter(role_navigation_item::Column::RoleId.is_in(role_ids.to_vec()))
            .all(&self.db)
            .await?;
        let item_ids: Vec<String> = bindings.into_iter().map(|b| b.navigation_item_id).collect();
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(NavigationItem::find()
            .filter(navigation_item::Column::Id.is_in(item_ids))
            .all(&self.db)
            .await?)
    }

    /// Object permissions granted through any of the given roles
    pub async fn object_permissions_for_roles(
        &self,
        role_ids: &[String],
    ) -> Result<Vec<ObjectPermission>, InternalError> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = RolePermission::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids.to_vec()))
            .all(&self.db)
            .await?;
        let mut perms: Vec<ObjectPermission> = rows
            .into_iter()
            .map(|r| ObjectPermission::new(r.app_label, r.codename))
            .collect();
        perms.sort();
        perms.dedup();
        Ok(perms)
    }

    /// Idempotent role assignment with assigner provenance
    pub async fn assign_role(
        &self,
        user_id: &str,
        role_id: &str,
        assigned_by: Option<&str>,
    ) -> Result<(), InternalError> {
        self.assign_role_with(&self.db, user_id, role_id, assigned_by).await
    }

    pub async fn assign_role_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        role_id: &str,
        assigned_by: Option<&str>,
    ) -> Result<(), InternalError> {
        let existing = RoleAssignment::find()
            .filter(role_assignment::Column::UserId.eq(user_id))
            .filter(role_assignment::Column::RoleId.eq(role_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let inserted = role_assignment::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            role_id: Set(role_id.to_string()),
            assigned_at: Set(Utc::now().timestamp()),
            assigned_by: Set(assigned_by.map(str::to_string)),
        }
        .insert(conn)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            // Concurrent assignment of the same pair; already idempotent
            Err(e) if crate::errors::internal::is_unique_violation(&e) => Ok(()),
            Err(e) => Err(InternalError::Database(e)),
        }
    }

    /// Idempotent revocation
    pub async fn revoke_role(&self, user_id: &str, role_id: &str) -> Result<(), InternalError> {
        RoleAssignment::delete_many()
            .filter(role_assignment::Column::UserId.eq(user_id))
            .filter(role_assignment::Column::RoleId.eq(role_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn list_principal_roles(
        &self,
        user_id: &str,
    ) -> Result<Vec<role::Model>, InternalError> {
        let assignments = RoleAssignment::find()
            .filter(role_assignment::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        let role_ids: Vec<String> = assignments.into_iter().map(|a| a.role_id).collect();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Role::find()
            .filter(role::Column::Id.is_in(role_ids))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Whether the principal holds the given well-known role by assignment
    pub async fn has_system_role(
        &self,
        user_id: &str,
        role: SystemRole,
    ) -> Result<bool, InternalError> {
        let roles = self.list_principal_roles(user_id).await?;
        Ok(roles
            .iter()
            .any(|r| SystemRole::from_name(&r.name) == Some(role)))
    }

    /// The frozen permission catalog
    pub async fn all_permissions(&self) -> Result<Vec<ObjectPermission>, InternalError> {
        let rows = Permission::find().all(&self.db).await?;
        let mut perms: Vec<ObjectPermission> = rows
            .into_iter()
            .map(|r| ObjectPermission::new(r.app_label, r.codename))
            .collect();
        perms.sort();
        Ok(perms)
    }

    /// Seed the permission catalog; safe to run on every boot
    pub async fn seed_permission_catalog(&self) -> Result<(), InternalError> {
        let existing = Permission::find().all(&self.db).await?;
        for (app_label, codename) in navigation_map::PERMISSION_CATALOG {
            let present = existing
                .iter()
                .any(|p| p.app_label == *app_label && p.codename == *codename);
            if !present {
                permission::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    app_label: Set(app_label.to_string()),
                    codename: Set(codename.to_string()),
                }
                .insert(&self.db)
                .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::navigation_store::NavigationStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (RoleStore, NavigationStore, DatabaseConnection) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        let roles = RoleStore::new(db.clone());
        let nav = NavigationStore::new(db.clone());
        roles.seed_permission_catalog().await.unwrap();
        nav.seed_defaults().await.unwrap();
        (roles, nav, db)
    }

    #[tokio::test]
    async fn test_create_role_and_duplicate_name() {
        let (roles, _, _) = setup().await;
        roles.create_role("Caretaker", Some("on-site staff")).await.unwrap();

        match roles.create_role("Caretaker", None).await {
            Err(InternalError::Duplicate(DuplicateField::RoleName)) => {}
            other => panic!("expected Duplicate(RoleName), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_admin_named_role_gets_full_grant() {
        let (roles, _, _) = setup().await;
        let created = roles.create_role("Administrator", Some("all")).await.unwrap();

        let perms = roles.role_object_permissions(&created.id).await.unwrap();
        let all = roles.all_permissions().await.unwrap();
        assert_eq!(perms, all);
        assert!(perms
            .iter()
            .any(|p| p.app_label == "properties" && p.codename == "delete_property"));

        let items = roles.role_navigation_items(&created.id).await.unwrap();
        assert_eq!(items.len(), navigation_map::DEFAULT_NAVIGATION.len());
    }

    #[tokio::test]
    async fn test_plain_role_gets_no_grant() {
        let (roles, _, _) = setup().await;
        let created = roles.create_role("Caretaker", None).await.unwrap();
        assert!(roles.role_object_permissions(&created.id).await.unwrap().is_empty());
        assert!(roles.role_navigation_items(&created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_items_imply_permissions() {
        let (roles, _, _) = setup().await;
        let created = roles.create_role("Caretaker", None).await.unwrap();

        roles
            .set_role_navigation_items(&created.id, &["user_list".to_string()])
            .await
            .unwrap();

        let perms = roles.role_object_permissions(&created.id).await.unwrap();
        assert!(perms
            .iter()
            .any(|p| p.app_label == "accounts" && p.codename == "view_user"));

        // Removing the item keeps the implied permission
        roles.set_role_navigation_items(&created.id, &[]).await.unwrap();
        let perms = roles.role_object_permissions(&created.id).await.unwrap();
        assert!(perms
            .iter()
            .any(|p| p.app_label == "accounts" && p.codename == "view_user"));
        assert!(roles.role_navigation_items(&created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_navigation_items_rejects_unknown_names() {
        let (roles, _, _) = setup().await;
        let created = roles.create_role("Caretaker", None).await.unwrap();
        let result = roles
            .set_role_navigation_items(&created.id, &["no_such_item".to_string()])
            .await;
        assert!(matches!(result, Err(InternalError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_replace_set_semantics_for_permissions() {
        let (roles, _, _) = setup().await;
        let created = roles.create_role("Caretaker", None).await.unwrap();

        roles
            .set_role_object_permissions(
                &created.id,
                &[
                    ObjectPermission::new("payments", "view_payment"),
                    ObjectPermission::new("payments", "add_payment"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(roles.role_object_permissions(&created.id).await.unwrap().len(), 2);

        roles
            .set_role_object_permissions(
                &created.id,
                &[ObjectPermission::new("payments", "view_payment")],
            )
            .await
            .unwrap();
        let perms = roles.role_object_permissions(&created.id).await.unwrap();
        assert_eq!(perms.len(), 1);
        assert_eq!(perms[0].codename, "view_payment");
    }

    async fn make_user(db: &DatabaseConnection, username: &str) -> String {
        use crate::stores::principal_store::{NewPrincipal, PrincipalStore};
        let store = PrincipalStore::new(db.clone());
        let phone = format!("+2557{:08}", username.len() * 1_000_131 % 100_000_000);
        store
            .create_principal(NewPrincipal {
                username: username.to_string(),
                email: format!("{}@x.io", username),
                password_hash: "$argon2id$fake".to_string(),
                first_name: None,
                last_name: None,
                phone,
                role_hint: "tenant".to_string(),
                is_approved: true,
                approved_by: None,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_assign_revoke_round_trip_is_neutral() {
        let (roles, _, db) = setup().await;
        let user_id = make_user(&db, "pat").await;
        let role = roles.create_role("Caretaker", None).await.unwrap();

        let before = roles.list_principal_roles(&user_id).await.unwrap();
        roles.assign_role(&user_id, &role.id, None).await.unwrap();
        roles.revoke_role(&user_id, &role.id).await.unwrap();
        let after = roles.list_principal_roles(&user_id).await.unwrap();

        assert_eq!(
            before.iter().map(|r| &r.id).collect::<Vec<_>>(),
            after.iter().map(|r| &r.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_assign_role_is_idempotent() {
        let (roles, _, db) = setup().await;
        let user_id = make_user(&db, "quinn").await;
        let role = roles.create_role("Caretaker", None).await.unwrap();

        roles.assign_role(&user_id, &role.id, Some("admin-1")).await.unwrap();
        roles.assign_role(&user_id, &role.id, Some("admin-1")).await.unwrap();

        assert_eq!(roles.list_principal_roles(&user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_system_role_alias_lookup_and_delete_guard() {
        let (roles, _, _) = setup().await;
        let manager = roles.ensure_system_role(SystemRole::Manager).await.unwrap();

        let found = roles.find_role_by_name("Property manager").await.unwrap().unwrap();
        assert_eq!(found.id, manager.id);

        assert!(roles.delete_role(&manager.id).await.is_err());
    }

    #[tokio::test]
    async fn test_system_role_rename_rejected_description_allowed() {
        let (roles, _, _) = setup().await;
        let manager = roles.ensure_system_role(SystemRole::Manager).await.unwrap();

        let result = roles.update_role(&manager.id, Some("Janitor"), None).await;
        assert!(matches!(result, Err(InternalError::Authorization(_))));

        let updated = roles
            .update_role(&manager.id, None, Some("Runs day-to-day operations"))
            .await
            .unwrap();
        assert_eq!(updated.name, manager.name);
        assert_eq!(
            updated.description.as_deref(),
            Some("Runs day-to-day operations")
        );

        // the canonical alias still resolves after the failed rename
        assert!(roles.find_role_by_name("Property manager").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_has_system_role_respects_aliases() {
        let (roles, _, db) = setup().await;
        let user_id = make_user(&db, "rita").await;
        let owner_role = roles.ensure_system_role(SystemRole::PropertyOwner).await.unwrap();
        roles.assign_role(&user_id, &owner_role.id, None).await.unwrap();

        assert!(roles.has_system_role(&user_id, SystemRole::PropertyOwner).await.unwrap());
        assert!(!roles.has_system_role(&user_id, SystemRole::Manager).await.unwrap());
    }
}
