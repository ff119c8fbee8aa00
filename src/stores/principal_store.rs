use crate::errors::internal::{
    classify_unique_violation, DuplicateField, InternalError, ResourceKind,
};
use crate::services::phone;
use crate::types::db::profile::{self, Entity as Profile};
use crate::types::db::user::{self, Entity as User};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

/// Input for an atomic principal + profile creation
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,
    pub role_hint: String,
    pub is_approved: bool,
    pub approved_by: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Persists users and their 1:1 profiles
pub struct PrincipalStore {
    db: DatabaseConnection,
}

impl PrincipalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a principal and its profile in one transaction. Unique
    /// constraint violations come back as typed duplicate errors.
    pub async fn create_principal(&self, new: NewPrincipal) -> Result<user::Model, InternalError> {
        let txn = self.db.begin().await?;
        let created = self.create_principal_with(&txn, new).await?;
        txn.commit().await?;
        Ok(created)
    }

    /// Same as `create_principal` but joins the caller's transaction, so
    /// signup can bundle the role assignment into the same commit.
    pub async fn create_principal_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        new: NewPrincipal,
    ) -> Result<user::Model, InternalError> {
        let now = Utc::now().timestamp();
        let user_id = Uuid::new_v4().to_string();

        let approved_at = new.is_approved.then_some(now);
        let new_user = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(new.username),
            email_normalized: Set(new.email.to_lowercase()),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            is_active: Set(true),
            is_staff: Set(new.is_staff),
            is_superuser: Set(new.is_superuser),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = new_user.insert(conn).await.map_err(|e| {
            match classify_unique_violation(&e) {
                Some(field) => InternalError::Duplicate(field),
                None => InternalError::Database(e),
            }
        })?;

        let new_profile = profile::ActiveModel {
            user_id: Set(user_id),
            phone: Set(new.phone),
            role_hint: Set(new.role_hint),
            is_approved: Set(new.is_approved),
            approved_at: Set(approved_at),
            approved_by: Set(new.approved_by),
            is_deactivated: Set(false),
            deactivation_reason: Set(None),
            deactivated_at: Set(None),
            deactivated_by: Set(None),
        };

        new_profile.insert(conn).await.map_err(|e| {
            match classify_unique_violation(&e) {
                Some(field) => InternalError::Duplicate(field),
                None => InternalError::Database(e),
            }
        })?;

        Ok(created)
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<user::Model>, InternalError> {
        Ok(User::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn get_by_id(&self, user_id: &str) -> Result<user::Model, InternalError> {
        self.find_by_id(user_id)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::Principal))
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        Ok(User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Case-insensitive email lookup via the normalized column
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, InternalError> {
        Ok(User::find()
            .filter(user::Column::EmailNormalized.eq(email.to_lowercase()))
            .one(&self.db)
            .await?)
    }

    /// Phone lookup: exact form first, then with the `+` prefix toggled
    pub async fn find_by_phone(&self, raw_phone: &str) -> Result<Option<user::Model>, InternalError> {
        for form in phone::lookup_forms(raw_phone) {
            let found = Profile::find()
                .filter(profile::Column::Phone.eq(&form))
                .one(&self.db)
                .await?;
            if let Some(profile_row) = found {
                return self.find_by_id(&profile_row.user_id).await;
            }
        }
        Ok(None)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<profile::Model, InternalError> {
        Profile::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::Principal))
    }

    /// Partial update across user and profile; a phone change revalidates
    /// uniqueness through the constraint.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<(), InternalError> {
        let txn = self.db.begin().await?;

        let user_row = User::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::Principal))?;

        if update.first_name.is_some() || update.last_name.is_some() {
            let mut active: user::ActiveModel = user_row.into();
            if let Some(first_name) = update.first_name {
                active.first_name = Set(Some(first_name));
            }
            if let Some(last_name) = update.last_name {
                active.last_name = Set(Some(last_name));
            }
            active.updated_at = Set(Utc::now().timestamp());
            active.update(&txn).await?;
        }

        if let Some(new_phone) = update.phone {
            let profile_row = Profile::find_by_id(user_id)
                .one(&txn)
                .await?
                .ok_or(InternalError::NotFound(ResourceKind::Principal))?;
            let mut active: profile::ActiveModel = profile_row.into();
            active.phone = Set(new_phone);
            active.update(&txn).await.map_err(|e| {
                match classify_unique_violation(&e) {
                    Some(_) => InternalError::Duplicate(DuplicateField::Phone),
                    None => InternalError::Database(e),
                }
            })?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: String,
    ) -> Result<(), InternalError> {
        let user_row = self.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user_row.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now().timestamp());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Admin approval: flips is_approved and stamps provenance
    pub async fn approve(&self, user_id: &str, by: &str) -> Result<(), InternalError> {
        let profile_row = self.get_profile(user_id).await?;
        let mut active: profile::ActiveModel = profile_row.into();
        active.is_approved = Set(true);
        active.approved_at = Set(Some(Utc::now().timestamp()));
        active.approved_by = Set(Some(by.to_string()));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Admin rejection hard-deletes the principal; profile and role
    /// assignments go with it via cascade.
    pub async fn reject(&self, user_id: &str) -> Result<(), InternalError> {
        let result = User::delete_by_id(user_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(InternalError::NotFound(ResourceKind::Principal));
        }
        Ok(())
    }

    pub async fn deactivate(
        &self,
        user_id: &str,
        reason: &str,
        by: &str,
    ) -> Result<(), InternalError> {
        let profile_row = self.get_profile(user_id).await?;
        let mut active: profile::ActiveModel = profile_row.into();
        active.is_deactivated = Set(true);
        active.deactivation_reason = Set(Some(reason.to_string()));
        active.deactivated_at = Set(Some(Utc::now().timestamp()));
        active.deactivated_by = Set(Some(by.to_string()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn activate(&self, user_id: &str, _by: &str) -> Result<(), InternalError> {
        let profile_row = self.get_profile(user_id).await?;
        let mut active: profile::ActiveModel = profile_row.into();
        active.is_deactivated = Set(false);
        active.deactivation_reason = Set(None);
        active.deactivated_at = Set(None);
        active.deactivated_by = Set(None);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Toggle the is_active flag (admin soft-disable)
    pub async fn toggle_active(&self, user_id: &str) -> Result<bool, InternalError> {
        let user_row = self.get_by_id(user_id).await?;
        let next = !user_row.is_active;
        let mut active: user::ActiveModel = user_row.into();
        active.is_active = Set(next);
        active.updated_at = Set(Utc::now().timestamp());
        active.update(&self.db).await?;
        Ok(next)
    }

    /// Toggle the approval flag; approving stamps provenance, revoking
    /// clears it
    pub async fn toggle_approval(&self, user_id: &str, by: &str) -> Result<bool, InternalError> {
        let profile_row = self.get_profile(user_id).await?;
        let next = !profile_row.is_approved;
        let mut active: profile::ActiveModel = profile_row.into();
        active.is_approved = Set(next);
        if next {
            active.approved_at = Set(Some(Utc::now().timestamp()));
            active.approved_by = Set(Some(by.to_string()));
        } else {
            active.approved_at = Set(None);
            active.approved_by = Set(None);
        }
        active.update(&self.db).await?;
        Ok(next)
    }

    /// Users whose profiles await approval, oldest first
    pub async fn list_pending(&self) -> Result<Vec<(user::Model, profile::Model)>, InternalError> {
        let pending = Profile::find()
            .filter(profile::Column::IsApproved.eq(false))
            .all(&self.db)
            .await?;
        let mut out = Vec::with_capacity(pending.len());
        for profile_row in pending {
            if let Some(user_row) = self.find_by_id(&profile_row.user_id).await? {
                out.push((user_row, profile_row));
            }
        }
        out.sort_by_key(|(u, _)| u.created_at);
        Ok(out)
    }

    /// Principals with the owner role hint, paired with their profiles
    pub async fn list_owners(&self) -> Result<Vec<(user::Model, profile::Model)>, InternalError> {
        let owners = Profile::find()
            .filter(profile::Column::RoleHint.eq("owner"))
            .all(&self.db)
            .await?;
        let mut out = Vec::with_capacity(owners.len());
        for profile_row in owners {
            if let Some(user_row) = self.find_by_id(&profile_row.user_id).await? {
                out.push((user_row, profile_row));
            }
        }
        out.sort_by_key(|(u, _)| u.created_at);
        Ok(out)
    }

    /// Ids of principals this admin approved
    pub async fn approved_by_ids(&self, admin_id: &str) -> Result<Vec<String>, InternalError> {
        let rows = Profile::find()
            .filter(profile::Column::ApprovedBy.eq(admin_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|p| p.user_id).collect())
    }

    /// Search users by username/email/name fragment, optionally narrowed
    /// by a resolver-supplied visibility condition (Manager scope).
    pub async fn search(
        &self,
        query: &str,
        scope: Option<Condition>,
    ) -> Result<Vec<user::Model>, InternalError> {
        let pattern = format!("%{}%", query);
        let mut select = User::find().filter(
            Condition::any()
                .add(user::Column::Username.like(&pattern))
                .add(user::Column::EmailNormalized.like(pattern.to_lowercase()))
                .add(user::Column::FirstName.like(&pattern))
                .add(user::Column::LastName.like(&pattern)),
        );
        if let Some(scope) = scope {
            select = select.filter(scope);
        }
        Ok(select.order_by_asc(user::Column::Username).all(&self.db).await?)
    }
}
