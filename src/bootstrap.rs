//! First-boot seeding: the permission catalog, the default navigation
//! tree, the well-known roles, and an optional superuser account from
//! the environment. All steps are idempotent and safe on every start.

use crate::app_data::AppData;
use crate::errors::internal::{DuplicateField, InternalError};
use crate::stores::credential_store;
use crate::stores::principal_store::NewPrincipal;
use crate::types::internal::system_role::SystemRole;
use std::env;
use tracing::{info, warn};

pub async fn seed(app: &AppData) -> Result<(), InternalError> {
    app.roles.seed_permission_catalog().await?;
    app.navigation.seed_defaults().await?;

    for role in [
        SystemRole::Admin,
        SystemRole::Manager,
        SystemRole::PropertyOwner,
        SystemRole::Tenant,
    ] {
        app.roles.ensure_system_role(role).await?;
    }

    seed_superuser(app).await?;
    Ok(())
}

/// Creates a superuser when BOOTSTRAP_ADMIN_{USERNAME,EMAIL,PASSWORD,
/// PHONE} are all present and the username is free
async fn seed_superuser(app: &AppData) -> Result<(), InternalError> {
    let vars: Vec<Option<String>> = [
        "BOOTSTRAP_ADMIN_USERNAME",
        "BOOTSTRAP_ADMIN_EMAIL",
        "BOOTSTRAP_ADMIN_PASSWORD",
        "BOOTSTRAP_ADMIN_PHONE",
    ]
    .iter()
    .map(|name| env::var(name).ok())
    .collect();

    let (Some(username), Some(email), Some(password), Some(phone)) =
        (&vars[0], &vars[1], &vars[2], &vars[3])
    else {
        return Ok(());
    };

    let password_hash = credential_store::hash_password(password).await?;
    let created = app
        .principals
        .create_principal(NewPrincipal {
            username: username.clone(),
            email: email.clone(),
            password_hash,
            first_name: None,
            last_name: None,
            phone: phone.clone(),
            role_hint: "tenant".to_string(),
            is_approved: true,
            approved_by: None,
            is_staff: true,
            is_superuser: true,
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = %user.id, "bootstrap superuser created");
            Ok(())
        }
        Err(InternalError::Duplicate(
            DuplicateField::Username | DuplicateField::Email | DuplicateField::Phone,
        )) => {
            // Already seeded on a previous boot
            Ok(())
        }
        Err(e) => {
            warn!("bootstrap superuser creation failed: {}", e);
            Err(e)
        }
    }
}
