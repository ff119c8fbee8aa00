use crate::config::Settings;
use crate::services::auth_service::AuthService;
use crate::services::resolver::Resolver;
use crate::services::signup_service::SignupService;
use crate::services::throttle::Throttle;
use crate::services::token_service::TokenService;
use crate::stores::credential_store::CredentialStore;
use crate::stores::navigation_store::NavigationStore;
use crate::stores::notification_store::NotificationStore;
use crate::stores::principal_store::PrincipalStore;
use crate::stores::property_store::PropertyStore;
use crate::stores::role_store::RoleStore;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Main-owned shared state. Everything is created once at startup and
/// handed to the API structs as Arcs.
pub struct AppData {
    pub db: DatabaseConnection,
    pub principals: Arc<PrincipalStore>,
    pub roles: Arc<RoleStore>,
    pub navigation: Arc<NavigationStore>,
    pub credentials: Arc<CredentialStore>,
    pub notifications: Arc<NotificationStore>,
    pub properties: Arc<PropertyStore>,
    pub resolver: Arc<Resolver>,
    pub auth: Arc<AuthService>,
    pub signup: Arc<SignupService>,
    pub auth_throttle: Arc<Throttle>,
    pub search_throttle: Arc<Throttle>,
}

impl AppData {
    pub fn init(db: DatabaseConnection, settings: &Settings) -> Arc<Self> {
        let tokens = TokenService::new(
            settings.jwt_secret.as_str(),
            settings.refresh_token_secret.as_str(),
            settings.access_ttl_minutes,
            settings.refresh_ttl_days,
        );

        Arc::new(Self {
            principals: Arc::new(PrincipalStore::new(db.clone())),
            roles: Arc::new(RoleStore::new(db.clone())),
            navigation: Arc::new(NavigationStore::new(db.clone())),
            credentials: Arc::new(CredentialStore::new(db.clone())),
            notifications: Arc::new(NotificationStore::new(db.clone())),
            properties: Arc::new(PropertyStore::new(db.clone())),
            resolver: Arc::new(Resolver::new(db.clone())),
            auth: Arc::new(AuthService::new(
                db.clone(),
                tokens,
                settings.default_reset_password.clone(),
            )),
            signup: Arc::new(SignupService::new(db.clone())),
            auth_throttle: Arc::new(Throttle::per_minute_auth()),
            search_throttle: Arc::new(Throttle::per_minute_search()),
            db,
        })
    }
}
