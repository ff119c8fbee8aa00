use std::env;

/// Runtime configuration, read once at startup from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,

    /// Symmetric secret for signing access tokens
    pub jwt_secret: String,

    /// Keyed-hash secret for refresh tokens at rest
    pub refresh_token_secret: String,

    /// Clamped to at most 60 by the token service
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,

    /// Password an admin-driven reset assigns
    pub default_reset_password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

fn required(name: &'static str) -> Result<String, SettingsError> {
    env::var(name).map_err(|_| SettingsError::MissingVariable(name))
}

fn parsed_or(name: &'static str, default: i64) -> Result<i64, SettingsError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| SettingsError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://nyumba.db?mode=rwc".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
            access_ttl_minutes: parsed_or("ACCESS_TOKEN_TTL_MINUTES", 15)?,
            refresh_ttl_days: parsed_or("REFRESH_TOKEN_TTL_DAYS", 30)?,
            default_reset_password: env::var("DEFAULT_RESET_PASSWORD")
                .unwrap_or_else(|_| "Chang3Me!".to_string()),
        })
    }
}
