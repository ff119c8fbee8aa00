use std::fmt;

/// Well-known roles with fixed semantics. Superuser and Staff derive from
/// principal flags; the remaining four are seeded role rows that may also
/// be referenced by legacy aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemRole {
    Superuser,
    Staff,
    Admin,
    Manager,
    PropertyOwner,
    Tenant,
}

impl SystemRole {
    /// Canonical role-row name
    pub fn canonical_name(&self) -> &'static str {
        match self {
            SystemRole::Superuser => "Superuser",
            SystemRole::Staff => "Staff",
            SystemRole::Admin => "Admin",
            SystemRole::Manager => "Manager",
            SystemRole::PropertyOwner => "PropertyOwner",
            SystemRole::Tenant => "Tenant",
        }
    }

    /// Resolve a stored or user-supplied role name, applying the legacy
    /// alias map once at the persistence boundary.
    pub fn from_name(name: &str) -> Option<SystemRole> {
        match name.trim().to_lowercase().as_str() {
            "superuser" => Some(SystemRole::Superuser),
            "staff" => Some(SystemRole::Staff),
            "admin" | "administrator" | "system administrator" => Some(SystemRole::Admin),
            "manager" | "property manager" => Some(SystemRole::Manager),
            "propertyowner" | "property owner" | "owner" => Some(SystemRole::PropertyOwner),
            "tenant" => Some(SystemRole::Tenant),
            _ => None,
        }
    }

    /// Role names that trigger the full-grant rule at creation time
    pub fn is_admin_name(name: &str) -> bool {
        matches!(
            name.trim().to_lowercase().as_str(),
            "admin" | "administrator" | "system administrator"
        )
    }

    /// Default description for auto-created role rows
    pub fn default_description(&self) -> &'static str {
        match self {
            SystemRole::Superuser => "Full system access",
            SystemRole::Staff => "Admin-surface access",
            SystemRole::Admin => "Administrative access",
            SystemRole::Manager => "Manages users they provisioned",
            SystemRole::PropertyOwner => "Lists and manages own properties",
            SystemRole::Tenant => "Browses and books properties",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// The coarse self-declared type captured at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHint {
    Tenant,
    Owner,
}

impl RoleHint {
    pub fn parse(value: &str) -> Option<RoleHint> {
        match value.trim().to_lowercase().as_str() {
            "tenant" => Some(RoleHint::Tenant),
            "owner" => Some(RoleHint::Owner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleHint::Tenant => "tenant",
            RoleHint::Owner => "owner",
        }
    }

    /// The role row a signup with this hint is assigned
    pub fn target_role(&self) -> SystemRole {
        match self {
            RoleHint::Tenant => SystemRole::Tenant,
            RoleHint::Owner => SystemRole::PropertyOwner,
        }
    }
}
