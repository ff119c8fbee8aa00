use std::fmt;

/// Typed `(app_label, codename)` pair. The dotted string form exists only
/// at the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPermission {
    pub app_label: String,
    pub codename: String,
}

impl ObjectPermission {
    pub fn new(app_label: impl Into<String>, codename: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            codename: codename.into(),
        }
    }

    /// Parse the wire form "app_label.codename"
    pub fn parse(value: &str) -> Option<ObjectPermission> {
        let (app_label, codename) = value.split_once('.')?;
        if app_label.is_empty() || codename.is_empty() {
            return None;
        }
        Some(ObjectPermission::new(app_label, codename))
    }
}

impl fmt::Display for ObjectPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.codename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_form() {
        let perm = ObjectPermission::parse("properties.view_property").unwrap();
        assert_eq!(perm.app_label, "properties");
        assert_eq!(perm.codename, "view_property");
        assert_eq!(perm.to_string(), "properties.view_property");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ObjectPermission::parse("no_dot").is_none());
        assert!(ObjectPermission::parse(".codename").is_none());
        assert!(ObjectPermission::parse("app.").is_none());
    }
}
