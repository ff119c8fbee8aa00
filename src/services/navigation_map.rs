//! Static navigation knowledge: the implication map binding navigation
//! items to the object permissions they carry, the permission catalog,
//! and the default navigation tree seeded into a fresh database.

/// Object permissions implied by granting a navigation item to a role.
/// Granting an item MUST also grant every permission listed here; removal
/// of an item does not revoke them.
pub const IMPLICATION_MAP: &[(&str, &[(&str, &str)])] = &[
    ("property_list", &[("properties", "view_property")]),
    ("properties", &[("properties", "view_property")]),
    ("request_list", &[("maintenance", "view_maintenancerequest")]),
    ("maintenance", &[("maintenance", "view_maintenancerequest")]),
    ("complaint_list", &[("complaints", "view_complaint")]),
    ("complaints", &[("complaints", "view_complaint")]),
    ("user_list", &[("accounts", "view_user")]),
    ("all_users", &[("accounts", "view_user")]),
    ("payment_list", &[("payments", "view_payment")]),
    ("payments", &[("payments", "view_payment")]),
    ("hotel_bookings", &[("properties", "view_booking")]),
    ("lodge_bookings", &[("properties", "view_booking")]),
    ("venue_bookings", &[("properties", "view_booking")]),
    ("house_bookings", &[("properties", "view_booking")]),
];

/// Look up the object permissions implied by a navigation item name
pub fn implied_permissions(nav_name: &str) -> &'static [(&'static str, &'static str)] {
    IMPLICATION_MAP
        .iter()
        .find(|(name, _)| *name == nav_name)
        .map(|(_, perms)| *perms)
        .unwrap_or(&[])
}

/// Property kinds and the management item each one gates
pub const KIND_MANAGEMENT_ITEMS: &[(&str, &str)] = &[
    ("hotel", "hotel_management"),
    ("lodge", "lodge_management"),
    ("venue", "venue_management"),
    ("house", "house_management"),
];

/// Parent item granted to owners holding at least one property of any kind
pub const MANAGE_PROPERTIES: &str = "manage_properties";

/// Full catalog of object permissions, seeded at bootstrap. The admin
/// full-grant rule reads the permissions table, not this constant, so
/// later additions are not retroactive.
pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    ("accounts", "view_user"),
    ("accounts", "add_user"),
    ("accounts", "change_user"),
    ("accounts", "delete_user"),
    ("properties", "view_property"),
    ("properties", "add_property"),
    ("properties", "change_property"),
    ("properties", "delete_property"),
    ("properties", "view_booking"),
    ("properties", "add_booking"),
    ("properties", "change_booking"),
    ("properties", "delete_booking"),
    ("maintenance", "view_maintenancerequest"),
    ("maintenance", "add_maintenancerequest"),
    ("maintenance", "change_maintenancerequest"),
    ("maintenance", "delete_maintenancerequest"),
    ("complaints", "view_complaint"),
    ("complaints", "add_complaint"),
    ("complaints", "change_complaint"),
    ("complaints", "delete_complaint"),
    ("payments", "view_payment"),
    ("payments", "add_payment"),
    ("payments", "change_payment"),
    ("payments", "delete_payment"),
    ("notifications", "view_notification"),
    ("notifications", "delete_notification"),
];

/// A navigation item seeded at bootstrap: (name, display name, url name,
/// parent name, order)
pub const DEFAULT_NAVIGATION: &[(&str, &str, Option<&str>, Option<&str>, i32)] = &[
    ("dashboard", "Dashboard", Some("dashboard"), None, 0),
    ("properties", "Properties", None, None, 10),
    ("property_list", "Property List", Some("property-list"), Some("properties"), 11),
    ("manage_properties", "Manage Properties", None, None, 20),
    ("hotel_management", "Hotel Management", Some("hotel-management"), Some("manage_properties"), 21),
    ("lodge_management", "Lodge Management", Some("lodge-management"), Some("manage_properties"), 22),
    ("venue_management", "Venue Management", Some("venue-management"), Some("manage_properties"), 23),
    ("house_management", "House Management", Some("house-management"), Some("manage_properties"), 24),
    ("bookings", "Bookings", None, None, 30),
    ("hotel_bookings", "Hotel Bookings", Some("hotel-bookings"), Some("bookings"), 31),
    ("lodge_bookings", "Lodge Bookings", Some("lodge-bookings"), Some("bookings"), 32),
    ("venue_bookings", "Venue Bookings", Some("venue-bookings"), Some("bookings"), 33),
    ("house_bookings", "House Bookings", Some("house-bookings"), Some("bookings"), 34),
    ("maintenance", "Maintenance", None, None, 40),
    ("request_list", "Request List", Some("request-list"), Some("maintenance"), 41),
    ("complaints", "Complaints", None, None, 50),
    ("complaint_list", "Complaint List", Some("complaint-list"), Some("complaints"), 51),
    ("payments", "Payments", None, None, 60),
    ("payment_list", "Payment List", Some("payment-list"), Some("payments"), 61),
    ("all_users", "All Users", None, None, 70),
    ("user_list", "User List", Some("user-list"), Some("all_users"), 71),
];
