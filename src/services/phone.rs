/// Phone validation and matching forms.
///
/// Stored numbers must match `^\+?[1-9]\d{1,14}$` (E.164-like, optional
/// leading `+`). Login lookups try the number exactly as given plus the
/// other form (with/without the `+` prefix), because clients are
/// inconsistent about it.

/// Validate a phone number against the accepted format
pub fn is_valid(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 2 || digits.len() > 15 {
        return false;
    }
    let mut chars = digits.chars();
    match chars.next() {
        Some(c) if ('1'..='9').contains(&c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_digit())
}

/// The candidate stored forms for a login phone: the input itself, then
/// the alternate with the `+` prefix toggled.
pub fn lookup_forms(phone: &str) -> Vec<String> {
    let mut forms = vec![phone.to_string()];
    match phone.strip_prefix('+') {
        Some(bare) => forms.push(bare.to_string()),
        None => forms.push(format!("+{}", phone)),
    }
    forms
}
