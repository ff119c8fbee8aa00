use crate::errors::internal::ValidationErrors;

/// Password strength policy: minimum 8 characters with at least one
/// uppercase letter, one lowercase letter, and one digit.
pub fn check_strength(password: &str) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if password.chars().count() < 8 {
        problems.push("Password must be at least 8 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

/// Apply the policy against a field in a validation accumulator
pub fn validate_into(password: &str, field: &str, errors: &mut ValidationErrors) {
    if let Err(problems) = check_strength(password) {
        for problem in problems {
            errors.push(field, problem);
        }
    }
}
