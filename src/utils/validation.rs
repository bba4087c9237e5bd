//! Input validation shared by the auth and product handlers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Lower-case and trim an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(DomainError::validation("Invalid email format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < 8 {
        return Err(DomainError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if password.len() > 128 {
        return Err(DomainError::validation(
            "Password must be less than 128 characters",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(DomainError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(DomainError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(
            "Password must contain at least one digit",
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Name is required"));
    }
    if name.chars().count() > 100 {
        return Err(DomainError::validation(
            "Name must be 100 characters or less",
        ));
    }
    Ok(())
}

/// Reject NaN, infinities and negative amounts
pub fn validate_amount(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("investor@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.co.in").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("Sh0rt").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_amount_validation() {
        assert!(validate_amount("amount", 0.0).is_ok());
        assert!(validate_amount("amount", -1.0).is_err());
        assert!(validate_amount("amount", f64::NAN).is_err());
        assert!(validate_amount("amount", f64::INFINITY).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Investor@Example.COM "), "investor@example.com");
    }
}
