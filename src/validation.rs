//! Input validation for repository writes.
//!
//! Validators return `Result<_, String>` with a human-readable message so they
//! can be collected with [`ValidationErrorBuilder`](crate::error::ValidationErrorBuilder).

use lazy_static::lazy_static;
use regex::Regex;

/// Symbols accepted by the password complexity rule
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Number of digits in a tax identifier (CNPJ)
pub const TAX_ID_DIGITS: usize = 14;

lazy_static! {
    /// Regex for the received date of an assignment (DD-MM-YYYY)
    static ref RECEIVED_DATE_REGEX: Regex = Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap();

    /// Regex for the tax ID display mask applied to 14 bare digits
    static ref TAX_ID_MASK_REGEX: Regex =
        Regex::new(r"^(\d{2})(\d{3})(\d{3})(\d{4})(\d{2})$").unwrap();
}

/// Require a non-blank text field, returning it trimmed
pub fn validate_required(value: &str, label: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(trimmed.to_string())
}

/// Strip punctuation from a tax ID and require exactly 14 digits
pub fn normalize_tax_id(raw: &str) -> Result<String, String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err("Tax ID is required".to_string());
    }
    if digits.len() != TAX_ID_DIGITS {
        return Err(format!(
            "Tax ID must have exactly {} digits (got {})",
            TAX_ID_DIGITS,
            digits.len()
        ));
    }
    Ok(digits)
}

/// Format 14 bare digits as `NN.NNN.NNN/NNNN-NN`.
///
/// Anything that is not exactly 14 digits is returned unchanged.
pub fn format_tax_id(digits: &str) -> String {
    TAX_ID_MASK_REGEX
        .replace(digits, "$1.$2.$3/$4-$5")
        .into_owned()
}

/// Validate an assignment received date (DD-MM-YYYY, shape only)
pub fn validate_received_date(date: &str) -> Result<(), String> {
    if date.is_empty() {
        return Err("Received date is required".to_string());
    }
    if !RECEIVED_DATE_REGEX.is_match(date) {
        return Err("Received date must use the DD-MM-YYYY format".to_string());
    }
    Ok(())
}

/// Validate password complexity
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        ));
    }

    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    if let Some(c) = password
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !is_symbol(*c))
    {
        return Err(format!(
            "Password contains an unsupported character '{}' (allowed symbols: {})",
            c, PASSWORD_SYMBOLS
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(is_symbol) {
        return Err(format!(
            "Password must contain at least one symbol from {}",
            PASSWORD_SYMBOLS
        ));
    }

    Ok(())
}

/// Validate that an optional confirmation matches the password
pub fn validate_password_confirmation(
    password: &str,
    confirmation: Option<&str>,
) -> Result<(), String> {
    match confirmation {
        Some(c) if c != password => Err("Passwords do not match".to_string()),
        _ => Ok(()),
    }
}

/// Parse a registration or IMO number.
///
/// Blank input yields `None`; anything else must be a non-negative integer.
pub fn parse_identifier(raw: &str) -> Result<Option<i64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("Identifier must be numeric".to_string());
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| "Identifier is too large".to_string())
}

/// Trim an optional text field, mapping blank to `None`
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
