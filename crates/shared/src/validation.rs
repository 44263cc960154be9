//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidateEmail, ValidationError};

/// Maximum length of a table name accepted by MySQL.
const MAX_IDENTIFIER_LENGTH: usize = 64;

lazy_static! {
    /// Unquoted SQL identifier: letter or underscore, then letters, digits, underscores.
    static ref SQL_IDENTIFIER_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Validates the syntax of a single email address.
pub fn validate_email_address(address: &str) -> Result<(), ValidationError> {
    if address.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_invalid");
        err.message = Some(format!("'{}' is not a valid email address", address).into());
        Err(err)
    }
}

/// Validates that a value can be interpolated into SQL as a bare identifier.
///
/// Table names cannot be bound as query parameters, so anything configurable
/// that ends up in a statement must pass this check first.
pub fn validate_sql_identifier(identifier: &str) -> Result<(), ValidationError> {
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        let mut err = ValidationError::new("identifier_length");
        err.message = Some("Identifier must be at most 64 characters".into());
        return Err(err);
    }

    if SQL_IDENTIFIER_REGEX.is_match(identifier) {
        Ok(())
    } else {
        let mut err = ValidationError::new("identifier_format");
        err.message =
            Some("Identifier may only contain letters, digits and underscores".into());
        Err(err)
    }
}
