//! Validation helpers and constants for account handlers

use carepoint_auth::MAX_PASSWORD_BYTES;
use carepoint_common::Error;
use regex::Regex;

/// Minimum password length in characters
pub const MIN_PASSWORD_CHARS: usize = 8;

lazy_static::lazy_static! {
    /// Mobile number: optional leading plus, 7 to 15 digits
    pub static ref MOBILE_NUMBER_REGEX: Regex =
        Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Validate a mobile number
pub fn validate_mobile_number(mobile_number: &str) -> bool {
    MOBILE_NUMBER_REGEX.is_match(mobile_number)
}

/// Enforce the password policy: at least 8 characters and no more than the
/// 72 bytes bcrypt will actually hash.
pub fn check_password_policy(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(Error::Validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

pub fn check_mobile_number(mobile_number: &str) -> Result<(), Error> {
    if validate_mobile_number(mobile_number) {
        Ok(())
    } else {
        Err(Error::Validation(
            "Mobile number must be 7 to 15 digits, optionally prefixed with +".to_string(),
        ))
    }
}
