pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{ApiResponse, UserProfile};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService, TOKEN_TTL_SECS};

lazy_static::lazy_static! {
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_REGEX: Regex = Regex::new(r"[!@#$%^&*]").unwrap();
    static ref PASSWORD_CHARSET_REGEX: Regex = Regex::new(r"^[A-Za-z0-9!@#$%^&*]+$").unwrap();
}

/// At least one upper-case letter, one digit and one of `!@#$%^&*`, and nothing
/// outside ASCII letters, digits and those specials.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = PASSWORD_CHARSET_REGEX.is_match(password)
        && UPPERCASE_REGEX.is_match(password)
        && DIGIT_REGEX.is_match(password)
        && SPECIAL_REGEX.is_match(password);

    if strong {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_strength");
        error.message = Some(
            "Password must be at least 8 characters long, contain a capital letter, a number, and a special character".into(),
        );
        Err(error)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 1 to 100 characters.
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 8 characters long and pass the strength rule.
    #[validate(length(min = 8, max = 128), custom = "validate_password_strength")]
    pub password: String,
}

/// Emails are matched case-insensitively and stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Payload returned after a successful login or registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub user: UserProfile,
    /// Session token, valid for one hour.
    pub token: String,
}

pub type AuthResponse = ApiResponse<AuthData>;
