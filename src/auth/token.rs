use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a session token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature checks out but the token is past its expiry.
    Expired,
    /// Bad signature, bad structure, or signed with another key.
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid => AppError::Forbidden("Invalid token. Access denied.".into()),
        }
    }
}

/// Issues and verifies HS256 session tokens with a key fixed at startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact: a token is dead the second it passes `exp`.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Generates a token for `user_id` that expires one hour from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Generates a token as if issued at `issued_at`.
    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECS);
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Checks signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                other => {
                    log::debug!("token rejected: {:?}", other);
                    TokenError::Invalid
                }
            })
    }
}
