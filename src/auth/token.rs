use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest token lifetime accepted, about a century.
pub const MAX_LIFETIME_HOURS: i64 = 24 * 366 * 100;

/// Represents the claims encoded within a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's identifier.
    pub sub: i64,
    /// The username at the time the token was issued.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp, present only when a token lifetime is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Issues and verifies HS256 tokens with a secret supplied at construction.
///
/// Cheap to clone; one instance is built at start-up and shared by the credential
/// service and the authentication middleware.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Option<chrono::Duration>,
}

impl TokenService {
    /// Creates a service signing with `secret`.
    ///
    /// With `lifetime_hours` unset, tokens carry no `exp` claim and never expire.
    /// Otherwise `exp` is set on issue and required on verification. The lifetime is
    /// clamped to `1..=MAX_LIFETIME_HOURS`.
    pub fn new(secret: &str, lifetime_hours: Option<i64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if lifetime_hours.is_none() {
            validation.required_spec_claims = HashSet::new();
            validation.validate_exp = false;
        }

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: lifetime_hours
                .map(|hours| chrono::Duration::hours(hours.clamp(1, MAX_LIFETIME_HOURS))),
        }
    }

    /// Generates a token asserting `user_id` and `username`.
    pub fn generate(&self, user_id: i64, username: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let exp = match self.lifetime {
            Some(lifetime) => Some(
                now.checked_add_signed(lifetime)
                    .ok_or_else(|| {
                        AppError::InternalServerError("Token lifetime out of range".into())
                    })?
                    .timestamp(),
            ),
            None => None,
        };

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and structure and decodes its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
    /// or it has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(AppError::from)
    }
}
