use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    models::{UserId, UserRole},
    Error, Result,
};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Role (operator or user)
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.sub.clone())
    }

    pub fn role(&self) -> Result<UserRole> {
        UserRole::from_str(&self.role)
            .map_err(|_| Error::Internal(format!("Invalid role in token: {}", self.role)))
    }
}

/// Bearer-token service: signing for tooling and tests, decoding for the
/// request path. HS256 with a shared secret from configuration.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &Algorithm::HS256)
            .finish()
    }
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &[u8], token_duration_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_duration: Duration::hours(token_duration_hours as i64),
        }
    }

    /// Sign a token for a user
    pub fn sign(&self, user_id: &UserId, role: UserRole) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_duration).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
    }

    /// Decode and validate a raw token
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized(format!("Invalid token: {e}")))
    }

    /// Decode the token carried in an `Authorization: Bearer ...` header value
    pub fn decode_bearer(&self, header_value: &str) -> Result<Claims> {
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized("Expected Bearer token".to_string()))?;
        self.decode(token.trim())
    }
}
