pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;

/// Bearer token claims. The token carries only the user id; role and status
/// are loaded fresh from the store on every request so revocations and role
/// changes take effect immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

/// Mint a bearer token for the given user id.
pub fn issue_token(user_id: i64) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(ApiError::internal("JWT secret not configured"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &Claims::new(user_id), &encoding_key)
        .map_err(|e| ApiError::internal(format!("JWT generation error: {}", e)))
}

/// Validate a bearer token and return its claims. Expired or malformed
/// tokens fail authentication, not authorization.
pub fn validate_token(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(ApiError::internal("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}
