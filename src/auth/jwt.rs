//! JWT token management
//!
//! HS256 bearer tokens naming the human actor and their role.

use crate::auth::Role;
use crate::error::{GovernanceError, GovernanceResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access token lifetime
pub const ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 60;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (human actor id, recorded on reviews and resolutions)
    pub sub: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Sign an access token for a human actor
pub fn create_token(secret: &str, subject: &str, role: Role) -> GovernanceResult<String> {
    if subject.trim().is_empty() {
        return Err(GovernanceError::Validation(
            "Token subject cannot be empty".to_string(),
        ));
    }

    let now = Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        role,
        exp: (now + Duration::minutes(ACCESS_TOKEN_EXPIRATION_MINUTES)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| GovernanceError::Internal(format!("Failed to create access token: {}", e)))
}

/// Decode and validate a JWT token
pub fn decode_token(secret: &str, token: &str) -> GovernanceResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            GovernanceError::Unauthorized("Token expired".to_string())
        }
        jsonwebtoken::errors::ErrorKind::InvalidToken => {
            GovernanceError::Unauthorized("Invalid token".to_string())
        }
        _ => GovernanceError::Unauthorized(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
