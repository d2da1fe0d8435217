use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::users;

/// Session token claims.
///
/// The `sub` field is the user's UUID in the `users` table. The role is
/// informational only; authorization always reads the stored user.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    /// User's email at the time the token was issued.
    pub email: Option<String>,
    /// User's role at the time the token was issued.
    pub role: Option<users::Roles>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

/// Sign a session token for `user`, valid for `ttl_secs`.
pub fn issue_token(user: &users::Model, secret: &str, ttl_secs: i64) -> Result<String, String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        exp: (now + ttl_secs).max(0) as usize,
        iat: Some(now.max(0) as usize),
        email: Some(user.email.clone()),
        role: Some(user.role),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {e}"))
}

/// Validate a session token and return the decoded claims.
///
/// Tokens are HS256 signed with the server's `JWT_SECRET`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|td| td.claims)
    .map_err(|e| format!("Token validation failed: {e}"))
}
