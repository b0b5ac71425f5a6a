use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user_id as string
    pub sub: String,
    /// Session the token was minted from
    pub sid: String,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::InvalidToken("Invalid user_id in token".to_string()))
    }

    pub fn session_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sid)
            .map_err(|_| Error::InvalidToken("Invalid session id in token".to_string()))
    }
}

/// Generates a JWT access token bound to a session
///
/// Returns the token and its expiration time.
///
/// # Example
/// ```rust,no_run
/// use fintrack::services::jwt::generate_jwt;
/// use uuid::Uuid;
///
/// let (token, expires_at) = generate_jwt(Uuid::now_v7(), Uuid::now_v7(), "my-secret", 15)?;
/// # Ok::<(), fintrack::error::Error>(())
/// ```
pub fn generate_jwt(
    user_id: Uuid,
    session_id: Uuid,
    secret: &str,
    expiration_minutes: i64,
) -> Result<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let expiration = now + Duration::minutes(expiration_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))?;

    Ok((token, expiration))
}

/// Verifies a JWT token and returns the claims if valid
///
/// # Errors
/// Returns an error if the token is invalid, expired, or has a bad signature
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => Error::SessionExpired("Token has expired".to_string()),
        ErrorKind::InvalidSignature => Error::InvalidToken("Invalid token signature".to_string()),
        _ => Error::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Extracts the Bearer token from the Authorization header
/// Format: "Authorization: Bearer <token>"
pub fn extract_token_from_header(auth_header: Option<&str>) -> Result<&str> {
    match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            Some(_) => Err(Error::Authentication("Empty token".to_string())),
            None => Err(Error::Authentication(
                "Invalid Authorization header format. Expected: 'Bearer <token>'".to_string(),
            )),
        },
        None => Err(Error::Authentication("Missing Authorization header".to_string())),
    }
}
