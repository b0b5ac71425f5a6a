use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::validation::Payload;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub timezone: Option<String>,
}

/// Column changes for a profile update. `None` leaves the column untouched;
/// `timezone: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub timezone: Option<Option<String>>,
}

pub const REGISTER_FIELDS: &[&str] = &["name", "email", "password", "password_confirmation", "timezone"];
pub const LOGIN_FIELDS: &[&str] = &["email", "password"];
pub const REFRESH_FIELDS: &[&str] = &["refresh_token"];
pub const PROFILE_FIELDS: &[&str] = &[
    "name",
    "email",
    "timezone",
    "current_password",
    "password",
    "password_confirmation",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl RegisterUser {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            name: payload.required("name")?,
            email: payload.required("email")?,
            password: payload.required("password")?,
            password_confirmation: payload.required("password_confirmation")?,
            timezone: payload.optional("timezone")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl LoginUser {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            email: payload.required("email")?,
            password: payload.required("password")?,
        })
    }
}

/// Profile update payload. Absent keys are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<Option<String>>,
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UpdateProfile {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        payload.require_any()?;
        Ok(Self {
            name: payload.optional("name")?,
            email: payload.optional("email")?,
            timezone: payload.nullable("timezone")?,
            current_password: payload.optional("current_password")?,
            password: payload.optional("password")?,
            password_confirmation: payload.optional("password_confirmation")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: User,
    pub access_token: String,           // JWT access token (short-lived, e.g., 15 minutes)
    pub refresh_token: String,          // Session token (long-lived, e.g., 30 days)
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl LoginResult {
    pub fn new(user: User, tokens: RefreshTokenResult) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_at: tokens.access_token_expires_at,
            refresh_token_expires_at: tokens.refresh_token_expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResult {
    pub access_token: String,
    pub refresh_token: String,                     // Rotated on every refresh
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct NewUserSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
