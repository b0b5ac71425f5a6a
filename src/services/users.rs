use crate::DbConn;
use crate::{
    config::JwtConfig,
    error::{Error, Result},
    models::users::{LoginResult, LoginUser, NewUser, RegisterUser, UpdateProfile, UpdateUser, User},
    queries::users,
    services::sessions,
    validation::{validate_email, validate_name, validate_password, validate_timezone},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_confirmation(password: &str, confirmation: Option<&str>) -> Result<()> {
    if confirmation != Some(password) {
        return Err(Error::validation(
            "password_confirmation",
            "The password confirmation does not match",
        ));
    }
    Ok(())
}

/// Hashes a password with Argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}

/// Registers a new user and opens their first session
pub async fn register_user(conn: &mut DbConn, register_user: RegisterUser, config: &JwtConfig) -> Result<LoginResult> {
    let name = validate_name("name", &register_user.name)?;
    let email = normalize_email(&register_user.email);
    validate_email(&email)?;
    validate_password(&register_user.password)?;
    ensure_confirmation(&register_user.password, Some(&register_user.password_confirmation))?;

    let timezone = match register_user.timezone.map(|tz| tz.trim().to_string()) {
        Some(tz) if !tz.is_empty() => {
            validate_timezone(&tz)?;
            Some(tz)
        }
        _ => None,
    };

    let user = users::create_user(
        conn,
        NewUser {
            name,
            email,
            password_hash: hash_password(&register_user.password)?,
            timezone,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "user registered");

    let tokens = sessions::issue_session(conn, user.id, config).await?;
    Ok(LoginResult::new(user, tokens))
}

/// Authenticates by email and password. Unknown emails, wrong passwords and
/// deleted accounts all produce the same error.
pub async fn login_user(conn: &mut DbConn, login_user: LoginUser, config: &JwtConfig) -> Result<LoginResult> {
    let email = normalize_email(&login_user.email);

    let Some(user) = users::get_active_user_by_email(conn, &email).await? else {
        return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(&login_user.password, &user.password_hash)? {
        return Err(Error::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    let tokens = sessions::issue_session(conn, user.id, config).await?;
    Ok(LoginResult::new(user, tokens))
}

pub async fn get_profile(conn: &mut DbConn, user_id: Uuid) -> Result<User> {
    users::get_user_by_id(conn, user_id)
        .await?
        .filter(|user| !user.is_deleted())
        .ok_or_else(|| Error::NotFound(format!("User with ID {} not found", user_id)))
}

/// Applies a profile update. Changing the password requires the current one.
pub async fn update_profile(conn: &mut DbConn, user_id: Uuid, profile: UpdateProfile) -> Result<User> {
    let current = get_profile(conn, user_id).await?;
    let mut update = UpdateUser::default();

    if let Some(name) = profile.name {
        update.name = Some(validate_name("name", &name)?);
    }

    if let Some(email) = profile.email {
        let email = normalize_email(&email);
        validate_email(&email)?;
        update.email = Some(email);
    }

    if let Some(timezone) = profile.timezone {
        update.timezone = Some(match timezone.map(|tz| tz.trim().to_string()) {
            Some(tz) if !tz.is_empty() => {
                validate_timezone(&tz)?;
                Some(tz)
            }
            _ => None,
        });
    }

    if let Some(password) = profile.password {
        let current_password = profile.current_password.unwrap_or_default();
        if !verify_password(&current_password, &current.password_hash)? {
            return Err(Error::validation("current_password", "The current password is incorrect"));
        }
        validate_password(&password)?;
        ensure_confirmation(&password, profile.password_confirmation.as_deref())?;
        update.password_hash = Some(hash_password(&password)?);
    }

    users::update_user(conn, user_id, update).await
}

/// Soft-deletes the account and revokes every session it holds.
pub async fn delete_account(conn: &mut DbConn, user_id: Uuid) -> Result<()> {
    let rows_affected = users::soft_delete_user(conn, user_id).await?;
    if rows_affected == 0 {
        return Err(Error::NotFound(format!("User with ID {} not found", user_id)));
    }

    let revoked = sessions::revoke_all_user_sessions(conn, user_id).await?;
    tracing::info!(user_id = %user_id, revoked, "account deleted");
    Ok(())
}
