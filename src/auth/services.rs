use sqlx::SqlitePool;
use time::PrimitiveDateTime;
use tracing::{error, info, warn};

use crate::auth::{
    password::{hash_password, verify_password},
    repo_types::{StoreError, User},
};

/// Shown for both an unknown username and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("username and password are required")]
    EmptyField,
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Checks a login attempt. `Ok(None)` covers every credential failure alike;
/// `Err` is reserved for store outages. The username is trimmed as at registration.
pub async fn authenticate(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let username = username.trim();
    let Some(user) = User::find_by_username(db, username).await? else {
        warn!(%username, "login unknown username");
        return Ok(None);
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => {
            info!(user_id = user.id, %username, "user logged in");
            Ok(Some(user))
        }
        Ok(false) => {
            warn!(user_id = user.id, %username, "login invalid password");
            Ok(None)
        }
        Err(e) => {
            error!(error = %e, user_id = user.id, "stored password hash unusable");
            Ok(None)
        }
    }
}

/// Creates an account. The caller is not logged in afterwards.
pub async fn register(
    db: &SqlitePool,
    username: &str,
    password: &str,
    now: PrimitiveDateTime,
) -> Result<User, RegisterError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(RegisterError::EmptyField);
    }

    let hash = hash_password(password)?;
    match User::create(db, username, &hash, now).await {
        Ok(user) => {
            info!(user_id = user.id, %username, "user registered");
            Ok(user)
        }
        Err(StoreError::UsernameTaken) => {
            warn!(%username, "username already registered");
            Err(RegisterError::UsernameTaken)
        }
        Err(StoreError::Database(e)) => Err(anyhow::Error::new(e).context("create user").into()),
    }
}
