use sqlx::SqlitePool;
use time::PrimitiveDateTime;

use crate::auth::repo_types::{StoreError, User};

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(
        db: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, start_date
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, start_date
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a user. The UNIQUE constraint on `username` decides duplicates,
    /// so two concurrent registrations cannot both succeed.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password_hash: &str,
        now: PrimitiveDateTime,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, start_date)
            VALUES (?1, ?2, ?3)
            RETURNING id, username, password, start_date
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UsernameTaken
            }
            other => StoreError::Database(other),
        })
    }
}
