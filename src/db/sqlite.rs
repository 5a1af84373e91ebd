//! In-memory SQLite backend for tests.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::repository::{map_insert_error, UserRepository};
use super::schema::{
    COUNT_USERS, INSERT_USER, SELECT_USER_BY_USERNAME, SQLITE_USERS_TABLE, UPDATE_USER_PASSWORD,
};
use super::user::User;
use crate::Result;

/// User repository backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Open an in-memory database for testing.
    ///
    /// The pool holds a single connection that never expires: every
    /// connection to `sqlite::memory:` is a separate database.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.create_tables().await?;
        Ok(repo)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(SQLITE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User> {
        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, username))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_USER_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<u64> {
        let result = sqlx::query(UPDATE_USER_PASSWORD)
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(COUNT_USERS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultError;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteUserRepository::open_in_memory().await.unwrap();

        let user = repo.insert("alice", "hash-a").await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.username, "alice");

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, user);
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_already_exists() {
        let repo = SqliteUserRepository::open_in_memory().await.unwrap();
        repo.insert("alice", "hash-a").await.unwrap();

        let err = repo.insert("alice", "hash-b").await.unwrap_err();
        assert!(matches!(err, VaultError::AlreadyExists(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_password_rows() {
        let repo = SqliteUserRepository::open_in_memory().await.unwrap();
        repo.insert("alice", "old").await.unwrap();

        assert_eq!(repo.update_password("alice", "new").await.unwrap(), 1);
        assert_eq!(repo.update_password("nobody", "new").await.unwrap(), 0);

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password, "new");
    }

    #[tokio::test]
    async fn test_username_lookup_is_exact() {
        let repo = SqliteUserRepository::open_in_memory().await.unwrap();
        repo.insert("Alice", "hash").await.unwrap();

        assert!(repo.find_by_username("alice").await.unwrap().is_none());
    }
}
