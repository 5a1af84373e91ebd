//! Credential store: user accounts with hashed passwords.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::repository::UserRepository;
use super::user::{User, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use crate::auth::{hash_password, verify_password, PasswordError};
use crate::{Result, VaultError};

/// Password behind the hash that unknown usernames are checked against.
const DUMMY_PASSWORD: &str = "filevault-no-such-user";

/// What [`CredentialStore::ensure_default_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    /// The administrator account did not exist and was created.
    Created,
    /// The administrator account existed and its password was reset.
    Reset,
}

/// User accounts over a [`UserRepository`].
///
/// Passwords are hashed before they reach the repository and are only
/// ever compared against stored hashes.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl CredentialStore {
    /// Create a store over a repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.repo.backend_name()
    }

    /// Create the accounts table if needed.
    pub async fn create_tables(&self) -> Result<()> {
        self.repo.create_tables().await
    }

    /// Register a new user.
    ///
    /// Fails with [`VaultError::AlreadyExists`] if the username is taken,
    /// including when a concurrent registration wins the race.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(VaultError::AlreadyExists(format!("user '{username}'")));
        }

        let hash = hash_blocking(password.to_string()).await?;
        let user = self.repo.insert(username, &hash).await?;

        info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Look up a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.repo.find_by_username(username).await
    }

    /// Replace a user's password.
    pub async fn update_user_password(&self, username: &str, new_password: &str) -> Result<()> {
        let hash = hash_blocking(new_password.to_string()).await?;
        let rows = self.repo.update_password(username, &hash).await?;
        if rows == 0 {
            return Err(VaultError::NotFound(format!("user '{username}'")));
        }

        debug!(username, "Password updated");
        Ok(())
    }

    /// Check a username/password pair.
    ///
    /// Returns the user on a match and `None` for an unknown user or a
    /// wrong password. Callers must not reveal which of the two it was.
    ///
    /// Both cases run one Argon2 verification, so they take the same time.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.repo.find_by_username(username).await? else {
            let dummy = self.dummy_hash().await?;
            verify_blocking(password.to_string(), dummy).await?;
            return Ok(None);
        };

        let matches = verify_blocking(password.to_string(), user.password.clone()).await?;
        Ok(matches.then_some(user))
    }

    /// Make sure the `admin` account exists with `password`.
    ///
    /// Creates the account when missing, otherwise resets its password.
    /// Running it repeatedly leaves exactly one administrator.
    pub async fn ensure_default_admin(&self, password: &str) -> Result<AdminBootstrap> {
        if password == DEFAULT_ADMIN_PASSWORD {
            warn!(
                username = DEFAULT_ADMIN_USERNAME,
                "Administrator uses the built-in default password; set ADMIN_DEFAULT_PASSWORD"
            );
        }

        let outcome = match self.repo.find_by_username(DEFAULT_ADMIN_USERNAME).await? {
            None => {
                match self.create_user(DEFAULT_ADMIN_USERNAME, password).await {
                    Ok(_) => AdminBootstrap::Created,
                    // Lost a race with another instance; fall back to a reset.
                    Err(VaultError::AlreadyExists(_)) => {
                        self.update_user_password(DEFAULT_ADMIN_USERNAME, password)
                            .await?;
                        AdminBootstrap::Reset
                    }
                    Err(e) => return Err(e),
                }
            }
            Some(_) => {
                self.update_user_password(DEFAULT_ADMIN_USERNAME, password)
                    .await?;
                AdminBootstrap::Reset
            }
        };

        info!(username = DEFAULT_ADMIN_USERNAME, ?outcome, "Default admin ensured");
        Ok(outcome)
    }

    async fn dummy_hash(&self) -> Result<String> {
        self.dummy_hash
            .get_or_try_init(|| hash_blocking(DUMMY_PASSWORD.to_string()))
            .await
            .cloned()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.repo.backend_name())
            .finish()
    }
}

async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| VaultError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| VaultError::Internal(e.to_string()))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool> {
    let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| VaultError::Internal(format!("verification task failed: {e}")))?;

    match outcome {
        Ok(()) => Ok(true),
        Err(PasswordError::VerificationFailed) => Ok(false),
        Err(PasswordError::InvalidHash) => {
            warn!("Stored password hash is malformed");
            Ok(false)
        }
        Err(e) => Err(VaultError::Internal(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteUserRepository;

    async fn store() -> CredentialStore {
        let repo = SqliteUserRepository::open_in_memory().await.unwrap();
        CredentialStore::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_user_stores_hash() {
        let store = store().await;
        let user = store.create_user("alice", "s3cret").await.unwrap();

        assert_ne!(user.password, "s3cret");
        assert!(user.password.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let store = store().await;
        store.create_user("alice", "one").await.unwrap();

        let err = store.create_user("alice", "two").await.unwrap_err();
        assert!(matches!(err, VaultError::AlreadyExists(_)));

        // Original password still works
        assert!(store
            .verify_credentials("alice", "one")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let store = store().await;
        let (a, b) = tokio::join!(
            store.create_user("race", "first"),
            store.create_user("race", "second"),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(VaultError::AlreadyExists(_))));
        assert_eq!(store.repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let store = store().await;
        store.create_user("alice", "right").await.unwrap();

        let user = store.verify_credentials("alice", "right").await.unwrap();
        assert_eq!(user.map(|u| u.username), Some("alice".to_string()));

        assert!(store
            .verify_credentials("alice", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("nobody", "right")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_is_checked_against_dummy_hash() {
        let store = store().await;
        assert!(store.dummy_hash.get().is_none());

        let result = store
            .verify_credentials("nobody", DUMMY_PASSWORD)
            .await
            .unwrap();
        assert!(result.is_none());

        // Same Argon2 parameters as real account hashes.
        let real = store.create_user("alice", "pw").await.unwrap().password;
        let dummy = store.dummy_hash.get().unwrap().clone();
        let params = |h: &str| h.rsplitn(3, '$').nth(2).unwrap().to_string();
        assert_eq!(params(&dummy), params(&real));
        assert!(verify_password(DUMMY_PASSWORD, &dummy).is_ok());

        // Built once, then reused.
        store.verify_credentials("ghost", "pw").await.unwrap();
        assert_eq!(store.dummy_hash.get().unwrap(), &dummy);
    }

    #[tokio::test]
    async fn test_empty_password_is_storable() {
        let store = store().await;
        store.create_user("blank", "").await.unwrap();

        assert!(store.verify_credentials("blank", "").await.unwrap().is_some());
        assert!(store.verify_credentials("blank", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let store = store().await;
        store.create_user("alice", "old").await.unwrap();

        store.update_user_password("alice", "new").await.unwrap();

        assert!(store.verify_credentials("alice", "old").await.unwrap().is_none());
        assert!(store.verify_credentials("alice", "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_password_unknown_user() {
        let store = store().await;
        let err = store
            .update_user_password("ghost", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_default_admin_creates_then_resets() {
        let store = store().await;

        let first = store.ensure_default_admin("admin123").await.unwrap();
        assert_eq!(first, AdminBootstrap::Created);
        assert!(store
            .verify_credentials("admin", "admin123")
            .await
            .unwrap()
            .is_some());

        store
            .update_user_password(DEFAULT_ADMIN_USERNAME, "changed")
            .await
            .unwrap();

        let second = store.ensure_default_admin("admin123").await.unwrap();
        assert_eq!(second, AdminBootstrap::Reset);

        assert_eq!(store.repo.count().await.unwrap(), 1);
        assert!(store
            .verify_credentials("admin", "admin123")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .verify_credentials("admin", "changed")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_ensure_default_admin_custom_password() {
        let store = store().await;
        store.ensure_default_admin("hunter2").await.unwrap();

        assert!(store
            .verify_credentials("admin", "hunter2")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_never_matches() {
        let store = store().await;
        store.repo.insert("legacy", "plaintext").await.unwrap();

        assert!(store
            .verify_credentials("legacy", "plaintext")
            .await
            .unwrap()
            .is_none());
    }
}
