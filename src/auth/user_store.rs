//! User Storage
//! Credential records in SQLite, keyed by a case-insensitive username

use crate::auth::models::{Role, User};
use crate::db::{Database, StoreError};
use rusqlite::{params, OptionalExtension};
use tracing::info;

/// Canonical form of a username for storage and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// User storage with SQLite backend
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    /// Create a new user store and initialize its table
    pub async fn new(db: Database) -> Result<Self, StoreError> {
        db.lock().await.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user'
            )",
            [],
        )?;
        Ok(Self { db })
    }

    /// Insert a user and return its id.
    ///
    /// Fails with [`StoreError::DuplicateUsername`] when the normalized
    /// username is already taken.
    pub async fn register(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, StoreError> {
        let username = normalize_username(username);
        let conn = self.db.lock().await;

        let inserted = conn.execute(
            "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if StoreError::is_unique_violation(&e) => {
                return Err(StoreError::DuplicateUsername)
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        info!(user_id = id, username = %username, role = %role, "Registered user");
        Ok(id)
    }

    /// Get user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let username = normalize_username(username);
        let conn = self.db.lock().await;

        let user = conn
            .query_row(
                "SELECT id, username, password, role FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        role: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    async fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::open(temp_file.path()).unwrap();
        let store = UserStore::new(db).await.unwrap();
        (store, temp_file)
    }

    #[tokio::test]
    async fn test_register_and_find() {
        let (store, _temp) = create_test_store().await;

        let id = store.register("critic1", "hash", Role::User).await.unwrap();
        let user = store.find_by_username("critic1").await.unwrap().unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.username, "critic1");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_usernames_are_case_insensitive() {
        let (store, _temp) = create_test_store().await;

        store.register("Alice", "hash", Role::Admin).await.unwrap();

        let user = store.find_by_username("ALICE").await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_distinct_error() {
        let (store, _temp) = create_test_store().await;

        store.register("alice", "hash", Role::User).await.unwrap();
        let err = store.register("aLiCe", "other", Role::Admin).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername), "got {err:?}");

        // the first registration is untouched
        let user = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_users_survive_reopen() {
        let (store, temp) = create_test_store().await;
        let id = store.register("critic1", "hash", Role::Admin).await.unwrap();
        drop(store);

        let reopened = UserStore::new(Database::open(temp.path()).unwrap())
            .await
            .unwrap();
        let user = reopened.find_by_username("critic1").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (store, _temp) = create_test_store().await;
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }
}
