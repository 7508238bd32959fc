use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::password::{PasswordError, PasswordHasher};
use crate::store::{StoreError, UserStore};

pub const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid user")]
    InvalidUser,

    #[error("invalid password")]
    InvalidPassword,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::DuplicateUser,
            StoreError::Database(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Signup and signin over a `UserStore`.
#[derive(Clone)]
pub struct Credentials {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl Credentials {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    #[instrument(skip_all, fields(name = %name))]
    pub async fn create_user(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AuthError::Validation("name and email are required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        // skip the slow hash for taken names; concurrent signups hit the unique constraint
        if self.users.find_by_name(name).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;

        let user = self
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_name(name).await?)
    }

    pub async fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let stored = user.password_hash.clone();
        let candidate = candidate.to_string();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))??;
        Ok(ok)
    }

    /// Resolves `name`/`password` to a user id.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn authenticate(&self, name: &str, password: &str) -> Result<Uuid, AuthError> {
        let user = self.find_by_name(name).await?.ok_or(AuthError::InvalidUser)?;

        if !self.verify_password(&user, password).await? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidPassword);
        }

        Ok(user.id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AuthError> {
        Ok(self.users.delete_user(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordHashConfig;
    use crate::store::MemoryStore;

    fn credentials() -> Credentials {
        let hasher = PasswordHasher::new(PasswordHashConfig {
            memory_kib: 256,
            iterations: 1,
        })
        .unwrap();
        Credentials::new(Arc::new(MemoryStore::new()), hasher)
    }

    #[tokio::test]
    async fn test_signup_succeeds_once_per_name() {
        let creds = credentials();
        let user = creds.create_user("alice", "alice@example.com", "secret1").await.unwrap();
        assert_eq!(user.name, "alice");
        assert_ne!(user.password_hash, "secret1");

        let err = creds
            .create_user("alice", "someone@example.com", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
    }

    #[tokio::test]
    async fn test_short_password_is_weak() {
        let creds = credentials();
        let err = creds.create_user("alice", "a@example.com", "1234").await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword));

        creds.create_user("alice", "a@example.com", "12345").await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let err = credentials()
            .create_user("  ", "a@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let creds = credentials();
        let user = creds.create_user("alice", "a@example.com", "secret1").await.unwrap();

        assert_eq!(creds.authenticate("alice", "secret1").await.unwrap(), user.id);
        assert!(matches!(
            creds.authenticate("alice", "wrong").await.unwrap_err(),
            AuthError::InvalidPassword
        ));
        assert!(matches!(
            creds.authenticate("nobody", "secret1").await.unwrap_err(),
            AuthError::InvalidUser
        ));
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "alice".to_string(),
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "alice");
    }
}
