use crate::error::StoreError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;
use wayline_core::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_salt: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

fn hash_password(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an account with a fresh random salt. Usernames are unique.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, StoreError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = hash_password(&salt, password);

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO users (id, username, email, password_salt, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(BASE64.encode(salt))
        .bind(BASE64.encode(&hash))
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::UsernameTaken(username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Verify credentials. Unknown usernames and wrong passwords are
    /// indistinguishable from the caller's side.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_salt, password_hash, created_at \
             FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::InvalidCredentials)?;

        let salt = BASE64
            .decode(&row.password_salt)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let expected = BASE64
            .decode(&row.password_hash)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let actual = hash_password(&salt, password);
        if !constant_time_eq(&actual, &expected) {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(row.into_domain())
    }

    pub async fn get(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_salt, password_hash, created_at \
             FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(UserRow::into_domain)
        .ok_or(StoreError::UserNotFound(id))
    }

    /// Update username/email; the username stays unique
    pub async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<User, StoreError> {
        let result = sqlx::query("UPDATE users SET username = ?1, email = ?2 WHERE id = ?3")
            .bind(username)
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::UserNotFound(id)),
            Ok(_) => self.get(id).await,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::UsernameTaken(username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbClient;

    async fn repo() -> UserRepository {
        let db = DbClient::new_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        UserRepository::new(db.pool)
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let repo = repo().await;
        let created = repo
            .create("marta", "marta@example.com", "s3cret")
            .await
            .unwrap();

        let verified = repo.verify("marta", "s3cret").await.unwrap();
        assert_eq!(verified.id, created.id);
        assert_eq!(verified.email, "marta@example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let repo = repo().await;
        repo.create("marta", "marta@example.com", "s3cret")
            .await
            .unwrap();

        let wrong = repo.verify("marta", "nope").await.unwrap_err();
        let unknown = repo.verify("nobody", "s3cret").await.unwrap_err();
        assert!(matches!(wrong, StoreError::InvalidCredentials));
        assert!(matches!(unknown, StoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let repo = repo().await;
        repo.create("marta", "a@example.com", "pw1").await.unwrap();

        let err = repo.create("marta", "b@example.com", "pw2").await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "marta"));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let repo = repo().await;
        let user = repo
            .create("marta", "marta@example.com", "s3cret")
            .await
            .unwrap();

        let updated = repo
            .update_profile(user.id, "marta-v", "new@example.com")
            .await
            .unwrap();
        assert_eq!(updated.username, "marta-v");
        assert_eq!(updated.email, "new@example.com");

        // Credentials are untouched by a profile update
        repo.verify("marta-v", "s3cret").await.unwrap();

        let err = repo
            .update_profile(Uuid::new_v4(), "x", "x@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(_)));
    }
}
