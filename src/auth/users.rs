//! User persistence

use sqlx::SqlitePool;
use tracing::info;

use super::models::User;
use crate::common::{generate_user_id, now_timestamp, safe_email_log, ApiError};
use crate::services::google::OAuthProfile;

const USER_COLUMNS: &str =
    "id, email, password_hash, name, avatar, is_verified, last_login, created_at";

/// Display name used when none was given: the local part of the email.
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[derive(Clone)]
pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Inserts an unverified password account.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, ApiError> {
        let id = generate_user_id();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, is_verified, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(now_timestamp())
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_insert(e, "User already exists"))?;

        info!(user_id = %id, email = %safe_email_log(email), "Created user");
        self.require(&id).await
    }

    async fn require(&self, id: &str) -> Result<User, ApiError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::InternalServer(format!("user {} vanished after write", id)))
    }

    pub async fn mark_verified(&self, id: &str) -> Result<User, ApiError> {
        sqlx::query("UPDATE users SET is_verified = 1, last_login = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db)
            .await?;
        self.require(id).await
    }

    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn touch_last_login(&self, id: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Creates or refreshes the account behind an OAuth login.
    ///
    /// New accounts are verified and have no password. Existing accounts get
    /// `last_login` bumped, the provider's picture if it sent one, and a name
    /// only when they never had one.
    pub async fn upsert_oauth(&self, email: &str, profile: &OAuthProfile) -> Result<User, ApiError> {
        let now = now_timestamp();
        let picture = profile.picture.as_deref().filter(|p| !p.is_empty());
        let name = profile.name.as_deref().filter(|n| !n.trim().is_empty());

        match self.find_by_email(email).await? {
            Some(existing) => {
                sqlx::query(
                    "UPDATE users SET
                        last_login = ?,
                        avatar = COALESCE(?, avatar),
                        name = CASE WHEN name IS NULL OR name = '' THEN ? ELSE name END
                     WHERE id = ?",
                )
                .bind(&now)
                .bind(picture)
                .bind(name)
                .bind(&existing.id)
                .execute(&self.db)
                .await?;

                info!(user_id = %existing.id, "Updated user from OAuth profile");
                self.require(&existing.id).await
            }
            None => {
                let id = generate_user_id();
                let name = name.map(str::to_string).unwrap_or_else(|| default_name(email));
                sqlx::query(
                    "INSERT INTO users (id, email, password_hash, name, avatar, is_verified, last_login, created_at)
                     VALUES (?, ?, '', ?, ?, 1, ?, ?)",
                )
                .bind(&id)
                .bind(email)
                .bind(&name)
                .bind(picture)
                .bind(&now)
                .bind(&now)
                .execute(&self.db)
                .await?;

                info!(user_id = %id, email = %safe_email_log(email), "Created user from OAuth profile");
                self.require(&id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::test_support::setup_test_db;

    fn profile(name: Option<&str>, picture: Option<&str>) -> OAuthProfile {
        OAuthProfile {
            email: Some("ada@example.com".to_string()),
            name: name.map(str::to_string),
            picture: picture.map(str::to_string),
        }
    }

    #[test]
    fn test_default_name() {
        assert_eq!(default_name("ada.lovelace@example.com"), "ada.lovelace");
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let users = UsersService::new(setup_test_db().await);
        let created = users.create("ada@example.com", "hash", "Ada").await.unwrap();
        assert!(created.id.starts_with("U_"));
        assert!(!created.is_verified);

        let found = users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(users.find_by_id("U_MISSING000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = UsersService::new(setup_test_db().await);
        users.create("ada@example.com", "hash", "Ada").await.unwrap();
        let err = users.create("ada@example.com", "hash", "Ada").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let users = UsersService::new(setup_test_db().await);
        let created = users.create("ada@example.com", "hash", "Ada").await.unwrap();
        let verified = users.mark_verified(&created.id).await.unwrap();
        assert!(verified.is_verified);
        assert!(verified.last_login.is_some());
    }

    #[tokio::test]
    async fn test_upsert_oauth_creates_verified_passwordless_user() {
        let users = UsersService::new(setup_test_db().await);
        let user = users
            .upsert_oauth("ada@example.com", &profile(None, Some("https://img/1.png")))
            .await
            .unwrap();
        assert!(user.is_verified);
        assert_eq!(user.password_hash, "");
        assert_eq!(user.name.as_deref(), Some("ada"));
        assert_eq!(user.avatar.as_deref(), Some("https://img/1.png"));
    }

    #[tokio::test]
    async fn test_upsert_oauth_keeps_existing_name() {
        let users = UsersService::new(setup_test_db().await);
        let created = users.create("ada@example.com", "hash", "Ada").await.unwrap();

        let user = users
            .upsert_oauth("ada@example.com", &profile(Some("Lady Ada"), Some("https://img/2.png")))
            .await
            .unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.avatar.as_deref(), Some("https://img/2.png"));
        assert_eq!(user.password_hash, "hash");
        assert!(user.last_login.is_some());

        // No picture from the provider leaves the avatar alone
        let user = users
            .upsert_oauth("ada@example.com", &profile(None, None))
            .await
            .unwrap();
        assert_eq!(user.avatar.as_deref(), Some("https://img/2.png"));
    }

    #[tokio::test]
    async fn test_upsert_oauth_fills_missing_name() {
        let db = setup_test_db().await;
        sqlx::query("INSERT INTO users (id, email, created_at) VALUES ('U_1', 'ada@example.com', 'now')")
            .execute(&db)
            .await
            .unwrap();
        let users = UsersService::new(db);

        let user = users
            .upsert_oauth("ada@example.com", &profile(Some("Ada"), None))
            .await
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Ada"));
    }
}
