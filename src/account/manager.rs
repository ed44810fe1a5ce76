/// Account directory operations using runtime queries
use crate::{
    account::{Profile, ProfileUpdate, DEFAULT_BACKGROUND_IMAGE_URL, DEFAULT_PROFILE_IMAGE_URL},
    db::models::UserRow,
    error::{ApiError, ApiResult},
    names::{self, NameKind},
    password,
};
use chrono::Utc;
use sqlx::SqlitePool;

const MAX_EMAIL_LEN: usize = 255;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new account
    ///
    /// Fails with `Conflict` when the email is already taken. Name resolution
    /// and the user insert share one transaction.
    pub async fn register(
        &self,
        email: &str,
        password_text: &str,
        first_name: &str,
        last_name: &str,
    ) -> ApiResult<Profile> {
        validate_email(email)?;
        if password_text.is_empty() {
            return Err(ApiError::Validation("Password must not be empty".to_string()));
        }
        names::validate_text(first_name)?;
        names::validate_text(last_name)?;

        let password_hash = password::hash(password_text)?;

        let mut tx = self.db.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let first_name_id = names::resolve_or_create(&mut tx, NameKind::First, first_name).await?;
        let last_name_id = names::resolve_or_create(&mut tx, NameKind::Last, last_name).await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, first_name_id, last_name_id,
                    profile_image_url, background_image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(email)
        .bind(&password_hash)
        .bind(first_name_id)
        .bind(last_name_id)
        .bind(DEFAULT_PROFILE_IMAGE_URL)
        .bind(DEFAULT_BACKGROUND_IMAGE_URL)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            // A concurrent registration with the same email beat the pre-check
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                ApiError::Conflict("Email already registered".to_string())
            }
            e => ApiError::Database(e),
        })?;

        tx.commit().await?;

        let user_id = result.last_insert_rowid();
        tracing::info!("Registered account {} for {}", user_id, email);

        Ok(Profile {
            user_id,
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_image_url: DEFAULT_PROFILE_IMAGE_URL.to_string(),
            background_image_url: DEFAULT_BACKGROUND_IMAGE_URL.to_string(),
        })
    }

    /// Authenticate by email and password
    ///
    /// Unknown email and wrong password produce the same error so the response
    /// never reveals whether an email is registered.
    pub async fn login(&self, email: &str, password_text: &str) -> ApiResult<Profile> {
        let user = self.find_by_email(email).await?.ok_or_else(|| {
            ApiError::Authentication("Invalid email or password".to_string())
        })?;

        if !password::verify(password_text, &user.password_hash)? {
            return Err(ApiError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        self.get_profile(user.id).await
    }

    /// Get the full account view, with name references resolved to text
    pub async fn get_profile(&self, user_id: i64) -> ApiResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "SELECT u.id AS user_id, u.email, f.name AS first_name, l.surname AS last_name,
                    u.profile_image_url, u.background_image_url
             FROM users u
             JOIN first_names f ON f.id = u.first_name_id
             JOIN last_names l ON l.id = u.last_name_id
             WHERE u.id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }

    /// Apply a partial profile update
    ///
    /// Fields that are absent or empty keep their stored values. Supplying a
    /// name resolves it through the dictionary; supplying a password re-hashes
    /// it. `updated_at` is always refreshed.
    pub async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> ApiResult<()> {
        let mut tx = self.db.begin().await?;

        let mut user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, first_name_id, last_name_id,
                    profile_image_url, background_image_url, created_at, updated_at
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

        if let Some(first_name) = present(&update.first_name) {
            names::validate_text(first_name)?;
            user.first_name_id =
                names::resolve_or_create(&mut tx, NameKind::First, first_name).await?;
        }
        if let Some(last_name) = present(&update.last_name) {
            names::validate_text(last_name)?;
            user.last_name_id =
                names::resolve_or_create(&mut tx, NameKind::Last, last_name).await?;
        }
        if let Some(password_text) = present(&update.password) {
            user.password_hash = password::hash(password_text)?;
        }
        if let Some(url) = present(&update.profile_image_url) {
            user.profile_image_url = url.to_string();
        }
        if let Some(url) = present(&update.background_image_url) {
            user.background_image_url = url.to_string();
        }

        sqlx::query(
            "UPDATE users SET first_name_id = ?1, last_name_id = ?2, password_hash = ?3,
                    profile_image_url = ?4, background_image_url = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(user.first_name_id)
        .bind(user.last_name_id)
        .bind(&user.password_hash)
        .bind(&user.profile_image_url)
        .bind(&user.background_image_url)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Restore the default profile image URL, returning it
    pub async fn reset_profile_image(&self, user_id: i64) -> ApiResult<String> {
        self.reset_image(user_id, "profile_image_url", DEFAULT_PROFILE_IMAGE_URL)
            .await
    }

    /// Restore the default background image URL, returning it
    pub async fn reset_background_image(&self, user_id: i64) -> ApiResult<String> {
        self.reset_image(user_id, "background_image_url", DEFAULT_BACKGROUND_IMAGE_URL)
            .await
    }

    async fn reset_image(
        &self,
        user_id: i64,
        column: &str,
        default_url: &str,
    ) -> ApiResult<String> {
        let update = format!(
            "UPDATE users SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            column
        );
        let result = sqlx::query(&update)
            .bind(default_url)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        Ok(default_url.to_string())
    }

    /// Delete the account and every contact it owns in one transaction
    pub async fn delete_account(&self, user_id: i64) -> ApiResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM phonebook_entries WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        tx.commit().await?;
        tracing::info!("Deleted account {}", user_id);

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, first_name_id, last_name_id,
                    profile_image_url, background_image_url, created_at, updated_at
             FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

/// Absent and empty both mean "leave unchanged"
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn validate_email(email: &str) -> ApiResult<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::Validation(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LEN
        )));
    }

    Ok(())
}
