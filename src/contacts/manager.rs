/// Contact ledger operations using runtime queries
use crate::{
    contacts::{ContactView, SortKey},
    error::{ApiError, ApiResult},
    names::{self, NameKind},
};
use chrono::Utc;
use sqlx::SqlitePool;

const MAX_PHONE_LEN: usize = 20;

/// Contact manager service
pub struct ContactManager {
    db: SqlitePool,
}

impl ContactManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List every contact owned by `owner_id`
    ///
    /// Ordered by the requested key with the other name as tie-breaker, using
    /// the store's binary collation.
    pub async fn list(&self, owner_id: i64, sort: SortKey) -> ApiResult<Vec<ContactView>> {
        let order = match sort {
            SortKey::FirstName => "f.name, l.surname",
            SortKey::LastName => "l.surname, f.name",
        };
        let select = format!(
            "SELECT c.id, f.name AS first_name, l.surname AS last_name, c.phone_number
             FROM phonebook_entries c
             JOIN first_names f ON f.id = c.first_name_id
             JOIN last_names l ON l.id = c.last_name_id
             WHERE c.user_id = ?1
             ORDER BY {}",
            order
        );

        let contacts = sqlx::query_as::<_, ContactView>(&select)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;

        Ok(contacts)
    }

    /// Fetch a single contact owned by `owner_id`
    pub async fn get(&self, owner_id: i64, contact_id: i64) -> ApiResult<ContactView> {
        sqlx::query_as::<_, ContactView>(
            "SELECT c.id, f.name AS first_name, l.surname AS last_name, c.phone_number
             FROM phonebook_entries c
             JOIN first_names f ON f.id = c.first_name_id
             JOIN last_names l ON l.id = c.last_name_id
             WHERE c.id = ?1 AND c.user_id = ?2",
        )
        .bind(contact_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))
    }

    /// Create a contact, resolving both names through the dictionary
    ///
    /// Duplicate name/number combinations are permitted.
    pub async fn create(
        &self,
        owner_id: i64,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> ApiResult<ContactView> {
        names::validate_text(first_name)?;
        names::validate_text(last_name)?;
        validate_phone(phone_number)?;

        let mut tx = self.db.begin().await?;

        let first_name_id = names::resolve_or_create(&mut tx, NameKind::First, first_name).await?;
        let last_name_id = names::resolve_or_create(&mut tx, NameKind::Last, last_name).await?;

        let result = sqlx::query(
            "INSERT INTO phonebook_entries (user_id, first_name_id, last_name_id, phone_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(owner_id)
        .bind(first_name_id)
        .bind(last_name_id)
        .bind(phone_number)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let contact_id = result.last_insert_rowid();
        tracing::debug!("Created contact {} for account {}", contact_id, owner_id);

        Ok(ContactView {
            id: contact_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone_number: phone_number.to_string(),
        })
    }

    /// Overwrite a contact's names and phone number
    ///
    /// Both names are re-resolved even when unchanged.
    pub async fn update(
        &self,
        owner_id: i64,
        contact_id: i64,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> ApiResult<()> {
        names::validate_text(first_name)?;
        names::validate_text(last_name)?;
        validate_phone(phone_number)?;

        let mut tx = self.db.begin().await?;

        // Ownership check before touching the dictionary
        let owned: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM phonebook_entries WHERE id = ?1 AND user_id = ?2",
        )
        .bind(contact_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(ApiError::NotFound("Contact not found".to_string()));
        }

        let first_name_id = names::resolve_or_create(&mut tx, NameKind::First, first_name).await?;
        let last_name_id = names::resolve_or_create(&mut tx, NameKind::Last, last_name).await?;

        sqlx::query(
            "UPDATE phonebook_entries SET first_name_id = ?1, last_name_id = ?2, phone_number = ?3
             WHERE id = ?4 AND user_id = ?5",
        )
        .bind(first_name_id)
        .bind(last_name_id)
        .bind(phone_number)
        .bind(contact_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Delete a contact owned by `owner_id`
    pub async fn delete(&self, owner_id: i64, contact_id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM phonebook_entries WHERE id = ?1 AND user_id = ?2")
            .bind(contact_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Contact not found".to_string()));
        }

        Ok(())
    }
}

fn validate_phone(phone_number: &str) -> ApiResult<()> {
    if phone_number.is_empty() {
        return Err(ApiError::Validation(
            "Phone number must not be empty".to_string(),
        ));
    }
    if phone_number.len() > MAX_PHONE_LEN {
        return Err(ApiError::Validation(format!(
            "Phone number must be at most {} characters",
            MAX_PHONE_LEN
        )));
    }

    Ok(())
}
