/// Contact ledger
///
/// Per-user phonebook entries referencing the shared name dictionary. Every
/// operation is scoped to the owning account in the query predicate itself;
/// another user's entry is indistinguishable from a missing one.

mod manager;

pub use manager::ContactManager;

use serde::{Deserialize, Serialize};

/// Contact entry with resolved name strings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Sort key for contact listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    FirstName,
    #[default]
    LastName,
}

impl SortKey {
    /// Parse a `sortBy` query value; anything unrecognized falls back to last name
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("firstname") => SortKey::FirstName,
            _ => SortKey::LastName,
        }
    }
}
