/// Name dictionary: deduplicated first/last name tables shared by every account
///
/// Names are created lazily on first use and never deleted. Two concurrent
/// creators racing on the same new text are arbitrated by the unique index:
/// the losing insert re-selects the winning row instead of failing the caller.
use crate::error::{ApiError, ApiResult};
use sqlx::SqliteConnection;

/// Longest name accepted by the dictionary columns
pub const MAX_NAME_LEN: usize = 100;

/// Which dictionary table a name resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    First,
    Last,
}

impl NameKind {
    fn table(self) -> &'static str {
        match self {
            NameKind::First => "first_names",
            NameKind::Last => "last_names",
        }
    }

    fn column(self) -> &'static str {
        match self {
            NameKind::First => "name",
            NameKind::Last => "surname",
        }
    }
}

/// Validate name text before it reaches the dictionary
pub fn validate_text(text: &str) -> ApiResult<()> {
    if text.is_empty() {
        return Err(ApiError::Validation("Name must not be empty".to_string()));
    }
    if text.len() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(())
}

/// Resolve `text` to its dictionary row id, inserting it on first use.
///
/// Runs on the caller's connection so it participates in the caller's
/// transaction. Inserts at most one row per call.
pub async fn resolve_or_create(
    conn: &mut SqliteConnection,
    kind: NameKind,
    text: &str,
) -> ApiResult<i64> {
    if let Some(id) = lookup(&mut *conn, kind, text).await? {
        return Ok(id);
    }

    let insert = format!(
        "INSERT INTO {} ({}) VALUES (?1)",
        kind.table(),
        kind.column()
    );
    match sqlx::query(&insert).bind(text).execute(&mut *conn).await {
        Ok(result) => Ok(result.last_insert_rowid()),
        // A concurrent creator won the race; the unique index is the authority.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            lookup(&mut *conn, kind, text).await?.ok_or_else(|| {
                ApiError::Internal(format!(
                    "Dictionary row for {:?} name missing after unique conflict",
                    kind
                ))
            })
        }
        Err(e) => Err(ApiError::Database(e)),
    }
}

async fn lookup(
    conn: &mut SqliteConnection,
    kind: NameKind,
    text: &str,
) -> ApiResult<Option<i64>> {
    let select = format!(
        "SELECT id FROM {} WHERE {} = ?1",
        kind.table(),
        kind.column()
    );
    let id: Option<i64> = sqlx::query_scalar(&select)
        .bind(text)
        .fetch_optional(conn)
        .await?;

    Ok(id)
}
