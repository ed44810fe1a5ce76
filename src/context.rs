/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    contacts::ContactManager,
    db,
    error::ApiResult,
    token::TokenIssuer,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub contacts: Arc<ContactManager>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        Ok(Self::with_pool(config, pool))
    }

    /// Assemble the context around an existing pool
    ///
    /// Tests use this with in-memory databases.
    pub fn with_pool(config: ServerConfig, pool: SqlitePool) -> Self {
        let accounts = Arc::new(AccountManager::new(pool.clone()));
        let contacts = Arc::new(ContactManager::new(pool.clone()));
        let tokens = Arc::new(TokenIssuer::new(&config.authentication.jwt_secret));

        Self {
            config: Arc::new(config),
            db: pool,
            accounts,
            contacts,
            tokens,
        }
    }
}
