use phonebook_api::{config::ServerConfig, context::AppContext, error::ApiResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phonebook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing signing secret fails here, before serving
    let config = ServerConfig::from_env()?;

    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await
}
