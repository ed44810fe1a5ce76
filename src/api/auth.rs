/// Registration and login endpoints
use crate::{account::Profile, context::AppContext, error::ApiResult};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Auth response: a fresh token plus the full account view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: String,
    pub background_image_url: String,
}

impl AuthResponse {
    fn new(token: String, profile: Profile) -> Self {
        Self {
            token,
            user_id: profile.user_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            profile_image_url: profile.profile_image_url,
            background_image_url: profile.background_image_url,
        }
    }
}

/// Register endpoint
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    tracing::info!("register: creating account for {}", req.email);

    let profile = ctx
        .accounts
        .register(&req.email, &req.password, &req.first_name, &req.last_name)
        .await?;

    let token = ctx.tokens.issue(profile.user_id, &profile.email)?;

    Ok(Json(AuthResponse::new(token, profile)))
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let profile = ctx.accounts.login(&req.email, &req.password).await?;

    let token = ctx.tokens.issue(profile.user_id, &profile.email)?;

    Ok(Json(AuthResponse::new(token, profile)))
}
