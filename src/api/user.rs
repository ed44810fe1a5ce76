/// Profile and account management endpoints
use crate::{
    account::{Profile, ProfileUpdate},
    auth::AuthUser,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/reset-profile-image", post(reset_profile_image))
        .route(
            "/user/reset-background-image",
            post(reset_background_image),
        )
        .route("/user/account", delete(delete_account))
}

/// Get the caller's profile
async fn get_profile(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Json<Profile>> {
    let profile = ctx.accounts.get_profile(user.id).await?;

    Ok(Json(profile))
}

/// Apply a partial profile update
async fn update_profile(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<StatusCode> {
    ctx.accounts.update_profile(user.id, &update).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Restore the default profile image
async fn reset_profile_image(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let url = ctx.accounts.reset_profile_image(user.id).await?;

    Ok(Json(json!({ "profileImageUrl": url })))
}

/// Restore the default background image
async fn reset_background_image(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let url = ctx.accounts.reset_background_image(user.id).await?;

    Ok(Json(json!({ "backgroundImageUrl": url })))
}

/// Delete the caller's account and all of its contacts
async fn delete_account(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.accounts.delete_account(user.id).await?;
    tracing::info!("delete_account: removed account {}", user.id);

    Ok(Json(json!({ "message": "Account deleted" })))
}
