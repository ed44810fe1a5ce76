/// Authentication extractor
use crate::{context::AppContext, error::ApiError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

/// Authenticated caller identity, proven by the validated bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.to_string()))
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        let claims = state.tokens.verify(&token)?;

        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::Authentication("Invalid token subject".to_string()))?;

        Ok(AuthUser {
            id,
            email: claims.email,
        })
    }
}
