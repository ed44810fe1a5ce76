/// Identity token issuance and verification
use crate::error::{ApiError, ApiResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tokens are valid for seven days from issuance.
const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Claims carried in the signed identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, stringified
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the signed identity tokens carried in bearer headers
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token embedding the account id and email
    pub fn issue(&self, user_id: i64, email: &str) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token's signature and expiration, returning its claims
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Allow some clock skew
        validation.leeway = 60;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("Token verification failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        ApiError::Authentication("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        ApiError::Authentication("Invalid token signature".to_string())
                    }
                    _ => ApiError::Authentication(format!("Invalid token: {}", e)),
                }
            })
    }
}
