//! Bearer-token identity verification.
//!
//! The core only needs `verify(credential) -> user_id`; the verifier trait
//! keeps the HTTP layer independent of the token scheme. The default
//! implementation validates HS256 JWTs.

use crate::api::AppState;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Identity verification collaborator
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a bearer credential to a user identifier
    async fn verify(&self, credential: &str) -> Result<String>;
}

/// JWT claims carried by SafeRoad tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier
    pub sub: String,
    /// Expiry (seconds since epoch)
    pub exp: usize,
}

/// HS256 JWT verifier
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<String> {
        let token_data = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::warn!(error = %e, "Token verification failed");
                AppError::Unauthenticated("Invalid or expired token".to_string())
            })?;

        Ok(token_data.claims.sub)
    }
}

/// Authenticated caller, available to handlers behind `require_auth`
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
}

/// Middleware: verify the bearer token and attach a `UserContext`
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;
    let user_id = state.verifier.verify(&token).await?;

    req.extensions_mut().insert(UserContext { user_id });

    Ok(next.run(req).await)
}

/// Extract bearer token from the Authorization header
fn extract_bearer_token(req: &Request) -> Result<String> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Malformed Authorization header".to_string()))?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthenticated("Malformed Authorization header".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthenticated(
            "Expected a bearer token".to_string(),
        ));
    }

    Ok(token.to_string())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<UserContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Missing authentication".to_string()))
    }
}
