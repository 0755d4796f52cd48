//! Request authentication.
//!
//! Every user-scoped route takes an `AuthUser` extractor. The bearer token is
//! checked against Supabase Auth; any failure becomes a 401 before the handler runs.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

const VERIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("token rejected (status {0})")]
    Rejected(u16),

    #[error("auth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth response has an invalid user id: {0}")]
    InvalidUserId(String),
}

/// The authenticated caller. All memory reads and writes are scoped to `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Resolves a bearer token to a user.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
}

/// Verifies access tokens with `GET {SUPABASE_URL}/auth/v1/user`.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(VERIFY_TIMEOUT_SECS))
                .build()?,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl TokenVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.user_endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected(status.as_u16()));
        }

        let user: SupabaseUser = response.json().await?;
        let id = Uuid::parse_str(&user.id).map_err(|_| AuthError::InvalidUserId(user.id))?;
        Ok(AuthUser {
            id,
            email: user.email,
        })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("{} {}: {}", parts.method, parts.uri.path(), AuthError::MissingToken);
            AppError::Unauthorized
        })?;

        let user = state.auth.verify(token).await.map_err(|e| {
            warn!("Authentication failed for {}: {e}", parts.uri.path());
            AppError::Unauthorized
        })?;
        debug!(
            "Authenticated {} ({})",
            user.id,
            user.email.as_deref().unwrap_or("no email")
        );
        Ok(user)
    }
}
