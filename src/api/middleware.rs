use crate::api::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};

/// Proof that the request carried the shared API secret as a bearer token.
#[derive(Debug)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::Unauthorized)?;
        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        if bearer_matches(auth_str, &state.config.auth.api_secret) {
            Ok(Self)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Exact match against `"Bearer " + secret`, compared over fixed-size digests.
fn bearer_matches(presented: &str, secret: &str) -> bool {
    let expected = Sha256::digest(format!("Bearer {secret}").as_bytes());
    let actual = Sha256::digest(presented.as_bytes());

    expected.iter().zip(actual.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
