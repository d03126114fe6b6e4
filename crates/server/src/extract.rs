//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use heirloom_core::CartToken;

use crate::error::AppError;

/// Header carrying the client's anonymous cart token.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

/// Extracts the [`CartToken`] from the `X-Cart-Token` header.
///
/// The token is generated client-side and is the only ownership scope for
/// cart items; every cart and checkout route requires it.
pub struct ClientToken(pub CartToken);

impl<S: Send + Sync> FromRequestParts<S> for ClientToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CART_TOKEN_HEADER)
            .ok_or_else(|| AppError::BadRequest("missing X-Cart-Token header".to_string()))?;
        let token = value
            .to_str()
            .map_err(|_| AppError::BadRequest("invalid X-Cart-Token header".to_string()))?;
        if token.is_empty() {
            return Err(AppError::BadRequest("missing X-Cart-Token header".to_string()));
        }
        Ok(Self(CartToken::new(token)))
    }
}
