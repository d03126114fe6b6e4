//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Client-facing messages never include storage or
//! gateway internals; card errors pass through their gateway message since
//! the client has to act on it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use heirloom_orders::{CartError, CatalogError, CheckoutError};

/// Application-level error type for the ordering API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_)
                | Self::Cart(CartError::Repository(_))
                | Self::Checkout(
                    CheckoutError::Repository(_) | CheckoutError::GatewayUnavailable
                )
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                // Missing and foreign items are indistinguishable to the client
                CartError::NotFound | CartError::Forbidden => StatusCode::NOT_FOUND,
                CartError::InvalidState => StatusCode::CONFLICT,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::PaymentNotConfirmed | CheckoutError::Gateway(_) => {
                    StatusCode::PAYMENT_REQUIRED
                }
                CheckoutError::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Cart(err) => match err {
                CartError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Repository(_) => "Internal server error".to_string(),
                CheckoutError::GatewayUnavailable => {
                    "Payment could not be verified, please try again".to_string()
                }
                CheckoutError::Gateway(gateway) => gateway.user_message(),
                other => other.to_string(),
            },
            Self::Catalog(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
