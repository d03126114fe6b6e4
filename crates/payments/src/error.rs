//! Gateway error taxonomy.

use thiserror::Error;

/// Errors surfaced by a payment gateway.
///
/// The `Display` form is operator-facing and may quote gateway detail;
/// [`GatewayError::user_message`] is the client-safe rendering and never
/// leaks raw gateway internals.
#[derive(Debug, Error, Clone)]
pub enum GatewayError {
    /// The card was declined or otherwise rejected.
    #[error("card error: {message}{}", .decline_code.as_ref().map(|c| format!(" (decline code {c})")).unwrap_or_default())]
    Card {
        /// Gateway-provided message; safe to show per Stripe's card-error contract.
        message: String,
        /// Machine-readable decline code, when the gateway provides one.
        decline_code: Option<String>,
    },

    /// Too many requests hit the gateway in too short a window.
    #[error("rate limited by payment gateway")]
    RateLimited,

    /// The request was malformed or violated a gateway constraint
    /// (e.g., partial refund exceeding the original charge).
    #[error("invalid request to payment gateway: {0}")]
    InvalidRequest(String),

    /// The gateway rejected our credentials.
    #[error("payment gateway authentication failed")]
    Authentication,

    /// The gateway could not be reached.
    #[error("could not reach payment gateway: {0}")]
    ApiConnection(String),

    /// The gateway timed out or is down. Checkout fails closed on this.
    #[error("payment gateway unavailable or timed out")]
    Unavailable,

    /// The gateway answered with something we could not interpret.
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

impl GatewayError {
    /// Client-safe message for this error.
    ///
    /// Card errors pass the gateway's own message through (Stripe documents
    /// these as customer-presentable); everything else collapses to a generic
    /// failure so gateway internals never reach the client UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Card { message, .. } => message.clone(),
            Self::RateLimited | Self::ApiConnection(_) | Self::Unavailable => {
                "Payment could not be processed right now. Please try again.".to_owned()
            }
            Self::InvalidRequest(_) | Self::Authentication | Self::UnexpectedResponse(_) => {
                "Payment could not be processed.".to_owned()
            }
        }
    }

    /// Whether the caller may retry the same checkout attempt.
    ///
    /// Only connectivity and timeout classes are retryable; every other
    /// variant is terminal for the attempt and needs new user input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ApiConnection(_) | Self::Unavailable)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Unavailable
        } else {
            Self::ApiConnection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_error_user_message_passes_through() {
        let err = GatewayError::Card {
            message: "Your card was declined.".to_owned(),
            decline_code: Some("insufficient_funds".to_owned()),
        };
        assert_eq!(err.user_message(), "Your card was declined.");
        assert!(err.to_string().contains("insufficient_funds"));
    }

    #[test]
    fn test_non_card_errors_are_generic_to_users() {
        let err = GatewayError::Authentication;
        assert!(!err.user_message().contains("authentication"));

        let err = GatewayError::InvalidRequest("amount exceeds charge am_123".to_owned());
        assert!(!err.user_message().contains("am_123"));
    }

    #[test]
    fn test_retryable_classes() {
        assert!(GatewayError::Unavailable.is_retryable());
        assert!(GatewayError::ApiConnection("dns".to_owned()).is_retryable());
        assert!(!GatewayError::RateLimited.is_retryable());
        assert!(
            !GatewayError::Card {
                message: "declined".to_owned(),
                decline_code: None
            }
            .is_retryable()
        );
    }
}
