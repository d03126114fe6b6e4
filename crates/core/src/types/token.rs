//! Cart token - the anonymous client session identifier.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token identifying an anonymous client's cart.
///
/// The token lives in the client's browser and is the only ownership check
/// for cart items: two tokens never see or mutate each other's items. It is
/// not an authenticated identity; a client who clears their browser storage
/// simply starts a new cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(String);

impl CartToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing token string (e.g., from a request header).
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CartToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for CartToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(CartToken::generate(), CartToken::generate());
    }

    #[test]
    fn test_round_trips_header_value() {
        let token = CartToken::new("abc-123");
        assert_eq!(token.as_str(), "abc-123");
        assert_eq!(token.to_string(), "abc-123");
    }
}
