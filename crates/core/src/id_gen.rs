//! Client order id generation
//!
//! Binance accepts an optional `newClientOrderId` of up to 36 characters
//! drawn from `[.A-Za-z:/0-9_-]`. Ids generated here stay inside that
//! alphabet so they can be passed straight through.

use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Longest client order id the exchange accepts
pub const MAX_CLIENT_ORDER_ID_LEN: usize = 36;

/// Prefix on every generated id, makes our orders easy to spot in trade history
pub const CLIENT_ORDER_ID_PREFIX: &str = "V4V";

const ID_ALPHABET: [char; 64] = [
    '_', '-', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g',
    'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Client-assigned order identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Generate a fresh `V4V-` prefixed id
    pub fn generate() -> Self {
        Self(generate_id_with_prefix(CLIENT_ORDER_ID_PREFIX))
    }

    /// Validate a caller-supplied id
    pub fn parse(id: &str) -> Result<Self, IdError> {
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if id.len() > MAX_CLIENT_ORDER_ID_LEN {
            return Err(IdError::TooLong(id.len()));
        }
        if let Some(c) = id.chars().find(|c| !is_allowed(*c)) {
            return Err(IdError::InvalidChar(c));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ClientOrderId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Client order id validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("client order id is empty")]
    Empty,
    #[error("client order id is {0} chars, limit is 36")]
    TooLong(usize),
    #[error("client order id contains '{0}'")]
    InvalidChar(char),
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '/' | '_' | '-')
}

/// Generate a 12 character id
pub fn generate_id() -> String {
    nanoid!(12, &ID_ALPHABET)
}

/// `{prefix}-{millis}-{nanoid}`, cut to the exchange's length limit
pub fn generate_id_with_prefix(prefix: &str) -> String {
    let timestamp = crate::timing::timestamp_ms();
    let short_id = nanoid!(8, &ID_ALPHABET);
    let id = format!("{prefix}-{timestamp}-{short_id}");
    id.chars().take(MAX_CLIENT_ORDER_ID_LEN).collect()
}
