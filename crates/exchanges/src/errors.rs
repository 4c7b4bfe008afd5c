//! Exchange error types
//!
//! One error enum for the whole call graph. Transport faults, exchange
//! rejections and client-side guardrails are all variants, so callers
//! pattern-match instead of probing response payloads.

use crate::binance::types::NewOrderResponse;

use thiserror::Error;
use v4v_core::Fixed;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    /// Error body `{"code": .., "msg": ..}` returned by the exchange
    #[error("Exchange error {code} (HTTP {status}): {msg}")]
    Api { status: u16, code: i64, msg: String },

    /// Account balances could not be read
    #[error("Bad connection: {0}")]
    BadConnection(String),

    /// The exchange refused the order
    #[error("Order rejected ({code}): {msg}")]
    OrderRejected { code: i64, msg: String },

    /// Not enough free balance to cover the order, detected before submission
    #[error("Low balance: {asset} needs {required}, {available} available")]
    LowBalance {
        asset: String,
        required: Fixed,
        available: Fixed,
    },

    /// The order went through but the balances after it could not be read
    ///
    /// Funds may have moved. Resubmitting would trade a second time.
    #[error(
        "Order {} on {} placed, balances after it unavailable: {source}",
        .order.order_id,
        .order.symbol
    )]
    SwapUnreconciled {
        order: Box<NewOrderResponse>,
        source: Box<ExchangeError>,
    },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fixed point error: {0}")]
    FixedPoint(String),
}

impl ExchangeError {
    /// Failures where repeating the identical request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http(status, _) => *status >= 500 || matches!(status, 418 | 429),
            Self::Api { status, code, .. } => {
                *status >= 500
                    || matches!(status, 418 | 429)
                    || BinanceErrorCode::from(*code) == BinanceErrorCode::TooManyRequests
            }
            _ => false,
        }
    }

    /// Wrap any failure as `BadConnection`, keeping its message
    pub fn into_bad_connection(self) -> Self {
        match self {
            Self::BadConnection(_) => self,
            e => Self::BadConnection(e.to_string()),
        }
    }

    /// Turn an exchange error body into an order rejection
    ///
    /// Authentication problems stay as they are so they are not mistaken
    /// for a business-rule rejection.
    pub fn into_order_rejection(self) -> Self {
        match self {
            Self::Api { code, msg, .. } if !BinanceErrorCode::from(code).is_auth() => {
                Self::OrderRejected { code, msg }
            }
            e => e,
        }
    }

    /// Exchange error code, when the exchange sent one
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } | Self::OrderRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<v4v_core::FixedError> for ExchangeError {
    fn from(err: v4v_core::FixedError) -> Self {
        Self::FixedPoint(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Binance numeric error codes this crate branches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinanceErrorCode {
    Unknown,
    Disconnected,
    Unauthorized,
    TooManyRequests,
    TimestampOutsideRecvWindow,
    InvalidSignature,
    /// Filter failure such as LOT_SIZE or NOTIONAL
    FilterFailure,
    BadSymbol,
    NewOrderRejected,
    ApiKeyFormatInvalid,
    RejectedMbxKey,
}

impl BinanceErrorCode {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::TimestampOutsideRecvWindow
                | Self::InvalidSignature
                | Self::ApiKeyFormatInvalid
                | Self::RejectedMbxKey
        )
    }
}

impl From<i64> for BinanceErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -1001 => Self::Disconnected,
            -1002 => Self::Unauthorized,
            -1003 => Self::TooManyRequests,
            -1013 => Self::FilterFailure,
            -1021 => Self::TimestampOutsideRecvWindow,
            -1022 => Self::InvalidSignature,
            -1121 => Self::BadSymbol,
            -2010 => Self::NewOrderRejected,
            -2014 => Self::ApiKeyFormatInvalid,
            -2015 => Self::RejectedMbxKey,
            _ => Self::Unknown,
        }
    }
}
