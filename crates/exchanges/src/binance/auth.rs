//! Binance authentication and request signing
//!
//! Signed endpoints take the urlencoded query string, append `recvWindow`
//! and `timestamp`, and sign the result with HMAC-SHA256 under the secret
//! key. The hex digest travels as the final `signature` parameter and the
//! API key as the `X-MBX-APIKEY` header.

use crate::errors::{ExchangeError, Result};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on authenticated requests
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance API key pair
#[derive(Clone, PartialEq, Eq)]
pub struct BinanceCredentials {
    pub api_key: String,
    secret_key: String,
}

impl BinanceCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Read a key pair from two environment variables
    ///
    /// `None` when either variable is unset or empty.
    pub fn from_env_pair(key_var: &str, secret_var: &str) -> Option<Self> {
        let api_key = std::env::var(key_var).ok().filter(|v| !v.trim().is_empty())?;
        let secret_key = std::env::var(secret_var).ok().filter(|v| !v.trim().is_empty())?;
        Some(Self::new(api_key.trim(), secret_key.trim()))
    }

    /// Both halves present
    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}

impl fmt::Debug for BinanceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars: Vec<char> = self.api_key.chars().collect();
        let masked_key = if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("BinanceCredentials")
            .field("api_key", &masked_key)
            .field("secret_key", &"***REDACTED***")
            .finish()
    }
}

/// Binance request signer
#[derive(Debug, Clone)]
pub struct BinanceSigner {
    credentials: BinanceCredentials,
}

impl BinanceSigner {
    pub fn new(credentials: BinanceCredentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::InvalidCredentials);
        }

        Ok(Self { credentials })
    }

    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    /// Hex-encoded HMAC-SHA256 of `payload`
    pub fn sign(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key.as_bytes())
            .map_err(|e| ExchangeError::Signing(format!("HMAC setup failed: {e}")))?;

        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Full signed query string: params, `recvWindow`, `timestamp`, `signature`
    pub fn signed_query(
        &self,
        params: &[(&str, &str)],
        recv_window: u64,
        timestamp: u64,
    ) -> Result<String> {
        let recv_window = recv_window.to_string();
        let timestamp = timestamp.to_string();

        let mut all = params.to_vec();
        all.push(("recvWindow", recv_window.as_str()));
        all.push(("timestamp", timestamp.as_str()));

        let query_string = build_query_string(&all);
        let signature = self.sign(&query_string)?;

        Ok(format!("{query_string}&signature={signature}"))
    }

    /// Check a signature against a payload
    pub fn validate_signature(&self, payload: &str, signature: &str) -> bool {
        match self.sign(payload) {
            Ok(expected_sig) => expected_sig == signature,
            Err(_) => false,
        }
    }
}

/// Urlencoded query string, parameters kept in the order given
pub fn build_query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
