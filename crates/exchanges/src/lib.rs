//! # v4v Exchange Integrations
//!
//! Binance Spot client and the order flows built on it.
//!
//! ## Architecture
//!
//! - **monoio-based HTTPS client** - single-threaded async, one TLS connection per request
//! - **Signed REST calls** - HMAC-SHA256 over the query string
//! - **Exact decimals** - every price, quantity and balance is a `Fixed`
//! - **`SpotApi` seam** - operations run against the live client or an in-memory fake

pub mod binance;
pub mod errors;
pub mod http;
pub mod swap;
pub mod traits;
pub mod types;

// Re-export main types
pub use binance::{BinanceRestClient, BinanceSpot, ClientFactory, Network, Settings};
pub use errors::{ExchangeError, Result};
pub use http::MonoioHttpsClient;
pub use swap::{SwapRequest, SwapResult};
pub use traits::SpotApi;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::binance::{
        BinanceConfig, BinanceCredentials, BinanceRestClient, BinanceSpot, ClientFactory,
        DEFAULT_STEP_SIZE, Network, Settings,
    };
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::swap::{SwapRequest, SwapResult};
    pub use crate::traits::SpotApi;
    pub use crate::types::*;
    pub use v4v_core::prelude::*;
}
