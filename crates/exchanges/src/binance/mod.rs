//! Binance Spot integration
//!
//! `rest` speaks the wire protocol, `spot` and the swap flow build the
//! operations on top of it, `config` decides which deployment and keys a
//! client gets.

pub mod auth;
pub mod config;
pub mod rest;
pub mod spot;
pub mod types;

pub use auth::{BinanceCredentials, BinanceSigner};
pub use config::{BinanceConfig, ClientFactory, Network, Settings};
pub use rest::BinanceRestClient;
pub use spot::{BinanceSpot, DEFAULT_STEP_SIZE};
pub use types::*;
