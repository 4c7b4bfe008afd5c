//! The seam between spot operations and the transport
//!
//! `BinanceSpot` only talks to the exchange through `SpotApi`, so the swap
//! flow can run against the live REST client or a scripted in-memory fake.
//! Futures are not `Send`: monoio drives everything on one thread.

use crate::binance::types::{
    AccountInfo, BookTicker, ConvertQuote, ExchangeInfo, MyTrade, NewOrderParams,
    NewOrderResponse, OpenOrder, PriceTicker,
};
use crate::errors::Result;
use async_trait::async_trait;
use v4v_core::Fixed;

/// Binance Spot endpoints used by the operations layer
#[async_trait(?Send)]
pub trait SpotApi {
    /// Best bid/ask for a symbol
    async fn book_ticker(&self, symbol: &str) -> Result<BookTicker>;

    /// Last trade price for a symbol
    async fn ticker_price(&self, symbol: &str) -> Result<PriceTicker>;

    /// Account snapshot with per-asset balances (signed)
    async fn account(&self) -> Result<AccountInfo>;

    /// Open orders for a symbol (signed)
    async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>>;

    /// Own trades for a symbol, newest last (signed)
    async fn my_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<MyTrade>>;

    /// Submit an order (signed)
    async fn new_order(&self, params: &NewOrderParams) -> Result<NewOrderResponse>;

    /// Trading rules for a single symbol
    async fn exchange_info(&self, symbol: &str) -> Result<ExchangeInfo>;

    /// Convert quote for `from_amount` of `from_asset` (signed)
    async fn convert_quote(
        &self,
        from_asset: &str,
        to_asset: &str,
        from_amount: Fixed,
    ) -> Result<ConvertQuote>;
}
