//! Spot operations on top of any `SpotApi`
//!
//! Each operation maps the raw endpoint payload into a domain type and
//! classifies failures: any failure reading the account is `BadConnection`,
//! an order the exchange refuses is `OrderRejected`.

use crate::binance::types::{ConvertQuote, MyTrade, NewOrderParams, NewOrderResponse, OpenOrder};
use crate::errors::{BinanceErrorCode, ExchangeError, Result};
use crate::traits::SpotApi;
use crate::types::{BTC, BalanceSnapshot, OrderRequest, PriceDirective, PriceQuote, SATS};

use tracing::{info, warn};
use v4v_core::prelude::*;

/// Step size used when a symbol publishes no LOT_SIZE filter
pub const DEFAULT_STEP_SIZE: Fixed = Fixed::from_scaled(1, 1);

/// Spot operations bound to one exchange connection
pub struct BinanceSpot<A: SpotApi> {
    api: A,
}

impl<A: SpotApi> BinanceSpot<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Best ask, best bid and last trade price
    pub async fn get_current_price(&self, symbol: &str) -> Result<PriceQuote> {
        let book = self.api.book_ticker(symbol).await?;
        let last = self.api.ticker_price(symbol).await?;

        Ok(PriceQuote {
            ask_price: book.ask_price,
            bid_price: book.bid_price,
            current_price: last.price,
        })
    }

    /// Free balance of each requested asset
    ///
    /// Requested assets the account does not hold read as zero. When BTC is
    /// requested and positive, a `SATS` entry holds the same amount in
    /// whole satoshis.
    pub async fn get_balances(&self, assets: &[&str]) -> Result<BalanceSnapshot> {
        let account = self
            .api
            .account()
            .await
            .map_err(ExchangeError::into_bad_connection)?;

        let mut snapshot: BalanceSnapshot = assets.iter().map(|a| (*a, Fixed::ZERO)).collect();
        for balance in &account.balances {
            if assets.contains(&balance.asset.as_str()) {
                snapshot.insert(balance.asset.clone(), balance.free);
            }
        }

        let btc = snapshot.get(BTC);
        if snapshot.contains(BTC) && btc.is_positive() {
            snapshot.insert(SATS, btc.to_sats()?);
        }

        Ok(snapshot)
    }

    pub async fn get_open_orders_for_symbol(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        self.api.open_orders(symbol).await
    }

    pub async fn get_trades_for_symbol(&self, symbol: &str) -> Result<Vec<MyTrade>> {
        self.api.my_trades(symbol, None).await
    }

    /// Submit an order, resolving `PriceDirective::Now` against the book first
    ///
    /// Exchange refusals come back as `OrderRejected` with the exchange's
    /// code and message.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<NewOrderResponse> {
        if !request.quantity.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }

        let takes_price = request.order_type.takes_limit_price();
        let price = match request.price {
            PriceDirective::Limit(price) => price,
            PriceDirective::Now => self
                .get_current_price(&request.symbol)
                .await?
                .for_side(request.side),
        };
        if takes_price && !price.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!(
                "price must be positive, got {price}"
            )));
        }

        let params = NewOrderParams {
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            time_in_force: takes_price.then_some(request.time_in_force),
            quantity: request.quantity,
            price: takes_price.then_some(price),
            new_client_order_id: request.client_order_id.clone(),
        };

        info!(
            "📤 {} {} {} @ {} ({})",
            params.side, params.quantity, params.symbol, price, params.order_type
        );

        match self.api.new_order(&params).await {
            Ok(order) => {
                v4v_core::log_order!("PLACED", order.order_id, order.symbol);
                Ok(order)
            }
            Err(e) => {
                let e = e.into_order_rejection();
                v4v_core::log_error!("place_order", e);
                Err(e)
            }
        }
    }

    /// LOT_SIZE step for `symbol`, or 0.1 when the exchange has none to offer
    pub async fn get_step_size(&self, symbol: &str) -> Result<Fixed> {
        let info = match self.api.exchange_info(symbol).await {
            Ok(info) => info,
            Err(e) if e.code().map(BinanceErrorCode::from) == Some(BinanceErrorCode::BadSymbol) => {
                warn!("⚠️ {} unknown to the exchange, using step {}", symbol, DEFAULT_STEP_SIZE);
                return Ok(DEFAULT_STEP_SIZE);
            }
            Err(e) => return Err(e),
        };

        match info.symbol(symbol).and_then(|s| s.lot_step_size()) {
            Some(step) if step.is_positive() => Ok(step),
            _ => {
                warn!("⚠️ No LOT_SIZE step for {}, using {}", symbol, DEFAULT_STEP_SIZE);
                Ok(DEFAULT_STEP_SIZE)
            }
        }
    }

    /// Convert quote for swapping `amount` of `from_asset` into `to_asset`
    pub async fn get_quote(
        &self,
        from_asset: &str,
        to_asset: &str,
        amount: Fixed,
    ) -> Result<ConvertQuote> {
        if !amount.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!(
                "quote amount must be positive, got {amount}"
            )));
        }
        self.api.convert_quote(from_asset, to_asset, amount).await
    }
}
