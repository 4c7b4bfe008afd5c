//! Place-order-now: one limit order with balances recorded either side
//!
//! The flow is strictly sequential: snapshot balances, resolve the price,
//! size the order to the lot step, check the from-asset balance, submit,
//! then snapshot again and report the difference. A failure before the
//! order aborts the remaining steps. Once the order is placed it is never
//! dropped: a failed closing snapshot returns it inside `SwapUnreconciled`.

use crate::binance::spot::BinanceSpot;
use crate::binance::types::NewOrderResponse;
use crate::errors::{ExchangeError, Result};
use crate::traits::SpotApi;
use crate::types::{
    BTC, BalanceReport, BalanceSnapshot, OrderRequest, OrderSide, PriceDirective, PriceQuote, SATS,
};

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{error, info, warn};
use v4v_core::prelude::*;

/// Smallest BTC notional the swap flow will size an order to
pub const MIN_BTC_NOTIONAL: Fixed = Fixed::from_scaled(11, 5);

/// Decimal places kept for BTC amounts and cross rates
pub const BTC_DECIMALS: u32 = 8;

/// Swap `quantity` of the base asset against the quote asset
///
/// The symbol is `from_asset` followed by `to_asset`. `side` is applied to
/// that symbol as given.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub from_asset: String,
    pub to_asset: String,
    pub side: OrderSide,
    pub quantity: Fixed,
    pub price: PriceDirective,
    /// Raise the quantity to the minimum BTC notional when selling into BTC
    pub minimum_order: bool,
    pub client_order_id: Option<ClientOrderId>,
}

impl SwapRequest {
    pub fn new(
        from_asset: impl Into<String>,
        to_asset: impl Into<String>,
        side: OrderSide,
        quantity: Fixed,
    ) -> Self {
        Self {
            from_asset: from_asset.into().to_ascii_uppercase(),
            to_asset: to_asset.into().to_ascii_uppercase(),
            side,
            quantity,
            price: PriceDirective::Now,
            minimum_order: false,
            client_order_id: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<PriceDirective>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_minimum_order(mut self, minimum_order: bool) -> Self {
        self.minimum_order = minimum_order;
        self
    }

    pub fn with_client_order_id(mut self, id: ClientOrderId) -> Self {
        self.client_order_id = Some(id);
        self
    }

    pub fn symbol(&self) -> String {
        format!("{}{}", self.from_asset, self.to_asset)
    }
}

/// Exchange order result merged with the prices and balances around it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapResult {
    #[serde(flatten)]
    pub order: NewOrderResponse,
    /// Book and last price, present when the price was resolved from the book
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceQuote>,
    /// Quantity actually submitted
    pub quantity: Fixed,
    /// Limit price actually submitted
    pub price: Fixed,
    pub balances: BalanceReport,
}

impl<A: SpotApi> BinanceSpot<A> {
    /// Submit one limit order now and report balances before and after
    pub async fn place_order_now(&self, request: &SwapRequest) -> Result<SwapResult> {
        let symbol = request.symbol();
        let assets = [request.from_asset.as_str(), request.to_asset.as_str()];

        let before = self.get_balances(&assets).await?;

        let (price, prices) = match request.price {
            PriceDirective::Limit(price) => (price, None),
            PriceDirective::Now => {
                let quote = self.get_current_price(&symbol).await?;
                (quote.for_side(request.side), Some(quote))
            }
        };
        if !price.is_positive() {
            return Err(ExchangeError::InvalidOrder(format!(
                "no usable {} price for {symbol}: {price}",
                request.side
            )));
        }

        let step = self.get_step_size(&symbol).await?;
        let enforce_minimum = request.minimum_order && request.to_asset == BTC;
        let quantity = normalize_quantity(request.quantity, price, step, enforce_minimum)?;

        let available = before.get(&request.from_asset);
        if quantity > available {
            warn!(
                "💸 {} {} needed for {}, only {} available",
                quantity, request.from_asset, symbol, available
            );
            return Err(ExchangeError::LowBalance {
                asset: request.from_asset.clone(),
                required: quantity,
                available,
            });
        }

        let client_order_id = request
            .client_order_id
            .clone()
            .unwrap_or_else(ClientOrderId::generate);

        info!(
            "🔁 Swap {} {} {} @ {} (step {}, id {})",
            request.side, quantity, symbol, price, step, client_order_id
        );

        let order = self
            .place_order(
                &OrderRequest::limit(&symbol, request.side, quantity, price)
                    .with_client_order_id(client_order_id),
            )
            .await?;

        let after = match self.get_balances(&assets).await {
            Ok(after) => after,
            Err(e) => {
                error!(
                    "❌ Order {} ({}) on {} placed but balances after it failed: {}",
                    order.order_id, order.client_order_id, symbol, e
                );
                return Err(ExchangeError::SwapUnreconciled {
                    order: Box::new(order),
                    source: Box::new(e),
                });
            }
        };
        let delta = balance_delta(&before, &after, &request.from_asset, &request.to_asset)?;

        Ok(SwapResult {
            order,
            prices,
            quantity,
            price,
            balances: BalanceReport {
                before,
                after,
                delta,
            },
        })
    }
}

/// Quantity to submit: optionally floored at the minimum BTC notional,
/// then rounded up to a whole number of steps
pub fn normalize_quantity(
    requested: Fixed,
    price: Fixed,
    step: Fixed,
    enforce_btc_minimum: bool,
) -> Result<Fixed> {
    let mut quantity = requested;
    if enforce_btc_minimum {
        let floor = MIN_BTC_NOTIONAL.checked_div(price)?;
        quantity = quantity.max(floor);
    }

    Ok(quantity.round_up_to_step(step)?)
}

/// `after - before` for every asset in either snapshot
///
/// BTC is kept to 8 decimals. When the snapshots carry `SATS` and one of
/// the legs is not BTC, a `SATS/<asset>` entry gives the realised rate in
/// satoshis per unit of that asset (zero when the asset did not move).
pub fn balance_delta(
    before: &BalanceSnapshot,
    after: &BalanceSnapshot,
    from_asset: &str,
    to_asset: &str,
) -> Result<BalanceSnapshot> {
    let assets: BTreeSet<&str> = before.assets().chain(after.assets()).collect();

    let mut delta = BalanceSnapshot::new();
    for asset in assets {
        let change = after.get(asset) - before.get(asset);
        let change = if asset == BTC {
            change.round_dp(BTC_DECIMALS)
        } else {
            change
        };
        delta.insert(asset, change);
    }

    let other = [from_asset, to_asset]
        .into_iter()
        .find(|asset| *asset != BTC && *asset != SATS);
    if let (Some(other), true) = (other, delta.contains(SATS)) {
        let moved = delta.get(other).abs();
        let rate = if moved.is_zero() {
            Fixed::ZERO
        } else {
            delta
                .get(SATS)
                .abs()
                .checked_div(moved)?
                .round_dp(BTC_DECIMALS)
                .normalize()
        };
        delta.insert(format!("{SATS}/{other}"), rate);
    }

    Ok(delta)
}
