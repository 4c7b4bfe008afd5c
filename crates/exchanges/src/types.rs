//! Domain types shared by the REST client, the operations and the CLI
//!
//! All amounts are `Fixed`. Enum variants serialise to the exchange's
//! SCREAMING_SNAKE_CASE spelling so they can go straight onto the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use v4v_core::prelude::*;

/// Asset code for bitcoin
pub const BTC: &str = "BTC";

/// Synthesised balance entry: BTC balance in satoshis
pub const SATS: &str = "SATS";

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side '{other}', expected BUY or SELL")),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    Limit,
    Market,
    LimitMaker,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::LimitMaker => "LIMIT_MAKER",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
        }
    }

    /// Whether the exchange expects `price` and `timeInForce` for this type
    pub fn takes_limit_price(&self) -> bool {
        matches!(
            self,
            OrderType::Limit | OrderType::StopLossLimit | OrderType::TakeProfitLimit
        )
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "LIMIT" => Ok(OrderType::Limit),
            "MARKET" => Ok(OrderType::Market),
            "LIMIT_MAKER" => Ok(OrderType::LimitMaker),
            "STOP_LOSS" => Ok(OrderType::StopLoss),
            "STOP_LOSS_LIMIT" => Ok(OrderType::StopLossLimit),
            "TAKE_PROFIT" => Ok(OrderType::TakeProfit),
            "TAKE_PROFIT_LIMIT" => Ok(OrderType::TakeProfitLimit),
            other => Err(format!("unknown order type '{other}'")),
        }
    }
}

/// Time in force
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good till canceled
    #[default]
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            other => Err(format!("unknown time in force '{other}', expected GTC, IOC or FOK")),
        }
    }
}

/// Order status as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PendingNew,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
    ExpiredInMatch,
}

/// Best bid/ask and last trade price for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ask_price: Fixed,
    pub bid_price: Fixed,
    pub current_price: Fixed,
}

impl PriceQuote {
    /// Price a marketable order would take: the ask for a buy, the bid for a sell
    pub fn for_side(&self, side: OrderSide) -> Fixed {
        match side {
            OrderSide::Buy => self.ask_price,
            OrderSide::Sell => self.bid_price,
        }
    }
}

/// Either an explicit limit price or "whatever the book says now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirective {
    Now,
    Limit(Fixed),
}

impl FromStr for PriceDirective {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("now") {
            Ok(PriceDirective::Now)
        } else {
            Fixed::from_str_exact(s).map(PriceDirective::Limit)
        }
    }
}

impl fmt::Display for PriceDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDirective::Now => f.write_str("now"),
            PriceDirective::Limit(price) => write!(f, "{price}"),
        }
    }
}

impl From<Fixed> for PriceDirective {
    fn from(price: Fixed) -> Self {
        PriceDirective::Limit(price)
    }
}

/// Free balance per asset
///
/// Lookups of assets that are not present read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(BTreeMap<String, Fixed>);

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance for `asset`, zero when absent
    pub fn get(&self, asset: &str) -> Fixed {
        self.0.get(asset).copied().unwrap_or(Fixed::ZERO)
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.0.contains_key(asset)
    }

    pub fn insert(&mut self, asset: impl Into<String>, amount: Fixed) {
        self.0.insert(asset.into(), amount);
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Fixed)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Fixed)> for BalanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, Fixed)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Balances either side of an order and their difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub before: BalanceSnapshot,
    pub after: BalanceSnapshot,
    pub delta: BalanceSnapshot,
}

/// Order to submit
///
/// `symbol` is the base asset followed by the quote asset, e.g. `HIVEBTC`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Fixed,
    pub price: PriceDirective,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub client_order_id: Option<ClientOrderId>,
}

impl OrderRequest {
    /// LIMIT / GTC order
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Fixed,
        price: impl Into<PriceDirective>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price: price.into(),
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Gtc,
            client_order_id: None,
        }
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    pub fn with_client_order_id(mut self, id: ClientOrderId) -> Self {
        self.client_order_id = Some(id);
        self
    }
}
