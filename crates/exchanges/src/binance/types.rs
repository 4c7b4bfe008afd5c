//! Binance Spot REST payloads
//!
//! Decimal fields arrive as JSON strings and deserialize straight into
//! `Fixed`; nothing passes through `f64`.

use crate::types::{OrderSide, OrderStatus, OrderType, TimeInForce};
use serde::{Deserialize, Serialize};
use v4v_core::prelude::*;

/// Error body returned with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// GET /api/v3/time
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub server_time: u64,
}

/// GET /api/v3/ticker/bookTicker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: Fixed,
    pub bid_qty: Fixed,
    pub ask_price: Fixed,
    pub ask_qty: Fixed,
}

/// GET /api/v3/ticker/price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTicker {
    pub symbol: String,
    pub price: Fixed,
}

/// GET /api/v3/account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_withdraw: bool,
    #[serde(default)]
    pub can_deposit: bool,
    #[serde(default)]
    pub update_time: u64,
    #[serde(default)]
    pub account_type: String,
    pub balances: Vec<AssetBalance>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AccountInfo {
    pub fn balance(&self, asset: &str) -> Option<&AssetBalance> {
        self.balances.iter().find(|b| b.asset == asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Fixed,
    pub locked: Fixed,
}

/// Partial fill attached to a FULL order response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: Fixed,
    pub qty: Fixed,
    pub commission: Fixed,
    pub commission_asset: String,
    #[serde(default)]
    pub trade_id: i64,
}

/// POST /api/v3/order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default = "no_order_list")]
    pub order_list_id: i64,
    pub client_order_id: String,
    pub transact_time: u64,
    #[serde(default)]
    pub price: Fixed,
    #[serde(default)]
    pub orig_qty: Fixed,
    #[serde(default)]
    pub executed_qty: Fixed,
    #[serde(default)]
    pub cummulative_quote_qty: Fixed,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(rename = "type", default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub side: Option<OrderSide>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

impl NewOrderResponse {
    pub fn is_filled(&self) -> bool {
        self.status == Some(OrderStatus::Filled)
    }
}

fn no_order_list() -> i64 {
    -1
}

/// GET /api/v3/openOrders element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default = "no_order_list")]
    pub order_list_id: i64,
    pub client_order_id: String,
    pub price: Fixed,
    pub orig_qty: Fixed,
    pub executed_qty: Fixed,
    pub cummulative_quote_qty: Fixed,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(default)]
    pub stop_price: Fixed,
    #[serde(default)]
    pub iceberg_qty: Fixed,
    pub time: u64,
    pub update_time: u64,
    #[serde(default)]
    pub is_working: bool,
    #[serde(default)]
    pub orig_quote_order_qty: Fixed,
}

impl OpenOrder {
    pub fn remaining_qty(&self) -> Fixed {
        self.orig_qty - self.executed_qty
    }
}

/// GET /api/v3/myTrades element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTrade {
    pub symbol: String,
    pub id: u64,
    pub order_id: u64,
    #[serde(default = "no_order_list")]
    pub order_list_id: i64,
    pub price: Fixed,
    pub qty: Fixed,
    pub quote_qty: Fixed,
    pub commission: Fixed,
    pub commission_asset: String,
    pub time: u64,
    pub is_buyer: bool,
    pub is_maker: bool,
    #[serde(default)]
    pub is_best_match: bool,
}

impl MyTrade {
    pub fn executed_at(&self) -> Timestamp {
        Timestamp::from_millis(self.time)
    }

    pub fn side(&self) -> OrderSide {
        if self.is_buyer {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }
}

/// GET /api/v3/exchangeInfo
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub server_time: u64,
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

impl SymbolInfo {
    /// `stepSize` of the LOT_SIZE filter
    pub fn lot_step_size(&self) -> Option<Fixed> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize { step_size, .. } => Some(*step_size),
            _ => None,
        })
    }

    /// `tickSize` of the PRICE_FILTER filter
    pub fn tick_size(&self) -> Option<Fixed> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::PriceFilter { tick_size, .. } => Some(*tick_size),
            _ => None,
        })
    }

    /// Minimum notional from NOTIONAL, or the older MIN_NOTIONAL
    pub fn min_notional(&self) -> Option<Fixed> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::Notional { min_notional } | SymbolFilter::MinNotional { min_notional } => {
                Some(*min_notional)
            }
            _ => None,
        })
    }
}

/// Symbol trading rules, tagged by `filterType`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter {
        min_price: Fixed,
        max_price: Fixed,
        tick_size: Fixed,
    },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: Fixed,
        max_qty: Fixed,
        step_size: Fixed,
    },
    #[serde(rename = "NOTIONAL", rename_all = "camelCase")]
    Notional { min_notional: Fixed },
    #[serde(rename = "MIN_NOTIONAL", rename_all = "camelCase")]
    MinNotional { min_notional: Fixed },
    #[serde(other)]
    Other,
}

/// POST /sapi/v1/convert/getQuote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuote {
    pub quote_id: String,
    pub ratio: Fixed,
    pub inverse_ratio: Fixed,
    pub valid_timestamp: u64,
    pub to_amount: Fixed,
    pub from_amount: Fixed,
}

/// Resolved parameters for POST /api/v3/order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderParams {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Fixed,
    pub price: Option<Fixed>,
    pub new_client_order_id: Option<ClientOrderId>,
}

impl NewOrderParams {
    /// Query parameters in the order the exchange documents them
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", self.symbol.clone()),
            ("side", self.side.to_string()),
            ("type", self.order_type.to_string()),
        ];

        if let Some(tif) = self.time_in_force {
            params.push(("timeInForce", tif.to_string()));
        }
        params.push(("quantity", self.quantity.to_wire()));
        if let Some(price) = self.price {
            params.push(("price", price.to_wire()));
        }
        if let Some(id) = &self.new_client_order_id {
            params.push(("newClientOrderId", id.to_string()));
        }

        params
    }
}
