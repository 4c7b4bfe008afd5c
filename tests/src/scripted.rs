//! Scripted in-memory exchange
//!
//! Implements `SpotApi` for a single `BASEQUOTE` symbol. Balances live in
//! memory and move when an order "fills", so the swap flow can be checked
//! end to end without a network. Every endpoint counts its calls.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use v4v_core::prelude::*;
use v4v_exchanges::binance::types::{
    AccountInfo, AssetBalance, BookTicker, ConvertQuote, ExchangeInfo, MyTrade, NewOrderParams,
    NewOrderResponse, OpenOrder, PriceTicker, SymbolFilter, SymbolInfo,
};
use v4v_exchanges::{ExchangeError, OrderSide, OrderStatus, Result, SpotApi};

/// Which trading rules `exchange_info` reports
#[derive(Debug, Clone, PartialEq)]
pub enum StepRule {
    /// LOT_SIZE filter with this step
    LotSize(Fixed),
    /// Symbol exists but carries no LOT_SIZE filter
    NoLotSize,
    /// Exchange answers -1121 Invalid symbol
    UnknownSymbol,
}

/// Call counters per endpoint
#[derive(Debug, Default)]
pub struct CallCounts {
    pub book_ticker: Cell<u32>,
    pub ticker_price: Cell<u32>,
    pub account: Cell<u32>,
    pub open_orders: Cell<u32>,
    pub my_trades: Cell<u32>,
    pub new_order: Cell<u32>,
    pub exchange_info: Cell<u32>,
    pub convert_quote: Cell<u32>,
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

pub struct ScriptedExchange {
    base: String,
    quote: String,
    bid: Fixed,
    ask: Fixed,
    last: Fixed,
    step: StepRule,
    fills: bool,
    balances: RefCell<BTreeMap<String, Fixed>>,
    /// Successful account calls allowed before the error is returned
    account_error: Option<(u32, ExchangeError)>,
    order_error: Option<ExchangeError>,
    open_orders: Vec<OpenOrder>,
    trades: Vec<MyTrade>,
    orders: RefCell<Vec<NewOrderParams>>,
    pub calls: CallCounts,
}

impl ScriptedExchange {
    /// HIVEBTC-like book: bid 0.0000061, ask 0.00000612, last 0.00000611, step 0.1
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
            bid: Fixed::from_scaled(61, 7),
            ask: Fixed::from_scaled(612, 8),
            last: Fixed::from_scaled(611, 8),
            step: StepRule::LotSize(Fixed::from_scaled(1, 1)),
            fills: true,
            balances: RefCell::new(BTreeMap::new()),
            account_error: None,
            order_error: None,
            open_orders: Vec::new(),
            trades: Vec::new(),
            orders: RefCell::new(Vec::new()),
            calls: CallCounts::default(),
        }
    }

    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    pub fn with_balance(self, asset: &str, free: Fixed) -> Self {
        self.balances.borrow_mut().insert(asset.to_string(), free);
        self
    }

    pub fn with_book(mut self, bid: Fixed, ask: Fixed, last: Fixed) -> Self {
        self.bid = bid;
        self.ask = ask;
        self.last = last;
        self
    }

    pub fn with_step(mut self, step: StepRule) -> Self {
        self.step = step;
        self
    }

    /// Accept orders but leave them resting, balances untouched
    pub fn without_fills(mut self) -> Self {
        self.fills = false;
        self
    }

    pub fn with_account_error(self, error: ExchangeError) -> Self {
        self.with_account_error_after(0, error)
    }

    /// Answer the first `ok_calls` account requests, then fail every one after
    pub fn with_account_error_after(mut self, ok_calls: u32, error: ExchangeError) -> Self {
        self.account_error = Some((ok_calls, error));
        self
    }

    pub fn with_order_error(mut self, error: ExchangeError) -> Self {
        self.order_error = Some(error);
        self
    }

    pub fn with_open_order(mut self, order: OpenOrder) -> Self {
        self.open_orders.push(order);
        self
    }

    pub fn with_trade(mut self, trade: MyTrade) -> Self {
        self.trades.push(trade);
        self
    }

    /// Orders received so far, oldest first
    pub fn orders(&self) -> Vec<NewOrderParams> {
        self.orders.borrow().clone()
    }

    pub fn balance(&self, asset: &str) -> Fixed {
        self.balances.borrow().get(asset).copied().unwrap_or(Fixed::ZERO)
    }

    fn apply_fill(&self, params: &NewOrderParams, price: Fixed) {
        let notional = params.quantity * price;
        let mut balances = self.balances.borrow_mut();
        let (base_change, quote_change) = match params.side {
            OrderSide::Sell => (-params.quantity, notional),
            OrderSide::Buy => (params.quantity, -notional),
        };

        *balances.entry(self.base.clone()).or_insert(Fixed::ZERO) += base_change;
        *balances.entry(self.quote.clone()).or_insert(Fixed::ZERO) += quote_change;
    }
}

#[async_trait(?Send)]
impl SpotApi for ScriptedExchange {
    async fn book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        bump(&self.calls.book_ticker);
        Ok(BookTicker {
            symbol: symbol.to_string(),
            bid_price: self.bid,
            bid_qty: Fixed::from_i64(1000),
            ask_price: self.ask,
            ask_qty: Fixed::from_i64(1000),
        })
    }

    async fn ticker_price(&self, symbol: &str) -> Result<PriceTicker> {
        bump(&self.calls.ticker_price);
        Ok(PriceTicker {
            symbol: symbol.to_string(),
            price: self.last,
        })
    }

    async fn account(&self) -> Result<AccountInfo> {
        bump(&self.calls.account);
        if let Some((ok_calls, error)) = &self.account_error {
            if self.calls.account.get() > *ok_calls {
                return Err(error.clone());
            }
        }

        let balances = self
            .balances
            .borrow()
            .iter()
            .map(|(asset, free)| AssetBalance {
                asset: asset.clone(),
                free: *free,
                locked: Fixed::ZERO,
            })
            .collect();

        Ok(AccountInfo {
            can_trade: true,
            can_withdraw: true,
            can_deposit: true,
            update_time: timestamp_ms(),
            account_type: "SPOT".to_string(),
            balances,
            permissions: vec!["SPOT".to_string()],
        })
    }

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        bump(&self.calls.open_orders);
        Ok(self
            .open_orders
            .iter()
            .filter(|o| o.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn my_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<MyTrade>> {
        bump(&self.calls.my_trades);
        let trades = self.trades.iter().filter(|t| t.symbol == symbol).cloned();
        Ok(match limit {
            Some(limit) => trades.take(limit as usize).collect(),
            None => trades.collect(),
        })
    }

    async fn new_order(&self, params: &NewOrderParams) -> Result<NewOrderResponse> {
        bump(&self.calls.new_order);
        self.orders.borrow_mut().push(params.clone());
        if let Some(error) = &self.order_error {
            return Err(error.clone());
        }

        let price = params.price.unwrap_or(self.last);
        let order_id = u64::from(self.calls.new_order.get());
        if self.fills {
            self.apply_fill(params, price);
        }

        let executed_qty = if self.fills {
            params.quantity
        } else {
            Fixed::ZERO
        };

        Ok(NewOrderResponse {
            symbol: params.symbol.clone(),
            order_id,
            order_list_id: -1,
            client_order_id: params
                .new_client_order_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(generate_id),
            transact_time: timestamp_ms(),
            price,
            orig_qty: params.quantity,
            executed_qty,
            cummulative_quote_qty: executed_qty * price,
            status: Some(if self.fills {
                OrderStatus::Filled
            } else {
                OrderStatus::New
            }),
            time_in_force: params.time_in_force,
            order_type: Some(params.order_type),
            side: Some(params.side),
            fills: Vec::new(),
        })
    }

    async fn exchange_info(&self, symbol: &str) -> Result<ExchangeInfo> {
        bump(&self.calls.exchange_info);
        let filters = match &self.step {
            StepRule::UnknownSymbol => {
                return Err(ExchangeError::Api {
                    status: 400,
                    code: -1121,
                    msg: "Invalid symbol.".to_string(),
                });
            }
            StepRule::NoLotSize => vec![SymbolFilter::Other],
            StepRule::LotSize(step) => vec![SymbolFilter::LotSize {
                min_qty: *step,
                max_qty: Fixed::from_i64(9_000_000),
                step_size: *step,
            }],
        };

        Ok(ExchangeInfo {
            timezone: "UTC".to_string(),
            server_time: timestamp_ms(),
            symbols: vec![SymbolInfo {
                symbol: symbol.to_string(),
                status: "TRADING".to_string(),
                base_asset: self.base.clone(),
                quote_asset: self.quote.clone(),
                filters,
            }],
        })
    }

    async fn convert_quote(
        &self,
        from_asset: &str,
        _to_asset: &str,
        from_amount: Fixed,
    ) -> Result<ConvertQuote> {
        bump(&self.calls.convert_quote);
        let ratio = if from_asset == self.base {
            self.bid
        } else {
            Fixed::ONE.checked_div(self.ask)?
        };

        Ok(ConvertQuote {
            quote_id: generate_id(),
            ratio,
            inverse_ratio: Fixed::ONE.checked_div(ratio)?,
            valid_timestamp: timestamp_ms() + 10_000,
            to_amount: from_amount * ratio,
            from_amount,
        })
    }
}
