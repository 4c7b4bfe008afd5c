//! Spot operations against the scripted exchange

use crate::scripted::{ScriptedExchange, StepRule};
use rstest::*;
use v4v_core::fixed;
use v4v_core::prelude::*;
use v4v_exchanges::binance::types::{MyTrade, OpenOrder};
use v4v_exchanges::prelude::*;

fn open_order(symbol: &str, order_id: u64) -> OpenOrder {
    OpenOrder {
        symbol: symbol.to_string(),
        order_id,
        order_list_id: -1,
        client_order_id: format!("resting-{order_id}"),
        price: fixed!(0.0000070),
        orig_qty: fixed!(50),
        executed_qty: fixed!(12.5),
        cummulative_quote_qty: fixed!(0.0000875),
        status: OrderStatus::PartiallyFilled,
        time_in_force: TimeInForce::Gtc,
        order_type: OrderType::Limit,
        side: OrderSide::Sell,
        stop_price: Fixed::ZERO,
        iceberg_qty: Fixed::ZERO,
        time: 1_700_000_000_000,
        update_time: 1_700_000_000_500,
        is_working: true,
        orig_quote_order_qty: Fixed::ZERO,
    }
}

fn trade(symbol: &str, id: u64) -> MyTrade {
    MyTrade {
        symbol: symbol.to_string(),
        id,
        order_id: 7,
        order_list_id: -1,
        price: fixed!(0.0000061),
        qty: fixed!(20),
        quote_qty: fixed!(0.000122),
        commission: fixed!(0.00000012),
        commission_asset: "BTC".to_string(),
        time: 1_700_000_000_000,
        is_buyer: false,
        is_maker: false,
        is_best_match: true,
    }
}

#[monoio::test]
async fn test_current_price() {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC"));

    let quote = spot.get_current_price("HIVEBTC").await.unwrap();

    assert_eq!(quote.ask_price, fixed!(0.00000612));
    assert_eq!(quote.bid_price, fixed!(0.0000061));
    assert_eq!(quote.current_price, fixed!(0.00000611));
    assert_eq!(spot.api().calls.book_ticker.get(), 1);
    assert_eq!(spot.api().calls.ticker_price.get(), 1);
}

#[monoio::test]
async fn test_zero_btc_has_no_sats() {
    let spot = BinanceSpot::new(
        ScriptedExchange::new("HIVE", "BTC")
            .with_balance("HIVE", fixed!(100))
            .with_balance("BTC", Fixed::ZERO),
    );

    let balances = spot.get_balances(&["HIVE", "BTC"]).await.unwrap();

    assert_eq!(balances.len(), 2);
    assert_eq!(balances.get("HIVE"), fixed!(100));
    assert_eq!(balances.get("BTC"), Fixed::ZERO);
    assert!(!balances.contains("SATS"));
}

#[rstest]
#[case::whole(fixed!(0.00123456), fixed!(123456))]
#[case::one_sat(fixed!(0.00000001), fixed!(1))]
#[case::one_coin(fixed!(1), fixed!(100000000))]
#[monoio::test]
async fn test_sats_entry(#[case] btc: Fixed, #[case] sats: Fixed) {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_balance("BTC", btc));

    let balances = spot.get_balances(&["HIVE", "BTC"]).await.unwrap();

    assert_eq!(balances.get("SATS"), sats);
    assert_eq!(balances.get("HIVE"), Fixed::ZERO);
    assert!(balances.contains("HIVE"));
}

#[monoio::test]
async fn test_sats_only_when_btc_requested() {
    let spot = BinanceSpot::new(
        ScriptedExchange::new("HIVE", "BTC")
            .with_balance("HIVE", fixed!(5))
            .with_balance("BTC", fixed!(0.5)),
    );

    let balances = spot.get_balances(&["HIVE"]).await.unwrap();

    assert_eq!(balances.len(), 1);
    assert!(!balances.contains("BTC"));
    assert!(!balances.contains("SATS"));
}

#[monoio::test]
async fn test_balance_snapshots_are_repeatable() {
    let spot = BinanceSpot::new(
        ScriptedExchange::new("HIVE", "BTC")
            .with_balance("HIVE", fixed!(100))
            .with_balance("BTC", fixed!(0.001)),
    );

    let first = spot.get_balances(&["HIVE", "BTC"]).await.unwrap();
    let second = spot.get_balances(&["HIVE", "BTC"]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(spot.api().calls.account.get(), 2);
}

#[rstest]
#[case::bad_key(ExchangeError::Api { status: 401, code: -2014, msg: "API-key format invalid.".to_string() })]
#[case::unreachable(ExchangeError::Network("TCP connect to api.binance.com failed".to_string()))]
#[case::timed_out(ExchangeError::Timeout("GET /api/v3/account exceeded 5000ms".to_string()))]
#[case::rate_limited(ExchangeError::Api { status: 429, code: -1003, msg: "Too many requests.".to_string() })]
#[case::gateway(ExchangeError::Http(502, "Bad Gateway".to_string()))]
#[monoio::test]
async fn test_balances_bad_connection(#[case] error: ExchangeError) {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_account_error(error));

    let err = spot.get_balances(&["HIVE", "BTC"]).await.unwrap_err();

    assert!(matches!(err, ExchangeError::BadConnection(_)), "got {err:?}");
}

#[monoio::test]
async fn test_open_orders_and_trades_by_symbol() {
    let spot = BinanceSpot::new(
        ScriptedExchange::new("HIVE", "BTC")
            .with_open_order(open_order("HIVEBTC", 1))
            .with_open_order(open_order("ETHBTC", 2))
            .with_trade(trade("HIVEBTC", 10))
            .with_trade(trade("HIVEBTC", 11)),
    );

    let orders = spot.get_open_orders_for_symbol("HIVEBTC").await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].remaining_qty(), fixed!(37.5));

    let trades = spot.get_trades_for_symbol("HIVEBTC").await.unwrap();
    assert_eq!(trades.iter().map(|t| t.id).collect::<Vec<_>>(), [10, 11]);
    assert_eq!(trades[0].side(), OrderSide::Sell);

    assert!(spot.get_trades_for_symbol("ETHBTC").await.unwrap().is_empty());
}

#[rstest]
#[case::buy_takes_ask(OrderSide::Buy, fixed!(0.00000612))]
#[case::sell_takes_bid(OrderSide::Sell, fixed!(0.0000061))]
#[monoio::test]
async fn test_place_order_now_price(#[case] side: OrderSide, #[case] expected: Fixed) {
    let spot = BinanceSpot::new(
        ScriptedExchange::new("HIVE", "BTC")
            .with_balance("HIVE", fixed!(100))
            .with_balance("BTC", fixed!(1))
            .without_fills(),
    );

    let order = spot
        .place_order(&OrderRequest::limit("HIVEBTC", side, fixed!(10), PriceDirective::Now))
        .await
        .unwrap();

    assert_eq!(order.price, expected);
    assert_eq!(order.status, Some(OrderStatus::New));
    assert_eq!(spot.api().orders()[0].price, Some(expected));
}

#[monoio::test]
async fn test_market_order_omits_price() {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_balance("HIVE", fixed!(100)));

    spot.place_order(
        &OrderRequest::limit("HIVEBTC", OrderSide::Sell, fixed!(10), PriceDirective::Now)
            .with_order_type(OrderType::Market),
    )
    .await
    .unwrap();

    let sent = &spot.api().orders()[0];
    assert_eq!(sent.order_type, OrderType::Market);
    assert_eq!(sent.price, None);
    assert_eq!(sent.time_in_force, None);
}

#[rstest]
#[case::zero(Fixed::ZERO)]
#[case::negative(-fixed!(1))]
#[monoio::test]
async fn test_place_order_rejects_bad_quantity(#[case] quantity: Fixed) {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC"));

    let err = spot
        .place_order(&OrderRequest::limit("HIVEBTC", OrderSide::Buy, quantity, fixed!(0.000006)))
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::InvalidOrder(_)));
    assert_eq!(spot.api().calls.new_order.get(), 0);
}

#[monoio::test]
async fn test_place_order_rejection() {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_order_error(
        ExchangeError::Api {
            status: 400,
            code: -2010,
            msg: "Account has insufficient balance for requested action.".to_string(),
        },
    ));

    let err = spot
        .place_order(&OrderRequest::limit("HIVEBTC", OrderSide::Buy, fixed!(10), fixed!(0.000006)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(-2010));
    assert!(matches!(err, ExchangeError::OrderRejected { .. }));
}

#[monoio::test]
async fn test_place_order_auth_failure_stays_api_error() {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_order_error(
        ExchangeError::Api {
            status: 400,
            code: -1022,
            msg: "Signature for this request is not valid.".to_string(),
        },
    ));

    let err = spot
        .place_order(&OrderRequest::limit("HIVEBTC", OrderSide::Buy, fixed!(10), fixed!(0.000006)))
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::Api { code: -1022, .. }));
}

#[rstest]
#[case::published(StepRule::LotSize(fixed!(0.01)), fixed!(0.01))]
#[case::unknown_symbol(StepRule::UnknownSymbol, fixed!(0.1))]
#[case::no_lot_size(StepRule::NoLotSize, fixed!(0.1))]
#[monoio::test]
async fn test_step_size(#[case] rule: StepRule, #[case] expected: Fixed) {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC").with_step(rule));

    assert_eq!(spot.get_step_size("HIVEBTC").await.unwrap(), expected);
}

#[monoio::test]
async fn test_quote() {
    let spot = BinanceSpot::new(ScriptedExchange::new("HIVE", "BTC"));

    let quote = spot.get_quote("HIVE", "BTC", fixed!(100)).await.unwrap();
    assert_eq!(quote.from_amount, fixed!(100));
    assert_eq!(quote.to_amount, fixed!(0.00061));

    let err = spot.get_quote("HIVE", "BTC", Fixed::ZERO).await.unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidOrder(_)));
    assert_eq!(spot.api().calls.convert_quote.get(), 1);
}
