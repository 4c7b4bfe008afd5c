//! v4v - Binance spot command line
//!
//! Every command prints its result as pretty JSON on stdout. Logs go to
//! stderr, filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;
use v4v_core::init_logging;
use v4v_exchanges::prelude::*;

/// Binance spot tools: prices, balances, orders and swap-now
#[derive(Parser, Debug)]
#[command(name = "v4v", version, about, long_about = None)]
struct Cli {
    /// Use the Binance spot testnet and the TESTNET_* key pair
    #[arg(long, global = true)]
    testnet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Best ask, best bid and last price for a symbol
    Price { symbol: String },

    /// Free balances for the given assets (adds SATS when BTC is listed)
    Balances {
        #[arg(required = true)]
        assets: Vec<String>,
    },

    /// Open orders for a symbol
    OpenOrders { symbol: String },

    /// Own trades for a symbol
    Trades { symbol: String },

    /// Place a single order
    Order {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        side: OrderSide,
        #[arg(long)]
        quantity: Fixed,
        /// Limit price, or "now" to take the current bid/ask
        #[arg(long, default_value = "now")]
        price: PriceDirective,
        /// LIMIT, MARKET, LIMIT_MAKER, STOP_LOSS_LIMIT, ...
        #[arg(long = "type", default_value = "LIMIT")]
        order_type: OrderType,
        /// GTC, IOC or FOK; ignored for types without a limit price
        #[arg(long, default_value = "GTC")]
        time_in_force: TimeInForce,
        #[arg(long)]
        client_order_id: Option<ClientOrderId>,
    },

    /// Place one order now and report balances before and after
    Swap {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        side: OrderSide,
        #[arg(long)]
        quantity: Fixed,
        /// Limit price, or "now" to take the current bid/ask
        #[arg(long, default_value = "now")]
        price: PriceDirective,
        /// Raise the quantity to the minimum BTC notional when selling into BTC
        #[arg(long)]
        minimum_order: bool,
        #[arg(long)]
        client_order_id: Option<ClientOrderId>,
    },

    /// LOT_SIZE step for a symbol
    StepSize { symbol: String },

    /// Convert quote for an amount of one asset into another
    Quote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Fixed,
    },
}

impl Command {
    /// Commands served by unsigned market-data endpoints
    fn is_public(&self) -> bool {
        matches!(self, Command::Price { .. } | Command::StepSize { .. })
    }
}

#[monoio::main(enable_timer = true)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    let network = if cli.testnet {
        Network::Testnet
    } else {
        Network::Production
    };
    info!("🚀 v4v {} on {}", env!("CARGO_PKG_VERSION"), network);

    let factory = ClientFactory::from_env().context("reading settings from the environment")?;
    let spot = if cli.command.is_public() {
        factory.public_spot(network)
    } else {
        factory.spot(network)
    }
    .with_context(|| format!("building the {network} client"))?;

    let output = run(&spot, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run<A: SpotApi>(spot: &BinanceSpot<A>, command: Command) -> Result<Value> {
    let value = match command {
        Command::Price { symbol } => {
            let symbol = symbol.to_ascii_uppercase();
            serde_json::to_value(spot.get_current_price(&symbol).await?)?
        }
        Command::Balances { assets } => {
            let assets: Vec<String> = assets.iter().map(|a| a.to_ascii_uppercase()).collect();
            let assets: Vec<&str> = assets.iter().map(String::as_str).collect();
            serde_json::to_value(spot.get_balances(&assets).await?)?
        }
        Command::OpenOrders { symbol } => {
            let symbol = symbol.to_ascii_uppercase();
            serde_json::to_value(spot.get_open_orders_for_symbol(&symbol).await?)?
        }
        Command::Trades { symbol } => {
            let symbol = symbol.to_ascii_uppercase();
            serde_json::to_value(spot.get_trades_for_symbol(&symbol).await?)?
        }
        Command::Order {
            symbol,
            side,
            quantity,
            price,
            order_type,
            time_in_force,
            client_order_id,
        } => {
            let mut request = OrderRequest::limit(symbol.to_ascii_uppercase(), side, quantity, price)
                .with_order_type(order_type)
                .with_time_in_force(time_in_force);
            if let Some(id) = client_order_id {
                request = request.with_client_order_id(id);
            }
            serde_json::to_value(spot.place_order(&request).await?)?
        }
        Command::Swap {
            from,
            to,
            side,
            quantity,
            price,
            minimum_order,
            client_order_id,
        } => {
            let mut request = SwapRequest::new(from, to, side, quantity)
                .with_price(price)
                .with_minimum_order(minimum_order);
            if let Some(id) = client_order_id {
                request = request.with_client_order_id(id);
            }
            serde_json::to_value(spot.place_order_now(&request).await?)?
        }
        Command::StepSize { symbol } => {
            let symbol = symbol.to_ascii_uppercase();
            let step_size = spot.get_step_size(&symbol).await?;
            json!({ "symbol": symbol, "stepSize": step_size })
        }
        Command::Quote { from, to, amount } => {
            let quote = spot
                .get_quote(&from.to_ascii_uppercase(), &to.to_ascii_uppercase(), amount)
                .await?;
            serde_json::to_value(quote)?
        }
    };

    Ok(value)
}
