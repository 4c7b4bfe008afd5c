//! Binance Spot REST client on the monoio HTTPS transport
//!
//! Public endpoints go through `get_request`, authenticated ones through
//! `signed_request`. Both decode the body straight into the typed payload
//! and turn any non-2xx answer into `ExchangeError::Api` (or `Http` when
//! the body is not the usual `{code, msg}` shape).

use crate::binance::auth::{API_KEY_HEADER, BinanceSigner};
use crate::binance::config::BinanceConfig;
use crate::binance::types::{
    AccountInfo, ApiErrorBody, BookTicker, ConvertQuote, ExchangeInfo, MyTrade, NewOrderParams,
    NewOrderResponse, OpenOrder, PriceTicker, ServerTime,
};
use crate::errors::{ExchangeError, Result};
use crate::http::{HttpResponse, MonoioHttpsClient};
use crate::traits::SpotApi;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use v4v_core::prelude::*;

/// Largest page `myTrades` accepts
pub const MAX_TRADES_LIMIT: u32 = 1000;

/// Binance REST client
pub struct BinanceRestClient {
    config: BinanceConfig,
    base_url: Url,
    https_client: MonoioHttpsClient,
    signer: Option<BinanceSigner>,
}

impl BinanceRestClient {
    /// Create a client; signed endpoints need `config.credentials`
    pub fn new(config: BinanceConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)?;
        let signer = config
            .credentials
            .clone()
            .map(BinanceSigner::new)
            .transpose()?;
        let https_client = MonoioHttpsClient::new(Duration::from_millis(config.timeout_ms))?;

        info!("🔗 Binance REST client created");
        info!("   Base URL: {}", base_url);
        info!("   Testnet: {}", config.testnet);
        info!("   Authenticated: {}", signer.is_some());

        Ok(Self {
            config,
            base_url,
            https_client,
            signer,
        })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }

    /// Test connectivity
    pub async fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.get_request("/api/v3/ping", &[]).await?;
        Ok(())
    }

    /// Server time in milliseconds
    pub async fn server_time(&self) -> Result<u64> {
        let time: ServerTime = self.get_request("/api/v3/time", &[]).await?;
        Ok(time.server_time)
    }

    pub async fn book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        self.get_request("/api/v3/ticker/bookTicker", &[("symbol", symbol)])
            .await
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<PriceTicker> {
        self.get_request("/api/v3/ticker/price", &[("symbol", symbol)])
            .await
    }

    pub async fn exchange_info(&self, symbol: &str) -> Result<ExchangeInfo> {
        self.get_request("/api/v3/exchangeInfo", &[("symbol", symbol)])
            .await
    }

    pub async fn account(&self) -> Result<AccountInfo> {
        self.signed_request("GET", "/api/v3/account", &[]).await
    }

    pub async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        self.signed_request("GET", "/api/v3/openOrders", &[("symbol", symbol)])
            .await
    }

    pub async fn my_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<MyTrade>> {
        let limit = limit.map(|l| l.clamp(1, MAX_TRADES_LIMIT).to_string());
        let mut params = vec![("symbol", symbol)];
        if let Some(limit) = &limit {
            params.push(("limit", limit.as_str()));
        }

        self.signed_request("GET", "/api/v3/myTrades", &params).await
    }

    pub async fn new_order(&self, order: &NewOrderParams) -> Result<NewOrderResponse> {
        let owned = order.to_query_params();
        let mut params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        params.push(("newOrderRespType", "FULL"));

        let response: NewOrderResponse =
            self.signed_request("POST", "/api/v3/order", &params).await?;

        v4v_core::log_order!("NEW", response.order_id, response.symbol);
        Ok(response)
    }

    pub async fn convert_quote(
        &self,
        from_asset: &str,
        to_asset: &str,
        from_amount: Fixed,
    ) -> Result<ConvertQuote> {
        let amount = from_amount.to_wire();
        self.signed_request(
            "POST",
            "/sapi/v1/convert/getQuote",
            &[
                ("fromAsset", from_asset),
                ("toAsset", to_asset),
                ("fromAmount", amount.as_str()),
            ],
        )
        .await
    }

    /// Unsigned GET
    async fn get_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let _timer = PerfTimer::start(format!("binance_get_{endpoint}"));

        let mut url = self.base_url.clone();
        url.set_path(endpoint);
        if !params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        debug!("📡 GET {}", url);

        let response = self
            .https_client
            .request_with_headers("GET", url.as_str(), None, &[])
            .await?;

        decode_response(response)
    }

    /// Signed request: params, `recvWindow`, `timestamp`, then `signature`
    async fn signed_request<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let _timer = PerfTimer::start(format!("binance_signed_{endpoint}"));

        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::MissingCredentials(format!("{endpoint} requires an API key pair"))
        })?;

        let query = signer.signed_query(params, self.config.recv_window, timestamp_ms())?;

        let mut url = self.base_url.clone();
        url.set_path(endpoint);
        url.set_query(Some(&query));

        debug!("📡 {} {} (signed)", method, endpoint);

        let response = self
            .https_client
            .request_with_headers(method, url.as_str(), None, &[(API_KEY_HEADER, signer.api_key())])
            .await?;

        decode_response(response)
    }
}

impl fmt::Debug for BinanceRestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceRestClient")
            .field("base_url", &self.base_url.as_str())
            .field("testnet", &self.config.testnet)
            .field("authenticated", &self.signer.is_some())
            .finish()
    }
}

/// Map a raw response to the payload or the exchange's error
pub(crate) fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(match serde_json::from_str::<ApiErrorBody>(&response.body) {
            Ok(err) => ExchangeError::Api {
                status: response.status,
                code: err.code,
                msg: err.msg,
            },
            Err(_) => ExchangeError::Http(response.status, response.body),
        });
    }

    serde_json::from_str(&response.body).map_err(|e| {
        ExchangeError::Serialization(format!("{e}: {}", response.body))
    })
}

#[async_trait(?Send)]
impl SpotApi for BinanceRestClient {
    async fn book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        BinanceRestClient::book_ticker(self, symbol).await
    }

    async fn ticker_price(&self, symbol: &str) -> Result<PriceTicker> {
        BinanceRestClient::ticker_price(self, symbol).await
    }

    async fn account(&self) -> Result<AccountInfo> {
        BinanceRestClient::account(self).await
    }

    async fn open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        BinanceRestClient::open_orders(self, symbol).await
    }

    async fn my_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<MyTrade>> {
        BinanceRestClient::my_trades(self, symbol, limit).await
    }

    async fn new_order(&self, params: &NewOrderParams) -> Result<NewOrderResponse> {
        BinanceRestClient::new_order(self, params).await
    }

    async fn exchange_info(&self, symbol: &str) -> Result<ExchangeInfo> {
        BinanceRestClient::exchange_info(self, symbol).await
    }

    async fn convert_quote(
        &self,
        from_asset: &str,
        to_asset: &str,
        from_amount: Fixed,
    ) -> Result<ConvertQuote> {
        BinanceRestClient::convert_quote(self, from_asset, to_asset, from_amount).await
    }
}
