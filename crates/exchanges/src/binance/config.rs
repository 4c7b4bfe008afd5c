//! Network selection, per-client configuration and the client factory
//!
//! Credentials come from the process environment, optionally seeded from a
//! `.env` file. Production and testnet keep separate key pairs.

use crate::binance::auth::BinanceCredentials;
use crate::binance::rest::BinanceRestClient;
use crate::binance::spot::BinanceSpot;
use crate::errors::{ExchangeError, Result};

use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

pub const PRODUCTION_BASE_URL: &str = "https://api.binance.com";
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

/// Binance caps `recvWindow` at 60 seconds
pub const MAX_RECV_WINDOW: u64 = 60_000;

pub const ENV_API_KEY: &str = "BINANCE_API_KEY";
pub const ENV_SECRET_KEY: &str = "BINANCE_SECRET_KEY";
pub const ENV_TESTNET_API_KEY: &str = "TESTNET_API_KEY";
pub const ENV_TESTNET_SECRET_KEY: &str = "TESTNET_SECRET_KEY";
pub const ENV_TIMEOUT_MS: &str = "V4V_TIMEOUT_MS";
pub const ENV_RECV_WINDOW: &str = "V4V_RECV_WINDOW";

/// Which Binance deployment to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Production,
    Testnet,
}

impl Network {
    pub fn base_url(&self) -> &'static str {
        match self {
            Network::Production => PRODUCTION_BASE_URL,
            Network::Testnet => TESTNET_BASE_URL,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Environment variables holding this network's key pair
    pub fn credential_vars(&self) -> (&'static str, &'static str) {
        match self {
            Network::Production => (ENV_API_KEY, ENV_SECRET_KEY),
            Network::Testnet => (ENV_TESTNET_API_KEY, ENV_TESTNET_SECRET_KEY),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Production => f.write_str("production"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" | "mainnet" => Ok(Network::Production),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(ExchangeError::Configuration(format!(
                "unknown network '{other}'"
            ))),
        }
    }
}

/// Configuration for one REST client
#[derive(Debug, Clone, PartialEq)]
pub struct BinanceConfig {
    pub base_url: String,
    pub credentials: Option<BinanceCredentials>,
    pub testnet: bool,
    pub timeout_ms: u64,
    pub recv_window: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self::for_network(Network::Production)
    }
}

impl BinanceConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            base_url: network.base_url().to_string(),
            credentials: None,
            testnet: network.is_testnet(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            recv_window: DEFAULT_RECV_WINDOW,
        }
    }

    pub fn testnet() -> Self {
        Self::for_network(Network::Testnet)
    }

    pub fn network(&self) -> Network {
        if self.testnet {
            Network::Testnet
        } else {
            Network::Production
        }
    }

    pub fn with_credentials(mut self, credentials: BinanceCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }

    /// Load this network's key pair from the environment
    pub fn with_env_credentials(mut self) -> Result<Self> {
        let (key_var, secret_var) = self.network().credential_vars();
        let credentials = BinanceCredentials::from_env_pair(key_var, secret_var).ok_or_else(|| {
            ExchangeError::MissingCredentials(format!("{key_var} and {secret_var} must be set"))
        })?;
        self.credentials = Some(credentials);
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ExchangeError::Configuration(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.recv_window == 0 || self.recv_window > MAX_RECV_WINDOW {
            return Err(ExchangeError::Configuration(format!(
                "recv_window must be between 1 and {MAX_RECV_WINDOW}, got {}",
                self.recv_window
            )));
        }
        Ok(())
    }
}

/// Process-wide settings: both key pairs plus transport knobs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub production: Option<BinanceCredentials>,
    pub testnet: Option<BinanceCredentials>,
    pub timeout_ms: Option<u64>,
    pub recv_window: Option<u64>,
}

impl Settings {
    /// Read settings from the environment, loading `.env` first when present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let (key_var, secret_var) = Network::Production.credential_vars();
        let production = BinanceCredentials::from_env_pair(key_var, secret_var);
        let (key_var, secret_var) = Network::Testnet.credential_vars();
        let testnet = BinanceCredentials::from_env_pair(key_var, secret_var);

        Ok(Self {
            production,
            testnet,
            timeout_ms: parse_env_u64(ENV_TIMEOUT_MS)?,
            recv_window: parse_env_u64(ENV_RECV_WINDOW)?,
        })
    }

    pub fn credentials(&self, network: Network) -> Option<&BinanceCredentials> {
        match network {
            Network::Production => self.production.as_ref(),
            Network::Testnet => self.testnet.as_ref(),
        }
    }

    /// Client configuration for `network`; credentials stay `None` when unset
    pub fn config_for(&self, network: Network) -> BinanceConfig {
        let mut config = BinanceConfig::for_network(network);
        config.credentials = self.credentials(network).cloned();
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(recv_window) = self.recv_window {
            config.recv_window = recv_window;
        }
        config
    }
}

fn parse_env_u64(var: &str) -> Result<Option<u64>> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => parse_u64(var, &raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_u64(var: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        ExchangeError::Configuration(format!("{var} must be a whole number of milliseconds, got '{raw}'"))
    })
}

/// Builds authenticated clients for either network from one `Settings`
#[derive(Debug, Clone)]
pub struct ClientFactory {
    settings: Settings,
}

impl ClientFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Result<Self> {
        Settings::from_env().map(Self::new)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Authenticated REST client for `network`
    ///
    /// Fails with `MissingCredentials` when the network's key pair is not
    /// configured.
    pub fn client(&self, network: Network) -> Result<BinanceRestClient> {
        let config = self.settings.config_for(network);
        if config.credentials.is_none() {
            let (key_var, secret_var) = network.credential_vars();
            return Err(ExchangeError::MissingCredentials(format!(
                "no {network} credentials: set {key_var} and {secret_var}"
            )));
        }

        info!("🔧 Building {} client for {}", network, config.base_url);
        BinanceRestClient::new(config)
    }

    /// Unauthenticated client for market data on `network`
    ///
    /// Signed endpoints on this client fail with `MissingCredentials`.
    pub fn public_client(&self, network: Network) -> Result<BinanceRestClient> {
        let mut config = self.settings.config_for(network);
        config.credentials = None;
        BinanceRestClient::new(config)
    }

    /// Spot operations bound to a fresh authenticated client for `network`
    pub fn spot(&self, network: Network) -> Result<BinanceSpot<BinanceRestClient>> {
        self.client(network).map(BinanceSpot::new)
    }

    /// Spot operations that only need public market data
    pub fn public_spot(&self, network: Network) -> Result<BinanceSpot<BinanceRestClient>> {
        self.public_client(network).map(BinanceSpot::new)
    }
}
