//! Alpaca integration for paper and live trading.
//!
//! One client covers the trading API (account, positions, orders, clock,
//! assets) and the market data API (latest and historical daily bars).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trading_core::error::{BrokerError, DataError};
use trading_core::traits::{AssetSource, Broker, PriceSource};
use trading_core::types::{
    Account, AssetCandidate, AssetClass, AssetStatus, Exchange, OrderConfirmation, OrderRequest,
    OrderStatus, Position, PriceBar, PriceSeries, Side,
};
use tracing::{debug, info};

/// Symbols per market data request.
const DEFAULT_BATCH_SIZE: usize = 200;
/// Bars per page on the historical endpoint.
const PAGE_LIMIT: usize = 10_000;

/// Alpaca API configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub paper: bool,
    /// Market data feed (`iex` or `sip`)
    pub data_feed: String,
}

impl AlpacaConfig {
    /// Create config directly with key and secret.
    pub fn new(api_key: String, api_secret: String, paper: bool) -> Self {
        Self {
            api_key,
            api_secret,
            paper,
            data_feed: "iex".to_string(),
        }
    }

    /// Load credentials from the named environment variables.
    pub fn from_env_vars(key_var: &str, secret_var: &str, paper: bool) -> Result<Self, BrokerError> {
        let api_key = std::env::var(key_var)
            .map_err(|_| BrokerError::Configuration(format!("{} not set", key_var)))?;
        let api_secret = std::env::var(secret_var)
            .map_err(|_| BrokerError::Configuration(format!("{} not set", secret_var)))?;

        Ok(Self::new(api_key, api_secret, paper))
    }

    /// Set the market data feed.
    pub fn with_data_feed(mut self, feed: impl Into<String>) -> Self {
        self.data_feed = feed.into();
        self
    }

    pub fn base_url(&self) -> &str {
        if self.paper {
            "https://paper-api.alpaca.markets"
        } else {
            "https://api.alpaca.markets"
        }
    }

    pub fn data_url(&self) -> &str {
        "https://data.alpaca.markets"
    }
}

/// Alpaca API response types
#[derive(Debug, Deserialize)]
struct AlpacaAccount {
    cash: Decimal,
    buying_power: Decimal,
    equity: Decimal,
}

#[derive(Debug, Deserialize)]
struct AlpacaPosition {
    symbol: String,
    qty: Decimal,
    avg_entry_price: Decimal,
    current_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    client_order_id: String,
    status: String,
    symbol: String,
    qty: Option<Decimal>,
    side: Side,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: &'static str,
    client_order_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AlpacaAsset {
    symbol: String,
    exchange: Exchange,
    class: AssetClass,
    status: AssetStatus,
    tradable: bool,
    marginable: bool,
    shortable: bool,
    easy_to_borrow: bool,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: DateTime<Utc>,
    c: Decimal,
}

#[derive(Debug, Deserialize)]
struct AlpacaBarsResponse {
    #[serde(default)]
    bars: HashMap<String, Vec<AlpacaBar>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaLatestBarsResponse {
    #[serde(default)]
    bars: HashMap<String, AlpacaBar>,
}

#[derive(Debug, Deserialize)]
struct AlpacaClock {
    is_open: bool,
}

/// Failure of a single HTTP round trip, before it is given a domain meaning.
#[derive(Debug)]
enum ApiFailure {
    Transport(String),
    Status(StatusCode, String),
    Decode(String),
}

impl From<ApiFailure> for BrokerError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Transport(e) => BrokerError::Connection(e),
            ApiFailure::Status(status, text) => BrokerError::ApiError(format!("{}: {}", status, text)),
            ApiFailure::Decode(e) => BrokerError::ApiError(e),
        }
    }
}

impl From<ApiFailure> for DataError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Transport(e) => DataError::ConnectionError(e),
            ApiFailure::Status(status, text) => DataError::Internal(format!("{}: {}", status, text)),
            ApiFailure::Decode(e) => DataError::ParseError(e),
        }
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiFailure> {
    let resp = request
        .send()
        .await
        .map_err(|e| ApiFailure::Transport(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(ApiFailure::Status(status, text));
    }

    resp.json().await.map_err(|e| ApiFailure::Decode(e.to_string()))
}

/// Alpaca broker and market data client.
pub struct AlpacaBroker {
    config: AlpacaConfig,
    client: Client,
    batch_size: usize,
}

impl AlpacaBroker {
    /// Create a new Alpaca client.
    pub fn new(config: AlpacaConfig) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&config.api_key)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&config.api_secret)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        Ok(Self {
            config,
            client,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Set how many symbols go into one market data request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn parse_order(order: AlpacaOrder, request: &OrderRequest) -> OrderConfirmation {
        OrderConfirmation {
            id: order.id,
            client_order_id: order.client_order_id,
            symbol: order.symbol,
            side: order.side,
            accepted_quantity: order.qty.unwrap_or(request.quantity),
            status: OrderStatus::from_broker(&order.status),
            submitted_at: order.submitted_at.unwrap_or(order.created_at),
        }
    }

    fn parse_position(p: AlpacaPosition) -> Position {
        Position {
            current_price: p.current_price.unwrap_or(p.avg_entry_price),
            symbol: p.symbol,
            quantity: p.qty,
            avg_entry_price: p.avg_entry_price,
        }
    }

    async fn history_page(
        &self,
        symbols: &str,
        start: &str,
        page_token: Option<&str>,
    ) -> Result<AlpacaBarsResponse, DataError> {
        let url = format!("{}/v2/stocks/bars", self.config.data_url());

        let mut params = vec![
            ("symbols", symbols.to_string()),
            ("timeframe", "1Day".to_string()),
            ("start", start.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("feed", self.config.data_feed.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("page_token", token.to_string()));
        }

        Ok(send_json(self.client.get(&url).query(&params)).await?)
    }
}

#[async_trait]
impl Broker for AlpacaBroker {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        let url = format!("{}/v2/account", self.config.base_url());
        let account: AlpacaAccount = send_json(self.client.get(&url)).await?;

        Ok(Account {
            cash: account.cash,
            buying_power: account.buying_power,
            equity: account.equity,
        })
    }

    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let url = format!("{}/v2/positions", self.config.base_url());
        let positions: Vec<AlpacaPosition> = send_json(self.client.get(&url)).await?;

        Ok(positions.into_iter().map(Self::parse_position).collect())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, BrokerError> {
        let url = format!("{}/v2/orders", self.config.base_url());

        let create_req = CreateOrderRequest {
            symbol: &request.symbol,
            qty: request.quantity.to_string(),
            side: request.side.as_str(),
            order_type: request.order_type.as_str(),
            time_in_force: request.time_in_force.as_str(),
            client_order_id: &request.client_order_id,
        };

        debug!("Submitting order: {:?}", create_req);

        let order: AlpacaOrder = send_json(self.client.post(&url).json(&create_req))
            .await
            .map_err(|failure| match failure {
                ApiFailure::Status(status, text) => {
                    BrokerError::OrderRejected(format!("{}: {}", status, text))
                }
                other => other.into(),
            })?;

        info!(
            symbol = %order.symbol,
            side = %order.side,
            status = %order.status,
            "Order submitted"
        );
        Ok(Self::parse_order(order, &request))
    }

    async fn is_market_open(&self) -> Result<bool, BrokerError> {
        let url = format!("{}/v2/clock", self.config.base_url());
        let clock: AlpacaClock = send_json(self.client.get(&url)).await?;
        Ok(clock.is_open)
    }

    fn name(&self) -> &str {
        if self.config.paper { "Alpaca Paper" } else { "Alpaca Live" }
    }
}

#[async_trait]
impl AssetSource for AlpacaBroker {
    async fn list_assets(
        &self,
        exchange: Exchange,
        asset_class: AssetClass,
        status: AssetStatus,
    ) -> Result<Vec<AssetCandidate>, DataError> {
        let url = format!("{}/v2/assets", self.config.base_url());
        let params = [
            ("status", status.as_str()),
            ("asset_class", asset_class.as_str()),
            ("exchange", exchange.as_str()),
        ];

        let assets: Vec<AlpacaAsset> = send_json(self.client.get(&url).query(&params)).await?;
        debug!(exchange = %exchange, count = assets.len(), "Listed assets");

        Ok(assets
            .into_iter()
            .map(|a| AssetCandidate {
                symbol: a.symbol,
                exchange: a.exchange,
                asset_class: a.class,
                status: a.status,
                tradable: a.tradable,
                marginable: a.marginable,
                shortable: a.shortable,
                easy_to_borrow: a.easy_to_borrow,
            })
            .collect())
    }
}

#[async_trait]
impl PriceSource for AlpacaBroker {
    async fn latest_prices(&self, symbols: &[String]) -> Result<HashMap<String, Decimal>, DataError> {
        let url = format!("{}/v2/stocks/bars/latest", self.config.data_url());
        let mut prices = HashMap::with_capacity(symbols.len());

        for batch in symbols.chunks(self.batch_size) {
            let params = [
                ("symbols", batch.join(",")),
                ("feed", self.config.data_feed.clone()),
            ];
            let data: AlpacaLatestBarsResponse =
                send_json(self.client.get(&url).query(&params)).await?;

            prices.extend(data.bars.into_iter().map(|(symbol, bar)| (symbol, bar.c)));
        }

        debug!(requested = symbols.len(), quoted = prices.len(), "Fetched latest prices");
        Ok(prices)
    }

    async fn daily_history(
        &self,
        symbols: &[String],
        lookback_days: i64,
        limit: usize,
    ) -> Result<HashMap<String, PriceSeries>, DataError> {
        let start = (Utc::now() - Duration::days(lookback_days)).to_rfc3339();
        let mut bars: HashMap<String, Vec<PriceBar>> = HashMap::new();

        for batch in symbols.chunks(self.batch_size) {
            let joined = batch.join(",");
            let mut page_token: Option<String> = None;

            loop {
                let page = self
                    .history_page(&joined, &start, page_token.as_deref())
                    .await?;

                for (symbol, symbol_bars) in page.bars {
                    let entry = bars.entry(symbol.clone()).or_default();
                    entry.extend(
                        symbol_bars
                            .into_iter()
                            .map(|b| PriceBar::new(symbol.clone(), b.c, b.t)),
                    );
                }

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
        }

        Ok(bars
            .into_iter()
            .map(|(symbol, symbol_bars)| {
                let mut series = PriceSeries::new(symbol.clone(), symbol_bars);
                series.truncate_front(limit);
                (symbol, series)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Alpaca Market Data"
    }
}
