//! Paper trading broker for simulation and tests.
//!
//! Implements every collaborator trait the engine needs from a single
//! in-memory account. Market orders fill immediately at the latest price.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use trading_core::error::{BrokerError, DataError};
use trading_core::traits::{AssetSource, Broker, PriceSource};
use trading_core::types::{
    Account, AssetCandidate, AssetClass, AssetStatus, Exchange, OrderConfirmation, OrderRequest,
    OrderStatus, Position, PriceBar, PriceSeries, Side,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct PaperState {
    cash: Decimal,
    positions: HashMap<String, Position>,
    prices: HashMap<String, Decimal>,
    history: HashMap<String, Vec<PriceBar>>,
    assets: Vec<AssetCandidate>,
    rejected_symbols: HashSet<String>,
    orders: Vec<OrderRequest>,
    market_open: bool,
    asset_requests: usize,
    history_requests: usize,
}

/// In-memory broker, price source and asset source.
#[derive(Debug)]
pub struct PaperBroker {
    state: Mutex<PaperState>,
}

impl PaperBroker {
    /// Create a new paper broker with initial cash and an open market.
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            state: Mutex::new(PaperState {
                cash: initial_cash,
                market_open: true,
                ..Default::default()
            }),
        }
    }

    // Poisoning only follows a panic elsewhere; the state is still consistent.
    fn state(&self) -> MutexGuard<'_, PaperState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set whether the market clock reports open.
    pub fn with_market_open(self, open: bool) -> Self {
        self.state().market_open = open;
        self
    }

    /// Set the latest price for a symbol.
    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.state().prices.insert(symbol.to_string(), price);
        self
    }

    /// Set daily closes for a symbol, oldest first, the last one dated today.
    pub fn with_history(self, symbol: &str, closes: &[Decimal]) -> Self {
        let today = Utc::now();
        let count = closes.len() as i64;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::new(symbol, *close, today - Duration::days(count - 1 - i as i64)))
            .collect();
        self.state().history.insert(symbol.to_string(), bars);
        self
    }

    /// Add a held position.
    pub fn with_position(self, symbol: &str, quantity: Decimal, avg_price: Decimal) -> Self {
        self.state()
            .positions
            .insert(symbol.to_string(), Position::new(symbol, quantity, avg_price));
        self
    }

    /// List an asset. Flags default to fully eligible.
    pub fn with_asset(self, symbol: &str, exchange: Exchange) -> Self {
        self.with_listed_asset(AssetCandidate {
            symbol: symbol.to_string(),
            exchange,
            asset_class: AssetClass::UsEquity,
            status: AssetStatus::Active,
            tradable: true,
            marginable: true,
            shortable: true,
            easy_to_borrow: true,
        })
    }

    /// List an asset with explicit flags.
    pub fn with_listed_asset(self, asset: AssetCandidate) -> Self {
        self.state().assets.push(asset);
        self
    }

    /// Reject every order for this symbol.
    pub fn reject_orders_for(self, symbol: &str) -> Self {
        self.state().rejected_symbols.insert(symbol.to_string());
        self
    }

    /// Every order submitted so far, in submission order.
    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.state().orders.clone()
    }

    /// Number of asset list requests served.
    pub fn asset_requests(&self) -> usize {
        self.state().asset_requests
    }

    /// Number of history requests served.
    pub fn history_requests(&self) -> usize {
        self.state().history_requests
    }

    /// Snapshot of the held positions.
    pub fn positions_snapshot(&self) -> HashMap<String, Position> {
        self.state().positions.clone()
    }

    fn fill(state: &mut PaperState, request: &OrderRequest) -> Result<(), BrokerError> {
        if !state.market_open {
            return Err(BrokerError::MarketClosed);
        }
        if state.rejected_symbols.contains(&request.symbol) {
            return Err(BrokerError::OrderRejected(format!("{} is not tradable", request.symbol)));
        }

        let price = *state
            .prices
            .get(&request.symbol)
            .ok_or_else(|| BrokerError::OrderRejected(format!("no quote for {}", request.symbol)))?;
        let value = price * request.quantity;

        match request.side {
            Side::Buy => {
                if value > state.cash {
                    return Err(BrokerError::InsufficientFunds {
                        required: value,
                        available: state.cash,
                    });
                }
                state.cash -= value;

                let position = state
                    .positions
                    .entry(request.symbol.clone())
                    .or_insert_with(|| Position::new(&request.symbol, Decimal::ZERO, price));
                let cost = position.avg_entry_price * position.quantity + value;
                position.quantity += request.quantity;
                position.avg_entry_price = cost / position.quantity;
                position.current_price = price;
            }
            Side::Sell => {
                let position = state
                    .positions
                    .get_mut(&request.symbol)
                    .filter(|p| p.quantity >= request.quantity)
                    .ok_or_else(|| BrokerError::PositionNotFound(request.symbol.clone()))?;
                position.quantity -= request.quantity;
                position.current_price = price;

                if position.is_flat() {
                    state.positions.remove(&request.symbol);
                }
                state.cash += value;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        let state = self.state();
        let holdings: Decimal = state.positions.values().map(Position::market_value).sum();

        Ok(Account {
            cash: state.cash,
            buying_power: state.cash,
            equity: state.cash + holdings,
        })
    }

    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError> {
        Ok(self.state().positions.values().cloned().collect())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, BrokerError> {
        let mut state = self.state();
        Self::fill(&mut state, &request)?;
        state.orders.push(request.clone());

        Ok(OrderConfirmation {
            id: Uuid::new_v4().to_string(),
            client_order_id: request.client_order_id,
            symbol: request.symbol,
            side: request.side,
            accepted_quantity: request.quantity,
            status: OrderStatus::Filled,
            submitted_at: Utc::now(),
        })
    }

    async fn is_market_open(&self) -> Result<bool, BrokerError> {
        Ok(self.state().market_open)
    }

    fn name(&self) -> &str {
        "Paper Broker"
    }
}

#[async_trait]
impl AssetSource for PaperBroker {
    async fn list_assets(
        &self,
        exchange: Exchange,
        asset_class: AssetClass,
        status: AssetStatus,
    ) -> Result<Vec<AssetCandidate>, DataError> {
        let mut state = self.state();
        state.asset_requests += 1;

        Ok(state
            .assets
            .iter()
            .filter(|a| a.exchange == exchange && a.asset_class == asset_class && a.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PriceSource for PaperBroker {
    async fn latest_prices(&self, symbols: &[String]) -> Result<HashMap<String, Decimal>, DataError> {
        let state = self.state();
        Ok(symbols
            .iter()
            .filter_map(|s| state.prices.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }

    async fn daily_history(
        &self,
        symbols: &[String],
        lookback_days: i64,
        limit: usize,
    ) -> Result<HashMap<String, PriceSeries>, DataError> {
        let mut state = self.state();
        state.history_requests += 1;
        let cutoff = Utc::now() - Duration::days(lookback_days);

        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                let bars: Vec<PriceBar> = state
                    .history
                    .get(symbol)?
                    .iter()
                    .filter(|b| b.timestamp >= cutoff)
                    .cloned()
                    .collect();
                let mut series = PriceSeries::new(symbol.clone(), bars);
                series.truncate_front(limit);
                Some((symbol.clone(), series))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Paper Prices"
    }
}
