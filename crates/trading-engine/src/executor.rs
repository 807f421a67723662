//! Daily execution cycle.
//!
//! One cycle checks the market clock, exits held positions showing a death
//! cross, then spends available cash on affordable symbols showing a golden
//! cross, one share at a time.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use trading_core::error::TradingResult;
use trading_core::traits::{AssetSource, Broker, Notifier, PriceSource};
use trading_core::types::{
    AssetClass, AssetStatus, Exchange, OrderConfirmation, OrderRequest, Position, Side, Signal,
};
use trading_strategies::{
    filter_by_price, filter_eligible, CandidateSelector, MACrossover, MACrossoverConfig,
};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub crossover: MACrossoverConfig,
    /// Calendar days of daily history requested per symbol
    pub lookback_days: i64,
    /// Trailing bars kept per symbol
    pub history_limit: usize,
    pub exchanges: Vec<Exchange>,
    pub asset_class: AssetClass,
    pub status: AssetStatus,
    /// Exclusive price floor for the initial candidate scan
    pub min_price: Decimal,
    /// Exclusive price floor when re-quoting inside the entry loop
    pub requote_min_price: Decimal,
    /// Buying continues only while cash exceeds this
    pub min_cash: Decimal,
    pub order_quantity: Decimal,
    pub settle_delay: Duration,
    pub alert_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            crossover: MACrossoverConfig::default(),
            lookback_days: 210,
            history_limit: 210,
            exchanges: vec![Exchange::Nasdaq, Exchange::Nyse],
            asset_class: AssetClass::UsEquity,
            status: AssetStatus::Active,
            min_price: dec!(2),
            requote_min_price: dec!(1),
            min_cash: dec!(5),
            order_quantity: dec!(1),
            settle_delay: Duration::from_secs(60),
            alert_prefix: "@everyone".to_string(),
        }
    }
}

/// Where a cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    MarketCheck,
    Exit,
    Entry,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::MarketCheck => "market-check",
            CyclePhase::Exit => "exit",
            CyclePhase::Entry => "entry",
        };
        f.write_str(name)
    }
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub market_open: bool,
    pub sells: Vec<OrderConfirmation>,
    pub buys: Vec<OrderConfirmation>,
    pub elapsed: Duration,
}

/// Runs the daily decision-and-execution cycle against its collaborators.
pub struct TradingEngine {
    config: EngineConfig,
    strategy: MACrossover,
    broker: Arc<dyn Broker>,
    prices: Arc<dyn PriceSource>,
    assets: Arc<dyn AssetSource>,
    notifier: Arc<dyn Notifier>,
    selector: Box<dyn CandidateSelector>,
    phase: CyclePhase,
}

impl TradingEngine {
    pub fn new(
        config: EngineConfig,
        broker: Arc<dyn Broker>,
        prices: Arc<dyn PriceSource>,
        assets: Arc<dyn AssetSource>,
        notifier: Arc<dyn Notifier>,
        selector: Box<dyn CandidateSelector>,
    ) -> Self {
        let strategy = MACrossover::new(config.crossover);
        Self {
            config,
            strategy,
            broker,
            prices,
            assets,
            notifier,
            selector,
            phase: CyclePhase::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run one cycle under the error boundary.
    ///
    /// A failure aborts the rest of the cycle and is reported to the operator.
    /// Orders submitted before the failure stand.
    pub async fn run_guarded(&mut self) -> Option<CycleReport> {
        match self.run_cycle().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, phase = %self.phase, "Cycle aborted");
                self.transition(CyclePhase::Idle);
                self.announce(&format!("{}\nERROR: {}", self.config.alert_prefix, e))
                    .await;
                None
            }
        }
    }

    /// Run one cycle, propagating the first failure.
    pub async fn run_cycle(&mut self) -> TradingResult<CycleReport> {
        let started = Instant::now();
        let mut report = CycleReport::default();

        self.transition(CyclePhase::MarketCheck);
        report.market_open = self.broker.is_market_open().await?;
        self.announce(&format!("Is the market open? {}!", report.market_open))
            .await;

        if report.market_open {
            self.transition(CyclePhase::Exit);
            report.sells = self.exit_phase().await?;

            self.transition(CyclePhase::Entry);
            report.buys = self.entry_phase().await?;
        }

        self.transition(CyclePhase::Idle);
        report.elapsed = started.elapsed();
        self.announce(&format!("This script took {:?}", report.elapsed))
            .await;

        info!(
            market_open = report.market_open,
            sells = report.sells.len(),
            buys = report.buys.len(),
            "Cycle complete"
        );
        Ok(report)
    }

    /// Sell the full quantity of every held position showing a death cross.
    async fn exit_phase(&self) -> TradingResult<Vec<OrderConfirmation>> {
        let positions: Vec<Position> = self
            .broker
            .get_positions()
            .await?
            .into_iter()
            .filter(Position::is_long)
            .collect();

        if positions.is_empty() {
            debug!("No open positions");
            return Ok(Vec::new());
        }

        let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
        let signals = self.classify(&symbols).await?;

        let mut sells = Vec::new();
        for position in &positions {
            if !signals.get(&position.symbol).is_some_and(Signal::is_sell) {
                continue;
            }

            let request = OrderRequest::market(&position.symbol, Side::Sell, position.quantity);
            let confirmation = self.broker.submit_order(request).await?;
            info!(symbol = %position.symbol, quantity = %position.quantity, "Sell order placed");
            self.announce(&format!("A market SELL order was placed for: {}", position.symbol))
                .await;
            sells.push(confirmation);
        }

        Ok(sells)
    }

    /// Buy affordable golden-cross symbols until cash or candidates run out.
    async fn entry_phase(&mut self) -> TradingResult<Vec<OrderConfirmation>> {
        let account = self.broker.get_account().await?;
        let mut cash = account.cash;
        self.announce(&format!("Account currently has {} cash available", cash))
            .await;

        if cash <= self.config.min_cash {
            info!(%cash, min_cash = %self.config.min_cash, "Not enough cash to enter positions");
            return Ok(Vec::new());
        }

        let mut listed = Vec::new();
        for exchange in &self.config.exchanges {
            listed.extend(
                self.assets
                    .list_assets(*exchange, self.config.asset_class, self.config.status)
                    .await?,
            );
        }
        let targets: Vec<String> = filter_eligible(listed)
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        self.announce(&format!("Found {} target assets", targets.len()))
            .await;

        let quotes = self.prices.latest_prices(&targets).await?;
        let cheap = filter_by_price(&targets, &quotes, self.config.min_price, account.whole_cash());
        self.announce(&format!("Cheap symbols: {:?}", cheap)).await;

        let signals = self.classify(&cheap).await?;
        let mut buyable: Vec<String> = cheap
            .into_iter()
            .filter(|s| signals.get(s).is_some_and(Signal::is_buy))
            .collect();
        self.announce(&format!("Buyable symbols: {:?}", buyable)).await;

        let mut buys = Vec::new();
        while cash > self.config.min_cash && !buyable.is_empty() {
            let Some(symbol) = self.selector.select(&buyable).cloned() else {
                break;
            };

            let request = OrderRequest::market(&symbol, Side::Buy, self.config.order_quantity);
            let confirmation = self.broker.submit_order(request).await?;
            info!(%symbol, selector = self.selector.name(), "Buy order placed");
            self.announce(&format!("A market BUY order was placed for: {}", symbol))
                .await;
            buys.push(confirmation);

            tokio::time::sleep(self.config.settle_delay).await;

            cash = self.broker.get_cash().await?;
            let quotes = self.prices.latest_prices(&buyable).await?;
            buyable = filter_by_price(&buyable, &quotes, self.config.requote_min_price, cash);
            debug!(%cash, remaining = buyable.len(), "Requoted candidates");
        }

        Ok(buys)
    }

    /// Classify every symbol from its trailing daily history.
    ///
    /// Symbols the provider returns no history for are left out.
    async fn classify(&self, symbols: &[String]) -> TradingResult<HashMap<String, Signal>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let history = self
            .prices
            .daily_history(symbols, self.config.lookback_days, self.config.history_limit)
            .await?;

        let mut signals = HashMap::with_capacity(history.len());
        for (symbol, series) in &history {
            let signal = self.strategy.classify_series(series);
            debug!(%symbol, bars = series.len(), closes = ?series.closes(), %signal, "Classified");
            signals.insert(symbol.clone(), signal);
        }
        Ok(signals)
    }

    fn transition(&mut self, next: CyclePhase) {
        debug!(from = %self.phase, to = %next, "Cycle phase");
        self.phase = next;
    }

    async fn announce(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message).await {
            warn!(error = %e, notifier = self.notifier.name(), "Notification failed");
        }
    }
}
