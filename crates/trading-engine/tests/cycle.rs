//! Full cycles against the paper broker.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trading_broker::PaperBroker;
use trading_core::error::NotificationError;
use trading_core::traits::Notifier;
use trading_core::types::{Exchange, Side};
use trading_engine::{CyclePhase, EngineConfig, TradingEngine};
use trading_strategies::{FirstSelector, MACrossoverConfig, WindowConvention};

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "Recording"
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _message: &str) -> Result<(), NotificationError> {
        Err(NotificationError::Delivery("webhook down".into()))
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        crossover: MACrossoverConfig {
            short_window: 2,
            long_window: 4,
            convention: WindowConvention::Full,
        },
        ..EngineConfig::default()
    }
}

fn engine(broker: &Arc<PaperBroker>, notifier: Arc<dyn Notifier>) -> TradingEngine {
    TradingEngine::new(
        config(),
        broker.clone(),
        broker.clone(),
        broker.clone(),
        notifier,
        Box::new(FirstSelector),
    )
}

fn closes(values: &[i64]) -> Vec<Decimal> {
    values.iter().copied().map(Decimal::from).collect()
}

// Short average crosses above the long one on the last bar.
fn golden_cross() -> Vec<Decimal> {
    closes(&[10, 10, 10, 10, 1, 1, 30])
}

// Short average crosses below the long one on the last bar.
fn death_cross() -> Vec<Decimal> {
    closes(&[10, 10, 10, 10, 30, 30, 1])
}

fn flat() -> Vec<Decimal> {
    closes(&[10, 10, 10, 10, 10, 10, 10])
}

#[tokio::test(start_paused = true)]
async fn test_market_closed_skips_everything() {
    let broker = Arc::new(
        PaperBroker::new(dec!(100))
            .with_market_open(false)
            .with_position("F", dec!(3), dec!(10))
            .with_history("F", &death_cross())
            .with_asset("AMD", Exchange::Nasdaq),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    assert!(!report.market_open);
    assert!(broker.submitted_orders().is_empty());
    assert_eq!(broker.history_requests(), 0);
    assert_eq!(broker.asset_requests(), 0);
    assert_eq!(notifier.messages()[0], "Is the market open? false!");
    assert_eq!(engine.phase(), CyclePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_death_cross_sells_full_position_only() {
    let broker = Arc::new(
        PaperBroker::new(dec!(0))
            .with_position("F", dec!(7), dec!(10))
            .with_price("F", dec!(1))
            .with_history("F", &death_cross())
            .with_position("GE", dec!(2), dec!(10))
            .with_price("GE", dec!(10))
            .with_history("GE", &flat()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    let orders = broker.submitted_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].symbol, "F");
    assert_eq!(orders[0].side, Side::Sell);
    assert_eq!(orders[0].quantity, dec!(7));

    assert_eq!(report.sells.len(), 1);
    assert!(report.buys.is_empty());
    assert!(!broker.positions_snapshot().contains_key("F"));
    assert_eq!(broker.positions_snapshot()["GE"].quantity, dec!(2));
    assert!(notifier
        .messages()
        .contains(&"A market SELL order was placed for: F".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_no_positions_skips_history_request() {
    let broker = Arc::new(PaperBroker::new(dec!(0)));
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier);

    engine.run_cycle().await.unwrap();

    assert_eq!(broker.history_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_low_cash_never_fetches_universe() {
    let broker = Arc::new(
        PaperBroker::new(dec!(4.50))
            .with_asset("SIRI", Exchange::Nasdaq)
            .with_price("SIRI", dec!(3))
            .with_history("SIRI", &golden_cross()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    assert!(report.market_open);
    assert!(report.buys.is_empty());
    assert_eq!(broker.asset_requests(), 0);
    assert!(broker.submitted_orders().is_empty());
    assert!(notifier
        .messages()
        .contains(&"Account currently has 4.50 cash available".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_single_buyable_candidate_is_bought() {
    let broker = Arc::new(
        PaperBroker::new(dec!(8))
            .with_asset("SIRI", Exchange::Nasdaq)
            .with_price("SIRI", dec!(3))
            .with_history("SIRI", &golden_cross()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.buys.len(), 1);
    let orders = broker.submitted_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].symbol, "SIRI");
    assert_eq!(orders[0].side, Side::Buy);
    assert_eq!(orders[0].quantity, dec!(1));
    assert!(notifier
        .messages()
        .contains(&"A market BUY order was placed for: SIRI".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_spend_down_stops_at_cash_threshold() {
    let broker = Arc::new(
        PaperBroker::new(dec!(20))
            .with_asset("SIRI", Exchange::Nasdaq)
            .with_price("SIRI", dec!(3))
            .with_history("SIRI", &golden_cross()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier);

    let report = engine.run_cycle().await.unwrap();

    // 20 -> 17 -> 14 -> 11 -> 8 -> 5
    assert_eq!(report.buys.len(), 5);
    assert_eq!(broker.positions_snapshot()["SIRI"].quantity, dec!(5));
    assert!(report.elapsed >= Duration::from_secs(5 * 60));
}

#[tokio::test(start_paused = true)]
async fn test_entry_ignores_ineligible_and_unaffordable_symbols() {
    let broker = Arc::new(
        PaperBroker::new(dec!(10))
            // priced above floor(cash)
            .with_asset("AMD", Exchange::Nasdaq)
            .with_price("AMD", dec!(120))
            .with_history("AMD", &golden_cross())
            // at the price floor
            .with_asset("TWO", Exchange::Nyse)
            .with_price("TWO", dec!(2))
            .with_history("TWO", &golden_cross())
            // affordable but no crossover
            .with_asset("GE", Exchange::Nyse)
            .with_price("GE", dec!(4))
            .with_history("GE", &flat()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    assert!(report.buys.is_empty());
    assert!(broker.submitted_orders().is_empty());
    assert_eq!(broker.asset_requests(), 2);

    let messages = notifier.messages();
    assert!(messages.contains(&"Found 3 target assets".to_string()));
    assert!(messages.contains(&"Cheap symbols: [\"GE\"]".to_string()));
    assert!(messages.contains(&"Buyable symbols: []".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_order_reported_through_error_boundary() {
    let broker = Arc::new(
        PaperBroker::new(dec!(50))
            .with_asset("HALT", Exchange::Nasdaq)
            .with_price("HALT", dec!(3))
            .with_history("HALT", &golden_cross())
            .reject_orders_for("HALT"),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_guarded().await;

    assert!(report.is_none());
    assert!(broker.submitted_orders().is_empty());
    let last = notifier.messages().pop().unwrap();
    assert!(last.starts_with("@everyone\nERROR: "));
    assert!(last.contains("HALT"));
    assert_eq!(engine.phase(), CyclePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_notification_failure_does_not_abort_cycle() {
    let broker = Arc::new(
        PaperBroker::new(dec!(8))
            .with_asset("SIRI", Exchange::Nasdaq)
            .with_price("SIRI", dec!(3))
            .with_history("SIRI", &golden_cross()),
    );
    let mut engine = engine(&broker, Arc::new(FailingNotifier));

    let report = engine.run_guarded().await.unwrap();

    assert_eq!(report.buys.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sell_stands_when_later_buy_fails() {
    let broker = Arc::new(
        PaperBroker::new(dec!(50))
            .with_position("F", dec!(7), dec!(10))
            .with_price("F", dec!(1))
            .with_history("F", &death_cross())
            .with_asset("HALT", Exchange::Nasdaq)
            .with_price("HALT", dec!(3))
            .with_history("HALT", &golden_cross())
            .reject_orders_for("HALT"),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_guarded().await;

    assert!(report.is_none());
    let orders = broker.submitted_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].symbol, "F");
    assert_eq!(orders[0].side, Side::Sell);
    assert!(!broker.positions_snapshot().contains_key("F"));

    let messages = notifier.messages();
    assert!(messages.contains(&"A market SELL order was placed for: F".to_string()));
    assert!(messages.last().unwrap().starts_with("@everyone\nERROR: "));
}

#[tokio::test(start_paused = true)]
async fn test_fractional_cash_ceiling_is_floored() {
    // 5.20 < 5.50 but not below floor(5.50)
    let broker = Arc::new(
        PaperBroker::new(dec!(5.50))
            .with_asset("SIRI", Exchange::Nasdaq)
            .with_price("SIRI", dec!(5.20))
            .with_history("SIRI", &golden_cross()),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut engine = engine(&broker, notifier.clone());

    let report = engine.run_cycle().await.unwrap();

    assert!(report.buys.is_empty());
    assert_eq!(broker.asset_requests(), 2);
    assert!(notifier.messages().contains(&"Cheap symbols: []".to_string()));
}
