//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{Account, OrderConfirmation, OrderRequest, Position};
use async_trait::async_trait;

/// Trait for broker integrations.
///
/// All state lives with the broker; implementations must not cache account
/// or position data between calls.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Get the current account snapshot.
    async fn get_account(&self) -> Result<Account, BrokerError>;

    /// Get all open positions.
    async fn get_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// Submit a new order.
    ///
    /// # Returns
    /// The broker's confirmation. Rejections surface as `BrokerError`.
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation, BrokerError>;

    /// Check if the market is currently open.
    async fn is_market_open(&self) -> Result<bool, BrokerError>;

    /// Get the current cash balance.
    async fn get_cash(&self) -> Result<rust_decimal::Decimal, BrokerError> {
        let account = self.get_account().await?;
        Ok(account.cash)
    }

    /// Get the broker name.
    fn name(&self) -> &str;
}
