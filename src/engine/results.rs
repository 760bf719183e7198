// 7.0.2: result types and errors for engine operations.

use crate::ledger::LedgerError;
use crate::order::{OrderError, OrderStatus};
use crate::position::PositionError;
use crate::types::{Cents, OrderId, TradeId};

/// What happened when an order executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub trade_id: TradeId,
    pub fill_price: Cents,
    pub fee: Cents,
}

/// Returned from `place_order`. A market order resolves immediately, so its
/// terminal status (and fill, if any) is already known; a limit order comes
/// back `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub execution: Option<ExecutionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Notional or fee left the representable cash range.
    #[error("notional exceeds the representable cash range")]
    NotionalOverflow,
}
