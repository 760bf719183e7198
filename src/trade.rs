//! Trade history: the append-only record of every execution.
//!
//! A `Trade` is immutable once written. Ordering is creation order, which the
//! log preserves by construction.

use crate::types::{Cents, OrderId, PositionId, Side, Size, TradeId, Timestamp};
use serde::{Deserialize, Serialize};

/// Where a trade came from. Explicit closes execute without a resting order,
/// so they reference the position instead of a synthetic order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeOrigin {
    Order(OrderId),
    PositionClose(PositionId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub origin: TradeOrigin,
    pub symbol: String,
    pub side: Side,
    pub price: Cents,
    pub size: Size,
    pub fee: Cents,
    pub timestamp: Timestamp,
}

#[derive(Debug)]
pub struct TradeLog {
    trades: Vec<Trade>,
    next_id: u64,
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeLog {
    pub fn new() -> Self {
        Self {
            trades: Vec::new(),
            next_id: 1,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        origin: TradeOrigin,
        symbol: &str,
        side: Side,
        price: Cents,
        size: Size,
        fee: Cents,
        timestamp: Timestamp,
    ) -> TradeId {
        let id = TradeId(self.next_id);
        self.next_id += 1;
        self.trades.push(Trade {
            id,
            origin,
            symbol: symbol.to_string(),
            side,
            price,
            size,
            fee,
            timestamp,
        });
        id
    }

    pub fn all(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Re-admit a persisted trade with its original identity.
    pub(crate) fn restore(&mut self, trade: Trade) {
        self.next_id = self.next_id.max(trade.id.0 + 1);
        self.trades.push(trade);
    }
}
