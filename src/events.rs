// 6.0: every state change produces an event. the host watches this stream to
// decide when to persist a snapshot or re-render; the engine never calls out.

use crate::types::{Cents, OrderId, PositionId, Side, Size, Timestamp, TradeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // feed
    PriceChanged(PriceChangedEvent),

    // orders
    OrderPlaced(OrderPlacedEvent),
    OrderFilled(OrderFilledEvent),
    OrderCancelled(OrderCancelledEvent),

    // positions
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),

    // ledger
    BalanceChanged(BalanceChangedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChangedEvent {
    pub price: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order_id: OrderId,
    pub side: Side,
    pub size: Size,
    pub limit_price: Option<Cents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFilledEvent {
    pub order_id: OrderId,
    pub trade_id: TradeId,
    pub side: Side,
    pub size: Size,
    pub price: Cents,
    pub fee: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order_id: OrderId,
    pub reason: CancelReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    UserRequested,
    /// Buy could not cover notional + fee at execution time.
    InsufficientFunds,
    /// Sell exceeded the held long size, or a buy against a standing short
    /// exceeded its size, at execution time.
    InsufficientPosition,
    /// Notional or fee left the representable cash range at execution time.
    NotionalOverflow,
}

/// Emitted after every cash movement, with the committed figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChangedEvent {
    pub cash: Cents,
    pub total_pnl: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub entry_price: Cents,
    pub size: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub exit_price: Cents,
    pub realized_pnl: Cents,
}
