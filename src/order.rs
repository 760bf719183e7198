//! Order model and the book that owns it.
//!
//! There is no depth here: the engine is the sole market maker, so the book is
//! a status ledger, not a CLOB. It owns every order ever placed and is the only
//! place status transitions happen. The matching engine reads and transitions
//! orders exclusively through this interface.

use crate::types::{Cents, OrderId, Side, Size, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Executes immediately at the current feed price.
    Market,
    /// Rests until the feed crosses its limit price.
    Limit,
}

/// Order lifecycle. `Filled` and `Cancelled` are terminal and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub kind: OrderKind,
    pub side: Side,
    /// Present iff `kind == Limit`.
    pub limit_price: Option<Cents>,
    pub size: Size,
    pub status: OrderStatus,
    pub created_at: Timestamp,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    // trigger test against a fresh tick. market orders never rest, so only
    // limit orders are asked.
    pub fn triggers_at(&self, tick_price: Cents) -> bool {
        debug_assert_eq!(self.kind, OrderKind::Limit);
        match (self.side, self.limit_price) {
            (Side::Buy, Some(limit)) => tick_price <= limit,
            (Side::Sell, Some(limit)) => tick_price >= limit,
            _ => false,
        }
    }
}

/// A placement request before the book assigns identity.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub symbol: String,
    pub kind: OrderKind,
    pub side: Side,
    pub limit_price: Option<Cents>,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("invalid order: {0}")]
    InvalidOrder(&'static str),

    #[error("order {0:?} not found")]
    NotFound(OrderId),

    #[error("order {0:?} is already terminal")]
    AlreadyTerminal(OrderId),
}

/// Owns every order and its status. Append-only by id; orders are never removed,
/// terminal ones just stop appearing in the pending projection.
#[derive(Debug)]
pub struct OrderBook {
    orders: HashMap<OrderId, Order>,
    next_id: u64,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            next_id: 1,
        }
    }

    fn next_order_id(&mut self) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        id
    }

    // 3.1: admit a new order in Pending. validation happens before identity is
    // assigned, a rejected order never existed.
    pub fn place(&mut self, request: NewOrder, now: Timestamp) -> Result<OrderId, OrderError> {
        match request.kind {
            OrderKind::Limit => match request.limit_price {
                None => return Err(OrderError::InvalidOrder("limit order without a price")),
                Some(price) if price.value() <= 0 => {
                    return Err(OrderError::InvalidOrder("limit price must be positive"))
                }
                // price and size are both known here, so an unfillable
                // notional never rests in the book
                Some(price) if price.checked_times(request.size).is_none() => {
                    return Err(OrderError::InvalidOrder("limit notional overflows"))
                }
                Some(_) => {}
            },
            OrderKind::Market => {
                if request.limit_price.is_some() {
                    return Err(OrderError::InvalidOrder("market order carries a price"));
                }
            }
        }

        let id = self.next_order_id();
        let order = Order {
            id,
            symbol: request.symbol,
            kind: request.kind,
            side: request.side,
            limit_price: request.limit_price,
            size: request.size,
            status: OrderStatus::Pending,
            created_at: now,
        };
        self.orders.insert(id, order);
        Ok(id)
    }

    /// User-facing cancel: `Pending -> Cancelled`. Cancelling a terminal order
    /// is an explicit error, not a silent no-op.
    pub fn cancel(&mut self, id: OrderId) -> Result<(), OrderError> {
        let order = self.orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;
        if order.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal(id));
        }
        order.status = OrderStatus::Cancelled;
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    // 3.2: pending projection in deterministic matching order: ascending
    // created_at, ties broken by id. simultaneous triggers replay identically.
    pub fn pending(&self, symbol: Option<&str>) -> Vec<&Order> {
        let mut pending: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.is_pending())
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .collect();
        pending.sort_by_key(|o| (o.created_at, o.id));
        pending
    }

    pub fn all(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    // engine-only transitions. terminal states never change again.
    pub(crate) fn mark_filled(&mut self, id: OrderId) {
        if let Some(order) = self.orders.get_mut(&id) {
            debug_assert!(order.is_pending(), "fill of a terminal order");
            order.status = OrderStatus::Filled;
        }
    }

    pub(crate) fn mark_cancelled(&mut self, id: OrderId) {
        if let Some(order) = self.orders.get_mut(&id) {
            debug_assert!(order.is_pending(), "cancel of a terminal order");
            order.status = OrderStatus::Cancelled;
        }
    }

    /// Re-admit a persisted order with its original identity. The id counter is
    /// bumped past it so later placements cannot collide.
    pub(crate) fn restore(&mut self, order: Order) {
        self.next_id = self.next_id.max(order.id.0 + 1);
        self.orders.insert(order.id, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_limit(price: i64, size: i64) -> NewOrder {
        NewOrder {
            symbol: "CSK".to_string(),
            kind: OrderKind::Limit,
            side: Side::Buy,
            limit_price: Some(Cents(price)),
            size: Size::new(size).unwrap(),
        }
    }

    #[test]
    fn place_assigns_identity_and_pending() {
        let mut book = OrderBook::new();
        let id = book.place(buy_limit(3300, 10), Timestamp::from_millis(5)).unwrap();
        let order = book.get(id).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, Timestamp::from_millis(5));
    }

    #[test]
    fn place_rejects_nonpositive_limit_price() {
        let mut book = OrderBook::new();
        let bad = NewOrder {
            limit_price: Some(Cents(0)),
            ..buy_limit(1, 10)
        };
        let err = book.place(bad, Timestamp::from_millis(0)).unwrap_err();
        assert!(matches!(err, OrderError::InvalidOrder(_)));
        assert!(book.pending(None).is_empty());
    }

    #[test]
    fn place_rejects_unrepresentable_limit_notional() {
        let mut book = OrderBook::new();
        let err = book
            .place(
                buy_limit(4_000_000_000_000_000_000, 10),
                Timestamp::from_millis(0),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidOrder(_)));
        assert!(book.pending(None).is_empty());
    }

    #[test]
    fn cancel_is_terminal_and_not_repeatable() {
        let mut book = OrderBook::new();
        let id = book.place(buy_limit(3300, 10), Timestamp::from_millis(0)).unwrap();
        book.cancel(id).unwrap();
        assert_eq!(book.get(id).unwrap().status, OrderStatus::Cancelled);
        assert_eq!(book.cancel(id), Err(OrderError::AlreadyTerminal(id)));
    }

    #[test]
    fn cancel_unknown_is_not_found() {
        let mut book = OrderBook::new();
        assert_eq!(
            book.cancel(OrderId(99)),
            Err(OrderError::NotFound(OrderId(99)))
        );
    }

    #[test]
    fn pending_sorted_by_creation_then_id() {
        let mut book = OrderBook::new();
        let late = book.place(buy_limit(3300, 1), Timestamp::from_millis(20)).unwrap();
        let early = book.place(buy_limit(3200, 1), Timestamp::from_millis(10)).unwrap();
        let tied = book.place(buy_limit(3100, 1), Timestamp::from_millis(10)).unwrap();

        let ids: Vec<OrderId> = book.pending(None).iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![early, tied, late]);
    }

    #[test]
    fn pending_filters_by_symbol() {
        let mut book = OrderBook::new();
        book.place(buy_limit(3300, 1), Timestamp::from_millis(0)).unwrap();
        let other = NewOrder {
            symbol: "OTH".to_string(),
            ..buy_limit(3300, 1)
        };
        book.place(other, Timestamp::from_millis(1)).unwrap();

        assert_eq!(book.pending(Some("CSK")).len(), 1);
        assert_eq!(book.pending(Some("OTH")).len(), 1);
        assert_eq!(book.pending(None).len(), 2);
    }

    #[test]
    fn limit_trigger_conditions() {
        let mut book = OrderBook::new();
        let buy = book.place(buy_limit(3300, 1), Timestamp::from_millis(0)).unwrap();
        let sell = book
            .place(
                NewOrder {
                    side: Side::Sell,
                    limit_price: Some(Cents(3500)),
                    ..buy_limit(0, 1)
                },
                Timestamp::from_millis(1),
            )
            .unwrap();

        let buy = book.get(buy).unwrap();
        assert!(!buy.triggers_at(Cents(3400)));
        assert!(buy.triggers_at(Cents(3300)));
        assert!(buy.triggers_at(Cents(3200)));

        let sell = book.get(sell).unwrap();
        assert!(!sell.triggers_at(Cents(3400)));
        assert!(sell.triggers_at(Cents(3500)));
        assert!(sell.triggers_at(Cents(3600)));
    }

    #[test]
    fn restore_bumps_id_counter() {
        let mut book = OrderBook::new();
        let restored = Order {
            id: OrderId(17),
            symbol: "CSK".to_string(),
            kind: OrderKind::Limit,
            side: Side::Buy,
            limit_price: Some(Cents(3300)),
            size: Size::new(5).unwrap(),
            status: OrderStatus::Pending,
            created_at: Timestamp::from_millis(1),
        };
        book.restore(restored);
        let fresh = book.place(buy_limit(3300, 1), Timestamp::from_millis(2)).unwrap();
        assert_eq!(fresh, OrderId(18));
    }
}
