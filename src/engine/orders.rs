//! Order placement, cancellation, and execution.
//!
//! Execution is all-or-nothing: preconditions are checked against committed
//! state before any mutation, so a failed attempt cancels the order and touches
//! nothing else. There are no partial fills in this market model.

use super::core::Engine;
use super::results::{EngineError, ExecutionSummary, OrderResult};
use crate::events::{
    CancelReason, EventPayload, OrderCancelledEvent, OrderFilledEvent, OrderPlacedEvent,
    PositionClosedEvent, PositionOpenedEvent,
};
use crate::order::{NewOrder, OrderKind, OrderStatus};
use crate::position::FillOutcome;
use crate::trade::TradeOrigin;
use crate::types::{Cents, OrderId, PositionSide, Side, Size};

/// Outcome of one execution attempt against committed state.
pub(super) enum ExecOutcome {
    Filled(ExecutionSummary),
    Cancelled(CancelReason),
}

impl Engine {
    /// Place an order. Market orders execute immediately at the current feed
    /// price; limit orders rest until a tick crosses their limit.
    ///
    /// An execution-time shortfall (funds or position) is not an error here:
    /// the order is created, then observed as `Cancelled` in the result.
    pub fn place_order(
        &mut self,
        symbol: &str,
        kind: OrderKind,
        side: Side,
        limit_price: Option<Cents>,
        size: Size,
    ) -> Result<OrderResult, EngineError> {
        let request = NewOrder {
            symbol: symbol.to_string(),
            kind,
            side,
            limit_price,
            size,
        };
        let order_id = self.orders.place(request, self.current_time)?;

        self.emit_event(EventPayload::OrderPlaced(OrderPlacedEvent {
            order_id,
            side,
            size,
            limit_price,
        }));

        let execution = match kind {
            OrderKind::Market => {
                let fill_price = self.feed.current();
                match self.execute_order(order_id, fill_price) {
                    ExecOutcome::Filled(summary) => Some(summary),
                    ExecOutcome::Cancelled(_) => None,
                }
            }
            OrderKind::Limit => None,
        };

        // the placed order always exists; read back its committed status
        let status = self
            .orders
            .get(order_id)
            .map(|o| o.status)
            .unwrap_or(OrderStatus::Pending);

        Ok(OrderResult {
            order_id,
            status,
            execution,
        })
    }

    /// User cancellation: `Pending -> Cancelled`.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<(), EngineError> {
        self.orders.cancel(order_id)?;
        self.emit_event(EventPayload::OrderCancelled(OrderCancelledEvent {
            order_id,
            reason: CancelReason::UserRequested,
        }));
        Ok(())
    }

    // 7.2: the execution algorithm. fill price is decided by the caller
    // (market/close: tick price, limit: the order's own limit price).
    //   1. notional = price * size, fee = notional * fee_bps; cancel when
    //      either leaves the representable cash range
    //   2. buy: fit inside any standing short, then cover notional + fee, or
    //      cancel; sell: hold the size long or cancel
    //   3. ledger move, then position book, then trade record, then order status
    // all on &mut self, so the whole transaction commits before anyone reads.
    pub(super) fn execute_order(&mut self, order_id: OrderId, fill_price: Cents) -> ExecOutcome {
        let Some(order) = self.orders.get(order_id) else {
            // caller passed an id it just read from the book
            debug_assert!(false, "execute of unknown order");
            return ExecOutcome::Cancelled(CancelReason::UserRequested);
        };
        let symbol = order.symbol.clone();
        let side = order.side;
        let size = order.size;

        let Some(notional) = fill_price.checked_times(size) else {
            return self.cancel_at_execution(order_id, CancelReason::NotionalOverflow);
        };
        let Some(fee) = self.config.fee_bps.checked_apply(notional) else {
            return self.cancel_at_execution(order_id, CancelReason::NotionalOverflow);
        };

        match side {
            Side::Buy => {
                // a buy against a standing short is a buy-back; reject-excess,
                // the same policy as oversells, before any cash moves
                let short = self.positions.held_size(&symbol, PositionSide::Short);
                if short.is_some_and(|held| held < size) {
                    return self.cancel_at_execution(order_id, CancelReason::InsufficientPosition);
                }
                let Some(total) = notional.checked_add(fee) else {
                    return self.cancel_at_execution(order_id, CancelReason::NotionalOverflow);
                };
                if self.ledger.debit(total).is_err() {
                    return self.cancel_at_execution(order_id, CancelReason::InsufficientFunds);
                }
            }
            Side::Sell => {
                let held = self.positions.held_size(&symbol, PositionSide::Long);
                if held.map_or(true, |h| h < size) {
                    return self.cancel_at_execution(order_id, CancelReason::InsufficientPosition);
                }
                self.ledger.credit(notional.sub(fee));
            }
        }

        let outcome = self
            .positions
            .apply_fill(&symbol, side, fill_price, size, self.current_time);
        self.note_fill_outcome(&outcome, fill_price);

        let trade_id = self.trades.record(
            TradeOrigin::Order(order_id),
            &symbol,
            side,
            fill_price,
            size,
            fee,
            self.current_time,
        );

        self.refresh_total_pnl();
        self.emit_balance_changed();

        self.orders.mark_filled(order_id);
        self.emit_event(EventPayload::OrderFilled(OrderFilledEvent {
            order_id,
            trade_id,
            side,
            size,
            price: fill_price,
            fee,
        }));

        tracing::debug!(
            order_id = order_id.0,
            %side,
            price = fill_price.value(),
            size = size.value(),
            fee = fee.value(),
            "order filled"
        );

        ExecOutcome::Filled(ExecutionSummary {
            trade_id,
            fill_price,
            fee,
        })
    }

    fn cancel_at_execution(&mut self, order_id: OrderId, reason: CancelReason) -> ExecOutcome {
        self.orders.mark_cancelled(order_id);
        self.emit_event(EventPayload::OrderCancelled(OrderCancelledEvent {
            order_id,
            reason,
        }));
        tracing::debug!(order_id = order_id.0, ?reason, "order cancelled at execution");
        ExecOutcome::Cancelled(reason)
    }

    fn note_fill_outcome(&mut self, outcome: &FillOutcome, fill_price: Cents) {
        match outcome {
            FillOutcome::Opened(id) => {
                let size = self.positions.get(*id).map(|p| p.size);
                if let Some(size) = size {
                    self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
                        position_id: *id,
                        entry_price: fill_price,
                        size,
                    }));
                }
            }
            FillOutcome::Closed { id, realized_pnl } => {
                self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
                    position_id: *id,
                    exit_price: fill_price,
                    realized_pnl: *realized_pnl,
                }));
            }
            FillOutcome::Merged(_) | FillOutcome::Reduced { .. } => {}
        }
    }
}
