// 8.0: the persistence contract. the engine never touches storage itself: the
// host serializes `EngineSnapshot` to whatever store it owns and hands it back
// on startup.
//
// restore is defensive per-record: a malformed order, position or trade is
// skipped and counted, never aborting the load or corrupting live state.

use crate::engine::{Engine, EngineConfig};
use crate::feed::PricePoint;
use crate::order::{Order, OrderKind, OrderStatus};
use crate::position::Position;
use crate::trade::Trade;
use crate::types::Cents;
use serde::{Deserialize, Serialize};

/// Flat, serializable image of the full engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub symbol: String,
    pub current_price: Cents,
    pub price_history: Vec<PricePoint>,
    pub cash: Cents,
    pub total_pnl: Cents,
    /// Every order ever placed, terminal ones included.
    pub orders: Vec<Order>,
    pub positions: Vec<Position>,
    pub trades: Vec<Trade>,
}

/// What a restore actually admitted. Skipped counts are per-record rejections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub orders_restored: usize,
    pub orders_skipped: usize,
    pub positions_restored: usize,
    pub positions_skipped: usize,
    pub trades_restored: usize,
}

impl Engine {
    pub fn snapshot(&self) -> EngineSnapshot {
        let balance = self.balance();
        EngineSnapshot {
            symbol: self.symbol().to_string(),
            current_price: self.current_price(),
            price_history: self.price_history().copied().collect(),
            cash: balance.cash,
            total_pnl: balance.total_pnl,
            orders: self.all_orders_cloned(),
            positions: self.positions(None).into_iter().cloned().collect(),
            trades: self.trade_history().to_vec(),
        }
    }

    /// Build a fresh engine from a persisted snapshot.
    ///
    /// Pending orders are re-armed into the matching loop; terminal orders come
    /// back as history only. Positions and trades keep their original ids and
    /// timestamps. Id counters resume past the restored maxima.
    pub fn restore(config: EngineConfig, snapshot: EngineSnapshot) -> (Engine, RestoreReport) {
        let mut config = config;
        config.symbol = snapshot.symbol;

        let mut engine = Engine::new(config);
        let mut report = RestoreReport::default();

        engine.restore_ledger(snapshot.cash, snapshot.total_pnl);
        engine.restore_price(snapshot.current_price, snapshot.price_history);

        for order in snapshot.orders {
            if order_is_wellformed(&order) {
                engine.restore_order(order);
                report.orders_restored += 1;
            } else {
                tracing::warn!(order_id = order.id.0, "skipping malformed order record");
                report.orders_skipped += 1;
            }
        }

        for position in snapshot.positions {
            if position_is_wellformed(&position, &engine) {
                engine.restore_position(position);
                report.positions_restored += 1;
            } else {
                tracing::warn!(
                    position_id = position.id.0,
                    "skipping malformed position record"
                );
                report.positions_skipped += 1;
            }
        }

        for trade in snapshot.trades {
            engine.restore_trade(trade);
            report.trades_restored += 1;
        }

        // restored positions carry persisted pnl; recompute both marks and the
        // aggregate so the books agree with the restored price
        engine.reprice_restored();

        (engine, report)
    }
}

fn order_is_wellformed(order: &Order) -> bool {
    if order.size.value() <= 0 {
        return false;
    }
    match order.status {
        // only limit orders can re-arm: a pending market order has no trigger,
        // so it would rest forever. live orders need a usable trigger price.
        OrderStatus::Pending => {
            order.kind == OrderKind::Limit && order.limit_price.is_some_and(|p| p.value() > 0)
        }
        _ => true,
    }
}

fn position_is_wellformed(position: &Position, engine: &Engine) -> bool {
    position.size.value() > 0
        && position.entry_price.value() > 0
        // the one-position-per-(symbol, side) invariant survives restore
        && engine
            .positions(Some(&position.symbol))
            .iter()
            .all(|p| p.side != position.side)
}
