//! Tick handling: price updates and the limit-order matching sweep.

use super::core::Engine;
use crate::events::{EventPayload, PriceChangedEvent};
use crate::types::Cents;

impl Engine {
    /// Advance the simulated feed one step and process the new price.
    /// Never fails; the walk is bounded below at one cent.
    pub fn tick(&mut self) -> Cents {
        let price = self.feed.step(self.current_time);
        self.process_price(price);
        price
    }

    /// Inject an externally chosen price (tests, restore, replays) and process
    /// it exactly as a simulated tick would.
    pub fn apply_price(&mut self, price: Cents) {
        debug_assert!(price.value() >= 1);
        self.feed.set_price(price, self.current_time);
        self.process_price(price);
    }

    // 7.3: one PriceChanged transaction. sweep pending limit orders in
    // deterministic order (ascending created_at, then id), executing each that
    // triggers at its OWN limit price, never the tick price: a resting buy at
    // 3300 fills at 3300 even when the tick gapped to 3250. then mark every
    // open position to the new price.
    fn process_price(&mut self, tick_price: Cents) {
        self.emit_event(EventPayload::PriceChanged(PriceChangedEvent {
            price: tick_price,
        }));

        let triggered: Vec<_> = self
            .orders
            .pending(None)
            .iter()
            .filter(|o| o.limit_price.is_some() && o.triggers_at(tick_price))
            .map(|o| (o.id, o.limit_price))
            .collect();

        for (order_id, limit_price) in triggered {
            if let Some(limit_price) = limit_price {
                // outcome lands in the order's status; a precondition failure
                // cancels that order and the sweep continues
                let _ = self.execute_order(order_id, limit_price);
            }
        }

        self.positions.reprice_all(tick_price);
        self.refresh_total_pnl();
    }
}
