// 7.1 engine/core.rs: the engine owns every piece of trading state. there is no
// global store: construct one Engine per session and hand out references.
// all mutation goes through &mut self, so commands and ticks serialize and no
// partially-applied transaction is ever observable.

use super::config::EngineConfig;
use crate::events::{BalanceChangedEvent, Event, EventId, EventPayload};
use crate::feed::{PriceFeed, PricePoint};
use crate::ledger::{BalanceLedger, BalanceSnapshot};
use crate::order::{Order, OrderBook};
use crate::position::{Position, PositionBook};
use crate::trade::{Trade, TradeLog};
use crate::types::{Cents, OrderId, PositionId, Timestamp};

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) feed: PriceFeed,
    pub(super) orders: OrderBook,
    pub(super) positions: PositionBook,
    pub(super) ledger: BalanceLedger,
    pub(super) trades: TradeLog,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let feed = match config.feed_seed {
            Some(seed) => PriceFeed::with_seed(&config.feed, seed),
            None => PriceFeed::new(&config.feed),
        };
        let ledger = BalanceLedger::new(config.opening_cash);
        Self {
            config,
            feed,
            orders: OrderBook::new(),
            positions: PositionBook::new(),
            ledger,
            trades: TradeLog::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    // explicit clock: the simulation loop stamps wall time before each tick,
    // tests drive it directly.
    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    // ---- queries: committed snapshots only ----

    pub fn current_price(&self) -> Cents {
        self.feed.current()
    }

    pub fn price_history(&self) -> impl Iterator<Item = &PricePoint> {
        self.feed.history()
    }

    pub fn pending_orders(&self, symbol: Option<&str>) -> Vec<&Order> {
        self.orders.pending(symbol)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn positions(&self, symbol: Option<&str>) -> Vec<&Position> {
        self.positions.open(symbol)
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn trade_history(&self) -> &[Trade] {
        self.trades.all()
    }

    pub fn balance(&self) -> BalanceSnapshot {
        self.ledger.snapshot()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    // ---- restore plumbing, called only from snapshot::restore ----

    pub(crate) fn all_orders_cloned(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.all().cloned().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    pub(crate) fn restore_ledger(&mut self, cash: Cents, total_pnl: Cents) {
        self.ledger.restore(cash, total_pnl);
    }

    pub(crate) fn restore_price(&mut self, price: Cents, history: Vec<PricePoint>) {
        self.feed.restore_history(history);
        self.feed.restore_current(Cents(price.value().max(1)));
    }

    pub(crate) fn restore_order(&mut self, order: Order) {
        self.orders.restore(order);
    }

    pub(crate) fn restore_position(&mut self, position: Position) {
        self.positions.restore(position);
    }

    pub(crate) fn restore_trade(&mut self, trade: Trade) {
        self.trades.restore(trade);
    }

    pub(crate) fn reprice_restored(&mut self) {
        let price = self.feed.current();
        self.positions.reprice_all(price);
        self.refresh_total_pnl();
    }

    // total pnl is the sum over open positions; kept in the ledger snapshot so
    // the host reads one committed figure.
    pub(super) fn refresh_total_pnl(&mut self) {
        let total = self.positions.total_pnl();
        self.ledger.set_total_pnl(total);
    }

    // every cash movement announces the committed figures, so the host never
    // has to diff snapshots to notice a balance change.
    pub(super) fn emit_balance_changed(&mut self) {
        let balance = self.ledger.snapshot();
        self.emit_event(EventPayload::BalanceChanged(BalanceChangedEvent {
            cash: balance.cash,
            total_pnl: balance.total_pnl,
        }));
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        tracing::debug!(event_id = event.id.0, payload = ?event.payload, "engine event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
