// papertrade-core: single-instrument paper trading engine.
// the engine is the sole market maker: a simulated feed ticks, limit orders
// trigger against it, and one cash account absorbs every fill. all arithmetic
// is integer cents; dollars exist only at the presentation boundary.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: OrderId, Cents, Size, Bps, Side, Timestamp
//   2.x  feed.rs: simulated price walk, bounded display history
//   3.x  order.rs: order model, status ledger, pending projection
//   4.x  position.rs: position book, weighted-average merges, mark-to-market
//   5.x  ledger.rs: cash balance, aggregate pnl, reject-on-overdraft
//   6.x  events.rs: state transition events for the host
//   7.x  engine/: matching and execution: commands, ticks, atomic fills
//   8.x  snapshot.rs: persistence contract, per-record defensive restore
//   9.x  sim.rs: background ticker, idempotent start, deterministic stop
//        trade.rs: append-only trade history

pub mod engine;
pub mod events;
pub mod feed;
pub mod ledger;
pub mod order;
pub mod position;
pub mod sim;
pub mod snapshot;
pub mod trade;
pub mod types;

pub use engine::{Engine, EngineConfig, EngineError, ExecutionSummary, OrderResult};
pub use events::{CancelReason, Event, EventId, EventPayload};
pub use feed::{FeedConfig, PriceFeed, PricePoint};
pub use ledger::{BalanceLedger, BalanceSnapshot, LedgerError};
pub use order::{NewOrder, Order, OrderBook, OrderError, OrderKind, OrderStatus};
pub use position::{ClosedPosition, FillOutcome, Position, PositionBook, PositionError};
pub use sim::{shared, SharedEngine, Simulation};
pub use snapshot::{EngineSnapshot, RestoreReport};
pub use trade::{Trade, TradeLog, TradeOrigin};
pub use types::{Bps, Cents, OrderId, PositionId, PositionSide, Side, Size, Timestamp, TradeId};
