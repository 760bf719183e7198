// 7.0 engine/: the matching and execution engine. split by concern:
//   core.rs      engine struct, clock, queries, event emission
//   orders.rs    place / cancel / execute
//   positions.rs explicit position close
//   pricing.rs   tick handling and limit-order matching
//   results.rs   result structs and EngineError
//   config.rs    engine configuration

mod config;
mod core;
mod orders;
mod positions;
mod pricing;
mod results;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{EngineError, ExecutionSummary, OrderResult};
