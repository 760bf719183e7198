//! Engine configuration options.

use crate::feed::FeedConfig;
use crate::types::{Bps, Cents};

/// Engine configuration. Defaults reproduce the stock paper market:
/// symbol CSK, $1,000 opening cash, 1% fee, $34.00 starting price.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The single traded instrument.
    pub symbol: String,
    pub opening_cash: Cents,
    /// Fee charged on every fill, as a fraction of notional.
    pub fee_bps: Bps,
    pub feed: FeedConfig,
    /// Maximum number of audit events to retain in memory.
    pub max_events: usize,
    /// Fixed RNG seed for a reproducible price walk. `None` seeds from entropy.
    pub feed_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "CSK".to_string(),
            opening_cash: Cents(100_000),
            fee_bps: Bps::new(100),
            feed: FeedConfig::default(),
            max_events: 10_000,
            feed_seed: None,
        }
    }
}
