// 2.0: simulated price feed. a bounded random walk stands in for a real market:
// each step moves the price by a uniform draw in +/- max_move_bps, floored at one cent.
// the walk never fails and never leaves [1, inf).
//
// history is display-only. a bounded FIFO of recent points, nothing downstream
// depends on it for correctness.

use crate::types::{Bps, Cents, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// One observed price, kept for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Cents,
    pub timestamp: Timestamp,
}

/// Feed tuning. Defaults mirror a slow-moving paper market:
/// $34.00 start, +/-2% per step, one step every two seconds.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub initial_price: Cents,
    /// Maximum single-step move, in basis points of the current price.
    pub max_move_bps: u32,
    /// How many history points to retain.
    pub history_cap: usize,
    /// Tick interval used by the simulation driver.
    pub interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_price: Cents(3400),
            max_move_bps: 200,
            history_cap: 100,
            interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub struct PriceFeed {
    current: Cents,
    history: VecDeque<PricePoint>,
    max_move_bps: u32,
    history_cap: usize,
    rng: StdRng,
}

impl PriceFeed {
    pub fn new(config: &FeedConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Seeded construction for reproducible walks in tests and replays.
    pub fn with_seed(config: &FeedConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &FeedConfig, rng: StdRng) -> Self {
        debug_assert!(config.initial_price.value() >= 1);
        Self {
            current: config.initial_price,
            history: VecDeque::with_capacity(config.history_cap),
            max_move_bps: config.max_move_bps,
            history_cap: config.history_cap,
            rng,
        }
    }

    pub fn current(&self) -> Cents {
        self.current
    }

    pub fn history(&self) -> impl Iterator<Item = &PricePoint> {
        self.history.iter()
    }

    // 2.1: one step of the walk. new = max(1, current + current * U) with
    // U uniform in +/- max_move_bps. records the point and returns the new price.
    pub fn step(&mut self, now: Timestamp) -> Cents {
        let span = self.max_move_bps as i32;
        let move_bps = Bps::new(self.rng.gen_range(-span..=span));
        let delta = move_bps.apply(self.current);
        let next = self.current.value().saturating_add(delta.value()).max(1);

        self.set_price(Cents(next), now);
        self.current
    }

    /// Force a price, recording it in history. Used on restore and by tests.
    pub fn set_price(&mut self, price: Cents, now: Timestamp) {
        debug_assert!(price.value() >= 1);
        self.current = price;
        self.history.push_back(PricePoint {
            price,
            timestamp: now,
        });
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
    }

    /// Set the current price without recording a history point. The snapshot
    /// history already carries the matching tail entry.
    pub(crate) fn restore_current(&mut self, price: Cents) {
        debug_assert!(price.value() >= 1);
        self.current = price;
    }

    /// Reload history wholesale from a persisted snapshot, oldest first.
    pub fn restore_history(&mut self, points: impl IntoIterator<Item = PricePoint>) {
        self.history.clear();
        for point in points {
            self.history.push_back(point);
            while self.history.len() > self.history_cap {
                self.history.pop_front();
            }
        }
    }
}
