// 9.0: the price simulation lifecycle. a background thread is the sole producer
// of ticks; every tick takes the engine lock, so command handling and matching
// never interleave partially.
//
// start is idempotent (a second start while running is a no-op, never a second
// ticker) and stop is deterministic: it signals the thread and joins it, so no
// tick lands after stop returns and the books always reflect the last fully
// applied transaction.

use crate::engine::Engine;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// The engine shared between the host and the ticker thread.
pub type SharedEngine = Arc<Mutex<Engine>>;

pub fn shared(engine: Engine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

struct Worker {
    // dropping the sender wakes the thread out of its interval wait
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the ticker thread for one engine.
pub struct Simulation {
    engine: SharedEngine,
    worker: Option<Worker>,
}

impl Simulation {
    pub fn new(engine: SharedEngine) -> Self {
        Self {
            engine,
            worker: None,
        }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(false, |w| !w.handle.is_finished())
    }

    /// Start ticking. `interval` overrides the engine's configured feed
    /// interval. Starting while already running changes nothing.
    pub fn start(&mut self, interval: Option<Duration>) {
        if self.is_running() {
            tracing::debug!("price simulation already running, start is a no-op");
            return;
        }

        let interval = interval.unwrap_or_else(|| {
            self.engine
                .lock()
                .map(|e| e.config().feed.interval)
                .unwrap_or(Duration::from_secs(2))
        });

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let engine = Arc::clone(&self.engine);

        let handle = std::thread::spawn(move || {
            tracing::info!(interval_ms = interval.as_millis() as u64, "price simulation started");
            loop {
                match stop_rx.recv_timeout(interval) {
                    // stop requested or the Simulation was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let Ok(mut engine) = engine.lock() else {
                    tracing::error!("engine lock poisoned, stopping price simulation");
                    break;
                };
                engine.set_time(crate::types::Timestamp::now());
                let price = engine.tick();
                tracing::debug!(price = price.value(), "tick");
            }
            tracing::info!("price simulation stopped");
        });

        self.worker = Some(Worker { stop_tx, handle });
    }

    /// Stop ticking and wait for the thread to finish. Idempotent. After this
    /// returns, no further tick will mutate the engine.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            // send fails only if the thread already exited, which is fine
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;

    fn quick_sim() -> Simulation {
        let config = EngineConfig {
            feed_seed: Some(5),
            ..EngineConfig::default()
        };
        Simulation::new(shared(Engine::new(config)))
    }

    #[test]
    fn start_is_idempotent() {
        let mut sim = quick_sim();
        sim.start(Some(Duration::from_millis(5)));
        assert!(sim.is_running());
        // second start must not spawn a second ticker
        sim.start(Some(Duration::from_millis(5)));
        assert!(sim.is_running());
        sim.stop();
        assert!(!sim.is_running());
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let mut sim = quick_sim();
        sim.stop();
        assert!(!sim.is_running());
    }

    #[test]
    fn ticks_advance_the_feed_and_stop_halts_them() {
        let mut sim = quick_sim();
        sim.start(Some(Duration::from_millis(2)));
        std::thread::sleep(Duration::from_millis(50));
        sim.stop();

        let history_len = {
            let engine = sim.engine().lock().unwrap();
            engine.price_history().count()
        };
        assert!(history_len > 0, "expected at least one tick");

        // no ticks after stop returned
        std::thread::sleep(Duration::from_millis(20));
        let engine = sim.engine().lock().unwrap();
        assert_eq!(engine.price_history().count(), history_len);
    }

    #[test]
    fn restart_after_stop_works() {
        let mut sim = quick_sim();
        sim.start(Some(Duration::from_millis(2)));
        sim.stop();
        sim.start(Some(Duration::from_millis(2)));
        assert!(sim.is_running());
        sim.stop();
    }
}
