//! Paper Trading Engine Walkthrough.
//!
//! Drives the engine through its full lifecycle: market fills and fees, resting
//! limit orders, rejected oversells, explicit closes, snapshot round trips, and
//! a short live simulation run.

use papertrade_core::*;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Paper Trading Core Engine Walkthrough");
    println!("Single instrument, simulated feed, cash accounting\n");

    scenario_1_market_buy();
    scenario_2_limit_order_lifecycle();
    scenario_3_oversell_rejection();
    scenario_4_close_position();
    scenario_5_snapshot_roundtrip();
    scenario_6_live_simulation();

    println!("\nAll scenarios completed.");
}

fn deterministic_engine() -> Engine {
    Engine::new(EngineConfig {
        feed_seed: Some(42),
        ..EngineConfig::default()
    })
}

/// Market buy: fee math in plain sight.
fn scenario_1_market_buy() {
    println!("Scenario 1: Market Buy\n");

    let mut engine = deterministic_engine();
    engine.set_time(Timestamp::now());

    println!("  Opening cash: {}", engine.balance().cash);
    println!("  Feed price: {}", engine.current_price());

    let result = engine
        .place_order(
            "CSK",
            OrderKind::Market,
            Side::Buy,
            None,
            Size::new_unchecked(10),
        )
        .expect("valid order");

    let execution = result.execution.expect("market buy fills");
    println!(
        "  Bought 10 @ {} (fee {})",
        execution.fill_price, execution.fee
    );
    println!("  Cash after: {}", engine.balance().cash);

    let positions = engine.positions(None);
    println!(
        "  Position: {} {} @ entry {}\n",
        positions[0].size, positions[0].side, positions[0].entry_price
    );
}

/// Limit buy resting below market, then a tick crosses it.
fn scenario_2_limit_order_lifecycle() {
    println!("Scenario 2: Limit Order Lifecycle\n");

    let mut engine = deterministic_engine();
    engine.set_time(Timestamp::now());

    let result = engine
        .place_order(
            "CSK",
            OrderKind::Limit,
            Side::Buy,
            Some(Cents(3300)),
            Size::new_unchecked(5),
        )
        .expect("valid order");
    println!("  Placed limit buy 5 @ $33.00, status {:?}", result.status);

    engine.apply_price(Cents(3350));
    println!(
        "  Tick to $33.50: still pending ({} open)",
        engine.pending_orders(None).len()
    );

    engine.apply_price(Cents(3250));
    let order = engine.order(result.order_id).expect("order exists");
    let trade = engine.trade_history().last().expect("fill recorded");
    println!(
        "  Tick to $32.50: order {:?}, filled at {} (the limit, not the tick)\n",
        order.status, trade.price
    );
}

/// Selling more than held cancels the order and changes nothing.
fn scenario_3_oversell_rejection() {
    println!("Scenario 3: Oversell Rejection\n");

    let mut engine = deterministic_engine();
    engine.set_time(Timestamp::now());

    engine
        .place_order(
            "CSK",
            OrderKind::Market,
            Side::Buy,
            None,
            Size::new_unchecked(5),
        )
        .expect("valid order");
    let cash_before = engine.balance().cash;

    let result = engine
        .place_order(
            "CSK",
            OrderKind::Market,
            Side::Sell,
            None,
            Size::new_unchecked(50),
        )
        .expect("valid order");

    println!("  Sell 50 while holding 5: status {:?}", result.status);
    println!(
        "  Cash unchanged: {} == {}\n",
        engine.balance().cash,
        cash_before
    );
}

/// Open, watch pnl move, close explicitly.
fn scenario_4_close_position() {
    println!("Scenario 4: Close Position\n");

    let mut engine = deterministic_engine();
    engine.set_time(Timestamp::now());

    engine
        .place_order(
            "CSK",
            OrderKind::Market,
            Side::Buy,
            None,
            Size::new_unchecked(10),
        )
        .expect("valid order");
    let position_id = engine.positions(None)[0].id;

    engine.apply_price(Cents(3600));
    let position = engine.position(position_id).expect("position open");
    println!("  Marked to $36.00, unrealized pnl {}", position.pnl);

    let (closed, execution) = engine.close_position(position_id).expect("close succeeds");
    println!(
        "  Closed {} @ {}: realized {}, fee {}",
        closed.size, execution.fill_price, closed.realized_pnl, execution.fee
    );
    println!("  Cash after: {}\n", engine.balance().cash);
}

/// Persist, restore, verify identity survives.
fn scenario_5_snapshot_roundtrip() {
    println!("Scenario 5: Snapshot Round Trip\n");

    let mut engine = deterministic_engine();
    engine.set_time(Timestamp::now());

    engine
        .place_order(
            "CSK",
            OrderKind::Market,
            Side::Buy,
            None,
            Size::new_unchecked(10),
        )
        .expect("valid order");
    engine
        .place_order(
            "CSK",
            OrderKind::Limit,
            Side::Sell,
            Some(Cents(3600)),
            Size::new_unchecked(10),
        )
        .expect("valid order");

    let snapshot = engine.snapshot();
    let (restored, report) = Engine::restore(
        EngineConfig {
            feed_seed: Some(42),
            ..EngineConfig::default()
        },
        snapshot,
    );

    println!(
        "  Restored {} orders, {} positions, {} trades (skipped {})",
        report.orders_restored,
        report.positions_restored,
        report.trades_restored,
        report.orders_skipped + report.positions_skipped
    );
    println!(
        "  Pending limit orders live again: {}\n",
        restored.pending_orders(None).len()
    );
}

/// A second of real ticking on the background thread.
fn scenario_6_live_simulation() {
    println!("Scenario 6: Live Simulation\n");

    let mut sim = Simulation::new(shared(deterministic_engine()));
    sim.start(Some(Duration::from_millis(100)));
    std::thread::sleep(Duration::from_millis(550));
    sim.stop();

    let engine = sim.engine().lock().expect("engine lock");
    println!("  Ticks observed: {}", engine.price_history().count());
    println!("  Final price: {}", engine.current_price());
}
