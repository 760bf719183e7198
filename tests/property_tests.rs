//! Property-based tests over the numeric core.
//!
//! These verify invariants hold under random prices, sizes, and walks.

use papertrade_core::position::mark_to_market;
use papertrade_core::*;
use proptest::prelude::*;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = Cents> {
    (1i64..1_000_000i64).prop_map(Cents) // $0.01 to $10,000
}

fn size_strategy() -> impl Strategy<Value = Size> {
    (1i64..10_000i64).prop_map(Size::new_unchecked)
}

fn engine_at(price: Cents) -> Engine {
    let mut engine = Engine::new(EngineConfig {
        opening_cash: Cents(i64::MAX / 4), // never the binding constraint here
        feed_seed: Some(7),
        ..EngineConfig::default()
    });
    engine.set_time(Timestamp::from_millis(0));
    engine.apply_price(price);
    engine
}

proptest! {
    /// Unrealized pnl is zero when mark = entry, for both sides.
    #[test]
    fn pnl_zero_at_entry(price in price_strategy(), size in size_strategy()) {
        prop_assert_eq!(
            mark_to_market(PositionSide::Long, price, price, size),
            Cents::ZERO
        );
        prop_assert_eq!(
            mark_to_market(PositionSide::Short, price, price, size),
            Cents::ZERO
        );
    }

    /// pnl sign follows the side: longs gain when mark > entry, shorts mirror.
    #[test]
    fn pnl_sign_per_side(
        entry in price_strategy(),
        mark in price_strategy(),
        size in size_strategy(),
    ) {
        let long = mark_to_market(PositionSide::Long, entry, mark, size);
        let short = mark_to_market(PositionSide::Short, entry, mark, size);

        prop_assert_eq!(long, short.negate());
        if mark > entry {
            prop_assert!(long.value() > 0);
        } else if mark < entry {
            prop_assert!(long.value() < 0);
        }
    }

    /// A buy followed by a full sell at the same price loses exactly the two fees.
    #[test]
    fn round_trip_at_flat_price_costs_two_fees(
        price in price_strategy(),
        size in size_strategy(),
    ) {
        let mut engine = engine_at(price);
        let opening = engine.balance().cash;

        let buy = engine
            .place_order("CSK", OrderKind::Market, Side::Buy, None, size)
            .unwrap();
        prop_assert_eq!(buy.status, OrderStatus::Filled);

        let sell = engine
            .place_order("CSK", OrderKind::Market, Side::Sell, None, size)
            .unwrap();
        prop_assert_eq!(sell.status, OrderStatus::Filled);

        let buy_fee = buy.execution.unwrap().fee;
        let sell_fee = sell.execution.unwrap().fee;
        prop_assert_eq!(
            engine.balance().cash,
            opening.sub(buy_fee).sub(sell_fee)
        );
        prop_assert!(engine.positions(None).is_empty());
    }

    /// place-then-cancel leaves cash and positions untouched for any valid order.
    #[test]
    fn place_cancel_neutrality(
        limit in price_strategy(),
        size in size_strategy(),
        is_buy in any::<bool>(),
    ) {
        let mut engine = engine_at(Cents(3400));
        let cash = engine.balance().cash;
        let side = if is_buy { Side::Buy } else { Side::Sell };

        let result = engine
            .place_order("CSK", OrderKind::Limit, side, Some(limit), size)
            .unwrap();
        engine.cancel_order(result.order_id).unwrap();

        prop_assert_eq!(engine.balance().cash, cash);
        prop_assert!(engine.positions(None).is_empty());
        prop_assert_eq!(
            engine.order(result.order_id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    /// The simulated walk never leaves [1, inf) under any seed.
    #[test]
    fn price_walk_never_below_one_cent(seed in any::<u64>()) {
        let config = FeedConfig {
            initial_price: Cents(2), // start at the edge
            ..FeedConfig::default()
        };
        let mut feed = PriceFeed::with_seed(&config, seed);
        for i in 0..500 {
            prop_assert!(feed.step(Timestamp::from_millis(i)).value() >= 1);
        }
    }

    /// Fee is monotone in notional and never negative.
    #[test]
    fn fee_monotone_in_notional(
        price in price_strategy(),
        size in size_strategy(),
    ) {
        let fee_bps = Bps::new(100);
        let notional = price.times(size);
        let bigger = notional.add(Cents(10_000));

        let fee = fee_bps.apply(notional);
        prop_assert!(fee.value() >= 0);
        prop_assert!(fee_bps.apply(bigger) >= fee);
    }

    /// Merged entry price always lies between the two fill prices.
    #[test]
    fn merged_entry_is_bounded_by_fills(
        first in price_strategy(),
        second in price_strategy(),
        size_a in size_strategy(),
        size_b in size_strategy(),
    ) {
        let mut book = PositionBook::new();
        let now = Timestamp::from_millis(0);
        book.apply_fill("CSK", Side::Buy, first, size_a, now);
        book.apply_fill("CSK", Side::Buy, second, size_b, now);

        let position = book.find("CSK", PositionSide::Long).unwrap();
        let low = first.min(second);
        let high = first.max(second);
        prop_assert!(position.entry_price >= low && position.entry_price <= high);
        prop_assert_eq!(position.size.value(), size_a.value() + size_b.value());
    }
}
