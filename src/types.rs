// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, cents, sizes, fee rates, timestamps. each is a newtype so the compiler catches type mixups.
//
// canonical unit: integer cents for every price, notional, fee, balance and pnl.
// dollars exist only at the presentation boundary (Cents::to_dollars).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeId(pub u64);

// Buy adds to the long side, Sell takes from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    // which position side a fill on this order side grows
    pub fn position_side(&self) -> PositionSide {
        match self {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
        }
    }

    // closing a long sells, closing a short buys back
    pub fn exit_side(&self) -> Side {
        match self {
            PositionSide::Long => Side::Sell,
            PositionSide::Short => Side::Buy,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

// 1.1: money in integer cents. signed because pnl can be negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn add(&self, other: Cents) -> Self {
        Self(self.0 + other.0)
    }

    pub fn checked_add(&self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }

    pub fn sub(&self, other: Cents) -> Self {
        Self(self.0 - other.0)
    }

    pub fn negate(&self) -> Self {
        Self(-self.0)
    }

    // notional = price * size. None when the product leaves the i64 range;
    // money movements must go through this and reject on None.
    pub fn checked_times(&self, size: Size) -> Option<Cents> {
        let wide = self.0 as i128 * size.value() as i128;
        i64::try_from(wide).ok().map(Cents)
    }

    // saturating variant for informational marks (pnl display). never used
    // where cash actually moves.
    pub fn times(&self, size: Size) -> Cents {
        let wide = self.0 as i128 * size.value() as i128;
        Cents(i64::try_from(wide).unwrap_or(if wide > 0 { i64::MAX } else { i64::MIN }))
    }

    // boundary conversion: 3400 cents -> dec!(34.00)
    pub fn to_dollars(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_dollars())
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| acc.add(c))
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| acc.add(*c))
    }
}

// 1.2: share count. must be positive, zero-size orders and positions do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Size(i64);

impl Size {
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        if value > 0 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: i64) -> Self {
        debug_assert!(value > 0);
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn min(&self, other: Size) -> Size {
        Size(self.0.min(other.0))
    }

    // None when the reduction consumes the whole size
    pub fn checked_reduce(&self, by: Size) -> Option<Size> {
        Size::new(self.0 - by.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: basis points. 100 bps = 1%. fee math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bps(i32);

impl Bps {
    pub fn new(bps: i32) -> Self {
        Self(bps)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }

    // amount * bps / 10_000, rounded half-up. used for fees and the price walk.
    // None when the result leaves the i64 range (rates above 100% on amounts
    // near the bound); fee charging rejects on None.
    pub fn checked_apply(&self, amount: Cents) -> Option<Cents> {
        i64::try_from(self.rounded_wide(amount)).ok().map(Cents)
    }

    // saturating variant for informational figures.
    pub fn apply(&self, amount: Cents) -> Cents {
        let rounded = self.rounded_wide(amount);
        Cents(i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }))
    }

    fn rounded_wide(&self, amount: Cents) -> i128 {
        let wide = amount.value() as i128 * self.0 as i128;
        if wide >= 0 {
            (wide + 5_000) / 10_000
        } else {
            (wide - 5_000) / 10_000
        }
    }
}

// 1.4: millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cents_to_dollars() {
        assert_eq!(Cents(3400).to_dollars(), dec!(34.00));
        assert_eq!(Cents(1).to_dollars(), dec!(0.01));
        assert_eq!(Cents(-250).to_dollars(), dec!(-2.50));
    }

    #[test]
    fn cents_times_size() {
        let notional = Cents(3400).times(Size::new(10).unwrap());
        assert_eq!(notional, Cents(34_000));
    }

    #[test]
    fn bps_fee() {
        let one_percent = Bps::new(100);
        assert_eq!(one_percent.as_fraction(), dec!(0.01));
        assert_eq!(one_percent.apply(Cents(34_000)), Cents(340));
        // half-up rounding: 50 cents * 1% = 0.5 cents -> 1 cent
        assert_eq!(one_percent.apply(Cents(50)), Cents(1));
        assert_eq!(one_percent.apply(Cents(-50)), Cents(-1));
    }

    #[test]
    fn notional_overflow_is_detected_not_wrapped() {
        let huge = Cents(4_000_000_000_000_000_000);
        let ten = Size::new(10).unwrap();
        assert_eq!(huge.checked_times(ten), None);
        // the saturating form clamps instead of wrapping
        assert_eq!(huge.times(ten), Cents(i64::MAX));
        assert_eq!(huge.negate().times(ten), Cents(i64::MIN));
        // in range, both agree
        assert_eq!(Cents(3400).checked_times(ten), Some(Cents(34_000)));
    }

    #[test]
    fn checked_add_rejects_overflow() {
        assert_eq!(Cents(i64::MAX).checked_add(Cents(1)), None);
        assert_eq!(Cents(34_000).checked_add(Cents(340)), Some(Cents(34_340)));
    }

    #[test]
    fn fee_overflow_is_detected_not_wrapped() {
        // 200% of near-max cannot be represented
        let two_x = Bps::new(20_000);
        assert_eq!(two_x.checked_apply(Cents(i64::MAX)), None);
        assert_eq!(two_x.apply(Cents(i64::MAX)), Cents(i64::MAX));
        assert_eq!(Bps::new(100).checked_apply(Cents(34_000)), Some(Cents(340)));
    }

    #[test]
    fn size_rejects_nonpositive() {
        assert!(Size::new(0).is_none());
        assert!(Size::new(-5).is_none());
        assert_eq!(Size::new(10).unwrap().value(), 10);
    }

    #[test]
    fn size_checked_reduce() {
        let ten = Size::new(10).unwrap();
        let four = Size::new(4).unwrap();
        assert_eq!(ten.checked_reduce(four), Size::new(6));
        assert_eq!(ten.checked_reduce(ten), None);
    }

    #[test]
    fn side_mapping() {
        assert_eq!(Side::Buy.position_side(), PositionSide::Long);
        assert_eq!(Side::Sell.position_side(), PositionSide::Short);
        assert_eq!(PositionSide::Long.exit_side(), Side::Sell);
        assert_eq!(PositionSide::Short.exit_side(), Side::Buy);
    }
}
