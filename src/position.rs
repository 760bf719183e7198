// 4.0: open position tracking. pnl = (mark - entry) * size for longs, mirrored for shorts.
// at most one open position per (symbol, side). same-direction fills merge with a
// weighted-average entry, opposite-direction fills reduce. a position at size zero
// is removed, never retained.
//
// residual policy: a reducing fill may never exceed the held size. the engine
// rejects oversized exits before they reach this book, so no fill ever flips a
// position onto the other side.

use crate::types::{Cents, PositionId, PositionSide, Side, Size, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub side: PositionSide,
    pub size: Size,
    /// Size-weighted average of the fills that built this position.
    pub entry_price: Cents,
    pub current_price: Cents,
    /// Mark-to-market unrealized pnl. Derived, refreshed on every reprice.
    pub pnl: Cents,
    pub opened_at: Timestamp,
}

impl Position {
    pub fn notional(&self) -> Cents {
        self.current_price.times(self.size)
    }
}

// 4.1: the pnl formula, unrealized and realized share it.
pub fn mark_to_market(side: PositionSide, entry: Cents, mark: Cents, size: Size) -> Cents {
    let per_share = match side {
        PositionSide::Long => mark.sub(entry),
        PositionSide::Short => entry.sub(mark),
    };
    per_share.times(size)
}

// 4.2: weighted-average entry after a same-direction merge, rounded half-up.
fn merged_entry(old_entry: Cents, old_size: Size, fill_price: Cents, fill_size: Size) -> Cents {
    let weighted = old_entry.value() as i128 * old_size.value() as i128
        + fill_price.value() as i128 * fill_size.value() as i128;
    let total = (old_size.value() + fill_size.value()) as i128;
    let rounded = (weighted + total / 2) / total;
    Cents(rounded as i64)
}

/// What a fill did to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    Opened(PositionId),
    Merged(PositionId),
    Reduced {
        id: PositionId,
        remaining: Size,
        /// Realized on the reduced portion, at the fill price.
        realized_pnl: Cents,
    },
    Closed {
        id: PositionId,
        realized_pnl: Cents,
    },
}

/// A fully closed position, returned for trade recording.
#[derive(Debug, Clone)]
pub struct ClosedPosition {
    pub id: PositionId,
    pub symbol: String,
    pub side: PositionSide,
    pub size: Size,
    pub entry_price: Cents,
    /// Realized against the exit price.
    pub realized_pnl: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("position {0:?} not found")]
    NotFound(PositionId),
}

#[derive(Debug)]
pub struct PositionBook {
    positions: Vec<Position>,
    next_id: u64,
}

impl Default for PositionBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionBook {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            next_id: 1,
        }
    }

    fn next_position_id(&mut self) -> PositionId {
        let id = PositionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn open(&self, symbol: Option<&str>) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|p| symbol.map_or(true, |s| p.symbol == s))
            .collect()
    }

    /// The one open position on (symbol, side), if any.
    pub fn find(&self, symbol: &str, side: PositionSide) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.symbol == symbol && p.side == side)
    }

    pub fn held_size(&self, symbol: &str, side: PositionSide) -> Option<Size> {
        self.find(symbol, side).map(|p| p.size)
    }

    // 4.3: route an executed fill into the book.
    //   same-direction position -> merge, weighted-average entry
    //   opposite-direction position -> reduce by min(held, fill), remove at zero
    //   neither -> open fresh at the fill price
    pub fn apply_fill(
        &mut self,
        symbol: &str,
        fill_side: Side,
        price: Cents,
        size: Size,
        now: Timestamp,
    ) -> FillOutcome {
        let grows = fill_side.position_side();
        let shrinks = grows.opposite();

        if let Some(idx) = self.index_of(symbol, shrinks) {
            return self.reduce_at(idx, price, size);
        }

        if let Some(idx) = self.index_of(symbol, grows) {
            let position = &mut self.positions[idx];
            position.entry_price = merged_entry(position.entry_price, position.size, price, size);
            position.size = Size::new_unchecked(position.size.value() + size.value());
            position.current_price = price;
            position.pnl = mark_to_market(grows, position.entry_price, price, position.size);
            return FillOutcome::Merged(position.id);
        }

        let id = self.next_position_id();
        self.positions.push(Position {
            id,
            symbol: symbol.to_string(),
            side: grows,
            size,
            entry_price: price,
            current_price: price,
            pnl: Cents::ZERO,
            opened_at: now,
        });
        FillOutcome::Opened(id)
    }

    fn index_of(&self, symbol: &str, side: PositionSide) -> Option<usize> {
        self.positions
            .iter()
            .position(|p| p.symbol == symbol && p.side == side)
    }

    fn reduce_at(&mut self, idx: usize, price: Cents, fill_size: Size) -> FillOutcome {
        let position = &mut self.positions[idx];
        debug_assert!(
            fill_size <= position.size,
            "reducing fill exceeds held size; engine must reject oversized exits"
        );

        let reduce_by = position.size.min(fill_size);
        let realized = mark_to_market(position.side, position.entry_price, price, reduce_by);

        match position.size.checked_reduce(reduce_by) {
            Some(remaining) => {
                position.size = remaining;
                position.current_price = price;
                // entry price is unchanged on reduction
                position.pnl = mark_to_market(position.side, position.entry_price, price, remaining);
                FillOutcome::Reduced {
                    id: position.id,
                    remaining,
                    realized_pnl: realized,
                }
            }
            None => {
                let id = position.id;
                self.positions.remove(idx);
                FillOutcome::Closed {
                    id,
                    realized_pnl: realized,
                }
            }
        }
    }

    // 4.4: mark every open position to the new price. pure function of
    // (entry, mark, size), so repeated calls at the same price are identical.
    pub fn reprice_all(&mut self, price: Cents) {
        for position in &mut self.positions {
            position.current_price = price;
            position.pnl = mark_to_market(position.side, position.entry_price, price, position.size);
        }
    }

    pub fn total_pnl(&self) -> Cents {
        self.positions.iter().map(|p| p.pnl).sum()
    }

    /// Remove a position outright, realizing against the exit price.
    pub fn close(&mut self, id: PositionId, exit_price: Cents) -> Result<ClosedPosition, PositionError> {
        let idx = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(PositionError::NotFound(id))?;
        let position = self.positions.remove(idx);
        let realized = mark_to_market(position.side, position.entry_price, exit_price, position.size);
        Ok(ClosedPosition {
            id: position.id,
            symbol: position.symbol,
            side: position.side,
            size: position.size,
            entry_price: position.entry_price,
            realized_pnl: realized,
        })
    }

    /// Re-admit a persisted position with its original identity.
    pub(crate) fn restore(&mut self, position: Position) {
        self.next_id = self.next_id.max(position.id.0 + 1);
        self.positions.push(position);
    }
}
