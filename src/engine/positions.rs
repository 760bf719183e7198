//! Explicit position close: an immediate market exit of the full size.

use super::core::Engine;
use super::results::{EngineError, ExecutionSummary};
use crate::events::{EventPayload, PositionClosedEvent};
use crate::position::{ClosedPosition, PositionError};
use crate::trade::TradeOrigin;
use crate::types::{PositionId, PositionSide};

impl Engine {
    /// Close a position at the current feed price, full remaining size.
    ///
    /// Long: sell, credit `notional - fee`. Short: buy back, debit
    /// `notional + fee`; if cash cannot cover the buy-back the close is
    /// rejected and the position stays open.
    pub fn close_position(
        &mut self,
        position_id: PositionId,
    ) -> Result<(ClosedPosition, ExecutionSummary), EngineError> {
        let position = self
            .positions
            .get(position_id)
            .ok_or(PositionError::NotFound(position_id))?;
        let side = position.side;
        let size = position.size;
        let symbol = position.symbol.clone();

        let exit_price = self.feed.current();
        let notional = exit_price
            .checked_times(size)
            .ok_or(EngineError::NotionalOverflow)?;
        let fee = self
            .config
            .fee_bps
            .checked_apply(notional)
            .ok_or(EngineError::NotionalOverflow)?;

        match side {
            PositionSide::Long => self.ledger.credit(notional.sub(fee)),
            PositionSide::Short => {
                let total = notional
                    .checked_add(fee)
                    .ok_or(EngineError::NotionalOverflow)?;
                self.ledger.debit(total)?;
            }
        }

        // cannot fail: existence was checked above and &mut self held throughout
        let closed = self.positions.close(position_id, exit_price)?;
        self.refresh_total_pnl();
        self.emit_balance_changed();

        let trade_id = self.trades.record(
            TradeOrigin::PositionClose(position_id),
            &symbol,
            side.exit_side(),
            exit_price,
            size,
            fee,
            self.current_time,
        );

        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            position_id,
            exit_price,
            realized_pnl: closed.realized_pnl,
        }));

        tracing::debug!(
            position_id = position_id.0,
            %side,
            exit = exit_price.value(),
            realized = closed.realized_pnl.value(),
            "position closed"
        );

        Ok((
            closed,
            ExecutionSummary {
                trade_id,
                fill_price: exit_price,
                fee,
            },
        ))
    }
}
