// 5.0: cash accounting for the single trading identity. one balance, one
// aggregate pnl figure, nothing else.
//
// debit rejects instead of clamping: silently flooring at zero would hide
// insolvency from the caller, so an overdraft is an InsufficientFunds error
// and the balance is untouched.

use crate::types::Cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Cents, available: Cents },
}

/// Read-only view handed to queries. Dollar projections are the presentation
/// boundary, everything else in the engine stays in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub cash: Cents,
    pub total_pnl: Cents,
}

impl BalanceSnapshot {
    pub fn cash_dollars(&self) -> Decimal {
        self.cash.to_dollars()
    }

    pub fn total_pnl_dollars(&self) -> Decimal {
        self.total_pnl.to_dollars()
    }
}

#[derive(Debug, Clone)]
pub struct BalanceLedger {
    cash: Cents,
    total_pnl: Cents,
}

impl BalanceLedger {
    pub fn new(opening_cash: Cents) -> Self {
        debug_assert!(!opening_cash.is_negative());
        Self {
            cash: opening_cash,
            total_pnl: Cents::ZERO,
        }
    }

    pub fn cash(&self) -> Cents {
        self.cash
    }

    pub fn can_cover(&self, amount: Cents) -> bool {
        amount <= self.cash
    }

    pub fn credit(&mut self, amount: Cents) {
        debug_assert!(!amount.is_negative());
        self.cash = self.cash.add(amount);
    }

    pub fn debit(&mut self, amount: Cents) -> Result<(), LedgerError> {
        debug_assert!(!amount.is_negative());
        if !self.can_cover(amount) {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: self.cash,
            });
        }
        self.cash = self.cash.sub(amount);
        Ok(())
    }

    /// Refreshed from the position book after every reprice.
    pub fn set_total_pnl(&mut self, pnl: Cents) {
        self.total_pnl = pnl;
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            cash: self.cash,
            total_pnl: self.total_pnl,
        }
    }

    /// Overwrite from a persisted snapshot. Negative cash in a corrupt payload
    /// is floored at zero rather than admitted.
    pub(crate) fn restore(&mut self, cash: Cents, total_pnl: Cents) {
        self.cash = Cents(cash.value().max(0));
        self.total_pnl = total_pnl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn credit_and_debit() {
        let mut ledger = BalanceLedger::new(Cents(100_000));
        ledger.credit(Cents(500));
        assert_eq!(ledger.cash(), Cents(100_500));
        ledger.debit(Cents(34_340)).unwrap();
        assert_eq!(ledger.cash(), Cents(66_160));
    }

    #[test]
    fn overdraft_rejects_and_leaves_balance() {
        let mut ledger = BalanceLedger::new(Cents(100));
        let err = ledger.debit(Cents(101)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                needed: Cents(101),
                available: Cents(100),
            }
        );
        assert_eq!(ledger.cash(), Cents(100));
    }

    #[test]
    fn debit_to_exactly_zero_is_allowed() {
        let mut ledger = BalanceLedger::new(Cents(100));
        ledger.debit(Cents(100)).unwrap();
        assert_eq!(ledger.cash(), Cents::ZERO);
    }

    #[test]
    fn snapshot_converts_at_the_boundary() {
        let mut ledger = BalanceLedger::new(Cents(100_000));
        ledger.set_total_pnl(Cents(-1234));
        let snap = ledger.snapshot();
        assert_eq!(snap.cash_dollars(), dec!(1000.00));
        assert_eq!(snap.total_pnl_dollars(), dec!(-12.34));
    }

    #[test]
    fn restore_floors_negative_cash() {
        let mut ledger = BalanceLedger::new(Cents(100));
        ledger.restore(Cents(-50), Cents(0));
        assert_eq!(ledger.cash(), Cents::ZERO);
    }
}
