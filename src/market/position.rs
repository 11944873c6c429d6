//! Leveraged position accounting
//!
//! One position at most. Opening locks collateral out of the balance; closing
//! pays back `max(0, collateral * (1 + pnl))`; liquidation clears the position
//! with nothing paid once the loss reaches the whole collateral.

use serde::{Deserialize, Serialize};

/// Slack so that exact -100% moves liquidate despite float rounding
pub const LIQUIDATION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "Long",
            Side::Short => "Short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub collateral: f64,
}

impl Position {
    /// Return on collateral as a multiple (0.5 = +50%, -1 = wiped out)
    pub fn pnl_multiple(&self, price: f64, leverage: f64) -> f64 {
        if !(price > 0.0 && self.entry_price > 0.0) {
            return 0.0;
        }
        match self.side {
            Side::Long => (price / self.entry_price - 1.0) * leverage,
            Side::Short => (self.entry_price / price - 1.0) * leverage,
        }
    }

    /// What closing at `price` would pay back
    pub fn payout(&self, price: f64, leverage: f64) -> f64 {
        (self.collateral * (1.0 + self.pnl_multiple(price, leverage))).max(0.0)
    }

    pub fn is_liquidatable(&self, price: f64, leverage: f64) -> bool {
        self.pnl_multiple(price, leverage) <= -1.0 + LIQUIDATION_EPSILON
    }
}

/// A position that was closed by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedTrade {
    pub position: Position,
    pub exit_price: f64,
    pub pnl_multiple: f64,
    pub payout: f64,
}

/// A position wiped out by the liquidation monitor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Liquidation {
    pub position: Position,
    pub price: f64,
    pub pnl_multiple: f64,
}

/// Balance plus the single optional open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    balance: f64,
    position: Option<Position>,
}

impl Account {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: sanitize(balance),
            position: None,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Open a position sized `requested`, clamped into `[min_trade, balance]`.
    /// Returns None when a position is already open or the balance can't cover the minimum.
    pub fn open(
        &mut self,
        side: Side,
        requested: f64,
        price: f64,
        min_trade: f64,
    ) -> Option<Position> {
        if self.position.is_some() || !(price.is_finite() && price > 0.0) {
            return None;
        }

        let collateral = sanitize(requested).min(self.balance).max(sanitize(min_trade));
        if collateral <= 0.0 || collateral > self.balance {
            return None;
        }

        let position = Position {
            side,
            entry_price: price,
            collateral,
        };
        self.balance -= collateral;
        self.position = Some(position);
        Some(position)
    }

    /// Close at `price`, crediting the payout
    pub fn close(&mut self, price: f64, leverage: f64) -> Option<ClosedTrade> {
        let position = self.position.take()?;
        let pnl_multiple = position.pnl_multiple(price, leverage);
        let payout = position.payout(price, leverage);
        self.balance += payout;
        Some(ClosedTrade {
            position,
            exit_price: price,
            pnl_multiple,
            payout,
        })
    }

    /// Clear the position with no payout if its loss has reached 100%
    pub fn check_liquidation(&mut self, price: f64, leverage: f64) -> Option<Liquidation> {
        let position = *self.position.as_ref()?;
        if !position.is_liquidatable(price, leverage) {
            return None;
        }
        self.position = None;
        Some(Liquidation {
            position,
            price,
            pnl_multiple: position.pnl_multiple(price, leverage),
        })
    }
}

/// Non-finite and negative amounts become zero
fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LEVERAGE: f64 = 5.0;

    #[test]
    fn test_long_gain_projection() {
        let mut account = Account::new(1_000.0);
        let position = account.open(Side::Long, 100.0, 1_000_000.0, 10.0).unwrap();
        assert_eq!(account.balance(), 900.0);

        let pnl = position.pnl_multiple(1_100_000.0, LEVERAGE);
        assert!((pnl - 0.5).abs() < 1e-9);
        assert!((position.payout(1_100_000.0, LEVERAGE) - 150.0).abs() < 1e-9);

        let closed = account.close(1_100_000.0, LEVERAGE).unwrap();
        assert!((closed.payout - 150.0).abs() < 1e-9);
        assert!((account.balance() - 1_050.0).abs() < 1e-9);
        assert!(account.position().is_none());
    }

    #[test]
    fn test_round_trip_returns_collateral() {
        let mut account = Account::new(1_000.0);
        account.open(Side::Short, 250.0, 777_777.0, 10.0).unwrap();
        let closed = account.close(777_777.0, LEVERAGE).unwrap();
        assert_eq!(closed.pnl_multiple, 0.0);
        assert_eq!(closed.payout, 250.0);
        assert_eq!(account.balance(), 1_000.0);
    }

    #[test]
    fn test_short_liquidates_at_full_loss() {
        let mut account = Account::new(1_000.0);
        account.open(Side::Short, 100.0, 1_000_000.0, 10.0).unwrap();

        // +20% against the short is -83% on collateral at 5x
        assert!(account.check_liquidation(1_200_000.0, LEVERAGE).is_none());
        assert!(account.position().is_some());

        // +25% makes entry/price = 0.8 => -100%
        let liq = account.check_liquidation(1_250_000.0, LEVERAGE).unwrap();
        assert!((liq.pnl_multiple + 1.0).abs() < 1e-9);
        assert!(account.position().is_none());
        assert_eq!(account.balance(), 900.0);
    }

    #[test]
    fn test_long_liquidates_at_twenty_percent_drop() {
        let mut account = Account::new(1_000.0);
        account.open(Side::Long, 100.0, 1_000_000.0, 10.0).unwrap();
        assert!(account.check_liquidation(800_000.0, LEVERAGE).is_some());
        assert!(account.position().is_none());
    }

    #[test]
    fn test_deep_loss_payout_floors_at_zero() {
        let position = Position {
            side: Side::Long,
            entry_price: 1_000_000.0,
            collateral: 100.0,
        };
        assert_eq!(position.payout(500_000.0, LEVERAGE), 0.0);
    }

    #[test]
    fn test_single_position_only() {
        let mut account = Account::new(1_000.0);
        assert!(account.open(Side::Long, 100.0, 1_000.0, 10.0).is_some());
        assert!(account.open(Side::Short, 100.0, 1_000.0, 10.0).is_none());
        assert_eq!(account.balance(), 900.0);
    }

    #[test]
    fn test_size_is_clamped() {
        let mut account = Account::new(1_000.0);
        let p = account.open(Side::Long, 5_000.0, 1_000.0, 10.0).unwrap();
        assert_eq!(p.collateral, 1_000.0);
        account.close(1_000.0, LEVERAGE);

        let p = account.open(Side::Long, 1.0, 1_000.0, 10.0).unwrap();
        assert_eq!(p.collateral, 10.0);
        account.close(1_000.0, LEVERAGE);

        let p = account.open(Side::Long, f64::NAN, 1_000.0, 10.0).unwrap();
        assert_eq!(p.collateral, 10.0);
    }

    #[test]
    fn test_broke_account_cannot_open() {
        let mut account = Account::new(5.0);
        assert!(account.open(Side::Long, 100.0, 1_000.0, 10.0).is_none());
        assert_eq!(account.balance(), 5.0);
    }

    proptest! {
        #[test]
        fn prop_collateral_within_balance(
            balance in 0.0f64..10_000.0,
            requested in prop_oneof![any::<f64>(), -100.0f64..20_000.0],
            price in 1.0f64..1e9,
        ) {
            let mut account = Account::new(balance);
            let before = account.balance();
            if let Some(p) = account.open(Side::Long, requested, price, 10.0) {
                prop_assert!(p.collateral > 0.0);
                prop_assert!(p.collateral <= before);
                prop_assert!((account.balance() - (before - p.collateral)).abs() < 1e-9);
                prop_assert!(account.open(Side::Short, requested, price, 10.0).is_none());
            }
        }
    }
}
