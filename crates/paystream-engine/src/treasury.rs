//! In-memory payroll treasury and levy vault.
//!
//! [`PayrollTreasury`] is the funding pool administrators deposit into and
//! settlements draw from. [`LevyVault`] accumulates withheld levies.

use std::collections::HashMap;

use paystream_core::error::PoolError;
use paystream_core::traits::{FundingPool, LevyCollector, sum_of};
use paystream_core::types::{Amount, Recipient};
use tracing::info;

/// Shared funding pool with a per-recipient payout tally.
#[derive(Debug, Clone, Default)]
pub struct PayrollTreasury {
    balance: Amount,
    total_deposited: Amount,
    paid: HashMap<Recipient, Amount>,
}

impl PayrollTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// A treasury pre-funded with `amount`.
    pub fn with_balance(amount: Amount) -> Self {
        Self {
            balance: amount,
            total_deposited: amount,
            paid: HashMap::new(),
        }
    }

    /// Add funds to the pool.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), PoolError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let total = self
            .total_deposited
            .checked_add(amount)
            .ok_or(PoolError::ArithmeticOverflow)?;
        self.balance = balance;
        self.total_deposited = total;
        info!(amount, balance, "treasury funded");
        Ok(())
    }

    /// Funding needed to open streams with these totals.
    pub fn required_funding(amounts: &[Amount]) -> Result<Amount, PoolError> {
        sum_of(amounts)
    }

    /// Cumulative amount released to `recipient`.
    pub fn paid_to(&self, recipient: &Recipient) -> Amount {
        self.paid.get(recipient).copied().unwrap_or(0)
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    /// Cumulative amount released to anyone.
    pub fn total_released(&self) -> Amount {
        self.total_deposited - self.balance
    }
}

impl FundingPool for PayrollTreasury {
    fn balance(&self) -> Amount {
        self.balance
    }

    fn release_to(&mut self, recipient: Recipient, amount: Amount) -> Result<(), PoolError> {
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(PoolError::InsufficientFunds {
                have: self.balance,
                need: amount,
            })?;
        self.balance = remaining;
        *self.paid.entry(recipient).or_default() += amount;
        Ok(())
    }

    fn restore(&mut self, recipient: Recipient, amount: Amount) {
        self.balance = self.balance.saturating_add(amount);
        if let Some(paid) = self.paid.get_mut(&recipient) {
            *paid = paid.saturating_sub(amount);
            if *paid == 0 {
                self.paid.remove(&recipient);
            }
        }
    }
}

/// Collector for withheld levies.
#[derive(Debug, Clone, Default)]
pub struct LevyVault {
    balance: Amount,
    total_received: Amount,
}

impl LevyVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LevyCollector for LevyVault {
    fn receive(&mut self, amount: Amount) {
        self.balance = self.balance.saturating_add(amount);
        self.total_received = self.total_received.saturating_add(amount);
    }

    fn balance(&self) -> Amount {
        self.balance
    }

    fn total_received(&self) -> Amount {
        self.total_received
    }
}
