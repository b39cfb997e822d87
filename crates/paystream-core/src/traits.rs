//! Trait interfaces for the collaborators around the settlement engine.
//!
//! - [`FundingPool`]: custodies the settlement asset and releases it
//! - [`LevyCollector`]: receives withheld levy amounts
//! - [`Authorizer`]: answers whether a caller may administer streams
//! - [`EventSink`]: fire-and-forget audit trail

use crate::error::PoolError;
use crate::events::StreamEvent;
use crate::types::{AccountId, Amount, Recipient, Transfer};

/// Sum of a list of amounts, failing on overflow.
///
/// This is the funding requirement for opening streams with these totals.
pub fn sum_of(amounts: &[Amount]) -> Result<Amount, PoolError> {
    amounts
        .iter()
        .try_fold(0u128, |acc, &a| acc.checked_add(a))
        .ok_or(PoolError::ArithmeticOverflow)
}

/// The shared pool that funds every stream.
///
/// Implementations are driven under the engine's lock; they need not be
/// internally synchronized.
pub trait FundingPool: Send {
    /// Current balance in base units.
    fn balance(&self) -> Amount;

    /// Move `amount` out of the pool to `recipient`.
    ///
    /// Must either move the full amount or fail without effect.
    fn release_to(&mut self, recipient: Recipient, amount: Amount) -> Result<(), PoolError>;

    /// Undo a successful [`release_to`](Self::release_to) of `amount` to
    /// `recipient`, returning the funds to the pool.
    fn restore(&mut self, recipient: Recipient, amount: Amount);

    /// Release every transfer or none.
    ///
    /// Default implementation checks the combined requirement against
    /// [`balance`](Self::balance), then releases leg by leg. If a leg fails,
    /// the legs already released are restored in reverse order before the
    /// error is returned. Zero-amount legs are skipped.
    fn release_all(&mut self, transfers: &[Transfer]) -> Result<(), PoolError> {
        let amounts: Vec<Amount> = transfers.iter().map(|t| t.amount).collect();
        let need = sum_of(&amounts)?;
        let have = self.balance();
        if have < need {
            return Err(PoolError::InsufficientFunds { have, need });
        }
        let legs: Vec<&Transfer> = transfers.iter().filter(|t| t.amount > 0).collect();
        for (done, t) in legs.iter().enumerate() {
            if let Err(err) = self.release_to(t.recipient, t.amount) {
                for undo in legs[..done].iter().rev() {
                    self.restore(undo.recipient, undo.amount);
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// The account that collects withheld levies.
pub trait LevyCollector: Send {
    /// Credit a levy released from the pool.
    fn receive(&mut self, amount: Amount);

    /// Amount currently held.
    fn balance(&self) -> Amount;

    /// Cumulative amount ever received.
    ///
    /// Default implementation: same as [`balance`](Self::balance), for
    /// collectors that never disburse.
    fn total_received(&self) -> Amount {
        self.balance()
    }
}

/// Capability check for administrator-class operations.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: &AccountId) -> bool;
}

/// Destination for committed domain events. Must not block or fail.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StreamEvent);
}
