//! Settlement: pay out earned-but-unwithdrawn amounts, split into net and levy.
//!
//! Ordering is checks, effects, interactions: the record's `withdrawn`
//! counter is advanced before any funds move, and restored if the pool
//! refuses the release.

use paystream_core::accrual::{split_levy, withdrawable};
use paystream_core::error::StreamError;
use paystream_core::traits::{FundingPool, LevyCollector};
use paystream_core::types::{AccountId, Amount, LevySplit, Recipient, Timestamp, Transfer};
use tracing::{debug, warn};

use crate::lifecycle::StreamBook;

/// Read-only withdrawable amount for `payee` at `now`.
pub fn withdrawable_of(
    book: &StreamBook,
    payee: &AccountId,
    now: Timestamp,
) -> Result<Amount, StreamError> {
    let record = book.get(payee).ok_or(StreamError::NoStream(*payee))?;
    Ok(withdrawable(record, now))
}

/// Withdraw everything `payee` has earned by `now`.
///
/// On success the pool has released `net` to the payee and `levy` to the
/// levy account, and the collector has been credited with `levy`. On any
/// failure the book, pool and collector are unchanged.
pub fn withdraw(
    book: &mut StreamBook,
    pool: &mut dyn FundingPool,
    collector: &mut dyn LevyCollector,
    payee: &AccountId,
    now: Timestamp,
) -> Result<LevySplit, StreamError> {
    let record = book.get_mut(payee).ok_or(StreamError::NoStream(*payee))?;

    let total = withdrawable(record, now);
    if total == 0 {
        return Err(StreamError::NothingToWithdraw(*payee));
    }
    let split = split_levy(total, record.levy_bps)?;

    let before = record.withdrawn;
    record.withdrawn = before
        .checked_add(total)
        .ok_or(StreamError::ArithmeticOverflow)?;

    let legs = [
        Transfer {
            recipient: Recipient::Payee(*payee),
            amount: split.net,
        },
        Transfer {
            recipient: Recipient::LevyAccount,
            amount: split.levy,
        },
    ];
    if let Err(err) = pool.release_all(&legs) {
        record.withdrawn = before;
        warn!(%payee, total, %err, "settlement release failed, withdrawal rolled back");
        return Err(err.into());
    }
    if split.levy > 0 {
        collector.receive(split.levy);
    }

    debug!(%payee, net = split.net, levy = split.levy, withdrawn = record.withdrawn, "settled");
    Ok(split)
}
