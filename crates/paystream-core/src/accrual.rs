//! Accrual math: schedule derivation, earned-to-date, levy split.
//!
//! All arithmetic is unsigned integer with truncating division. Nothing here
//! touches state; every function is a pure map from its inputs.

use crate::constants::{BPS_PRECISION, MAX_DEPOSIT};
use crate::error::StreamError;
use crate::types::{Amount, FullTermRule, LevySplit, StreamRecord, StreamState, Timestamp};

/// Per-second rate and rounding residue for a deposit spread over `[start, end)`.
///
/// Invariant: `rate * (end - start) + remainder == amount` and
/// `remainder < end - start`.
pub fn schedule(
    amount: Amount,
    start: Timestamp,
    end: Timestamp,
) -> Result<(Amount, Amount), StreamError> {
    if end <= start {
        return Err(StreamError::InvalidSchedule { start, end });
    }
    if amount == 0 || amount > MAX_DEPOSIT {
        return Err(StreamError::InvalidAmount(amount));
    }
    let duration = (end - start) as u128;
    let rate = amount / duration;
    let remainder = amount - rate * duration;
    Ok((rate, remainder))
}

/// Amount earned by `record` as of `now`.
///
/// - canceled: the frozen amount, independent of `now`
/// - before start: zero
/// - paused: evaluated at the pause instant
/// - effective instant at or past the end: the exact deposit, when the
///   record's [`FullTermRule`] allows the flush
/// - otherwise `rate * active seconds`, capped at the deposit
pub fn earned(record: &StreamRecord, now: Timestamp) -> Amount {
    let total_paused = match record.state {
        StreamState::Canceled { frozen_earned, .. } => return frozen_earned,
        StreamState::Active { total_paused } | StreamState::Paused { total_paused, .. } => {
            total_paused
        }
    };
    if now < record.start_time {
        return 0;
    }

    let observed = record.state.paused_at().unwrap_or(now);
    let effective_now = observed.min(record.end_time);
    let elapsed = effective_now.saturating_sub(record.start_time);
    let active = elapsed.saturating_sub(total_paused);

    if effective_now >= record.end_time {
        let flush = match record.full_term_rule {
            FullTermRule::Always => true,
            FullTermRule::OnlyUninterrupted => total_paused == 0,
        };
        if flush {
            return record.deposited;
        }
    }

    // active <= duration, so rate * active <= deposited: no overflow.
    (record.rate_per_sec * active as u128).min(record.deposited)
}

/// Earned but not yet withdrawn as of `now`.
pub fn withdrawable(record: &StreamRecord, now: Timestamp) -> Amount {
    earned(record, now).saturating_sub(record.withdrawn)
}

/// Split `total` into net and levy: `levy = total * bps / 10_000`, truncating.
pub fn split_levy(total: Amount, levy_bps: u16) -> Result<LevySplit, StreamError> {
    let levy = total
        .checked_mul(levy_bps as u128)
        .ok_or(StreamError::ArithmeticOverflow)?
        / BPS_PRECISION as u128;
    Ok(LevySplit {
        net: total - levy,
        levy,
    })
}
