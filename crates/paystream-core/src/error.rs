//! Error types for PayStream.
use thiserror::Error;

use crate::types::{AccountId, Amount, StreamStatus, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("caller {0} is not authorized")] Unauthorized(AccountId),
    #[error("invalid schedule: end {end} must be after start {start}")] InvalidSchedule { start: Timestamp, end: Timestamp },
    #[error("invalid levy: {bps} bps exceeds maximum {max}")] InvalidLevy { bps: u16, max: u16 },
    #[error("invalid amount: {0}")] InvalidAmount(Amount),
    #[error("stream already exists for {0}")] DuplicateStream(AccountId),
    #[error("canceled stream for {payee} still owes {owed}")] UnsettledStream { payee: AccountId, owed: Amount },
    #[error("no stream for {0}")] NoStream(AccountId),
    #[error("invalid state for {payee}: {status}")] InvalidState { payee: AccountId, status: StreamStatus },
    #[error("nothing to withdraw for {0}")] NothingToWithdraw(AccountId),
    #[error("array length mismatch: {0:?}")] ArrayLengthMismatch([usize; 5]),
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: Amount, need: Amount },
    #[error("clock regression: {now} is before {last}")] ClockRegression { last: Timestamp, now: Timestamp },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("batch entry {index}: {source}")] BatchEntry { index: usize, source: Box<StreamError> },
}

impl StreamError {
    /// The underlying error, looking through a batch entry wrapper.
    pub fn root(&self) -> &StreamError {
        match self {
            StreamError::BatchEntry { source, .. } => source.root(),
            other => other,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: Amount, need: Amount },
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

impl From<PoolError> for StreamError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::InsufficientFunds { have, need } => StreamError::InsufficientFunds { have, need },
            PoolError::ArithmeticOverflow => StreamError::ArithmeticOverflow,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: {0} bytes, expected 20")] InvalidLength(usize),
}
