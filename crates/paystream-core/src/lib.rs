//! # paystream-core
//! Foundation types, accrual math and collaborator traits for PayStream.
//!
//! A stream commits a deposit to one payee over `[start, end)`; the payee's
//! earned balance grows by `floor(deposit / duration)` per active second and
//! is flushed to the exact deposit once the schedule completes.

pub mod accrual;
pub mod constants;
pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use accrual::{earned, schedule, split_levy, withdrawable};
pub use error::{PoolError, StreamError};
pub use events::StreamEvent;
pub use types::{
    AccountId, Amount, BatchRequest, FullTermRule, LevySplit, Recipient, StreamParams,
    StreamRecord, StreamState, StreamStatus, Timestamp, Transfer,
};
