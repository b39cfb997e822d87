//! Observable domain events, emitted after an operation commits.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, Timestamp};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    StreamCreated {
        payee: AccountId,
        total_amount: Amount,
        start: Timestamp,
        end: Timestamp,
        rate: Amount,
        remainder: Amount,
        levy_bps: u16,
    },
    StreamPaused {
        payee: AccountId,
        paused_at: Timestamp,
    },
    StreamResumed {
        payee: AccountId,
        resumed_at: Timestamp,
        total_paused: u64,
    },
    StreamCanceled {
        payee: AccountId,
        frozen_earned: Amount,
    },
    Withdrawn {
        payee: AccountId,
        net: Amount,
        levy: Amount,
    },
}

impl StreamEvent {
    /// The payee the event concerns.
    pub fn payee(&self) -> AccountId {
        match *self {
            Self::StreamCreated { payee, .. }
            | Self::StreamPaused { payee, .. }
            | Self::StreamResumed { payee, .. }
            | Self::StreamCanceled { payee, .. }
            | Self::Withdrawn { payee, .. } => payee,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StreamCreated { .. } => "stream_created",
            Self::StreamPaused { .. } => "stream_paused",
            Self::StreamResumed { .. } => "stream_resumed",
            Self::StreamCanceled { .. } => "stream_canceled",
            Self::Withdrawn { .. } => "withdrawn",
        }
    }
}
