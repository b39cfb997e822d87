//! Stream lifecycle: creation, batch intake, pause, resume, cancel.
//!
//! [`StreamBook`] owns every stream record, the archive of replaced records
//! and the payee registry. It enforces the state machine
//!
//! ```text
//!   None ──create──▶ Active ◀──resume── Paused
//!                      │  └────pause─────▶ │
//!                      └──cancel──▶ Canceled ◀──cancel──┘
//! ```
//!
//! Every method either applies its full effect or returns an error with the
//! book untouched. Authorization and clock ordering are the caller's concern.

use std::collections::{HashMap, HashSet};

use paystream_core::accrual::{earned, schedule};
use paystream_core::error::StreamError;
use paystream_core::events::StreamEvent;
use paystream_core::types::{
    AccountId, Amount, BatchRequest, FullTermRule, StreamParams, StreamRecord, StreamState,
    StreamStatus, Timestamp,
};

use crate::config::{EngineConfig, RecreatePolicy};
use crate::registry::PayeeRegistry;

/// Rules the book applies at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub max_levy_bps: u16,
    pub recreate_policy: RecreatePolicy,
    pub full_term_rule: FullTermRule,
}

impl From<&EngineConfig> for LifecyclePolicy {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            max_levy_bps: cfg.max_levy_bps,
            recreate_policy: cfg.recreate_policy,
            full_term_rule: cfg.full_term_rule,
        }
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// A creation request that passed validation.
struct Accepted {
    params: StreamParams,
    rate: Amount,
    remainder: Amount,
}

/// In-memory table of stream records keyed by payee.
#[derive(Debug, Clone, Default)]
pub struct StreamBook {
    records: HashMap<AccountId, StreamRecord>,
    archive: HashMap<AccountId, Vec<StreamRecord>>,
    registry: PayeeRegistry,
    policy: LifecyclePolicy,
}

impl StreamBook {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn get(&self, payee: &AccountId) -> Option<&StreamRecord> {
        self.records.get(payee)
    }

    pub(crate) fn get_mut(&mut self, payee: &AccountId) -> Option<&mut StreamRecord> {
        self.records.get_mut(payee)
    }

    /// Status of the payee's current record, `None` if there is none.
    pub fn status_of(&self, payee: &AccountId) -> StreamStatus {
        self.records
            .get(payee)
            .map_or(StreamStatus::None, StreamRecord::status)
    }

    /// Records replaced under [`RecreatePolicy::AfterCancel`], oldest first.
    pub fn history(&self, payee: &AccountId) -> &[StreamRecord] {
        self.archive.get(payee).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn registry(&self) -> &PayeeRegistry {
        &self.registry
    }

    /// Current records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &StreamRecord> {
        self.records.values()
    }

    /// Open a stream for `params.payee`.
    pub fn create(&mut self, params: StreamParams) -> Result<StreamEvent, StreamError> {
        let accepted = self.check_create(params, &HashSet::new())?;
        Ok(self.insert(accepted))
    }

    /// Open every stream in `batch`, or none.
    ///
    /// Entries are validated in order against the book plus the entries
    /// before them, so a payee repeated within the batch is rejected at its
    /// second occurrence. Nothing is written until every entry passes.
    pub fn batch_create(&mut self, batch: &BatchRequest) -> Result<Vec<StreamEvent>, StreamError> {
        let params = batch.to_params()?;

        let mut pending = HashSet::with_capacity(params.len());
        let mut accepted = Vec::with_capacity(params.len());
        for (index, p) in params.into_iter().enumerate() {
            let ok = self
                .check_create(p, &pending)
                .map_err(|e| StreamError::BatchEntry { index, source: Box::new(e) })?;
            pending.insert(p.payee);
            accepted.push(ok);
        }

        Ok(accepted.into_iter().map(|a| self.insert(a)).collect())
    }

    /// Freeze accrual for an active stream.
    pub fn pause(&mut self, payee: &AccountId, now: Timestamp) -> Result<StreamEvent, StreamError> {
        let record = self.records.get_mut(payee).ok_or(StreamError::NoStream(*payee))?;
        let StreamState::Active { total_paused } = record.state else {
            return Err(invalid_state(record));
        };
        record.state = StreamState::Paused {
            paused_at: now,
            total_paused,
        };
        Ok(StreamEvent::StreamPaused {
            payee: *payee,
            paused_at: now,
        })
    }

    /// Resume a paused stream.
    ///
    /// Only the part of the paused interval inside `[start_time, end_time]`
    /// is credited to `total_paused`; accrual is already zero before the
    /// start and capped after the end.
    pub fn resume(&mut self, payee: &AccountId, now: Timestamp) -> Result<StreamEvent, StreamError> {
        let record = self.records.get_mut(payee).ok_or(StreamError::NoStream(*payee))?;
        let StreamState::Paused {
            paused_at,
            total_paused,
        } = record.state
        else {
            return Err(invalid_state(record));
        };
        if now < paused_at {
            return Err(StreamError::ClockRegression {
                last: paused_at,
                now,
            });
        }
        let credited = now
            .min(record.end_time)
            .saturating_sub(paused_at.max(record.start_time));
        let total_paused = total_paused
            .checked_add(credited)
            .ok_or(StreamError::ArithmeticOverflow)?;
        record.state = StreamState::Active { total_paused };
        Ok(StreamEvent::StreamResumed {
            payee: *payee,
            resumed_at: now,
            total_paused,
        })
    }

    /// Terminate a stream, freezing what it has earned as of `now`.
    ///
    /// Returns the event together with the frozen amount.
    pub fn cancel(
        &mut self,
        payee: &AccountId,
        now: Timestamp,
    ) -> Result<(StreamEvent, Amount), StreamError> {
        let record = self.records.get_mut(payee).ok_or(StreamError::NoStream(*payee))?;
        if record.is_canceled() {
            return Err(invalid_state(record));
        }
        let frozen_earned = earned(record, now);
        record.state = StreamState::Canceled {
            frozen_earned,
            total_paused: record.state.total_paused(),
        };
        let event = StreamEvent::StreamCanceled {
            payee: *payee,
            frozen_earned,
        };
        Ok((event, frozen_earned))
    }

    fn check_create(
        &self,
        params: StreamParams,
        pending: &HashSet<AccountId>,
    ) -> Result<Accepted, StreamError> {
        let payee = params.payee;
        if pending.contains(&payee) {
            return Err(StreamError::DuplicateStream(payee));
        }
        if let Some(existing) = self.records.get(&payee) {
            match (self.policy.recreate_policy, existing.is_canceled()) {
                (RecreatePolicy::AfterCancel, true) if existing.outstanding() > 0 => {
                    return Err(StreamError::UnsettledStream {
                        payee,
                        owed: existing.outstanding(),
                    });
                }
                (RecreatePolicy::AfterCancel, true) => {}
                _ => return Err(StreamError::DuplicateStream(payee)),
            }
        }

        let (rate, remainder) = schedule(params.total_amount, params.start_time, params.end_time)?;

        if params.levy_bps > self.policy.max_levy_bps {
            return Err(StreamError::InvalidLevy {
                bps: params.levy_bps,
                max: self.policy.max_levy_bps,
            });
        }

        Ok(Accepted {
            params,
            rate,
            remainder,
        })
    }

    fn insert(&mut self, accepted: Accepted) -> StreamEvent {
        let Accepted {
            params,
            rate,
            remainder,
        } = accepted;
        let record = StreamRecord {
            payee: params.payee,
            levy_bps: params.levy_bps,
            start_time: params.start_time,
            end_time: params.end_time,
            rate_per_sec: rate,
            deposited: params.total_amount,
            withdrawn: 0,
            remainder,
            full_term_rule: self.policy.full_term_rule,
            state: StreamState::Active { total_paused: 0 },
        };
        if let Some(previous) = self.records.insert(params.payee, record) {
            self.archive.entry(params.payee).or_default().push(previous);
        }
        self.registry.register(params.payee);

        StreamEvent::StreamCreated {
            payee: params.payee,
            total_amount: params.total_amount,
            start: params.start_time,
            end: params.end_time,
            rate,
            remainder,
            levy_bps: params.levy_bps,
        }
    }
}

fn invalid_state(record: &StreamRecord) -> StreamError {
    StreamError::InvalidState {
        payee: record.payee,
        status: record.status(),
    }
}
