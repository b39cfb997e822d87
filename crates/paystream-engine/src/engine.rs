//! The payroll engine.
//!
//! [`PayrollEngine`] composes the stream book, funding pool, levy collector
//! and engine clock into one [`Ledger`] behind a single `parking_lot::Mutex`.
//! Every mutating operation runs to completion under that lock or fails
//! with the ledger unchanged, so operations are totally ordered and a
//! withdrawal can never observe another one half-applied.
//!
//! Administrator-class operations consult the [`Authorizer`]; committed
//! operations are published to the [`EventSink`] while the lock is still
//! held, so subscribers see events in commit order.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use paystream_core::accrual;
use paystream_core::error::StreamError;
use paystream_core::events::StreamEvent;
use paystream_core::traits::{Authorizer, EventSink, FundingPool, LevyCollector, sum_of};
use paystream_core::types::{
    AccountId, Amount, BatchRequest, LevySplit, StreamParams, StreamRecord, StreamStatus,
    Timestamp,
};

use crate::config::{ConfigError, EngineConfig};
use crate::lifecycle::{LifecyclePolicy, StreamBook};
use crate::settlement;
use crate::treasury::{LevyVault, PayrollTreasury};

/// Everything the engine mutates, guarded as one unit.
struct Ledger<P, L> {
    book: StreamBook,
    pool: P,
    levy: L,
    /// Latest instant accepted by a mutating operation.
    last_now: Option<Timestamp>,
}

impl<P, L> Ledger<P, L> {
    fn check_clock(&self, now: Timestamp) -> Result<(), StreamError> {
        match self.last_now {
            Some(last) if now < last => Err(StreamError::ClockRegression { last, now }),
            _ => Ok(()),
        }
    }
}

/// Streaming payroll accrual and settlement engine.
pub struct PayrollEngine<P: FundingPool = PayrollTreasury, L: LevyCollector = LevyVault> {
    ledger: Mutex<Ledger<P, L>>,
    authorizer: Arc<dyn Authorizer>,
    events: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl PayrollEngine {
    /// Engine with an empty in-memory treasury and levy vault.
    pub fn new(
        config: EngineConfig,
        authorizer: Arc<dyn Authorizer>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        Self::with_parts(config, PayrollTreasury::new(), LevyVault::new(), authorizer, events)
    }
}

impl<L: LevyCollector> PayrollEngine<PayrollTreasury, L> {
    /// Fund the treasury. Returns the new pool balance.
    pub fn deposit(&self, amount: Amount) -> Result<Amount, StreamError> {
        let mut ledger = self.ledger.lock();
        ledger.pool.deposit(amount)?;
        Ok(ledger.pool.balance())
    }
}

impl<P: FundingPool, L: LevyCollector> PayrollEngine<P, L> {
    pub fn with_parts(
        config: EngineConfig,
        pool: P,
        levy: L,
        authorizer: Arc<dyn Authorizer>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            max_levy_bps = config.max_levy_bps,
            default_levy_bps = config.default_levy_bps,
            recreate_policy = ?config.recreate_policy,
            full_term_rule = ?config.full_term_rule,
            "payroll engine ready"
        );
        Ok(Self {
            ledger: Mutex::new(Ledger {
                book: StreamBook::new(LifecyclePolicy::from(&config)),
                pool,
                levy,
                last_now: None,
            }),
            authorizer,
            events,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn authorize(&self, caller: &AccountId, op: &'static str) -> Result<(), StreamError> {
        if self.authorizer.is_authorized(caller) {
            return Ok(());
        }
        warn!(%caller, op, "unauthorized caller");
        Err(StreamError::Unauthorized(*caller))
    }

    // --- administration ---

    /// Open a stream. Requires an authorized caller.
    pub fn create_stream(&self, caller: &AccountId, params: StreamParams) -> Result<(), StreamError> {
        self.authorize(caller, "create")?;
        let mut ledger = self.ledger.lock();
        let event = ledger.book.create(params).inspect_err(|err| {
            warn!(payee = %params.payee, %err, "stream creation rejected");
        })?;
        info!(
            payee = %params.payee,
            amount = params.total_amount,
            start = params.start_time,
            end = params.end_time,
            levy_bps = params.levy_bps,
            "stream created"
        );
        self.events.emit(event);
        Ok(())
    }

    /// Open a stream at the configured default levy.
    pub fn create_with_default_levy(
        &self,
        caller: &AccountId,
        payee: AccountId,
        total_amount: Amount,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<(), StreamError> {
        self.create_stream(
            caller,
            StreamParams {
                payee,
                total_amount,
                start_time,
                end_time,
                levy_bps: self.config.default_levy_bps,
            },
        )
    }

    /// Open every stream in `batch`, or none. Returns the number created.
    pub fn batch_create(&self, caller: &AccountId, batch: &BatchRequest) -> Result<usize, StreamError> {
        self.authorize(caller, "batch_create")?;
        let mut ledger = self.ledger.lock();
        let events = ledger.book.batch_create(batch).inspect_err(|err| {
            warn!(entries = batch.payees.len(), %err, "batch rejected");
        })?;
        let created = events.len();
        info!(created, "batch created");
        for event in events {
            self.events.emit(event);
        }
        Ok(created)
    }

    /// Freeze accrual for an active stream.
    pub fn pause(&self, caller: &AccountId, payee: &AccountId, now: Timestamp) -> Result<(), StreamError> {
        self.transition(caller, payee, now, "pause", |book| {
            book.pause(payee, now).map(|event| (event, ()))
        })
    }

    /// Resume a paused stream.
    pub fn resume(&self, caller: &AccountId, payee: &AccountId, now: Timestamp) -> Result<(), StreamError> {
        self.transition(caller, payee, now, "resume", |book| {
            book.resume(payee, now).map(|event| (event, ()))
        })
    }

    /// Cancel a stream. Returns the frozen earned amount.
    pub fn cancel(&self, caller: &AccountId, payee: &AccountId, now: Timestamp) -> Result<Amount, StreamError> {
        self.transition(caller, payee, now, "cancel", |book| book.cancel(payee, now))
    }

    fn transition<T>(
        &self,
        caller: &AccountId,
        payee: &AccountId,
        now: Timestamp,
        op: &'static str,
        apply: impl FnOnce(&mut StreamBook) -> Result<(StreamEvent, T), StreamError>,
    ) -> Result<T, StreamError> {
        self.authorize(caller, op)?;
        let mut ledger = self.ledger.lock();
        let (event, out) = ledger
            .check_clock(now)
            .and_then(|()| apply(&mut ledger.book))
            .inspect_err(|err| warn!(%payee, now, op, %err, "stream transition rejected"))?;
        ledger.last_now = Some(now);
        info!(%payee, now, op, "stream transition applied");
        self.events.emit(event);
        Ok(out)
    }

    // --- settlement ---

    /// Pay out everything `payee` has earned by `now`, net of levy.
    ///
    /// Anyone may trigger a withdrawal; funds only ever go to the payee and
    /// the levy account.
    pub fn withdraw(&self, payee: &AccountId, now: Timestamp) -> Result<LevySplit, StreamError> {
        let mut guard = self.ledger.lock();
        let ledger = &mut *guard;
        let split = ledger
            .check_clock(now)
            .and_then(|()| {
                settlement::withdraw(&mut ledger.book, &mut ledger.pool, &mut ledger.levy, payee, now)
            })
            .inspect_err(|err| warn!(%payee, now, %err, "withdrawal rejected"))?;
        ledger.last_now = Some(now);
        info!(%payee, now, net = split.net, levy = split.levy, "withdrawal settled");
        self.events.emit(StreamEvent::Withdrawn {
            payee: *payee,
            net: split.net,
            levy: split.levy,
        });
        Ok(split)
    }

    // --- queries ---

    pub fn get_stream(&self, payee: &AccountId) -> Option<StreamRecord> {
        self.ledger.lock().book.get(payee).cloned()
    }

    pub fn status_of(&self, payee: &AccountId) -> StreamStatus {
        self.ledger.lock().book.status_of(payee)
    }

    /// Earned as of `now`; zero for a payee without a stream.
    pub fn earned(&self, payee: &AccountId, now: Timestamp) -> Amount {
        self.ledger
            .lock()
            .book
            .get(payee)
            .map_or(0, |record| accrual::earned(record, now))
    }

    pub fn withdrawable(&self, payee: &AccountId, now: Timestamp) -> Result<Amount, StreamError> {
        settlement::withdrawable_of(&self.ledger.lock().book, payee, now)
    }

    /// Every payee that ever had a stream, in order of first creation.
    pub fn employees(&self) -> Vec<AccountId> {
        self.ledger.lock().book.registry().payees().to_vec()
    }

    pub fn employee_count(&self) -> usize {
        self.ledger.lock().book.registry().len()
    }

    /// Records replaced by re-creation, oldest first.
    pub fn stream_history(&self, payee: &AccountId) -> Vec<StreamRecord> {
        self.ledger.lock().book.history(payee).to_vec()
    }

    pub fn default_levy_bps(&self) -> u16 {
        self.config.default_levy_bps
    }

    pub fn pool_balance(&self) -> Amount {
        self.ledger.lock().pool.balance()
    }

    pub fn levy_balance(&self) -> Amount {
        self.ledger.lock().levy.balance()
    }

    pub fn levy_total_received(&self) -> Amount {
        self.ledger.lock().levy.total_received()
    }

    /// Sum over current streams of what is still owed to payees: the
    /// deposit (or frozen amount, once canceled) less what was withdrawn.
    pub fn total_obligations(&self) -> Result<Amount, StreamError> {
        let ledger = self.ledger.lock();
        let owed: Vec<Amount> = ledger.book.records().map(StreamRecord::outstanding).collect();
        Ok(sum_of(&owed)?)
    }

    /// Latest instant accepted by a mutating operation.
    pub fn last_instant(&self) -> Option<Timestamp> {
        self.ledger.lock().last_now
    }

    /// Run `f` against the funding pool under the ledger lock.
    pub fn with_pool<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.ledger.lock().pool)
    }
}
