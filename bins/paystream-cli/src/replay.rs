//! Scripted replay of engine operations.
//!
//! A script names the owner, an optional initial treasury deposit and a
//! list of operations. Each operation is applied in order to a fresh
//! in-memory engine; failures are recorded per step (or abort the run in
//! strict mode). The report carries every stream, the event log and the
//! final treasury position.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use paystream_core::error::StreamError;
use paystream_core::events::StreamEvent;
use paystream_core::types::{
    AccountId, Amount, BatchRequest, StreamParams, StreamRecord, Timestamp,
};
use paystream_engine::{EngineConfig, MemorySink, PayrollEngine, RoleRegistry};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub owner: AccountId,
    #[serde(default)]
    pub funding: Amount,
    #[serde(default)]
    pub ops: Vec<Op>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    GrantHr {
        caller: AccountId,
        who: AccountId,
    },
    RevokeHr {
        caller: AccountId,
        who: AccountId,
    },
    Deposit {
        amount: Amount,
    },
    Create {
        caller: AccountId,
        stream: StreamParams,
    },
    CreateDefault {
        caller: AccountId,
        payee: AccountId,
        total_amount: Amount,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    BatchCreate {
        caller: AccountId,
        batch: BatchRequest,
    },
    Pause {
        caller: AccountId,
        payee: AccountId,
        now: Timestamp,
    },
    Resume {
        caller: AccountId,
        payee: AccountId,
        now: Timestamp,
    },
    Cancel {
        caller: AccountId,
        payee: AccountId,
        now: Timestamp,
    },
    Withdraw {
        payee: AccountId,
        now: Timestamp,
    },
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Op::GrantHr { .. } => "grant_hr",
            Op::RevokeHr { .. } => "revoke_hr",
            Op::Deposit { .. } => "deposit",
            Op::Create { .. } => "create",
            Op::CreateDefault { .. } => "create_default",
            Op::BatchCreate { .. } => "batch_create",
            Op::Pause { .. } => "pause",
            Op::Resume { .. } => "resume",
            Op::Cancel { .. } => "cancel",
            Op::Withdraw { .. } => "withdraw",
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Outcome {
    pub step: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub streams: Vec<StreamRecord>,
    pub events: Vec<StreamEvent>,
    pub pool_balance: Amount,
    pub levy_balance: Amount,
    pub total_obligations: Amount,
}

pub fn parse(json: &str) -> Result<Script> {
    serde_json::from_str(json).context("malformed replay script")
}

/// Apply `script` to a fresh engine.
pub fn run(script: &Script, config: EngineConfig, strict: bool) -> Result<Report> {
    let roles = Arc::new(RoleRegistry::new(script.owner));
    let sink = Arc::new(MemorySink::new());
    let engine = PayrollEngine::new(config, roles.clone(), sink.clone())
        .context("invalid engine config")?;
    if script.funding > 0 {
        engine
            .deposit(script.funding)
            .context("initial treasury deposit")?;
    }

    let mut outcomes = Vec::with_capacity(script.ops.len());
    for (step, op) in script.ops.iter().enumerate() {
        let error = match apply(&engine, &roles, op) {
            Ok(()) => None,
            Err(err) if strict => bail!("step {step} ({}) failed: {err}", op.name()),
            Err(err) => {
                warn!(step, op = op.name(), %err, "replay step failed");
                Some(err.to_string())
            }
        };
        outcomes.push(Outcome {
            step,
            op: op.name(),
            error,
        });
    }

    let streams = engine
        .employees()
        .iter()
        .filter_map(|payee| engine.get_stream(payee))
        .collect();
    let total_obligations = engine
        .total_obligations()
        .context("summing outstanding obligations")?;
    info!(steps = outcomes.len(), events = sink.len(), "replay complete");

    Ok(Report {
        outcomes,
        streams,
        events: sink.take(),
        pool_balance: engine.pool_balance(),
        levy_balance: engine.levy_balance(),
        total_obligations,
    })
}

fn apply(engine: &PayrollEngine, roles: &RoleRegistry, op: &Op) -> Result<(), StreamError> {
    match op {
        Op::GrantHr { caller, who } => roles.grant_hr(caller, *who).map(drop),
        Op::RevokeHr { caller, who } => roles.revoke_hr(caller, who).map(drop),
        Op::Deposit { amount } => engine.deposit(*amount).map(drop),
        Op::Create { caller, stream } => engine.create_stream(caller, *stream),
        Op::CreateDefault {
            caller,
            payee,
            total_amount,
            start_time,
            end_time,
        } => engine.create_with_default_levy(caller, *payee, *total_amount, *start_time, *end_time),
        Op::BatchCreate { caller, batch } => engine.batch_create(caller, batch).map(drop),
        Op::Pause { caller, payee, now } => engine.pause(caller, payee, *now),
        Op::Resume { caller, payee, now } => engine.resume(caller, payee, *now),
        Op::Cancel { caller, payee, now } => engine.cancel(caller, payee, *now).map(drop),
        Op::Withdraw { payee, now } => engine.withdraw(payee, *now).map(drop),
    }
}
