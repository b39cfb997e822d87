//! Shared builders for the integration suites.

use std::sync::Arc;

use paystream_core::constants::UNIT;
use paystream_core::types::{AccountId, Amount, StreamParams, Timestamp};
use paystream_engine::{EngineConfig, MemorySink, PayrollEngine, RoleRegistry};

/// Deploying account; holds the HR role implicitly.
pub const OWNER: AccountId = AccountId::repeat_byte(0xA0);
/// Account granted HR by [`harness`].
pub const HR: AccountId = AccountId::repeat_byte(0xB0);
/// Account with no role.
pub const OUTSIDER: AccountId = AccountId::repeat_byte(0xEE);

/// Default treasury funding: one million tokens.
pub const FUNDING: Amount = 1_000_000 * UNIT;

/// Deterministic payee from a seed byte.
pub fn who(seed: u8) -> AccountId {
    AccountId::repeat_byte(seed)
}

/// Payee from a wider index, for large batches.
pub fn payee_n(n: u32) -> AccountId {
    let mut bytes = [0x11u8; 20];
    bytes[16..].copy_from_slice(&n.to_be_bytes());
    AccountId(bytes)
}

pub fn stream(
    payee: AccountId,
    total_amount: Amount,
    start_time: Timestamp,
    end_time: Timestamp,
    levy_bps: u16,
) -> StreamParams {
    StreamParams {
        payee,
        total_amount,
        start_time,
        end_time,
        levy_bps,
    }
}

/// An engine together with its role registry and event log.
pub struct Harness {
    pub engine: PayrollEngine,
    pub roles: Arc<RoleRegistry>,
    pub events: Arc<MemorySink>,
}

/// Engine with `config`, a treasury holding `funding`, and [`HR`] granted.
pub fn harness_with(config: EngineConfig, funding: Amount) -> Harness {
    let roles = Arc::new(RoleRegistry::new(OWNER));
    roles
        .grant_hr(&OWNER, HR)
        .expect("owner grants HR");
    let events = Arc::new(MemorySink::new());
    let engine = PayrollEngine::new(config, roles.clone(), events.clone())
        .expect("valid engine config");
    if funding > 0 {
        engine.deposit(funding).expect("treasury funding");
    }
    Harness {
        engine,
        roles,
        events,
    }
}

/// Default configuration, funded with [`FUNDING`].
pub fn harness() -> Harness {
    harness_with(EngineConfig::default(), FUNDING)
}
