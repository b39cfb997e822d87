//! # paystream-engine
//! Stream lifecycle, settlement and the funding ledger.
//!
//! [`PayrollEngine`] is the entry point. It owns a [`StreamBook`] of
//! per-payee records, a [`FundingPool`](paystream_core::traits::FundingPool)
//! and a [`LevyCollector`](paystream_core::traits::LevyCollector), and
//! serializes every operation through one lock:
//! - **Lifecycle**: create, batch-create, pause, resume, cancel (HR only).
//! - **Settlement**: withdraw earned funds, split into net pay and levy.
//! - **Queries**: accrual, withdrawable balance, registry, funding.

pub mod access;
pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod registry;
pub mod settlement;
pub mod sink;
pub mod treasury;

pub use access::RoleRegistry;
pub use config::{ConfigError, EngineConfig, RecreatePolicy};
pub use engine::PayrollEngine;
pub use lifecycle::{LifecyclePolicy, StreamBook};
pub use registry::PayeeRegistry;
pub use sink::{BroadcastSink, MemorySink, NullSink};
pub use treasury::{LevyVault, PayrollTreasury};
