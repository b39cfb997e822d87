//! Integration test suite for PayStream.
//!
//! The suites under `tests/` drive a [`PayrollEngine`](paystream_engine::PayrollEngine)
//! end to end: worked payroll scenarios, randomized accounting properties,
//! and multi-threaded settlement.

pub mod helpers;
