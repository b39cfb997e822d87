//! Criterion benchmarks for the engine's hot paths.

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use paystream_core::constants::{MONTH_SECS, UNIT};
use paystream_core::types::{AccountId, BatchRequest, StreamParams};
use paystream_engine::{EngineConfig, NullSink, PayrollEngine, RoleRegistry};

const START: u64 = 1_700_000_000;
const OWNER: AccountId = AccountId::repeat_byte(0xA0);

fn payee(i: u32) -> AccountId {
    let mut bytes = [0u8; 20];
    bytes[..4].copy_from_slice(&i.to_be_bytes());
    AccountId(bytes)
}

fn params(i: u32) -> StreamParams {
    StreamParams {
        payee: payee(i),
        total_amount: 3_000 * UNIT,
        start_time: START,
        end_time: START + MONTH_SECS,
        levy_bps: 1_000,
    }
}

fn funded_engine(streams: u32) -> PayrollEngine {
    let engine = PayrollEngine::new(
        EngineConfig::default(),
        Arc::new(RoleRegistry::new(OWNER)),
        Arc::new(NullSink),
    )
    .unwrap();
    engine.deposit(u128::from(streams) * 3_000 * UNIT).unwrap();
    let batch: BatchRequest = (0..streams).map(params).collect();
    engine.batch_create(&OWNER, &batch).unwrap();
    engine
}

fn bench_batch_create(c: &mut Criterion) {
    let batch: BatchRequest = (0..100).map(params).collect();
    c.bench_function("batch_create_100", |b| {
        b.iter_batched(
            || funded_engine(0),
            |engine| engine.batch_create(&OWNER, black_box(&batch)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_withdraw(c: &mut Criterion) {
    c.bench_function("withdraw_mid_stream", |b| {
        b.iter_batched(
            || funded_engine(100),
            |engine| engine.withdraw(black_box(&payee(42)), START + MONTH_SECS / 2),
            BatchSize::SmallInput,
        )
    });
}

fn bench_total_obligations(c: &mut Criterion) {
    let engine = funded_engine(1_000);
    c.bench_function("total_obligations_1000", |b| {
        b.iter(|| engine.total_obligations())
    });
}

criterion_group!(benches, bench_batch_create, bench_withdraw, bench_total_obligations);
criterion_main!(benches);
