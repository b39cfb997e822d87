//! Criterion benchmarks for the accrual calculator.
//!
//! Covers: schedule derivation, earned at mid-stream, earned past the end,
//! and the levy split.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use paystream_core::accrual::{earned, schedule, split_levy};
use paystream_core::constants::{MONTH_SECS, UNIT};
use paystream_core::types::{AccountId, FullTermRule, StreamRecord, StreamState};

const START: u64 = 1_700_000_000;

fn monthly_record() -> StreamRecord {
    let amount = 3_000 * UNIT;
    let (rate, remainder) = schedule(amount, START, START + MONTH_SECS).unwrap();
    StreamRecord {
        payee: AccountId::repeat_byte(0x11),
        levy_bps: 1_000,
        start_time: START,
        end_time: START + MONTH_SECS,
        rate_per_sec: rate,
        deposited: amount,
        withdrawn: 0,
        remainder,
        full_term_rule: FullTermRule::Always,
        state: StreamState::Active { total_paused: 3_600 },
    }
}

fn bench_schedule(c: &mut Criterion) {
    c.bench_function("schedule", |b| {
        b.iter(|| schedule(black_box(3_000 * UNIT), black_box(START), black_box(START + MONTH_SECS)))
    });
}

fn bench_earned_mid_stream(c: &mut Criterion) {
    let record = monthly_record();
    let now = START + MONTH_SECS / 2;

    c.bench_function("earned_mid_stream", |b| {
        b.iter(|| earned(black_box(&record), black_box(now)))
    });
}

fn bench_earned_past_end(c: &mut Criterion) {
    let record = monthly_record();
    let now = START + 2 * MONTH_SECS;

    c.bench_function("earned_past_end", |b| {
        b.iter(|| earned(black_box(&record), black_box(now)))
    });
}

fn bench_split_levy(c: &mut Criterion) {
    c.bench_function("split_levy", |b| {
        b.iter(|| split_levy(black_box(1_500 * UNIT), black_box(1_000)))
    });
}

criterion_group!(
    benches,
    bench_schedule,
    bench_earned_mid_stream,
    bench_earned_past_end,
    bench_split_levy
);
criterion_main!(benches);
