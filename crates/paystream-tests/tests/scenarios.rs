//! End-to-end payroll scenarios against a funded engine.
//!
//! Each test drives the public `PayrollEngine` API the way an HR operator
//! and employees would, and checks balances on both sides of the treasury.

use paystream_core::constants::{MONTH_SECS, SECONDS_PER_DAY, UNIT};
use paystream_core::error::StreamError;
use paystream_core::events::StreamEvent;
use paystream_core::types::{BatchRequest, FullTermRule, Recipient, StreamStatus};
use paystream_engine::{EngineConfig, RecreatePolicy};
use paystream_tests::helpers::*;

const S: u64 = 1_700_000_000;
const DAY: u64 = SECONDS_PER_DAY;

// ==========================================================================
// Worked examples
// ==========================================================================

#[test]
fn full_term_pays_exact_deposit_despite_rounding() {
    let h = harness();
    h.engine
        .create_stream(&HR, stream(who(1), 10_000_000, S, S + 7, 0))
        .unwrap();

    let record = h.engine.get_stream(&who(1)).unwrap();
    assert_eq!(record.rate_per_sec, 1_428_571);
    assert_eq!(record.remainder, 3);

    assert_eq!(h.engine.earned(&who(1), S + 6), 1_428_571 * 6);
    assert_eq!(h.engine.earned(&who(1), S + 100), 10_000_000);

    let split = h.engine.withdraw(&who(1), S + 100).unwrap();
    assert_eq!(split.total(), 10_000_000);
    assert_eq!(split.levy, 0);
    assert_eq!(h.engine.get_stream(&who(1)).unwrap().withdrawn, 10_000_000);
    assert_eq!(h.engine.pool_balance(), FUNDING - 10_000_000);
}

#[test]
fn monthly_salary_midpoint_with_levy() {
    let h = harness();
    let amount = 3_000 * UNIT;
    h.engine
        .create_stream(&HR, stream(who(1), amount, S, S + MONTH_SECS, 1_000))
        .unwrap();

    let record = h.engine.get_stream(&who(1)).unwrap();
    assert_eq!(record.rate_per_sec, 1_157_407_407_407_407);
    assert_eq!(record.remainder, 1_056_000);

    let mid = S + MONTH_SECS / 2;
    let expected = record.rate_per_sec * 1_296_000;
    assert_eq!(h.engine.earned(&who(1), mid), expected);

    let split = h.engine.withdraw(&who(1), mid).unwrap();
    assert_eq!(split.total(), expected);
    assert_eq!(split.levy, expected / 10);
    assert_eq!(split.net, expected - expected / 10);
    assert_eq!(h.engine.levy_balance(), expected / 10);
    assert_eq!(
        h.engine
            .with_pool(|pool| pool.paid_to(&Recipient::Payee(who(1)))),
        split.net
    );
}

#[test]
fn pause_window_is_excluded_from_accrual() {
    let h = harness();
    h.engine
        .create_stream(&HR, stream(who(1), 3_000 * UNIT, S, S + MONTH_SECS, 1_000))
        .unwrap();
    let rate = h.engine.get_stream(&who(1)).unwrap().rate_per_sec;

    h.engine.pause(&HR, &who(1), S + 10 * DAY).unwrap();
    assert_eq!(h.engine.earned(&who(1), S + 12 * DAY), rate * 10 * DAY as u128);
    h.engine.resume(&HR, &who(1), S + 15 * DAY).unwrap();

    assert_eq!(h.engine.earned(&who(1), S + 20 * DAY), rate * 15 * DAY as u128);
}

#[test]
fn whole_month_settles_to_the_token() {
    let h = harness();
    let amount = 3_000 * UNIT;
    h.engine
        .create_stream(&HR, stream(who(1), amount, S, S + MONTH_SECS, 1_000))
        .unwrap();

    let mut paid = 0;
    for day in [1, 7, 8, 20, 29, 30, 31] {
        if let Ok(split) = h.engine.withdraw(&who(1), S + day * DAY) {
            paid += split.total();
        }
    }
    assert_eq!(paid, amount);
    assert_eq!(h.engine.levy_total_received(), amount / 10);
    assert_eq!(h.engine.pool_balance(), FUNDING - amount);
    assert_eq!(h.engine.total_obligations(), Ok(0));
}

// ==========================================================================
// Roles
// ==========================================================================

#[test]
fn only_hr_administers_streams() {
    let h = harness();
    let params = stream(who(1), 1_000, S, S + 100, 0);
    assert_eq!(
        h.engine.create_stream(&OUTSIDER, params),
        Err(StreamError::Unauthorized(OUTSIDER))
    );

    h.engine.create_stream(&HR, params).unwrap();
    assert_eq!(
        h.engine.pause(&who(1), &who(1), S + 1),
        Err(StreamError::Unauthorized(who(1)))
    );

    assert_eq!(
        h.roles.grant_hr(&HR, OUTSIDER),
        Err(StreamError::Unauthorized(HR))
    );
    h.roles.grant_hr(&OWNER, OUTSIDER).unwrap();
    h.engine.pause(&OUTSIDER, &who(1), S + 1).unwrap();
    assert_eq!(h.engine.status_of(&who(1)), StreamStatus::Paused);
}

#[test]
fn anyone_can_settle_on_behalf_of_a_payee() {
    let h = harness();
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 500))
        .unwrap();
    let split = h.engine.withdraw(&who(1), S + 40).unwrap();
    assert_eq!((split.net, split.levy), (380, 20));
    assert_eq!(
        h.engine
            .with_pool(|pool| pool.paid_to(&Recipient::Payee(who(1)))),
        380
    );
}

// ==========================================================================
// Re-creation after cancel
// ==========================================================================

#[test]
fn reject_policy_keeps_canceled_record_forever() {
    let h = harness();
    let params = stream(who(1), 1_000, S, S + 100, 0);
    h.engine.create_stream(&HR, params).unwrap();
    h.engine.cancel(&HR, &who(1), S + 20).unwrap();
    h.engine.withdraw(&who(1), S + 30).unwrap();

    assert_eq!(
        h.engine.create_stream(&HR, params),
        Err(StreamError::DuplicateStream(who(1)))
    );
    assert_eq!(h.engine.status_of(&who(1)), StreamStatus::Canceled);
    assert!(h.engine.stream_history(&who(1)).is_empty());
}

#[test]
fn after_cancel_policy_replaces_settled_record() {
    let cfg = EngineConfig {
        recreate_policy: RecreatePolicy::AfterCancel,
        ..EngineConfig::default()
    };
    let h = harness_with(cfg, FUNDING);
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 0))
        .unwrap();
    h.engine.cancel(&HR, &who(1), S + 20).unwrap();

    let renewal = stream(who(1), 4_000, S + 50, S + 90, 0);
    assert_eq!(
        h.engine.create_stream(&HR, renewal),
        Err(StreamError::UnsettledStream { payee: who(1), owed: 200 })
    );

    h.engine.withdraw(&who(1), S + 25).unwrap();
    h.engine.create_stream(&HR, renewal).unwrap();

    assert_eq!(h.engine.get_stream(&who(1)).unwrap().deposited, 4_000);
    assert_eq!(h.engine.earned(&who(1), S + 60), 1_000);
    let history = h.engine.stream_history(&who(1));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].withdrawn, 200);
    assert_eq!(h.engine.employees(), vec![who(1)]);
}

// ==========================================================================
// Pause straddling the end of the schedule
// ==========================================================================

fn paused_once(rule: FullTermRule) -> u128 {
    let cfg = EngineConfig {
        full_term_rule: rule,
        ..EngineConfig::default()
    };
    let h = harness_with(cfg, FUNDING);
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 0))
        .unwrap();
    h.engine.pause(&HR, &who(1), S + 10).unwrap();
    h.engine.resume(&HR, &who(1), S + 20).unwrap();
    h.engine.earned(&who(1), S + 500)
}

#[test]
fn always_rule_flushes_after_interruptions() {
    assert_eq!(paused_once(FullTermRule::Always), 1_000);
}

#[test]
fn uninterrupted_rule_pays_only_active_time() {
    assert_eq!(paused_once(FullTermRule::OnlyUninterrupted), 900);
}

#[test]
fn stream_paused_past_end_earns_up_to_pause_instant() {
    let cfg = EngineConfig {
        full_term_rule: FullTermRule::OnlyUninterrupted,
        ..EngineConfig::default()
    };
    let h = harness_with(cfg, FUNDING);
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 0))
        .unwrap();
    h.engine.pause(&HR, &who(1), S + 60).unwrap();
    // Still paused: evaluated at the pause instant.
    assert_eq!(h.engine.earned(&who(1), S + 1_000), 600);
    h.engine.resume(&HR, &who(1), S + 80).unwrap();
    assert_eq!(h.engine.earned(&who(1), S + 1_000), 800);
}

#[test]
fn resume_after_end_keeps_what_was_paid_out() {
    let cfg = EngineConfig {
        full_term_rule: FullTermRule::OnlyUninterrupted,
        ..EngineConfig::default()
    };
    let h = harness_with(cfg, FUNDING);
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 0))
        .unwrap();
    h.engine.pause(&HR, &who(1), S + 60).unwrap();
    assert_eq!(h.engine.withdraw(&who(1), S + 60).unwrap().total(), 600);

    h.engine.resume(&HR, &who(1), S + 1_000).unwrap();
    assert_eq!(h.engine.get_stream(&who(1)).unwrap().state.total_paused(), 40);
    assert_eq!(h.engine.earned(&who(1), S + 1_000), 600);

    assert_eq!(h.engine.cancel(&HR, &who(1), S + 1_000), Ok(600));
    assert_eq!(h.engine.total_obligations(), Ok(0));
    assert_eq!(
        h.engine.withdraw(&who(1), S + 1_000),
        Err(StreamError::NothingToWithdraw(who(1)))
    );
}

// ==========================================================================
// Batch intake
// ==========================================================================

#[test]
fn batch_onboarding_funds_whole_team() {
    let h = harness();
    let team: BatchRequest = (0..25)
        .map(|i| stream(payee_n(i), 2_000 * UNIT, S, S + MONTH_SECS, 1_000))
        .collect();

    assert_eq!(h.engine.batch_create(&HR, &team), Ok(25));
    assert_eq!(h.engine.employee_count(), 25);
    assert_eq!(h.engine.employees()[0], payee_n(0));
    assert_eq!(h.engine.total_obligations(), Ok(50_000 * UNIT));
    assert_eq!(h.events.len(), 25);
}

#[test]
fn batch_with_one_bad_row_creates_nothing() {
    let h = harness();
    let mut team: BatchRequest = (0..5)
        .map(|i| stream(payee_n(i), 1_000, S, S + 100, 1_000))
        .collect();
    team.levy_bps[3] = 10_001;

    let err = h.engine.batch_create(&HR, &team).unwrap_err();
    assert!(matches!(err, StreamError::BatchEntry { index: 3, .. }));
    assert!(matches!(err.root(), StreamError::InvalidLevy { bps: 10_001, .. }));
    assert_eq!(h.engine.employee_count(), 0);
    assert!(h.events.is_empty());
}

#[test]
fn batch_with_ragged_columns_creates_nothing() {
    let h = harness();
    let mut team: BatchRequest = (0..3)
        .map(|i| stream(payee_n(i), 1_000, S, S + 100, 0))
        .collect();
    team.ends.push(S + 200);

    assert_eq!(
        h.engine.batch_create(&HR, &team),
        Err(StreamError::ArrayLengthMismatch([3, 3, 3, 4, 3]))
    );
    assert_eq!(h.engine.employee_count(), 0);
}

// ==========================================================================
// Event log
// ==========================================================================

#[test]
fn event_log_serializes_as_tagged_json() {
    let h = harness();
    h.engine
        .create_stream(&HR, stream(who(1), 1_000, S, S + 100, 1_000))
        .unwrap();
    h.engine.withdraw(&who(1), S + 50).unwrap();

    let events = h.events.events();
    assert_eq!(
        events[1],
        StreamEvent::Withdrawn { payee: who(1), net: 450, levy: 50 }
    );

    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("\"stream_created\""));
    assert!(json.contains("\"withdrawn\""));
    let back: Vec<StreamEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, events);
}
