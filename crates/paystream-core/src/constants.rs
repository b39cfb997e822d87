//! Protocol constants. All monetary values are in base units of the
//! settlement asset (1 HLUSD = 10^18 units).

/// Base units per whole token.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator: 10_000 bps = 100%.
pub const BPS_PRECISION: u16 = 10_000;

/// Hard ceiling for a stream's levy. A configured maximum can only be lower.
pub const MAX_LEVY_BPS: u16 = BPS_PRECISION;

/// Levy applied when the administrator does not name one (10%).
pub const DEFAULT_LEVY_BPS: u16 = 1_000;

/// Largest amount a single stream may commit.
///
/// Bounded so that `total * levy_bps` never overflows during settlement.
pub const MAX_DEPOSIT: u128 = u128::MAX / BPS_PRECISION as u128;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Nominal payroll month (30 days) in seconds.
pub const MONTH_SECS: u64 = 30 * SECONDS_PER_DAY;

/// Default capacity of the broadcast event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1_024;
