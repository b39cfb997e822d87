//! Core domain types: accounts, stream records, batch requests, transfers.
//!
//! Amounts are `u128` base units; instants and durations are `u64` Unix
//! seconds.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{AccountIdError, StreamError};

/// Amount of the settlement asset in base units.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 20-byte account identifier (payee, administrator, or owner).
///
/// Displayed and serialized as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The zero account.
    pub const ZERO: Self = Self([0u8; 20]);

    /// An account whose bytes are all `byte`.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AccountIdError::InvalidHex(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AccountIdError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl From<[u8; 20]> for AccountId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Externally visible lifecycle status of a payee's stream.
///
/// `None` is reported for payees without a record; it is never stored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    #[default]
    None,
    Active,
    Paused,
    Canceled,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// Whether a stream whose schedule has fully elapsed is paid its exact
/// deposit, absorbing the rounding remainder.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FullTermRule {
    /// Flush whenever the effective instant reaches the end, regardless of
    /// pause history.
    #[default]
    Always,
    /// Flush only for streams that were never paused; a paused-then-resumed
    /// stream earns `rate * active time`, capped at the deposit.
    OnlyUninterrupted,
}

/// Per-state data of an existing stream.
///
/// Each variant carries only the fields meaningful in that state.
/// `total_paused` counts paused seconds that fell inside the schedule
/// window; time paused before the start or after the end is not counted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Active {
        total_paused: u64,
    },
    Paused {
        paused_at: Timestamp,
        total_paused: u64,
    },
    Canceled {
        frozen_earned: Amount,
        total_paused: u64,
    },
}

impl StreamState {
    pub fn status(&self) -> StreamStatus {
        match self {
            Self::Active { .. } => StreamStatus::Active,
            Self::Paused { .. } => StreamStatus::Paused,
            Self::Canceled { .. } => StreamStatus::Canceled,
        }
    }

    /// Cumulative paused duration across all completed pause/resume cycles.
    pub fn total_paused(&self) -> u64 {
        match *self {
            Self::Active { total_paused }
            | Self::Paused { total_paused, .. }
            | Self::Canceled { total_paused, .. } => total_paused,
        }
    }

    pub fn paused_at(&self) -> Option<Timestamp> {
        match *self {
            Self::Paused { paused_at, .. } => Some(paused_at),
            _ => None,
        }
    }

    pub fn frozen_earned(&self) -> Option<Amount> {
        match *self {
            Self::Canceled { frozen_earned, .. } => Some(frozen_earned),
            _ => None,
        }
    }
}

/// The authoritative record of one payee's stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StreamRecord {
    pub payee: AccountId,
    /// Fraction of each withdrawal withheld, in basis points.
    pub levy_bps: u16,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// `floor(deposited / (end_time - start_time))`.
    pub rate_per_sec: Amount,
    /// Total committed at creation. Immutable.
    pub deposited: Amount,
    /// Cumulative amount paid out (net plus levy).
    pub withdrawn: Amount,
    /// `deposited - rate_per_sec * duration`.
    pub remainder: Amount,
    pub full_term_rule: FullTermRule,
    pub state: StreamState,
}

impl StreamRecord {
    pub fn status(&self) -> StreamStatus {
        self.state.status()
    }

    /// Scheduled duration in seconds.
    pub fn duration(&self) -> u64 {
        self.end_time - self.start_time
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self.state, StreamState::Canceled { .. })
    }

    /// The most this stream can ever pay out: the deposit, or the frozen
    /// amount once canceled.
    pub fn entitlement(&self) -> Amount {
        self.state.frozen_earned().unwrap_or(self.deposited)
    }

    /// Entitlement not yet withdrawn.
    pub fn outstanding(&self) -> Amount {
        self.entitlement().saturating_sub(self.withdrawn)
    }
}

/// Parameters for opening a single stream.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamParams {
    pub payee: AccountId,
    pub total_amount: Amount,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub levy_bps: u16,
}

/// Column-oriented batch of creation requests.
///
/// All five columns must have the same length.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BatchRequest {
    pub payees: Vec<AccountId>,
    pub amounts: Vec<Amount>,
    pub starts: Vec<Timestamp>,
    pub ends: Vec<Timestamp>,
    pub levy_bps: Vec<u16>,
}

impl BatchRequest {
    /// Column lengths in declaration order.
    pub fn lengths(&self) -> [usize; 5] {
        [
            self.payees.len(),
            self.amounts.len(),
            self.starts.len(),
            self.ends.len(),
            self.levy_bps.len(),
        ]
    }

    /// Zip the columns into per-stream parameters.
    ///
    /// Fails with [`StreamError::ArrayLengthMismatch`] if the columns differ
    /// in length.
    pub fn to_params(&self) -> Result<Vec<StreamParams>, StreamError> {
        let lengths = self.lengths();
        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(StreamError::ArrayLengthMismatch(lengths));
        }
        Ok((0..lengths[0])
            .map(|i| StreamParams {
                payee: self.payees[i],
                total_amount: self.amounts[i],
                start_time: self.starts[i],
                end_time: self.ends[i],
                levy_bps: self.levy_bps[i],
            })
            .collect())
    }
}

impl FromIterator<StreamParams> for BatchRequest {
    fn from_iter<I: IntoIterator<Item = StreamParams>>(iter: I) -> Self {
        let mut batch = BatchRequest::default();
        for p in iter {
            batch.payees.push(p.payee);
            batch.amounts.push(p.total_amount);
            batch.starts.push(p.start_time);
            batch.ends.push(p.end_time);
            batch.levy_bps.push(p.levy_bps);
        }
        batch
    }
}

/// Destination of a pool release.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Payee(AccountId),
    LevyAccount,
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payee(id) => write!(f, "{id}"),
            Self::LevyAccount => f.write_str("levy-account"),
        }
    }
}

/// One leg of a settlement.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub recipient: Recipient,
    pub amount: Amount,
}

/// A withdrawal total split into the payee's share and the withheld levy.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LevySplit {
    pub net: Amount,
    pub levy: Amount,
}

impl LevySplit {
    pub fn total(&self) -> Amount {
        self.net + self.levy
    }
}
