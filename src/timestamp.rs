//! NTP 64-bit fixed-point timestamps.
//!
//! The upper 32 bits count whole seconds since 1900-01-01T00:00:00 UTC, the
//! lower 32 bits are a binary fraction of a second. Conversions to calendar
//! time go through an integer tick count so that no floating point is involved.

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
pub const NTP_EPOCH_OFFSET: i64 = 2_208_988_800;

/// Calendar-time resolution used for every conversion (nanoseconds).
pub const TICKS_PER_SECOND: i64 = 1_000_000_000;

/// Length of one NTP era (2^32 seconds).
const ERA_SECONDS: i128 = 1 << 32;

/// Encoded size of a timestamp field.
pub const TIMESTAMP_SIZE: usize = 8;

/// 1900-01-01T00:00:00 UTC.
pub fn ntp_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH - TimeDelta::seconds(NTP_EPOCH_OFFSET)
}

/// Ticks elapsed since the NTP epoch. Negative for times before 1900.
/// Wide enough for every date chrono can represent.
pub fn ticks_since_epoch(time: DateTime<Utc>) -> i128 {
    let elapsed = time.signed_duration_since(ntp_epoch());
    elapsed.num_seconds() as i128 * TICKS_PER_SECOND as i128 + elapsed.subsec_nanos() as i128
}

/// Raw on-the-wire timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    pub fn from_be_bytes(bytes: [u8; TIMESTAMP_SIZE]) -> Self {
        NtpTimestamp {
            seconds: BigEndian::read_u32(&bytes[0..4]),
            fraction: BigEndian::read_u32(&bytes[4..8]),
        }
    }

    pub fn to_bytes(self) -> [u8; TIMESTAMP_SIZE] {
        let mut out = [0u8; TIMESTAMP_SIZE];
        out[0..4].copy_from_slice(&self.seconds.to_be_bytes());
        out[4..8].copy_from_slice(&self.fraction.to_be_bytes());
        out
    }

    /// Encode a calendar time.
    ///
    /// `seconds = ticks / TPS`, `fraction = (ticks % TPS) * 2^32 / TPS`. Seconds
    /// are taken modulo 2^32, so times outside NTP era 0 (1900 to 2036-02-07)
    /// wrap into it like the protocol does.
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let ticks = ticks_since_epoch(time);
        let tps = TICKS_PER_SECOND as i128;
        let seconds = ticks.div_euclid(tps).rem_euclid(ERA_SECONDS);
        let remainder = ticks.rem_euclid(tps);
        let fraction = ((remainder as u64) << 32) / TICKS_PER_SECOND as u64;
        NtpTimestamp {
            seconds: seconds as u32,
            fraction: fraction as u32,
        }
    }

    /// Total ticks since the NTP epoch: `seconds * TPS + floor(fraction * TPS / 2^32)`.
    pub fn ticks(self) -> i64 {
        let sub_second = (self.fraction as u64 * TICKS_PER_SECOND as u64) >> 32;
        self.seconds as i64 * TICKS_PER_SECOND + sub_second as i64
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        ntp_epoch() + TimeDelta::nanoseconds(self.ticks())
    }
}

impl From<DateTime<Utc>> for NtpTimestamp {
    fn from(time: DateTime<Utc>) -> Self {
        NtpTimestamp::from_datetime(time)
    }
}

/// Time zone in which decoded timestamps are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayZone {
    Utc,
    #[default]
    Local,
}

impl DisplayZone {
    pub fn convert(self, time: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            DisplayZone::Utc => time.fixed_offset(),
            DisplayZone::Local => time.with_timezone(&Local).fixed_offset(),
        }
    }
}
