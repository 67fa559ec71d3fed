//! Round-trip delay and clock offset from the four protocol timestamps.
//!
//! T1 originate (client send), T2 receive (server), T3 transmit (server),
//! T4 destination (client receive, captured locally):
//!
//! ```text
//! delay  = (T2 - T1) + (T4 - T3)
//! offset = ((T2 - T1) - (T4 - T3)) / 2
//! ```
//!
//! Single-sample estimate: no filtering, no outlier rejection.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

pub fn delay_ticks(t1: i64, t2: i64, t3: i64, t4: i64) -> i64 {
    (t2 - t1) + (t4 - t3)
}

/// Positive when the local clock is behind the server.
pub fn offset_ticks(t1: i64, t2: i64, t3: i64, t4: i64) -> i64 {
    ((t2 - t1) - (t4 - t3)) / 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundTrip {
    #[serde(rename = "delay_ns", serialize_with = "as_nanos")]
    pub delay: TimeDelta,
    #[serde(rename = "offset_ns", serialize_with = "as_nanos")]
    pub offset: TimeDelta,
}

impl RoundTrip {
    /// Timestamps in nanosecond ticks on any common scale.
    pub fn from_ticks(t1: i64, t2: i64, t3: i64, t4: i64) -> Self {
        RoundTrip {
            delay: TimeDelta::nanoseconds(delay_ticks(t1, t2, t3, t4)),
            offset: TimeDelta::nanoseconds(offset_ticks(t1, t2, t3, t4)),
        }
    }

    pub fn from_timestamps(
        originate: DateTime<Utc>,
        receive: DateTime<Utc>,
        transmit: DateTime<Utc>,
        destination: DateTime<Utc>,
    ) -> Self {
        // Differences of calendar times, so dates far from 1900 cannot overflow.
        let outbound = receive - originate;
        let inbound = destination - transmit;
        RoundTrip {
            delay: outbound + inbound,
            offset: (outbound - inbound) / 2,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        nanos(self.delay) as f64 / 1_000_000.0
    }

    pub fn offset_ms(&self) -> f64 {
        nanos(self.offset) as f64 / 1_000_000.0
    }
}

fn nanos(delta: TimeDelta) -> i64 {
    delta.num_nanoseconds().unwrap_or(if delta < TimeDelta::zero() { i64::MIN } else { i64::MAX })
}

fn as_nanos<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(nanos(*delta))
}
