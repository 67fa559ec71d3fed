//! Aggregation of repeated queries against one server.

use crate::roundtrip::RoundTrip;
use chrono::TimeDelta;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    samples: Vec<RoundTrip>,
    failures: usize,
}

impl PollSummary {
    pub fn new() -> Self {
        PollSummary::default()
    }

    pub fn record_success(&mut self, round_trip: RoundTrip) {
        self.samples.push(round_trip);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn successes(&self) -> usize {
        self.samples.len()
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn mean_offset(&self) -> Option<TimeDelta> {
        mean(self.samples.iter().map(|s| s.offset))
    }

    pub fn mean_delay(&self) -> Option<TimeDelta> {
        mean(self.samples.iter().map(|s| s.delay))
    }

    pub fn min_delay(&self) -> Option<TimeDelta> {
        self.best_sample().map(|s| s.delay)
    }

    /// Offset of the sample with the smallest delay, usually the most trustworthy one.
    pub fn best_offset(&self) -> Option<TimeDelta> {
        self.best_sample().map(|s| s.offset)
    }

    fn best_sample(&self) -> Option<&RoundTrip> {
        self.samples.iter().min_by_key(|s| s.delay)
    }
}

fn mean(values: impl Iterator<Item = TimeDelta>) -> Option<TimeDelta> {
    let (count, total) = values.fold((0i128, 0i128), |(n, sum), v| {
        (n + 1, sum + v.num_nanoseconds().unwrap_or_default() as i128)
    });
    if count == 0 {
        return None;
    }
    Some(TimeDelta::nanoseconds((total / count) as i64))
}

fn millis(delta: Option<TimeDelta>) -> Option<f64> {
    delta.and_then(|d| d.num_nanoseconds()).map(|ns| ns as f64 / 1_000_000.0)
}

impl Serialize for PollSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PollSummary", 6)?;
        state.serialize_field("successes", &self.successes())?;
        state.serialize_field("failures", &self.failures)?;
        state.serialize_field("mean_offset_ms", &millis(self.mean_offset()))?;
        state.serialize_field("mean_delay_ms", &millis(self.mean_delay()))?;
        state.serialize_field("min_delay_ms", &millis(self.min_delay()))?;
        state.serialize_field("best_offset_ms", &millis(self.best_offset()))?;
        state.end()
    }
}
