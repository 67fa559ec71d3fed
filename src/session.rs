//! One request/response cycle against an NTP server.
//!
//! The session builds a fresh request, hands it to the transport, stamps the
//! destination time as soon as the reply is back, validates it and decodes
//! it. There is one outstanding request per session; callers that poll
//! repeatedly reuse the session serially.

use crate::error::{InvalidReason, QueryError};
use crate::ntp::{DecodedPacket, Mode, NtpPacket, NtpRequest};
use crate::roundtrip::RoundTrip;
use crate::timestamp::DisplayZone;
use crate::traits::{NtpTransport, ReverseDns};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::time::Duration;

/// A validated, fully decoded reply plus the round-trip estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub host: String,
    pub packet: DecodedPacket,
    pub destination_timestamp: DateTime<FixedOffset>,
    pub round_trip: RoundTrip,
}

/// Length and mode checks. Returns the parsed packet on success.
///
/// The reply's originate timestamp is not compared with the request's
/// transmit timestamp.
pub fn validate_response(reply: &[u8]) -> Result<NtpPacket, InvalidReason> {
    let packet = NtpPacket::from_bytes(reply)?;
    match packet.mode() {
        Mode::Server => Ok(packet),
        other => Err(InvalidReason::UnexpectedMode(other)),
    }
}

pub fn is_response_valid(reply: &[u8]) -> bool {
    validate_response(reply).is_ok()
}

pub struct Session<T, R>
where
    T: NtpTransport,
    R: ReverseDns,
{
    transport: T,
    dns: R,
    zone: DisplayZone,
}

impl<T, R> Session<T, R>
where
    T: NtpTransport,
    R: ReverseDns,
{
    pub fn new(transport: T, dns: R) -> Self {
        Session {
            transport,
            dns,
            zone: DisplayZone::default(),
        }
    }

    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Run one query. Any failure aborts the whole query; nothing is retried.
    pub fn query(
        &mut self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<QueryResult, QueryError> {
        let request = NtpRequest::new();
        debug!("[Session] Querying {}:{} (timeout {:?})", host, port, timeout);

        let reply = self
            .transport
            .exchange(host, port, request.as_bytes(), timeout)
            .map_err(|e| QueryError::from_transport(host, e))?;
        let destination = Utc::now();

        let packet = validate_response(&reply).map_err(|reason| {
            warn!("[Session] Rejected reply from {}: {}", host, reason);
            QueryError::InvalidResponse {
                host: host.to_string(),
                reason,
            }
        })?;

        let round_trip = RoundTrip::from_timestamps(
            packet.originate_timestamp(),
            packet.receive_timestamp(),
            packet.transmit_timestamp(),
            destination,
        );
        debug!(
            "[Session] {} offset {:+.3} ms, delay {:.3} ms",
            host,
            round_trip.offset_ms(),
            round_trip.delay_ms()
        );

        Ok(QueryResult {
            host: host.to_string(),
            packet: packet.decode(&self.dns, self.zone),
            destination_timestamp: self.zone.convert(destination),
            round_trip,
        })
    }
}
