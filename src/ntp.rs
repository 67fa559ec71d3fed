//! NTP packet codec.
//!
//! Builds the 48-byte client request and decodes the fixed header of a
//! server reply (RFC 2030 / RFC 5905 layout, no extension fields):
//!
//! ```text
//!  0      LI(2) | VN(3) | Mode(3)
//!  1      Stratum
//!  2      Poll interval (log2 s)
//!  3      Precision (log2 s)
//!  4-7    Root delay (16.16)
//!  8-11   Root dispersion (16.16)
//!  12-15  Reference identifier
//!  16-23  Reference timestamp
//!  24-31  Originate timestamp
//!  32-39  Receive timestamp
//!  40-47  Transmit timestamp
//! ```
//!
//! Decoding is split in two steps: [`NtpPacket::from_bytes`] checks the length
//! and unpacks the header byte once, then the accessors are pure views over
//! the immutable buffer. [`NtpPacket::decode`] produces a [`DecodedPacket`]
//! with every field converted for display.

use crate::error::InvalidReason;
use crate::timestamp::{DisplayZone, NtpTimestamp, TIMESTAMP_SIZE};
use crate::traits::ReverseDns;
use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, FixedOffset, Utc};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

// ============================================================================
// NTP PROTOCOL CONSTANTS
// ============================================================================

/// NTP packet size (48 bytes)
pub const NTP_PACKET_SIZE: usize = 48;

/// Well-known NTP port
pub const NTP_PORT: u16 = 123;

/// Version number written into requests
pub const NTP_VERSION: u8 = 4;

/// Placeholder for reference identifiers that cannot be shown
pub const REFERENCE_ID_UNAVAILABLE: &str = "N/A";

const ROOT_DELAY_OFFSET: usize = 4;
const ROOT_DISPERSION_OFFSET: usize = 8;
const REFERENCE_ID_OFFSET: usize = 12;
const REFERENCE_TS_OFFSET: usize = 16;
const ORIGINATE_TS_OFFSET: usize = 24;
const RECEIVE_TS_OFFSET: usize = 32;
const TRANSMIT_TS_OFFSET: usize = 40;

// ============================================================================
// HEADER FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeapIndicator {
    NoWarning,
    LastMinute61,
    LastMinute59,
    Alarm,
}

impl From<u8> for LeapIndicator {
    fn from(v: u8) -> Self {
        match v & 0x03 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::LastMinute61,
            2 => LeapIndicator::LastMinute59,
            _ => LeapIndicator::Alarm,
        }
    }
}

impl LeapIndicator {
    pub fn bits(self) -> u8 {
        match self {
            LeapIndicator::NoWarning => 0,
            LeapIndicator::LastMinute61 => 1,
            LeapIndicator::LastMinute59 => 2,
            LeapIndicator::Alarm => 3,
        }
    }
}

impl fmt::Display for LeapIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LeapIndicator::NoWarning => "no warning",
            LeapIndicator::LastMinute61 => "last minute has 61 seconds",
            LeapIndicator::LastMinute59 => "last minute has 59 seconds",
            LeapIndicator::Alarm => "alarm (clock not synchronized)",
        };
        f.write_str(text)
    }
}

/// Association mode. `Unknown` keeps the raw value (0, 6 or 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Unknown(u8),
    SymmetricActive,
    SymmetricPassive,
    Client,
    Server,
    Broadcast,
}

impl From<u8> for Mode {
    fn from(v: u8) -> Self {
        match v & 0x07 {
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            other => Mode::Unknown(other),
        }
    }
}

impl Mode {
    pub fn bits(self) -> u8 {
        match self {
            Mode::Unknown(v) => v & 0x07,
            Mode::SymmetricActive => 1,
            Mode::SymmetricPassive => 2,
            Mode::Client => 3,
            Mode::Server => 4,
            Mode::Broadcast => 5,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Unknown(v) => write!(f, "unknown ({})", v),
            Mode::SymmetricActive => f.write_str("symmetric active"),
            Mode::SymmetricPassive => f.write_str("symmetric passive"),
            Mode::Client => f.write_str("client"),
            Mode::Server => f.write_str("server"),
            Mode::Broadcast => f.write_str("broadcast"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stratum {
    Unspecified,
    PrimaryReference,
    /// 2..=15
    SecondaryReference(u8),
    /// 16..=255
    Reserved(u8),
}

impl From<u8> for Stratum {
    fn from(v: u8) -> Self {
        match v {
            0 => Stratum::Unspecified,
            1 => Stratum::PrimaryReference,
            2..=15 => Stratum::SecondaryReference(v),
            _ => Stratum::Reserved(v),
        }
    }
}

impl Stratum {
    pub fn value(self) -> u8 {
        match self {
            Stratum::Unspecified => 0,
            Stratum::PrimaryReference => 1,
            Stratum::SecondaryReference(v) | Stratum::Reserved(v) => v,
        }
    }
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stratum::Unspecified => f.write_str("unspecified"),
            Stratum::PrimaryReference => f.write_str("primary reference"),
            Stratum::SecondaryReference(v) => write!(f, "secondary reference ({})", v),
            Stratum::Reserved(v) => write!(f, "reserved ({})", v),
        }
    }
}

/// Byte 0 unpacked into its three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderByte {
    pub leap_indicator: LeapIndicator,
    pub version_number: u8,
    pub mode: Mode,
}

impl HeaderByte {
    /// LI = 0, VN = 4, Mode = client.
    pub const CLIENT_REQUEST: u8 = 0x1B;

    pub fn from_byte(b: u8) -> Self {
        HeaderByte {
            leap_indicator: LeapIndicator::from(b >> 6),
            version_number: (b & 0x38) >> 3,
            mode: Mode::from(b & 0x07),
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.leap_indicator.bits() << 6) | ((self.version_number & 0x07) << 3) | self.mode.bits()
    }
}

// ============================================================================
// REQUEST
// ============================================================================

/// Outgoing client request: header 0x1B, zeros, and the transmit timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtpRequest {
    bytes: [u8; NTP_PACKET_SIZE],
    transmit: NtpTimestamp,
}

impl NtpRequest {
    /// Request stamped with the current local time.
    pub fn new() -> Self {
        NtpRequest::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        let header = HeaderByte {
            leap_indicator: LeapIndicator::NoWarning,
            version_number: NTP_VERSION,
            mode: Mode::Client,
        };
        let transmit = NtpTimestamp::from_datetime(now);

        let mut bytes = [0u8; NTP_PACKET_SIZE];
        bytes[0] = header.to_byte();
        bytes[TRANSMIT_TS_OFFSET..TRANSMIT_TS_OFFSET + TIMESTAMP_SIZE]
            .copy_from_slice(&transmit.to_bytes());

        NtpRequest { bytes, transmit }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn transmit_timestamp(&self) -> NtpTimestamp {
        self.transmit
    }
}

impl Default for NtpRequest {
    fn default() -> Self {
        NtpRequest::new()
    }
}

// ============================================================================
// REPLY
// ============================================================================

/// A received packet, length-checked and with the header byte unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtpPacket {
    bytes: [u8; NTP_PACKET_SIZE],
    header: HeaderByte,
}

impl NtpPacket {
    /// Accepts any buffer of at least 48 bytes; trailing bytes (extension
    /// fields, MAC) are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, InvalidReason> {
        if data.len() < NTP_PACKET_SIZE {
            return Err(InvalidReason::TooShort { received: data.len() });
        }
        let mut bytes = [0u8; NTP_PACKET_SIZE];
        bytes.copy_from_slice(&data[..NTP_PACKET_SIZE]);
        Ok(NtpPacket {
            header: HeaderByte::from_byte(bytes[0]),
            bytes,
        })
    }

    pub fn as_bytes(&self) -> &[u8; NTP_PACKET_SIZE] {
        &self.bytes
    }

    pub fn header(&self) -> HeaderByte {
        self.header
    }

    pub fn leap_indicator(&self) -> LeapIndicator {
        self.header.leap_indicator
    }

    pub fn version_number(&self) -> u8 {
        self.header.version_number
    }

    pub fn mode(&self) -> Mode {
        self.header.mode
    }

    pub fn stratum(&self) -> Stratum {
        Stratum::from(self.bytes[1])
    }

    /// Poll interval in seconds, `round(2^byte)`. The byte is taken as
    /// unsigned; results beyond `u64` saturate.
    pub fn poll_interval(&self) -> u64 {
        2f64.powi(self.bytes[2] as i32).round() as u64
    }

    /// Precision in milliseconds, `1000 * 2^byte` with the byte taken as unsigned.
    pub fn precision_ms(&self) -> f64 {
        1000.0 * 2f64.powi(self.bytes[3] as i32)
    }

    pub fn root_delay_ms(&self) -> f64 {
        fixed_16_16_ms(&self.bytes[ROOT_DELAY_OFFSET..ROOT_DELAY_OFFSET + 4])
    }

    pub fn root_dispersion_ms(&self) -> f64 {
        fixed_16_16_ms(&self.bytes[ROOT_DISPERSION_OFFSET..ROOT_DISPERSION_OFFSET + 4])
    }

    pub fn reference_id_bytes(&self) -> [u8; 4] {
        let mut id = [0u8; 4];
        id.copy_from_slice(&self.bytes[REFERENCE_ID_OFFSET..REFERENCE_ID_OFFSET + 4]);
        id
    }

    /// ASCII code for stratum 0/1, reverse-resolved IPv4 address for
    /// secondary references under NTPv3, "N/A" otherwise.
    pub fn reference_identifier(&self, dns: &dyn ReverseDns) -> String {
        let id = self.reference_id_bytes();
        match self.stratum() {
            Stratum::Unspecified | Stratum::PrimaryReference => ascii_reference(&id),
            Stratum::SecondaryReference(_) if self.version_number() == 3 => {
                let addr = Ipv4Addr::from(id);
                match dns.lookup(addr) {
                    Ok(name) => name,
                    Err(e) => {
                        debug!("[NTP] Reverse lookup of {} failed: {}", addr, e);
                        REFERENCE_ID_UNAVAILABLE.to_string()
                    }
                }
            }
            _ => REFERENCE_ID_UNAVAILABLE.to_string(),
        }
    }

    pub fn reference_timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(REFERENCE_TS_OFFSET).to_datetime()
    }

    pub fn originate_timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(ORIGINATE_TS_OFFSET).to_datetime()
    }

    pub fn receive_timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(RECEIVE_TS_OFFSET).to_datetime()
    }

    pub fn transmit_timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(TRANSMIT_TS_OFFSET).to_datetime()
    }

    pub fn timestamp_at(&self, offset: usize) -> NtpTimestamp {
        let mut raw = [0u8; TIMESTAMP_SIZE];
        raw.copy_from_slice(&self.bytes[offset..offset + TIMESTAMP_SIZE]);
        NtpTimestamp::from_be_bytes(raw)
    }

    /// Decode every field. Reference, receive and transmit timestamps are
    /// shown in `zone`; the originate timestamp echoes the client clock and
    /// stays in UTC.
    pub fn decode(&self, dns: &dyn ReverseDns, zone: DisplayZone) -> DecodedPacket {
        DecodedPacket {
            leap_indicator: self.leap_indicator(),
            version_number: self.version_number(),
            mode: self.mode(),
            stratum: self.stratum(),
            poll_interval: self.poll_interval(),
            precision_ms: self.precision_ms(),
            root_delay_ms: self.root_delay_ms(),
            root_dispersion_ms: self.root_dispersion_ms(),
            reference_identifier: self.reference_identifier(dns),
            reference_timestamp: zone.convert(self.reference_timestamp()),
            originate_timestamp: DisplayZone::Utc.convert(self.originate_timestamp()),
            receive_timestamp: zone.convert(self.receive_timestamp()),
            transmit_timestamp: zone.convert(self.transmit_timestamp()),
        }
    }
}

/// 16.16 fixed point to milliseconds.
fn fixed_16_16_ms(raw: &[u8]) -> f64 {
    let value = BigEndian::read_u32(raw);
    1000.0 * value as f64 / 65536.0
}

/// The code ends at the first NUL. Remaining bytes that are not printable
/// ASCII become '?'.
fn ascii_reference(id: &[u8; 4]) -> String {
    id.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

// ============================================================================
// DECODED VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedPacket {
    pub leap_indicator: LeapIndicator,
    pub version_number: u8,
    pub mode: Mode,
    pub stratum: Stratum,
    pub poll_interval: u64,
    pub precision_ms: f64,
    pub root_delay_ms: f64,
    pub root_dispersion_ms: f64,
    pub reference_identifier: String,
    pub reference_timestamp: DateTime<FixedOffset>,
    pub originate_timestamp: DateTime<FixedOffset>,
    pub receive_timestamp: DateTime<FixedOffset>,
    pub transmit_timestamp: DateTime<FixedOffset>,
}

impl fmt::Display for DecodedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Leap indicator:      {}", self.leap_indicator)?;
        writeln!(f, "Version number:      {}", self.version_number)?;
        writeln!(f, "Mode:                {}", self.mode)?;
        writeln!(f, "Stratum:             {}", self.stratum)?;
        writeln!(f, "Poll interval:       {} s", self.poll_interval)?;
        writeln!(f, "Precision:           {} ms", self.precision_ms)?;
        writeln!(f, "Root delay:          {:.3} ms", self.root_delay_ms)?;
        writeln!(f, "Root dispersion:     {:.3} ms", self.root_dispersion_ms)?;
        writeln!(f, "Reference ID:        {}", self.reference_identifier)?;
        writeln!(f, "Reference timestamp: {}", self.reference_timestamp.to_rfc3339())?;
        writeln!(f, "Originate timestamp: {}", self.originate_timestamp.to_rfc3339())?;
        writeln!(f, "Receive timestamp:   {}", self.receive_timestamp.to_rfc3339())?;
        write!(f, "Transmit timestamp:  {}", self.transmit_timestamp.to_rfc3339())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockReverseDns;
    use chrono::TimeZone;
    use mockall::predicate::*;
    use std::io;

    fn packet_with(edit: impl FnOnce(&mut [u8; NTP_PACKET_SIZE])) -> NtpPacket {
        let mut raw = [0u8; NTP_PACKET_SIZE];
        raw[0] = 0x24; // LI 0, VN 4, server
        edit(&mut raw);
        NtpPacket::from_bytes(&raw).unwrap()
    }

    fn no_dns() -> MockReverseDns {
        let mut dns = MockReverseDns::new();
        dns.expect_lookup().never();
        dns
    }

    #[test]
    fn test_header_byte_roundtrip_all_values() {
        for b in 0..=u8::MAX {
            let header = HeaderByte::from_byte(b);
            assert_eq!(header.to_byte(), b, "header byte {:#04x}", b);
        }
    }

    #[test]
    fn test_header_byte_fields() {
        let header = HeaderByte::from_byte(0xE3); // 11 100 011
        assert_eq!(header.leap_indicator, LeapIndicator::Alarm);
        assert_eq!(header.version_number, 4);
        assert_eq!(header.mode, Mode::Client);

        let header = HeaderByte::from_byte(0x5C); // 01 011 100
        assert_eq!(header.leap_indicator, LeapIndicator::LastMinute61);
        assert_eq!(header.version_number, 3);
        assert_eq!(header.mode, Mode::Server);
    }

    #[test]
    fn test_mode_mapping() {
        assert_eq!(Mode::from(0), Mode::Unknown(0));
        assert_eq!(Mode::from(1), Mode::SymmetricActive);
        assert_eq!(Mode::from(2), Mode::SymmetricPassive);
        assert_eq!(Mode::from(3), Mode::Client);
        assert_eq!(Mode::from(4), Mode::Server);
        assert_eq!(Mode::from(5), Mode::Broadcast);
        assert_eq!(Mode::from(6), Mode::Unknown(6));
        assert_eq!(Mode::from(7), Mode::Unknown(7));
    }

    #[test]
    fn test_stratum_mapping() {
        assert_eq!(Stratum::from(0), Stratum::Unspecified);
        assert_eq!(Stratum::from(1), Stratum::PrimaryReference);
        for v in 2..=15 {
            assert_eq!(Stratum::from(v), Stratum::SecondaryReference(v));
        }
        for v in 16..=255 {
            assert_eq!(Stratum::from(v), Stratum::Reserved(v));
        }
        for v in 0..=u8::MAX {
            assert_eq!(Stratum::from(v).value(), v);
        }
    }

    #[test]
    fn test_request_layout() {
        let before = Utc::now();
        let request = NtpRequest::new();
        let bytes = request.as_bytes();

        assert_eq!(bytes.len(), NTP_PACKET_SIZE);
        assert_eq!(bytes[0], HeaderByte::CLIENT_REQUEST);
        assert!(bytes[1..40].iter().all(|&b| b == 0));

        let mut raw = [0u8; TIMESTAMP_SIZE];
        raw.copy_from_slice(&bytes[40..48]);
        let sent = NtpTimestamp::from_be_bytes(raw).to_datetime();
        let drift = (sent - before).num_milliseconds().abs();
        assert!(drift < 1000, "transmit timestamp {}ms away from now", drift);
        assert_eq!(request.transmit_timestamp(), NtpTimestamp::from_be_bytes(raw));
    }

    #[test]
    fn test_request_at_fixed_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let request = NtpRequest::at(now);
        let packet = NtpPacket::from_bytes(request.as_bytes()).unwrap();
        assert_eq!(packet.mode(), Mode::Client);
        assert_eq!(packet.version_number(), 4);
        assert_eq!(packet.transmit_timestamp(), now);
        assert_eq!(packet.originate_timestamp(), crate::timestamp::ntp_epoch());
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert_eq!(
            NtpPacket::from_bytes(&[0u8; 10]),
            Err(InvalidReason::TooShort { received: 10 })
        );
        assert!(NtpPacket::from_bytes(&[0u8; 47]).is_err());
        assert!(NtpPacket::from_bytes(&[0u8; 68]).is_ok());
    }

    #[test]
    fn test_root_delay_and_dispersion() {
        let packet = packet_with(|raw| {
            raw[4..8].copy_from_slice(&[0x00, 0x01, 0x00, 0x00]);
            raw[8..12].copy_from_slice(&[0x00, 0x00, 0x80, 0x00]);
        });
        assert_eq!(packet.root_delay_ms(), 1000.0);
        assert_eq!(packet.root_dispersion_ms(), 500.0);
    }

    #[test]
    fn test_poll_interval() {
        assert_eq!(packet_with(|raw| raw[2] = 6).poll_interval(), 64);
        assert_eq!(packet_with(|raw| raw[2] = 0).poll_interval(), 1);
        assert_eq!(packet_with(|raw| raw[2] = 17).poll_interval(), 131_072);
        assert_eq!(packet_with(|raw| raw[2] = 200).poll_interval(), u64::MAX);
    }

    #[test]
    fn test_precision_uses_unsigned_exponent() {
        assert_eq!(packet_with(|raw| raw[3] = 0).precision_ms(), 1000.0);
        assert_eq!(packet_with(|raw| raw[3] = 3).precision_ms(), 8000.0);
        // 0xEC is -20 as a signed byte but is read as 236.
        assert_eq!(packet_with(|raw| raw[3] = 0xEC).precision_ms(), 1000.0 * 2f64.powi(236));
    }

    #[test]
    fn test_reference_id_ascii_for_primary() {
        let packet = packet_with(|raw| {
            raw[1] = 1;
            raw[12..16].copy_from_slice(b"GPS\0");
        });
        assert_eq!(packet.reference_identifier(&no_dns()), "GPS");

        let packet = packet_with(|raw| {
            raw[1] = 0;
            raw[12..16].copy_from_slice(b"RATE");
        });
        assert_eq!(packet.reference_identifier(&no_dns()), "RATE");
    }

    #[test]
    fn test_reference_id_stops_at_first_nul() {
        let packet = packet_with(|raw| {
            raw[1] = 1;
            raw[12..16].copy_from_slice(&[0x47, 0x00, 0x50, 0xE9]);
        });
        assert_eq!(packet.reference_identifier(&no_dns()), "G");

        let packet = packet_with(|raw| {
            raw[1] = 1;
            raw[12..16].copy_from_slice(&[0x01, b'B', 0xE9, b'\n']);
        });
        let id = packet.reference_identifier(&no_dns());
        assert_eq!(id, "?B??");
        assert!(!id.chars().any(|c| c.is_control()));
    }

    #[test]
    fn test_reference_id_reverse_lookup_v3() {
        let mut dns = MockReverseDns::new();
        dns.expect_lookup()
            .with(eq(Ipv4Addr::new(192, 0, 2, 7)))
            .times(1)
            .returning(|_| Ok("ntp1.example.net".to_string()));

        let packet = packet_with(|raw| {
            raw[0] = 0x1C; // VN 3, server
            raw[1] = 2;
            raw[12..16].copy_from_slice(&[192, 0, 2, 7]);
        });
        assert_eq!(packet.reference_identifier(&dns), "ntp1.example.net");
    }

    #[test]
    fn test_reference_id_lookup_failure_degrades() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut dns = MockReverseDns::new();
        dns.expect_lookup()
            .times(1)
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "no PTR record")));

        let packet = packet_with(|raw| {
            raw[0] = 0x1C;
            raw[1] = 3;
            raw[12..16].copy_from_slice(&[10, 0, 0, 1]);
        });
        assert_eq!(packet.reference_identifier(&dns), REFERENCE_ID_UNAVAILABLE);
    }

    #[test]
    fn test_reference_id_not_available() {
        // Secondary reference under NTPv4 carries a hash, not an address.
        let packet = packet_with(|raw| {
            raw[1] = 2;
            raw[12..16].copy_from_slice(&[1, 2, 3, 4]);
        });
        assert_eq!(packet.reference_identifier(&no_dns()), REFERENCE_ID_UNAVAILABLE);

        let packet = packet_with(|raw| {
            raw[0] = 0x1C;
            raw[1] = 16;
        });
        assert_eq!(packet.reference_identifier(&no_dns()), REFERENCE_ID_UNAVAILABLE);
    }

    #[test]
    fn test_decode_keeps_originate_in_utc() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let ts = NtpTimestamp::from_datetime(t).to_bytes();
        let packet = packet_with(|raw| {
            raw[1] = 1;
            raw[24..32].copy_from_slice(&ts);
            raw[40..48].copy_from_slice(&ts);
        });

        let decoded = packet.decode(&no_dns(), DisplayZone::Local);
        assert_eq!(decoded.originate_timestamp.offset().local_minus_utc(), 0);
        assert_eq!(decoded.originate_timestamp, t);
        assert_eq!(decoded.transmit_timestamp, t);
    }

    #[test]
    fn test_display_lists_fields() {
        let packet = packet_with(|raw| {
            raw[1] = 1;
            raw[12..16].copy_from_slice(b"PPS\0");
        });
        let text = packet.decode(&no_dns(), DisplayZone::Utc).to_string();
        assert!(text.contains("Mode:                server"));
        assert!(text.contains("Stratum:             primary reference"));
        assert!(text.contains("Reference ID:        PPS"));
    }
}
