use crate::error::TransportError;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait NtpTransport {
    /// Resolve `host`, send `request` to `(host, port)` over UDP and block for the reply.
    /// The reply is returned as received; it may be any length.
    fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ReverseDns {
    /// Look up the host name registered for `addr`.
    fn lookup(&self, addr: Ipv4Addr) -> io::Result<String>;
}
