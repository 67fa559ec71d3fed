use crate::error::TransportError;
use crate::traits::{NtpTransport, ReverseDns};
use log::debug;
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Receive buffer; larger than a bare header so oversized replies are not truncated.
const RECV_BUFFER_SIZE: usize = 1024;

/// Blocking UDP transport. One socket per exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        UdpTransport
    }
}

impl NtpTransport for UdpTransport {
    fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let addr = resolve(host, port)?;
        debug!("[Transport] {} resolved to {}", host, addr);

        let socket = create_query_socket(addr, timeout)?;
        socket
            .send(request)
            .map_err(|e| socket_error(e, timeout))?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let size = socket
            .recv(&mut buf)
            .map_err(|e| socket_error(e, timeout))?;
        debug!("[Transport] Received {} bytes from {}", size, addr);
        Ok(buf[..size].to_vec())
    }
}

/// Expired SO_SNDTIMEO/SO_RCVTIMEO show up as WouldBlock on Unix and TimedOut on Windows.
fn socket_error(err: io::Error, timeout: Duration) -> TransportError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout(timeout),
        _ => TransportError::Io(err),
    }
}

/// Resolve `host:port`, preferring an IPv4 address when both families are returned.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(TransportError::Resolution)?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            TransportError::Resolution(io::Error::new(
                ErrorKind::NotFound,
                format!("no addresses found for {}", host),
            ))
        })
}

/// Connected UDP socket with send and receive timeouts.
pub fn create_query_socket(addr: SocketAddr, timeout: Duration) -> io::Result<UdpSocket> {
    if timeout.is_zero() {
        return Err(io::Error::new(ErrorKind::InvalidInput, "timeout must be non-zero"));
    }

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;

    let local: SocketAddr = match addr.ip() {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    socket.bind(&local.into())?;
    socket.set_read_timeout(Some(timeout))?;
    socket.set_write_timeout(Some(timeout))?;
    socket.connect(&addr.into())?;

    Ok(socket.into())
}

/// Reverse DNS through the system resolver (`getnameinfo`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemReverseDns;

impl ReverseDns for SystemReverseDns {
    #[cfg(unix)]
    fn lookup(&self, addr: Ipv4Addr) -> io::Result<String> {
        use std::ffi::CStr;
        use std::{mem, ptr};

        const HOST_BUFFER_SIZE: usize = 1025;

        let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
        sin.sin_family = libc::AF_INET as libc::sa_family_t;
        sin.sin_addr = libc::in_addr {
            s_addr: u32::from(addr).to_be(),
        };

        let mut host = [0 as libc::c_char; HOST_BUFFER_SIZE];
        let ret = unsafe {
            libc::getnameinfo(
                &sin as *const libc::sockaddr_in as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
                host.as_mut_ptr(),
                HOST_BUFFER_SIZE as libc::socklen_t,
                ptr::null_mut(),
                0,
                libc::NI_NAMEREQD,
            )
        };
        if ret != 0 {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("getnameinfo({}) failed with code {}", addr, ret),
            ));
        }

        let name = unsafe { CStr::from_ptr(host.as_ptr()) };
        Ok(name.to_string_lossy().into_owned())
    }

    #[cfg(not(unix))]
    fn lookup(&self, addr: Ipv4Addr) -> io::Result<String> {
        Err(io::Error::new(
            ErrorKind::Unsupported,
            format!("reverse lookup of {} not supported on this platform", addr),
        ))
    }
}

/// Never resolves; reference identifiers that need a lookup show as "N/A".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReverseDns;

impl ReverseDns for NoReverseDns {
    fn lookup(&self, addr: Ipv4Addr) -> io::Result<String> {
        Err(io::Error::new(
            ErrorKind::Unsupported,
            format!("reverse lookup of {} disabled", addr),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_literal_address() {
        let addr = resolve("127.0.0.1", 123).unwrap();
        assert_eq!(addr, "127.0.0.1:123".parse().unwrap());
    }

    #[test]
    fn test_resolve_failure_is_resolution_error() {
        let err = resolve("no-such-host.invalid", 123).unwrap_err();
        assert!(matches!(err, TransportError::Resolution(_)), "got {:?}", err);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = create_query_socket("127.0.0.1:123".parse().unwrap(), Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_socket_timeouts_classified() {
        let timeout = Duration::from_millis(300);
        for kind in [ErrorKind::WouldBlock, ErrorKind::TimedOut] {
            let err = socket_error(io::Error::new(kind, "send timed out"), timeout);
            assert!(matches!(err, TransportError::Timeout(t) if t == timeout), "got {:?}", err);
        }

        let err = socket_error(io::Error::new(ErrorKind::ConnectionRefused, "refused"), timeout);
        assert!(matches!(err, TransportError::Io(_)), "got {:?}", err);
    }

    #[test]
    fn test_no_reverse_dns_always_fails() {
        assert!(NoReverseDns.lookup(Ipv4Addr::LOCALHOST).is_err());
    }

    #[test]
    fn test_exchange_times_out_without_reply() {
        // Bound but silent peer.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = silent.local_addr().unwrap().port();

        let mut transport = UdpTransport::new();
        let err = transport
            .exchange("127.0.0.1", port, &[0u8; 48], Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)), "got {:?}", err);
    }

    #[test]
    fn test_exchange_returns_reply_bytes() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = peer.local_addr().unwrap().port();

        let responder = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (size, src) = peer.recv_from(&mut buf).unwrap();
            assert_eq!(size, 48);
            peer.send_to(&[7u8; 12], src).unwrap();
        });

        let mut transport = UdpTransport::new();
        let reply = transport
            .exchange("127.0.0.1", port, &[0u8; 48], Duration::from_secs(2))
            .unwrap();
        assert_eq!(reply, vec![7u8; 12]);
        responder.join().unwrap();
    }
}
