//! How a request reaches a server and its reply comes back.
//!
//! Chain building is written against [`Transport`] so tests can substitute deterministic
//! in-process servers for the network.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::directory::{Address, Protocol};

/// Largest reply accepted. A reply with a full 32-element path is 2408 bytes.
const MAX_REPLY_SIZE: usize = 4096;

/// How often a blocked receive wakes to look at the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("no reply from {0} before the timeout")]
    Timeout(String),

    #[error("unable to resolve {0}")]
    Resolve(String),

    #[error("{0} is not supported by this transport ({1})")]
    UnsupportedProtocol(Protocol, String),

    #[error("cancelled")]
    Cancelled,

    #[error("timeout of {0:?} is not usable")]
    InvalidTimeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether another attempt could succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_) | TransportError::Resolve(_) | TransportError::Io(_)
        )
    }
}

/// Sends one request datagram and waits for one reply.
pub trait Transport {
    fn exchange(
        &self,
        address: &Address,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;

    /// Addresses using a protocol this returns false for are never passed to `exchange`.
    fn supports(&self, _protocol: Protocol) -> bool {
        true
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn exchange(
        &self,
        address: &Address,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(address, request, timeout)
    }

    fn supports(&self, protocol: Protocol) -> bool {
        (**self).supports(protocol)
    }
}

/// UDP transport. A fresh socket is used for every exchange so a late reply to an earlier
/// attempt can never be mistaken for the reply to this one.
#[derive(Debug, Default, Clone)]
pub struct UdpTransport {
    cancel: Option<Arc<AtomicBool>>,
}

impl UdpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon an in-flight exchange once `flag` becomes true.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn resolve(address: &str) -> Result<SocketAddr, TransportError> {
        address
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(address.to_string()))?
            .next()
            .ok_or_else(|| TransportError::Resolve(address.to_string()))
    }

    fn connect(peer: SocketAddr) -> Result<UdpSocket, TransportError> {
        let local: SocketAddr = if peer.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        }
        .parse()
        .map_err(|_| TransportError::Resolve(peer.to_string()))?;

        let socket = UdpSocket::bind(local)?;
        // only datagrams from the peer are delivered to a connected socket
        socket.connect(peer)?;
        Ok(socket)
    }

    /// A zero timeout, or one too large to add to the clock, is rejected.
    fn deadline(timeout: Duration) -> Result<Instant, TransportError> {
        if timeout.is_zero() {
            return Err(TransportError::InvalidTimeout(timeout));
        }

        Instant::now()
            .checked_add(timeout)
            .ok_or(TransportError::InvalidTimeout(timeout))
    }

    fn receive(
        &self,
        socket: &UdpSocket,
        peer: SocketAddr,
        deadline: Instant,
    ) -> Result<Vec<u8>, TransportError> {
        let mut buf = [0u8; MAX_REPLY_SIZE];

        loop {
            if self.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout(peer.to_string()));
            }

            socket.set_read_timeout(Some(remaining.min(CANCEL_POLL_INTERVAL)))?;

            match socket.recv(&mut buf) {
                Ok(nbytes) => {
                    debug!("received {} bytes from {}", nbytes, peer);
                    trace_dump(&buf[..nbytes]);
                    return Ok(buf[..nbytes].to_vec());
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    continue;
                }
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }
}

impl Transport for UdpTransport {
    fn exchange(
        &self,
        address: &Address,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        if !self.supports(address.protocol()) {
            return Err(TransportError::UnsupportedProtocol(
                address.protocol(),
                address.address().to_string(),
            ));
        }

        let deadline = Self::deadline(timeout)?;
        let peer = Self::resolve(address.address())?;
        let socket = Self::connect(peer)?;

        debug!("sending {} bytes to {}", request.len(), peer);
        trace_dump(request);
        socket.send(request)?;

        self.receive(&socket, peer, deadline)
    }

    fn supports(&self, protocol: Protocol) -> bool {
        protocol == Protocol::Udp
    }
}

fn trace_dump(data: &[u8]) {
    if tracing::enabled!(tracing::Level::TRACE) {
        let mut dump = Vec::new();
        if notary_common::encoding::hexdump(data, &mut dump).is_ok() {
            trace!("\n{}", String::from_utf8_lossy(&dump));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn loopback_echo() -> (SocketAddr, thread::JoinHandle<()>) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 2048];
            let (n, from) = socket.recv_from(&mut buf).unwrap();
            buf[..n].reverse();
            socket.send_to(&buf[..n], from).unwrap();
        });

        (addr, handle)
    }

    #[test]
    fn udp_exchange_over_loopback() {
        let (addr, handle) = loopback_echo();
        let address = Address::udp(&addr.to_string()).unwrap();

        let reply = UdpTransport::new()
            .exchange(&address, &[1, 2, 3], Duration::from_secs(2))
            .unwrap();

        assert_eq!(reply, vec![3, 2, 1]);
        handle.join().unwrap();
    }

    #[test]
    fn silent_peer_times_out() {
        // bound but never answers
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let address = Address::udp(&silent.local_addr().unwrap().to_string()).unwrap();

        match UdpTransport::new().exchange(&address, &[0], Duration::from_millis(250)) {
            Err(TransportError::Timeout(_)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn cancelled_exchange_returns_promptly() {
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let address = Address::udp(&silent.local_addr().unwrap().to_string()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));

        let start = Instant::now();
        let result = UdpTransport::new()
            .with_cancel(flag)
            .exchange(&address, &[0], Duration::from_secs(30));

        assert!(matches!(result, Err(TransportError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn unusable_timeouts_are_rejected() {
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let address = Address::udp(&silent.local_addr().unwrap().to_string()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let transport = UdpTransport::new().with_cancel(flag);

        for timeout in [Duration::ZERO, Duration::from_secs(u64::MAX), Duration::MAX] {
            match transport.exchange(&address, &[0], timeout) {
                Err(TransportError::InvalidTimeout(t)) => assert_eq!(t, timeout),
                other => panic!("unexpected result for {timeout:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(TransportError::Timeout("a".into()).is_transient());
        assert!(TransportError::Resolve("a".into()).is_transient());
        assert!(!TransportError::Cancelled.is_transient());
        assert!(!TransportError::InvalidTimeout(Duration::ZERO).is_transient());
        assert!(!TransportError::UnsupportedProtocol(Protocol::Tcp, "a".into()).is_transient());
    }

    #[test]
    fn tcp_addresses_are_rejected() {
        let address = Address::new(Protocol::Tcp, "127.0.0.1:2002").unwrap();

        match UdpTransport::new().exchange(&address, &[0], Duration::from_secs(1)) {
            Err(TransportError::UnsupportedProtocol(Protocol::Tcp, _)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!UdpTransport::new().supports(Protocol::Tcp));
    }
}
