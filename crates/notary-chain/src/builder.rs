//! Build a chain by querying servers in sequence, each one attesting to the reply before it.
//!
//! The first server is asked to sign the artifact's nonce. Every later server is asked to sign
//! `SHA512(previous reply)`, so its timestamp is provably produced after the previous one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notary_common::crypto::chained_nonce;
use notary_protocol::request::Request;
use notary_protocol::response::Response;
use notary_protocol::tags::Nonce;
use notary_protocol::{FromWire, ToWire};
use tracing::{debug, info, warn};

use crate::chain::{Chain, Link};
use crate::directory::{Address, Server};
use crate::transport::{Transport, TransportError};
use crate::validation::{ResponseValidator, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    #[error("no servers to query")]
    NoServers,

    #[error("server '{server}' did not answer after {attempts} attempts: {source}")]
    Transport {
        server: String,
        attempts: u32,
        source: TransportError,
    },

    #[error("reply from '{server}' rejected: {source}")]
    ResponseRejected {
        server: String,
        source: ValidationError,
    },

    #[error("chain building was cancelled")]
    Cancelled,

    #[error("unable to encode request: {0}")]
    Encode(#[from] notary_protocol::error::Error),
}

/// How hard to try each server before giving up on the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per server, including the first
    pub attempts: u32,
    /// How long to wait for each reply
    pub timeout: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 3;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(attempts: u32, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            timeout,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_TIMEOUT)
    }
}

/// Queries servers one after another over `T`, producing a [`Chain`].
///
/// Only transport failures are retried. A reply that arrives but fails validation aborts the
/// build, as does cancellation.
pub struct ChainBuilder<T: Transport> {
    transport: T,
    policy: RetryPolicy,
    cancel: Arc<AtomicBool>,
    validate_replies: bool,
}

impl<T: Transport> ChainBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            validate_replies: true,
        }
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a flag that, once set, stops the build before its next attempt.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// When disabled, replies are only checked to be well-formed while building and all
    /// cryptographic checks are left to verification.
    pub fn validate_replies(mut self, enabled: bool) -> Self {
        self.validate_replies = enabled;
        self
    }

    /// Query each of `servers` in order, starting from `nonce`.
    ///
    /// Returns either a complete chain with one link per server, or the first error. A partial
    /// chain is never returned.
    pub fn build(&self, nonce: &Nonce, servers: &[Server]) -> Result<Chain, ChainError> {
        if servers.is_empty() {
            return Err(ChainError::NoServers);
        }

        let mut links = Vec::with_capacity(servers.len());
        let mut nonce = *nonce;

        for (idx, server) in servers.iter().enumerate() {
            debug!("link {}: querying '{}' with {:?}", idx, server.name(), nonce);

            let reply = self.query(server, &nonce)?;
            self.check_reply(server, &reply, &nonce)?;

            let next_nonce = chained_nonce(&reply);
            links.push(Link::new(server.name(), nonce, reply));
            nonce = next_nonce;
        }

        info!("built chain of {} links", links.len());
        Chain::new(links).ok_or(ChainError::NoServers)
    }

    fn query(&self, server: &Server, nonce: &Nonce) -> Result<Vec<u8>, ChainError> {
        let request = Request::new(nonce).as_bytes()?;
        let addresses: Vec<&Address> = server
            .addresses()
            .iter()
            .filter(|a| self.transport.supports(a.protocol()))
            .collect();

        let failed = |attempts: u32, source: TransportError| ChainError::Transport {
            server: server.name().to_string(),
            attempts,
            source,
        };

        if addresses.is_empty() {
            // Server::new guarantees at least one address
            let unusable = &server.addresses()[0];
            let source = TransportError::UnsupportedProtocol(
                unusable.protocol(),
                unusable.address().to_string(),
            );
            return Err(failed(0, source));
        }

        let mut last_error = None;

        for attempt in 0..self.policy.attempts {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(ChainError::Cancelled);
            }

            // rotate through the server's addresses on each retry
            let address = addresses[attempt as usize % addresses.len()];

            match self
                .transport
                .exchange(address, &request, self.policy.timeout)
            {
                Ok(reply) => return Ok(reply),
                Err(TransportError::Cancelled) => return Err(ChainError::Cancelled),
                Err(e) if !e.is_transient() => return Err(failed(attempt + 1, e)),
                Err(e) => {
                    warn!(
                        "'{}' attempt {}/{} via {} failed: {}",
                        server.name(),
                        attempt + 1,
                        self.policy.attempts,
                        address,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| TransportError::Timeout(server.name().into()));
        Err(failed(self.policy.attempts, source))
    }

    fn check_reply(
        &self,
        server: &Server,
        reply: &[u8],
        nonce: &Nonce,
    ) -> Result<(), ChainError> {
        let rejected = |source: ValidationError| ChainError::ResponseRejected {
            server: server.name().to_string(),
            source,
        };

        if self.validate_replies {
            let verified = ResponseValidator::for_server(server)
                .validate(reply, nonce)
                .map_err(rejected)?;
            debug!(
                "'{}' midpoint {} radius {}",
                server.name(),
                verified.midpoint,
                verified.radius
            );
        } else {
            Response::from_bytes(reply).map_err(|e| rejected(e.into()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use notary_common::crypto::sha512;

    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::directory::Protocol;
    use crate::test_utils::{FixtureTransport, TestServer, TimeoutTransport};
    use crate::transport::UdpTransport;

    /// Answers through `inner`, then raises `flag` as if Ctrl-C arrived mid-build.
    struct CancelAfterReply {
        inner: FixtureTransport,
        flag: Arc<AtomicBool>,
    }

    impl Transport for CancelAfterReply {
        fn exchange(
            &self,
            address: &Address,
            request: &[u8],
            timeout: Duration,
        ) -> Result<Vec<u8>, TransportError> {
            let reply = self.inner.exchange(address, request, timeout);
            self.flag.store(true, Ordering::Relaxed);
            reply
        }
    }

    /// Reports every exchange as cancelled in flight.
    #[derive(Default)]
    struct CancelledInFlight {
        attempts: AtomicUsize,
    }

    impl Transport for CancelledInFlight {
        fn exchange(
            &self,
            _address: &Address,
            _request: &[u8],
            _timeout: Duration,
        ) -> Result<Vec<u8>, TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Cancelled)
        }
    }

    fn artifact() -> Nonce {
        sha512(b"hello")
    }

    #[test]
    fn links_are_chained_by_reply_hash() {
        let servers = [
            TestServer::new("a", 1),
            TestServer::new("b", 2),
            TestServer::new("c", 3),
        ];
        let transport = FixtureTransport::new(&servers);
        let entries: Vec<Server> = servers.iter().map(TestServer::server).collect();

        let chain = ChainBuilder::new(&transport)
            .build(&artifact(), &entries)
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.initial_nonce(), &artifact());

        for pair in chain.links().windows(2) {
            assert_eq!(pair[1].nonce(), &chained_nonce(pair[0].reply()));
        }

        let names: Vec<&str> = chain.links().iter().map(|l| l.server_name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn timeouts_are_retried_then_fail() {
        let server = TestServer::new("slow", 1).server();
        let transport = TimeoutTransport::default();

        let result = ChainBuilder::new(&transport).build(&artifact(), &[server]);

        match result {
            Err(ChainError::Transport {
                server,
                attempts: 3,
                source: TransportError::Timeout(_),
            }) => assert_eq!(server, "slow"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(transport.attempts(), 3);
    }

    #[test]
    fn retries_rotate_addresses() {
        let addresses = vec![
            Address::udp("first.test:2002").unwrap(),
            Address::udp("second.test:2002").unwrap(),
        ];
        let server = Server::new("rotating", TestServer::new("x", 1).public_key(), addresses)
            .unwrap();
        let transport = TimeoutTransport::default();

        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let _ = ChainBuilder::new(&transport)
            .retry_policy(policy)
            .build(&artifact(), &[server]);

        assert_eq!(
            transport.addresses(),
            ["first.test:2002", "second.test:2002", "first.test:2002", "second.test:2002"]
        );
    }

    #[test]
    fn transient_failure_recovers() {
        let server = TestServer::new("flaky", 1);
        let transport = FixtureTransport::new(std::slice::from_ref(&server)).drop_first(2);

        let chain = ChainBuilder::new(&transport)
            .build(&artifact(), &[server.server()])
            .unwrap();

        assert_eq!(chain.len(), 1);
        assert_eq!(transport.attempts(), 3);
    }

    #[test]
    fn invalid_reply_is_not_retried() {
        let server = TestServer::new("liar", 1);
        let impostor = TestServer::new("liar", 99);
        // directory has the real key but the transport answers with the impostor
        let transport = FixtureTransport::new(std::slice::from_ref(&impostor));

        let result = ChainBuilder::new(&transport).build(&artifact(), &[server.server()]);

        match result {
            Err(ChainError::ResponseRejected {
                source: ValidationError::CertificateSignatureInvalid,
                ..
            }) => (),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(transport.attempts(), 1);
    }

    #[test]
    fn structural_check_only_when_validation_disabled() {
        let server = TestServer::new("liar", 1);
        let impostor = TestServer::new("liar", 99);
        let transport = FixtureTransport::new(std::slice::from_ref(&impostor));

        let chain = ChainBuilder::new(&transport)
            .validate_replies(false)
            .build(&artifact(), &[server.server()]);

        assert!(chain.is_ok());
    }

    #[test]
    fn cancelled_before_first_attempt() {
        let server = TestServer::new("a", 1);
        let transport = FixtureTransport::new(std::slice::from_ref(&server));
        let flag = Arc::new(AtomicBool::new(true));

        let result = ChainBuilder::new(&transport)
            .cancel_flag(flag)
            .build(&artifact(), &[server.server()]);

        assert!(matches!(result, Err(ChainError::Cancelled)));
        assert_eq!(transport.attempts(), 0);
    }

    #[test]
    fn cancelled_between_hops_discards_partial_chain() {
        let servers = [TestServer::new("a", 1), TestServer::new("b", 2)];
        let flag = Arc::new(AtomicBool::new(false));
        let transport = CancelAfterReply {
            inner: FixtureTransport::new(&servers),
            flag: flag.clone(),
        };
        let entries: Vec<Server> = servers.iter().map(TestServer::server).collect();

        let result = ChainBuilder::new(&transport)
            .cancel_flag(flag)
            .build(&artifact(), &entries);

        assert!(matches!(result, Err(ChainError::Cancelled)), "{result:?}");
        // hop 0 was answered, hop 1 was never sent
        assert_eq!(transport.inner.attempts(), 1);
    }

    #[test]
    fn cancelled_exchange_is_not_retried() {
        let server = TestServer::new("a", 1).server();
        let transport = CancelledInFlight::default();

        let result = ChainBuilder::new(&transport).build(&artifact(), &[server]);

        assert!(matches!(result, Err(ChainError::Cancelled)), "{result:?}");
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsupported_addresses_are_skipped() {
        let addresses = vec![
            Address::new(Protocol::Tcp, "tcp.test:2002").unwrap(),
            Address::udp("udp.test:2002").unwrap(),
        ];
        let server = Server::new("mixed", TestServer::new("x", 1).public_key(), addresses)
            .unwrap();
        let transport = TimeoutTransport::udp_only();

        let _ = ChainBuilder::new(&transport).build(&artifact(), &[server]);

        assert_eq!(
            transport.addresses(),
            ["udp.test:2002", "udp.test:2002", "udp.test:2002"]
        );
    }

    #[test]
    fn server_without_usable_address_is_never_attempted() {
        let addresses = vec![Address::new(Protocol::Tcp, "127.0.0.1:2002").unwrap()];
        let server = Server::new("tcp-only", TestServer::new("x", 1).public_key(), addresses)
            .unwrap();

        let result = ChainBuilder::new(UdpTransport::new()).build(&artifact(), &[server]);

        match result {
            Err(ChainError::Transport {
                attempts: 0,
                source: TransportError::UnsupportedProtocol(Protocol::Tcp, _),
                ..
            }) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unusable_timeout_is_not_retried() {
        let server = TestServer::new("a", 1).server();
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = ChainBuilder::new(UdpTransport::new())
            .retry_policy(policy)
            .build(&artifact(), &[server]);

        match result {
            Err(ChainError::Transport {
                attempts: 1,
                source: TransportError::InvalidTimeout(_),
                ..
            }) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_server_list() {
        let transport = TimeoutTransport::default();
        assert!(matches!(
            ChainBuilder::new(&transport).build(&artifact(), &[]),
            Err(ChainError::NoServers)
        ));
    }

    #[test]
    fn retry_policy_floor() {
        assert_eq!(RetryPolicy::new(0, Duration::from_secs(1)).attempts, 1);
        assert_eq!(RetryPolicy::default().attempts, 3);
        assert_eq!(RetryPolicy::default().timeout, Duration::from_secs(2));
    }
}
