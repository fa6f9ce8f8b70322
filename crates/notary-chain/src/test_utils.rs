//!
//! Deterministic signing servers and stub transports, so chains can be built and verified
//! without a network.
//!

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aws_lc_rs::signature::{Ed25519KeyPair, KeyPair};
use notary_merkle::MerkleTree;
use notary_protocol::error::Error;
use notary_protocol::request::Request;
use notary_protocol::response::Response;
use notary_protocol::tags::{
    Certificate, Delegation, MerkleRoot, Nonce, PublicKey, Signature, SignedResponse,
};
use notary_protocol::{FromWire, ToWire};

use crate::directory::{Address, Protocol, Server, ServerDirectory};
use crate::transport::{Transport, TransportError};

/// 2023-11-14T22:13:20Z
pub const DEFAULT_MIDPOINT: u64 = 1_700_000_000_000_000;

/// One second
pub const DEFAULT_RADIUS: u32 = 1_000_000;

/// A Roughtime server with fixed keys and a fixed clock. The same inputs always produce
/// byte-identical replies.
#[derive(Debug, Clone)]
pub struct TestServer {
    name: String,
    address: String,
    long_term_seed: [u8; 32],
    online_seed: [u8; 32],
    midpoint: u64,
    radius: u32,
    min_time: u64,
    max_time: u64,
    batch_size: usize,
}

impl TestServer {
    /// Keys are derived from `seed`, so two servers built with the same seed share keys.
    pub fn new(name: &str, seed: u8) -> Self {
        Self {
            name: name.to_string(),
            address: format!("{}.test:2002", name.to_lowercase().replace(' ', "-")),
            long_term_seed: [seed; 32],
            online_seed: [seed ^ 0xa5; 32],
            midpoint: DEFAULT_MIDPOINT,
            radius: DEFAULT_RADIUS,
            min_time: 0,
            max_time: u64::MAX,
            batch_size: 1,
        }
    }

    pub fn midpoint(mut self, midpoint: u64) -> Self {
        self.midpoint = midpoint;
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets MINT and MAXT of the delegation
    pub fn delegation_window(mut self, min_time: u64, max_time: u64) -> Self {
        self.min_time = min_time;
        self.max_time = max_time;
        self
    }

    /// Sign the request as the last leaf of a batch of `size` requests, so the reply carries a
    /// non-trivial PATH and INDX.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> PublicKey {
        public_key_of(&key_pair(&self.long_term_seed))
    }

    /// This server's directory entry
    pub fn server(&self) -> Server {
        let address = Address::udp(&self.address).expect("test address is host:port");
        Server::new(&self.name, self.public_key(), vec![address]).expect("valid test server")
    }

    /// Answer raw request bytes
    pub fn respond(&self, request: &[u8]) -> Result<Vec<u8>, Error> {
        let request = Request::from_bytes(request)?;
        self.sign_reply(request.nonc())
    }

    /// Answer a request for `nonce`
    pub fn respond_to(&self, nonce: &Nonce) -> Vec<u8> {
        self.sign_reply(nonce).expect("test reply serializes")
    }

    fn sign_reply(&self, nonce: &Nonce) -> Result<Vec<u8>, Error> {
        let mut tree = MerkleTree::new();
        for filler in 0..self.batch_size - 1 {
            tree.push_leaf(&[filler as u8; Nonce::SIZE]);
        }
        tree.push_leaf(nonce.as_ref());

        let root = tree.compute_root().expect("tree has at least one leaf");
        let index = self.batch_size - 1;
        let path = tree.get_paths(index)?;

        let online = key_pair(&self.online_seed);
        let srep = SignedResponse::new(self.radius, self.midpoint, MerkleRoot::from(root));
        let srep_sig = sign(&online, &srep.signed_bytes()?);

        let dele = Delegation::new(public_key_of(&online), self.min_time, self.max_time);
        let unsigned = Certificate::new(Signature::default(), dele.clone());
        let dele_sig = sign(&key_pair(&self.long_term_seed), &unsigned.signed_bytes()?);
        let cert = Certificate::new(dele_sig, dele);

        Response::new(srep_sig, path, srep, cert, index as u32).as_bytes()
    }
}

fn key_pair(seed: &[u8; 32]) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed_unchecked(seed).expect("32-byte seed is valid")
}

fn public_key_of(key_pair: &Ed25519KeyPair) -> PublicKey {
    PublicKey::try_from(key_pair.public_key().as_ref()).expect("ed25519 keys are 32 bytes")
}

fn sign(key_pair: &Ed25519KeyPair, msg: &[u8]) -> Signature {
    Signature::try_from(key_pair.sign(msg).as_ref()).expect("ed25519 signatures are 64 bytes")
}

/// A directory containing exactly `servers`
pub fn test_directory(servers: &[TestServer]) -> ServerDirectory {
    ServerDirectory::new(servers.iter().map(TestServer::server).collect())
        .expect("test server names are unique")
}

/// Routes each request to the [`TestServer`] registered at the request's address.
#[derive(Debug)]
pub struct FixtureTransport {
    servers: HashMap<String, TestServer>,
    drop_first: usize,
    attempts: AtomicUsize,
}

impl FixtureTransport {
    pub fn new(servers: &[TestServer]) -> Self {
        Self {
            servers: servers
                .iter()
                .map(|s| (s.address.clone(), s.clone()))
                .collect(),
            drop_first: 0,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Time out the first `n` exchanges before answering
    pub fn drop_first(mut self, n: usize) -> Self {
        self.drop_first = n;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for FixtureTransport {
    fn exchange(
        &self,
        address: &Address,
        request: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.drop_first {
            return Err(TransportError::Timeout(address.address().to_string()));
        }

        let server = self
            .servers
            .get(address.address())
            .ok_or_else(|| TransportError::Resolve(address.address().to_string()))?;

        server.respond(request).map_err(|e| {
            TransportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
        })
    }
}

/// Never answers. Records every address it was asked to reach.
#[derive(Debug, Default)]
pub struct TimeoutTransport {
    addresses: Mutex<Vec<String>>,
    udp_only: bool,
}

impl TimeoutTransport {
    /// Claims support for UDP addresses only
    pub fn udp_only() -> Self {
        Self {
            udp_only: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.addresses().len()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

impl Transport for TimeoutTransport {
    fn exchange(
        &self,
        address: &Address,
        _request: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        if let Ok(mut addresses) = self.addresses.lock() {
            addresses.push(address.address().to_string());
        }
        Err(TransportError::Timeout(address.address().to_string()))
    }

    fn supports(&self, protocol: Protocol) -> bool {
        !self.udp_only || protocol == Protocol::Udp
    }
}
