//!
//! Chained Roughtime time attestation.
//!
//! An artifact's SHA-512 is sent as the nonce to a first Roughtime server. Each following
//! server signs the hash of the previous server's reply. The resulting [`Chain`] proves the
//! artifact existed before every attested time and that the attestations happened in order.
//!
//! * [`ServerDirectory`] lists the trusted servers and their long-term keys
//! * [`ChainBuilder`] queries servers to produce a chain
//! * [`ChainVerifier`] checks a persisted chain offline and yields a [`VerificationReport`]
//! * [`codec`] reads and writes chains as JSON
//!

// The notary crate uses only safe Rust.
#![forbid(unsafe_code)]

pub mod args;
pub mod builder;
pub mod chain;
pub mod codec;
pub mod directory;
pub mod report;
pub mod transport;
pub mod validation;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{ChainBuilder, ChainError, RetryPolicy};
pub use chain::{Chain, Link};
pub use codec::CodecError;
pub use directory::{DirectoryError, Server, ServerDirectory};
pub use report::{LinkOutcome, VerificationReport};
pub use transport::{Transport, TransportError, UdpTransport};
pub use validation::{LinkVerification, ResponseValidator, ValidationError};
pub use verifier::{ChainVerifier, FailureReason, VerificationError};
