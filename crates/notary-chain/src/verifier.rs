//! Offline verification of a persisted chain.
//!
//! Verification is all-or-nothing. The first failing link ends verification with an error
//! naming that link. Later links are not examined.

use notary_common::crypto::chained_nonce;
use notary_protocol::tags::Nonce;
use tracing::debug;

use crate::chain::Chain;
use crate::directory::ServerDirectory;
use crate::report::{LinkOutcome, VerificationReport};
use crate::validation::{ResponseValidator, ValidationError};

/// Why a link failed
#[derive(thiserror::Error, Debug)]
pub enum FailureReason {
    #[error("first link does not attest to the expected nonce")]
    NonceMismatch,

    #[error("nonce is not the hash of the previous link's reply")]
    ChainBroken,

    #[error("server is not in the directory")]
    UnknownServer,

    #[error(transparent)]
    Response(#[from] ValidationError),

    #[error(
        "latest possible time {upper_bound} precedes earliest possible time {lower_bound} of an earlier link"
    )]
    TimeOrderingViolation { upper_bound: u64, lower_bound: u64 },
}

/// The first link that failed, and why.
#[derive(thiserror::Error, Debug)]
#[error("link {link_index} ('{server}') failed verification: {reason}")]
pub struct VerificationError {
    pub link_index: usize,
    pub server: String,
    #[source]
    pub reason: FailureReason,
}

/// Verifies chains against a fixed directory of trusted servers.
pub struct ChainVerifier<'a> {
    directory: &'a ServerDirectory,
}

impl<'a> ChainVerifier<'a> {
    pub fn new(directory: &'a ServerDirectory) -> Self {
        Self { directory }
    }

    /// Verify that `chain` is anchored to `expected_nonce`, that every link is correctly bound
    /// to its predecessor and validly signed by a directory server, and that the attested
    /// intervals never go backwards in time.
    ///
    /// Each link is checked in this order: nonce binding, directory lookup, reply validation,
    /// then time ordering.
    pub fn verify(
        &self,
        chain: &Chain,
        expected_nonce: &Nonce,
    ) -> Result<VerificationReport, VerificationError> {
        let mut outcomes = Vec::with_capacity(chain.len());
        let mut earliest = 0u64;
        let mut prior_reply: Option<&[u8]> = None;

        for (link_index, link) in chain.links().iter().enumerate() {
            let fail = |reason: FailureReason| VerificationError {
                link_index,
                server: link.server_name().to_string(),
                reason,
            };

            match prior_reply {
                None if link.nonce() != expected_nonce => {
                    return Err(fail(FailureReason::NonceMismatch));
                }
                Some(reply) if *link.nonce() != chained_nonce(reply) => {
                    return Err(fail(FailureReason::ChainBroken));
                }
                _ => (),
            }

            let server = self
                .directory
                .lookup(link.server_name())
                .map_err(|_| fail(FailureReason::UnknownServer))?;

            let verified = ResponseValidator::for_server(server)
                .validate(link.reply(), link.nonce())
                .map_err(|e| fail(e.into()))?;

            if verified.upper_bound() < earliest {
                return Err(fail(FailureReason::TimeOrderingViolation {
                    upper_bound: verified.upper_bound(),
                    lower_bound: earliest,
                }));
            }
            earliest = earliest.max(verified.lower_bound());

            debug!(
                "link {} ('{}') verified: midpoint {} radius {}",
                link_index,
                link.server_name(),
                verified.midpoint,
                verified.radius
            );

            outcomes.push(LinkOutcome::new(link.server_name(), &verified));
            prior_reply = Some(link.reply());
        }

        Ok(VerificationReport::new(*expected_nonce, outcomes))
    }
}
