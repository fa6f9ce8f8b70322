//! Validate a single server reply against the nonce it must attest to.
//!
//! A valid reply does not prove the server's clock was right, only that the holder of the
//! server's long-term key signed a time interval `(MIDP - RADI, MIDP + RADI)` after seeing the
//! nonce.

use aws_lc_rs::signature;
use aws_lc_rs::signature::UnparsedPublicKey;
use data_encoding::HEXLOWER;
use notary_merkle::root_from_paths;
use notary_protocol::FromWire;
use notary_protocol::response::Response;
use notary_protocol::tags::{MerkleRoot, Nonce, PublicKey};

use crate::directory::Server;

/// Reasons a reply fails validation
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] notary_protocol::error::Error),

    #[error("delegation certificate signature is invalid")]
    CertificateSignatureInvalid,

    #[error("midpoint {midpoint} is after the delegation expires at {max_time}")]
    CertificateExpired { midpoint: u64, max_time: u64 },

    #[error("midpoint {midpoint} is before the delegation begins at {min_time}")]
    MidpointOutOfDelegationWindow { midpoint: u64, min_time: u64 },

    #[error("signature over SREP is invalid")]
    SignatureInvalid,

    #[error("nonce is not included in the signed Merkle root: {0}")]
    InclusionProofInvalid(String),
}

/// The values a validated reply vouches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkVerification {
    /// Microseconds since the Unix epoch
    pub midpoint: u64,
    /// Microseconds
    pub radius: u32,
    pub root: MerkleRoot,
    pub delegated_key: PublicKey,
    pub min_time: u64,
    pub max_time: u64,
}

impl LinkVerification {
    pub fn lower_bound(&self) -> u64 {
        self.midpoint.saturating_sub(self.radius as u64)
    }

    pub fn upper_bound(&self) -> u64 {
        self.midpoint.saturating_add(self.radius as u64)
    }
}

/// Checks replies from one server, identified by its long-term public key.
#[derive(Debug)]
pub struct ResponseValidator {
    long_term_key: UnparsedPublicKey<[u8; 32]>,
}

impl ResponseValidator {
    pub fn new(long_term_key: &PublicKey) -> Self {
        let mut key_bytes = [0u8; PublicKey::SIZE];
        key_bytes.copy_from_slice(long_term_key.as_ref());

        Self {
            long_term_key: UnparsedPublicKey::new(&signature::ED25519, key_bytes),
        }
    }

    pub fn for_server(server: &Server) -> Self {
        Self::new(server.public_key())
    }

    /// Validate the raw reply bytes `raw`, which must attest to `nonce`.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// 1. the reply parses strictly
    /// 2. CERT is signed by the long-term key
    /// 3. MIDP lies within the delegation's `[MINT, MAXT]`
    /// 4. SREP is signed by the delegated key
    /// 5. PATH and INDX prove `nonce` is a leaf under ROOT
    pub fn validate(
        &self,
        raw: &[u8],
        nonce: &Nonce,
    ) -> Result<LinkVerification, ValidationError> {
        let response = Response::from_bytes(raw)?;

        self.check_dele_signature(&response)?;
        self.check_midpoint(&response)?;
        self.check_srep_signature(&response)?;
        self.check_merkle_proof(&response, nonce)?;

        let srep = response.srep();
        let dele = response.cert().dele();

        Ok(LinkVerification {
            midpoint: srep.midp(),
            radius: srep.radi(),
            root: *srep.root(),
            delegated_key: *dele.pubk(),
            min_time: dele.mint(),
            max_time: dele.maxt(),
        })
    }

    fn check_dele_signature(&self, response: &Response) -> Result<(), ValidationError> {
        let cert = response.cert();
        let signed = cert.signed_bytes()?;

        self.long_term_key
            .verify(&signed, cert.sig().as_ref())
            .map_err(|_| ValidationError::CertificateSignatureInvalid)
    }

    fn check_midpoint(&self, response: &Response) -> Result<(), ValidationError> {
        let midpoint = response.srep().midp();
        let dele = response.cert().dele();

        if midpoint > dele.maxt() {
            return Err(ValidationError::CertificateExpired {
                midpoint,
                max_time: dele.maxt(),
            });
        }

        if midpoint < dele.mint() {
            return Err(ValidationError::MidpointOutOfDelegationWindow {
                midpoint,
                min_time: dele.mint(),
            });
        }

        Ok(())
    }

    fn check_srep_signature(&self, response: &Response) -> Result<(), ValidationError> {
        let signed = response.srep().signed_bytes()?;
        let delegated_key = response.cert().dele().pubk();
        let pubk = UnparsedPublicKey::new(&signature::ED25519, delegated_key.as_ref());

        pubk.verify(&signed, response.sig().as_ref())
            .map_err(|_| ValidationError::SignatureInvalid)
    }

    fn check_merkle_proof(
        &self,
        response: &Response,
        nonce: &Nonce,
    ) -> Result<(), ValidationError> {
        let path = response.path();
        let index = response.indx();

        // INDX bits above the proof depth are never consumed by the proof, so they must be zero
        // or two distinct replies would verify identically.
        let depth = path.depth() as u32;
        if index.checked_shr(depth).unwrap_or(0) != 0 {
            return Err(ValidationError::InclusionProofInvalid(format!(
                "INDX {index} does not fit a path of depth {depth}"
            )));
        }

        let computed = root_from_paths(index, nonce.as_ref(), path);
        let root = response.srep().root().as_ref();

        if computed != *root {
            return Err(ValidationError::InclusionProofInvalid(format!(
                "computed {} != ROOT {}",
                HEXLOWER.encode(&computed),
                HEXLOWER.encode(root)
            )));
        }

        Ok(())
    }
}
