//! Functionality shared by the notary crates: nonce derivation, artifact hashing and
//! encoding helpers.

#![forbid(unsafe_code)]

pub mod crypto;
pub mod encoding;
