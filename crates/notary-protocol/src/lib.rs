//! Roughtime message structures used by the notary: requests carrying a 64-byte nonce and the
//! signed responses that bind that nonce to a server's timestamp.

// The protocol crate uses only safe Rust.
#![forbid(unsafe_code)]

pub mod cursor;
pub mod error;
pub mod header;
pub mod request;
pub mod response;
pub mod tag;
pub mod tags;
pub mod util;
pub mod wire;

// Re-export commonly used types
pub use wire::{FromWire, FromWireN, ToWire};
