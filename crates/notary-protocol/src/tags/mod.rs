//! Values carried by Roughtime tags, including the nested CERT, DELE and SREP messages.

pub use cert::Certificate;
pub use dele::Delegation;
pub use fixed_tag::FixedTag;
pub use nonce::Nonce;
pub use path::MerklePath;
pub use pubk::PublicKey;
pub use root::MerkleRoot;
pub use sig::Signature;
pub use srep::SignedResponse;

mod cert;
mod dele;
mod fixed_tag;
mod nonce;
mod path;
mod pubk;
mod root;
mod sig;
mod srep;
