//! JSON persistence for chains.
//!
//! ```json
//! {"links": [{"serverName": "...", "nonceOrBlind": "<base64>", "reply": "<base64>"}]}
//! ```
//!
//! Binary fields use standard padded base64. Decoding is strict: unknown fields, a nonce that
//! is not 64 bytes, an empty reply or an empty link list are all errors.

use std::io::{Read, Write};

use data_encoding::BASE64;
use notary_protocol::tags::Nonce;
use serde::{Deserialize, Serialize};

use crate::chain::{Chain, Link};

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("link {link_index}: field '{field}' is not valid base64: {source}")]
    Base64 {
        link_index: usize,
        field: &'static str,
        source: data_encoding::DecodeError,
    },

    #[error("link {link_index}: nonce must be {} bytes, found {len}", Nonce::SIZE)]
    NonceLength { link_index: usize, len: usize },

    #[error("link {link_index}: reply is empty")]
    EmptyReply { link_index: usize },

    #[error("link {link_index}: server name is empty")]
    EmptyServerName { link_index: usize },

    #[error("chain has no links")]
    EmptyChain,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChainDocument {
    links: Vec<LinkRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct LinkRecord {
    server_name: String,
    nonce_or_blind: String,
    reply: String,
}

impl From<&Link> for LinkRecord {
    fn from(link: &Link) -> Self {
        LinkRecord {
            server_name: link.server_name().to_string(),
            nonce_or_blind: BASE64.encode(link.nonce().as_ref()),
            reply: BASE64.encode(link.reply()),
        }
    }
}

impl LinkRecord {
    fn into_link(self, link_index: usize) -> Result<Link, CodecError> {
        if self.server_name.is_empty() {
            return Err(CodecError::EmptyServerName { link_index });
        }

        let nonce = BASE64
            .decode(self.nonce_or_blind.as_bytes())
            .map_err(|source| CodecError::Base64 {
                link_index,
                field: "nonceOrBlind",
                source,
            })?;

        let nonce = Nonce::try_from(nonce.as_slice()).map_err(|_| CodecError::NonceLength {
            link_index,
            len: nonce.len(),
        })?;

        let reply = BASE64
            .decode(self.reply.as_bytes())
            .map_err(|source| CodecError::Base64 {
                link_index,
                field: "reply",
                source,
            })?;

        if reply.is_empty() {
            return Err(CodecError::EmptyReply { link_index });
        }

        Ok(Link::new(&self.server_name, nonce, reply))
    }
}

/// Serialize `chain` to its JSON document.
pub fn encode(chain: &Chain) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    encode_to(chain, &mut out)?;
    Ok(out)
}

pub fn encode_to<W: Write>(chain: &Chain, writer: W) -> Result<(), CodecError> {
    let document = ChainDocument {
        links: chain.links().iter().map(LinkRecord::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Parse a chain document. Reply bytes are carried through untouched; whether they are
/// well-formed replies is decided at verification.
pub fn decode(bytes: &[u8]) -> Result<Chain, CodecError> {
    let document: ChainDocument = serde_json::from_slice(bytes)?;
    from_document(document)
}

pub fn decode_from<R: Read>(reader: R) -> Result<Chain, CodecError> {
    let document: ChainDocument = serde_json::from_reader(reader)?;
    from_document(document)
}

fn from_document(document: ChainDocument) -> Result<Chain, CodecError> {
    let links = document
        .links
        .into_iter()
        .enumerate()
        .map(|(idx, record)| record.into_link(idx))
        .collect::<Result<Vec<_>, _>>()?;

    Chain::new(links).ok_or(CodecError::EmptyChain)
}
