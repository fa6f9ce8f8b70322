use std::fmt;

use notary_protocol::tags::Nonce;

/// One hop of a chain: the nonce sent to a server and the exact bytes it replied with.
#[derive(Clone, PartialEq, Eq)]
pub struct Link {
    server_name: String,
    nonce: Nonce,
    reply: Vec<u8>,
}

impl Link {
    pub fn new(server_name: &str, nonce: Nonce, reply: Vec<u8>) -> Self {
        Self {
            server_name: server_name.to_string(),
            nonce,
            reply,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The reply exactly as received. Never re-serialized, since the next link's nonce is
    /// derived from these bytes.
    pub fn reply(&self) -> &[u8] {
        &self.reply
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("server_name", &self.server_name)
            .field("nonce", &self.nonce)
            .field("reply_len", &self.reply.len())
            .finish()
    }
}

/// An ordered, non-empty sequence of links. Link 0 attests to the artifact's nonce and every
/// later link attests to the reply before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    /// Returns `None` if `links` is empty.
    pub fn new(links: Vec<Link>) -> Option<Self> {
        if links.is_empty() {
            None
        } else {
            Some(Self { links })
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn into_links(self) -> Vec<Link> {
        self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if the chain has no links
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The nonce the first link was issued for.
    pub fn initial_nonce(&self) -> &Nonce {
        self.links[0].nonce()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_is_unrepresentable() {
        assert!(Chain::new(Vec::new()).is_none());
    }

    #[test]
    fn initial_nonce_is_first_link() {
        let first = Nonce::from([1u8; 64]);
        let second = Nonce::from([2u8; 64]);
        let chain = Chain::new(vec![
            Link::new("a", first, vec![0xaa]),
            Link::new("b", second, vec![0xbb]),
        ])
        .unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.initial_nonce(), &first);
        assert_eq!(chain.links()[1].server_name(), "b");
    }

    #[test]
    fn debug_omits_reply_bytes() {
        let link = Link::new("a", Nonce::default(), vec![0x42; 512]);
        let debug = format!("{link:?}");
        assert!(debug.contains("reply_len: 512"), "{debug}");
    }
}
