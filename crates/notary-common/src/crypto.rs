//! Hashing used to bind chain links together and to an artifact

use std::io::{self, Read};

use aws_lc_rs::digest::{Context, SHA512, digest};
use notary_protocol::tags::Nonce;

/// The nonce for the hop that follows a link whose reply was `prior_reply`.
///
/// Returns the full `SHA512(prior_reply)`. No other input participates, so a verifier holding
/// only the persisted reply derives the same value.
pub fn chained_nonce(prior_reply: &[u8]) -> Nonce {
    let digest = digest(&SHA512, prior_reply);
    Nonce::from(to_array(digest.as_ref()))
}

/// SHA-512 of everything `reader` produces, as a nonce. Input is hashed in fixed-size blocks
/// so arbitrarily large artifacts never sit in memory.
pub fn sha512_reader<R: Read>(mut reader: R) -> io::Result<Nonce> {
    let mut ctx = Context::new(&SHA512);
    let mut buf = [0u8; 16 * 1024];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        ctx.update(&buf[..n]);
    }

    Ok(Nonce::from(to_array(ctx.finish().as_ref())))
}

/// SHA-512 of an in-memory value, as a nonce.
pub fn sha512(data: &[u8]) -> Nonce {
    Nonce::from(to_array(digest(&SHA512, data).as_ref()))
}

fn to_array(digest: &[u8]) -> [u8; Nonce::SIZE] {
    let mut out = [0u8; Nonce::SIZE];
    out.copy_from_slice(digest);
    out
}
