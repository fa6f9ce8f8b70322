#![no_main]

use libfuzzer_sys::fuzz_target;
use notary_chain::test_utils::{TestServer, test_directory};
use notary_chain::{ChainVerifier, codec};
use notary_protocol::tags::Nonce;

fuzz_target!(|data: &[u8]| {
    // Neither decoding nor verifying hostile input may panic
    if let Ok(chain) = codec::decode(data) {
        let directory = test_directory(&[TestServer::new("a", 1), TestServer::new("b", 2)]);
        let nonce = *chain.initial_nonce();
        let _ = ChainVerifier::new(&directory).verify(&chain, &nonce);
        let _ = ChainVerifier::new(&directory).verify(&chain, &Nonce::default());
    }
});
