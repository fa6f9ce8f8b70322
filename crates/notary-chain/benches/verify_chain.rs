use divan::Bencher;
use notary_chain::test_utils::{FixtureTransport, TestServer, test_directory};
use notary_chain::{ChainBuilder, ChainVerifier, ResponseValidator, codec};
use notary_common::crypto::sha512;

fn main() {
    divan::main();
}

fn servers(count: usize) -> Vec<TestServer> {
    (0..count)
        .map(|i| {
            TestServer::new(&format!("server-{i}"), i as u8 + 1)
                .midpoint(1_700_000_000_000_000 + i as u64 * 1_000)
                .batch_size(16)
        })
        .collect()
}

#[divan::bench(min_time = 0.250)]
fn validate_reply(bencher: Bencher) {
    let server = TestServer::new("bench", 7).batch_size(64);
    let nonce = sha512(b"artifact");
    let reply = server.respond_to(&nonce);
    let validator = ResponseValidator::new(&server.public_key());

    bencher.bench(|| divan::black_box(validator.validate(&reply, &nonce).is_ok()));
}

#[divan::bench(args = [1, 3, 8], min_time = 0.250)]
fn verify(bencher: Bencher, links: usize) {
    let servers = servers(links);
    let transport = FixtureTransport::new(&servers);
    let entries: Vec<_> = servers.iter().map(TestServer::server).collect();
    let nonce = sha512(b"artifact");

    let chain = ChainBuilder::new(&transport)
        .build(&nonce, &entries)
        .unwrap();
    let directory = test_directory(&servers);
    let verifier = ChainVerifier::new(&directory);

    bencher.bench(|| divan::black_box(verifier.verify(&chain, &nonce).is_ok()));
}

#[divan::bench(args = [1, 8], min_time = 0.250)]
fn decode(bencher: Bencher, links: usize) {
    let servers = servers(links);
    let transport = FixtureTransport::new(&servers);
    let entries: Vec<_> = servers.iter().map(TestServer::server).collect();

    let chain = ChainBuilder::new(&transport)
        .build(&sha512(b"artifact"), &entries)
        .unwrap();
    let encoded = codec::encode(&chain).unwrap();

    bencher.bench(|| divan::black_box(codec::decode(&encoded).is_ok()));
}
