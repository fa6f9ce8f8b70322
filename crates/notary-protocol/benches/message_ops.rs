use divan::counter::BytesCount;
use divan::{AllocProfiler, Bencher, black_box_drop};
use notary_protocol::request::Request;
use notary_protocol::response::Response;
use notary_protocol::tags::{
    Certificate, Delegation, MerklePath, Nonce, PublicKey, SignedResponse,
};
use notary_protocol::{FromWire, ToWire};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn response_bytes(depth: usize) -> Vec<u8> {
    let mut path = MerklePath::default();
    for _ in 0..depth {
        path.push_element(&[0x0f; 64]).unwrap();
    }
    let srep = SignedResponse::new(1_000_000, 1_700_000_000_000_000, [0x21; 64].into());
    let cert = Certificate::new(
        [0x43; 64].into(),
        Delegation::new(PublicKey::from([0x32; 32]), 0, u64::MAX),
    );
    Response::new([0x54; 64].into(), path, srep, cert, 0)
        .as_bytes()
        .unwrap()
}

mod request {
    use super::*;

    #[divan::bench(min_time = 0.250)]
    fn create(bencher: Bencher) {
        let nonce = Nonce::from([42u8; 64]);

        bencher.bench_local(|| black_box_drop(divan::black_box(Request::new(&nonce)).as_bytes()));
    }
}

mod response {
    use super::*;

    #[divan::bench(args = [0, 8, 32], min_time = 0.250)]
    fn parse(bencher: Bencher, depth: usize) {
        let raw = response_bytes(depth);

        bencher
            .counter(BytesCount::new(raw.len()))
            .bench_local(|| black_box_drop(Response::from_bytes(divan::black_box(&raw))));
    }
}
