#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use notary_protocol::request::{REQUEST_SIZE, Request};
use notary_protocol::tags::Nonce;
use notary_protocol::wire::{FromWire, ToWire};

#[derive(Arbitrary)]
struct FuzzRequestData {
    nonce: [u8; 64],
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    if let Ok(fuzz_data) = FuzzRequestData::arbitrary(&mut u) {
        let request = Request::new(&Nonce::from(fuzz_data.nonce));
        let bytes = request.as_bytes().unwrap();
        assert_eq!(bytes.len(), REQUEST_SIZE);

        let parsed = Request::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, request);
    }

    // padding content is not significant, but the header and nonce must survive re-encoding
    if let Ok(request) = Request::from_bytes(data) {
        let encoded = request.as_bytes().unwrap();
        assert_eq!(encoded[..80], data[..80]);
    }
});
