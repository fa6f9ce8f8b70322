#![no_main]

use libfuzzer_sys::fuzz_target;
use notary_protocol::response::Response;
use notary_protocol::wire::{FromWire, ToWire};

fuzz_target!(|data: &[u8]| {
    // Parsing is strict, so an accepted response has exactly one encoding
    if let Ok(response) = Response::from_bytes(data) {
        assert!(data.len() >= Response::MINIMUM_SIZE);
        assert_eq!(response.wire_size(), data.len());
        assert_eq!(response.as_bytes().unwrap(), data);
    }
});
