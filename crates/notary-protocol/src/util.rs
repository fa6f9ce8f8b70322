use std::fmt::Write as _;

pub fn as_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(2 * data.len());

    for &byte in data {
        // writing to a String cannot fail
        let _ = write!(&mut out, "{byte:02x}");
    }

    out
}
