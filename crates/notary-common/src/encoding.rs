//! Encoding and decoding utilities for keys, nonces and other data

use std::io::Write;

use data_encoding::{
    BASE64, BASE64_NOPAD, BASE64URL, BASE64URL_NOPAD, DecodeError, DecodeKind,
    HEXLOWER_PERMISSIVE,
};
use notary_protocol::tags::{Nonce, PublicKey};

/// Decode a public key from hex or base64, trying each encoding until one succeeds.
pub fn try_decode_key(encoded_key: &str) -> Result<PublicKey, DecodeError> {
    let key = try_decode(encoded_key)?;

    PublicKey::try_from(key.as_slice()).map_err(|_| DecodeError {
        position: key.len(),
        kind: DecodeKind::Length,
    })
}

/// Attempt to decode `encoded_value` into a `Vec<u8>` using multiple encoding formats until
/// one succeeds.
pub fn try_decode(encoded_value: &str) -> Result<Vec<u8>, DecodeError> {
    let value = HEXLOWER_PERMISSIVE
        .decode(encoded_value.as_bytes())
        .or_else(|_| BASE64.decode(encoded_value.as_bytes()))
        .or_else(|_| BASE64_NOPAD.decode(encoded_value.as_bytes()))
        .or_else(|_| BASE64URL.decode(encoded_value.as_bytes()))
        .or_else(|_| BASE64URL_NOPAD.decode(encoded_value.as_bytes()))?;

    Ok(value)
}

/// Parse a precomputed expected nonce. Only hex is accepted and the input must be exactly
/// 128 characters (64 bytes).
pub fn nonce_from_hex(hex: &str) -> Result<Nonce, DecodeError> {
    let hex = hex.trim();
    if hex.len() != Nonce::SIZE * 2 {
        return Err(DecodeError {
            position: hex.len(),
            kind: DecodeKind::Length,
        });
    }

    let bytes = HEXLOWER_PERMISSIVE.decode(hex.as_bytes())?;
    Nonce::try_from(bytes.as_slice()).map_err(|_| DecodeError {
        position: bytes.len(),
        kind: DecodeKind::Length,
    })
}

/// Write a hex dump of the provided data to the writer.
///
/// The output format is similar to traditional hex dump tools:
/// - 8-digit hex offset
/// - 16 bytes per line in hex (grouped by 2 bytes)
/// - ASCII representation on the right
pub fn hexdump<W: Write>(data: &[u8], writer: &mut W) -> std::io::Result<()> {
    const BYTES_PER_LINE: usize = 16;

    for (offset, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        write!(writer, "{:08x}: ", offset * BYTES_PER_LINE)?;

        for (i, byte) in chunk.iter().enumerate() {
            write!(writer, "{byte:02x}")?;
            if i % 2 == 1 {
                write!(writer, " ")?;
            }
        }

        let padding = BYTES_PER_LINE - chunk.len();
        for i in 0..padding {
            write!(writer, "  ")?;
            if (chunk.len() + i) % 2 == 1 {
                write!(writer, " ")?;
            }
        }

        write!(writer, " |")?;
        for byte in chunk {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            write!(writer, "{ch}")?;
        }
        writeln!(writer, "|")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_key_hex() {
        let key_hex = "0101010101010101010101010101010101010101010101010101010101010101";
        let result = try_decode_key(key_hex).unwrap();
        assert_eq!(result.as_ref(), &[0x01u8; 32]);

        let key_hex = "0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A0A";
        let result = try_decode_key(key_hex).unwrap();
        assert_eq!(result.as_ref(), &[0x0au8; 32]);
    }

    #[test]
    fn decode_key_base64() {
        let result = try_decode_key("QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI=").unwrap();
        assert_eq!(result.as_ref(), &[0x42u8; 32]);

        let result = try_decode_key("QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI").unwrap();
        assert_eq!(result.as_ref(), &[0x42u8; 32]);
    }

    #[test]
    fn decode_key_wrong_length() {
        let result = try_decode_key("0101010101010101");
        assert!(matches!(
            result,
            Err(DecodeError {
                position: 8,
                kind: DecodeKind::Length
            })
        ));
    }

    #[test]
    fn decode_key_invalid_encoding() {
        assert!(try_decode_key("not-a-valid-key-encoding!!!").is_err());
    }

    #[test]
    fn nonce_from_hex_requires_128_chars() {
        let hex = "ab".repeat(64);
        assert_eq!(nonce_from_hex(&hex).unwrap(), Nonce::from([0xab; 64]));

        assert!(nonce_from_hex(&"ab".repeat(32)).is_err());
        assert!(nonce_from_hex(&"ab".repeat(65)).is_err());
        assert!(nonce_from_hex(&"zz".repeat(64)).is_err());
    }

    #[test]
    fn hexdump_format() {
        let data = b"Hello, World! This is a test.";
        let mut output = Vec::new();

        hexdump(data, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();

        assert!(result.contains("00000000:"));
        assert!(result.contains("4865 6c6c"));
        assert!(result.contains("|Hello, World! Th|"));
        assert!(result.contains("|is is a test.|"));
    }
}
