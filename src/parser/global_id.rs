//! IFC `GlobalId` decoding.
//!
//! IFC stores a 128-bit GUID as 22 characters of a custom base64 alphabet.
//! The first character carries the top 2 bits, the remaining 21 carry 6 bits
//! each.

use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

fn digit(c: u8) -> Option<u128> {
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u128)
}

/// Decodes a compressed IFC GlobalId into a UUID.
#[must_use]
pub fn decode_global_id(global_id: &str) -> Option<Uuid> {
    let bytes = global_id.trim().as_bytes();
    if bytes.len() != 22 {
        return None;
    }

    let first = digit(bytes[0])?;
    if first > 3 {
        return None;
    }

    let mut value = first;
    for &c in &bytes[1..] {
        value = (value << 6) | digit(c)?;
    }
    Some(Uuid::from_u128(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_global_id() {
        assert_eq!(decode_global_id("0000000000000000000000"), Some(Uuid::nil()));
    }

    #[test]
    fn test_max_global_id() {
        assert_eq!(decode_global_id("3$$$$$$$$$$$$$$$$$$$$$"), Some(Uuid::from_u128(u128::MAX)));
    }

    #[test]
    fn test_known_value() {
        // 0x...01 ends in the second alphabet entry.
        let decoded = decode_global_id("0000000000000000000001").unwrap();
        assert_eq!(decoded.as_u128(), 1);

        let decoded = decode_global_id("0000000000000000000010").unwrap();
        assert_eq!(decoded.as_u128(), 64);
    }

    #[test]
    fn test_invalid_global_ids() {
        assert_eq!(decode_global_id("short"), None);
        assert_eq!(decode_global_id("4000000000000000000000"), None);
        assert_eq!(decode_global_id("000000000000000000000!"), None);
    }
}
