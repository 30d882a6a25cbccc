//! Hex string helpers shared by the CLI and the report tooling.

use thiserror::Error;

/// Errors from hex string parsing
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex digit '{digit}' at position {position}")]
    InvalidDigit { digit: char, position: usize },
}

/// Render bytes as an uppercase, space-separated hex string ("AB CD 00").
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a hex string into bytes.
///
/// Case-insensitive. Whitespace and `0x` prefixes are ignored wherever they
/// appear, and an odd digit count gains an implied leading zero.
pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>, HexError> {
    let cleaned = input.to_lowercase().replace("0x", "");
    let digits: Vec<(usize, char)> = cleaned
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .collect();

    let mut nibbles = Vec::with_capacity(digits.len() + 1);
    if digits.len() % 2 != 0 {
        nibbles.push((0, '0'));
    }
    nibbles.extend(digits);

    let mut bytes = Vec::with_capacity(nibbles.len() / 2);
    let mut high = 0u8;
    for (index, (position, digit)) in nibbles.into_iter().enumerate() {
        let value = digit
            .to_digit(16)
            .ok_or(HexError::InvalidDigit { digit, position })? as u8;
        if index % 2 == 0 {
            high = value << 4;
        } else {
            bytes.push(high | value);
        }
    }
    Ok(bytes)
}

/// Interpret a hex string as a u32: the parsed bytes are zero-padded to four
/// and read little-endian ("12 34" is 0x3412).
pub fn hex_to_u32(input: &str) -> Result<u32, HexError> {
    let mut bytes = hex_to_bytes(input)?;
    if bytes.len() < 4 {
        bytes.resize(4, 0);
    }
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Render a u32 as the hex string of its little-endian bytes.
pub fn u32_to_hex(value: u32) -> String {
    bytes_to_hex(&value.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_to_hex() {
        assert_eq!(bytes_to_hex(&[0]), "00");
        assert_eq!(bytes_to_hex(&[1]), "01");
        assert_eq!(bytes_to_hex(&[0xAB]), "AB");
        assert_eq!(bytes_to_hex(&[0xFF]), "FF");
    }

    #[test]
    fn bytes_to_hex_spacing() {
        assert_eq!(bytes_to_hex(&[0, 0, 0]), "00 00 00");
        assert_eq!(bytes_to_hex(&[1, 2, 0xA, 0xB]), "01 02 0A 0B");
        assert_eq!(bytes_to_hex(&[0xAB, 0xCD, 0, 1, 0xFF]), "AB CD 00 01 FF");
        assert_eq!(bytes_to_hex(&[0xFF, 0xFF]), "FF FF");
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn hex_to_bytes_basic() {
        assert_eq!(hex_to_bytes("AB CD").unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(hex_to_bytes("abcd").unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(hex_to_bytes("0xAB 0xCD").unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn hex_to_bytes_odd_length_gets_leading_zero() {
        assert_eq!(hex_to_bytes("abc").unwrap(), vec![0x0A, 0xBC]);
        assert_eq!(hex_to_bytes("1").unwrap(), vec![0x01]);
    }

    #[test]
    fn hex_to_bytes_rejects_invalid_digits() {
        assert!(matches!(
            hex_to_bytes("zz"),
            Err(HexError::InvalidDigit { digit: 'z', .. })
        ));
        assert!(hex_to_bytes("12 3g").is_err());
    }

    #[test]
    fn hex_to_u32_is_little_endian() {
        assert_eq!(hex_to_u32("01").unwrap(), 1);
        assert_eq!(hex_to_u32("12 34").unwrap(), 0x3412);
        assert_eq!(hex_to_u32("0x59").unwrap(), 0x59);
        assert_eq!(hex_to_u32("").unwrap(), 0);
    }

    #[test]
    fn u32_to_hex_renders_le_bytes() {
        assert_eq!(u32_to_hex(1), "01 00 00 00");
        assert_eq!(u32_to_hex(0x3412), "12 34 00 00");
    }

    #[test]
    fn hex_round_trip() {
        let bytes = vec![0x00, 0x7F, 0x80, 0xFF, 0x05];
        assert_eq!(hex_to_bytes(&bytes_to_hex(&bytes)).unwrap(), bytes);
    }
}
