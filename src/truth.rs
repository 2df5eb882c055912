//! Truth-table string and hex conversions shared by DEC and the CLI.
//!
//! Truth-table strings use the convention from the data model: position `i`
//! (0-based, left to right) corresponds to the assignment whose integer
//! value is `|TT|-1-i`. Hex here is the plain "-f HEX" convention used by the
//! decomposition commands: groups of 4 bits, left to right, one hex digit
//! each — distinct from the little-endian-by-character convention BENCH LUT
//! lines use for their truth-table field (see [`crate::bench`]).

/// Errors from truth-table string/hex parsing.
#[derive(Debug, thiserror::Error)]
pub enum TruthError {
    /// Length was not a power of two.
    #[error("truth table length {0} is not a power of two")]
    NotPowerOfTwo(usize),
    /// A binary string contained a character other than '0'/'1'.
    #[error("truth table contains a non-binary character: {0:?}")]
    NonBinary(char),
    /// A hex string contained a non-hex-digit character.
    #[error("truth table contains a non-hex character: {0:?}")]
    NonHex(char),
    /// Hex string expands to fewer bits than the table needs. The spec
    /// resolves this conservatively: short hex is rejected, never
    /// zero-padded.
    #[error("hex string expands to {available} bits, need at least {bits}")]
    TooShortHex { available: usize, bits: usize },
}

/// `true` if `n` is a power of two (`n > 0`).
pub fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Parses a `{'0','1'}` truth-table string into bits, MSB-first as written.
pub fn parse_binary(s: &str) -> Result<Vec<bool>, TruthError> {
    if !is_power_of_two(s.len()) {
        return Err(TruthError::NotPowerOfTwo(s.len()));
    }
    s.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(TruthError::NonBinary(other)),
        })
        .collect()
}

/// Renders bits (as read off row 0 of a structural matrix, left to right)
/// into a `{'0','1'}` string.
pub fn bits_to_binary(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Renders bits into hex, left-padding with zero bits up to a whole nibble
/// (needed for sub-nibble widths like a 1-input LUT's 2-bit table).
pub fn bits_to_hex(bits: &[bool]) -> String {
    let pad = (4 - bits.len() % 4) % 4;
    let mut out = String::with_capacity((bits.len() + pad) / 4);
    let padded: Vec<bool> = std::iter::repeat(false).take(pad).chain(bits.iter().copied()).collect();
    for chunk in padded.chunks(4) {
        let mut v = 0u8;
        for (i, &b) in chunk.iter().enumerate() {
            if b {
                v |= 1 << (chunk.len() - 1 - i);
            }
        }
        out.push(std::char::from_digit(v as u32, 16).unwrap());
    }
    out
}

/// Parses a hex truth table for an `n`-input function (`2^n` bits).
///
/// Mirrors the reference decoder: every hex digit expands to 4 bits
/// (MSB-first), the digits are concatenated in order, and the rightmost
/// `2^n` bits of that expansion are the truth table — so a hex string wider
/// than needed is accepted (extra leading bits are dropped) but one that
/// expands to fewer bits than `2^n` is rejected rather than zero-padded.
pub fn hex_to_bits(hex: &str, n: usize) -> Result<Vec<bool>, TruthError> {
    let bits = 1usize << n;
    let mut expanded = Vec::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let v = c.to_digit(16).ok_or(TruthError::NonHex(c))?;
        for shift in (0..4).rev() {
            expanded.push((v >> shift) & 1 != 0);
        }
    }
    if expanded.len() < bits {
        return Err(TruthError::TooShortHex { available: expanded.len(), bits });
    }
    Ok(expanded[expanded.len() - bits..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let bits = parse_binary("10001011").unwrap();
        assert_eq!(bits_to_hex(&bits).to_uppercase(), "8B");
        assert_eq!(hex_to_bits("8B", 3).unwrap(), bits);
    }

    #[test]
    fn short_hex_is_rejected() {
        // "8" expands to 4 bits; an 8-bit table (n=3) needs more than that.
        assert!(matches!(hex_to_bits("8", 3), Err(TruthError::TooShortHex { .. })));
    }

    #[test]
    fn single_input_lut_uses_a_sub_nibble_width() {
        // NOT gate: tt "01" (F(1)=0, F(0)=1), encoded as the nibble 0x1.
        let bits = hex_to_bits("1", 1).unwrap();
        assert_eq!(bits_to_binary(&bits), "01");
        assert_eq!(bits_to_hex(&bits), "1");
    }

    #[test]
    fn d1_scenario() {
        let bits = parse_binary("11010001").unwrap();
        assert_eq!(bits_to_hex(&bits).to_uppercase(), "D1");
    }
}
