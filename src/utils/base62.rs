//! Base62 codec for short codes.
//!
//! Alphabet order is digits, then uppercase, then lowercase. Zero encodes to
//! `"0"`; any other value never starts with `'0'`.

/// Codec alphabet. Index = digit value.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;

/// Errors returned by [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("invalid character {0:?} at position {1}")]
    InvalidCharacter(char, usize),

    #[error("leading zero in non-zero value")]
    LeadingZero,

    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Encodes `n` into its shortest base62 representation.
///
/// # Examples
///
/// ```
/// use linkpress::utils::base62::encode;
///
/// assert_eq!(encode(0), "0");
/// assert_eq!(encode(61), "z");
/// assert_eq!(encode(62), "10");
/// ```
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    // u64::MAX needs 11 digits
    let mut buf = [0u8; 11];
    let mut pos = buf.len();
    while n > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }

    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Decodes a base62 string produced by [`encode`].
///
/// Only canonical forms are accepted: a leading `'0'` is rejected unless the
/// whole input is `"0"`, keeping the mapping a bijection.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode(input: &str) -> Result<u64, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }
    if input.len() > 1 && input.starts_with('0') {
        return Err(DecodeError::LeadingZero);
    }

    input.chars().enumerate().try_fold(0u64, |acc, (pos, c)| {
        let digit = digit_value(c).ok_or(DecodeError::InvalidCharacter(c, pos))?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or(DecodeError::Overflow)
    })
}

fn digit_value(c: char) -> Option<u64> {
    let v = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'A'..='Z' => c as u64 - 'A' as u64 + 10,
        'a'..='z' => c as u64 - 'a' as u64 + 36,
        _ => return None,
    };
    Some(v)
}

/// Returns true if `code` is non-empty and uses only alphabet characters.
///
/// Used to reject obviously bogus codes before touching the store.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 11 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
