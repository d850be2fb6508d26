// Key format classification. Pure, no cryptographic verification.

use serde::Serialize;

/// Expected key length: 64 hex characters, i.e. a 256-bit key.
pub const KEY_LENGTH: usize = 64;

/// Format classification of a candidate string. The three variants are
/// mutually exclusive and exhaustive: length is checked before charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyClass {
    Valid,
    NonHex,
    WrongLength,
}

/// Classify a candidate: `Valid` iff it is exactly [`KEY_LENGTH`] characters
/// of `[0-9a-fA-F]`; `WrongLength` on any other length; `NonHex` when only
/// the charset check fails.
pub fn classify(candidate: &str) -> KeyClass {
    if candidate.chars().count() != KEY_LENGTH {
        return KeyClass::WrongLength;
    }
    if candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        KeyClass::Valid
    } else {
        KeyClass::NonHex
    }
}
