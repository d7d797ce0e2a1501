//! Solana address classification.
//!
//! A mint address is the base58 encoding of a 32-byte ed25519 public key,
//! which always lands between 32 and 44 characters.

/// Shortest base58 rendering of a 32-byte key.
pub const MIN_ADDRESS_LEN: usize = 32;

/// Longest base58 rendering of a 32-byte key.
pub const MAX_ADDRESS_LEN: usize = 44;

/// Decoded length of a Solana public key.
const PUBKEY_BYTES: usize = 32;

/// Result of classifying a user submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_address: bool,
}

/// Classifies trimmed user input as a token address or free text.
pub fn classify(input: &str) -> Classification {
    Classification {
        is_address: is_address(input),
    }
}

/// Returns `true` when `input` decodes to a 32-byte base58 public key.
///
/// Any decode failure is reported as `false`, never as an error.
pub fn is_address(input: &str) -> bool {
    let candidate = input.trim();
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&candidate.len()) {
        return false;
    }
    if !candidate.bytes().all(is_base58_byte) {
        return false;
    }
    matches!(
        bs58::decode(candidate).into_vec(),
        Ok(bytes) if bytes.len() == PUBKEY_BYTES
    )
}

/// Bitcoin base58 alphabet: alphanumerics without `0`, `O`, `I` and `l`.
pub(crate) fn is_base58_byte(b: u8) -> bool {
    matches!(b, b'1'..=b'9' | b'A'..=b'H' | b'J'..=b'N' | b'P'..=b'Z' | b'a'..=b'k' | b'm'..=b'z')
}
