//! Generation and format checks for 16-digit account hashes.

use crate::error::AuthError;

pub const ACCOUNT_HASH_LEN: usize = 16;
pub const MIN_ACCOUNT_HASH: u64 = 1_000_000_000_000_000;
pub const MAX_ACCOUNT_HASH: u64 = 9_999_999_999_999_999;

const SPAN: u64 = MAX_ACCOUNT_HASH - MIN_ACCOUNT_HASH + 1;

/// Draw a new account hash uniformly from
/// `[MIN_ACCOUNT_HASH, MAX_ACCOUNT_HASH]` using OS randomness.
///
/// Uniqueness is not checked here; the caller retries on collision.
///
/// # Errors
///
/// Returns [`AuthError::Randomness`] if the OS entropy source fails.
pub fn generate_account_hash() -> Result<String, AuthError> {
    // Reject draws from the partial block at the top of the u64 range.
    let zone = (u64::MAX / SPAN) * SPAN;
    loop {
        let mut bytes = [0u8; 8];
        getrandom::fill(&mut bytes).map_err(|e| AuthError::Randomness(e.to_string()))?;
        let draw = u64::from_le_bytes(bytes);
        if draw < zone {
            return Ok((MIN_ACCOUNT_HASH + draw % SPAN).to_string());
        }
    }
}

/// Check that `candidate` is exactly 16 ASCII digits with a non-zero lead.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAccountHash`] otherwise.
pub fn validate_account_hash(candidate: &str) -> Result<(), AuthError> {
    let well_formed = candidate.len() == ACCOUNT_HASH_LEN
        && candidate.bytes().all(|b| b.is_ascii_digit())
        && !candidate.starts_with('0');
    if well_formed {
        Ok(())
    } else {
        Err(AuthError::InvalidAccountHash)
    }
}

/// Log-safe rendering: the first four characters followed by an ellipsis.
#[must_use]
pub fn mask_account_hash(hash: &str) -> String {
    let prefix: String = hash.chars().take(4).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn generated_hashes_are_valid_and_in_range() {
        for _ in 0..200 {
            let hash = generate_account_hash().unwrap();
            assert_eq!(hash.len(), ACCOUNT_HASH_LEN);
            validate_account_hash(&hash).unwrap();
            let value: u64 = hash.parse().unwrap();
            assert!((MIN_ACCOUNT_HASH..=MAX_ACCOUNT_HASH).contains(&value));
        }
    }

    #[test]
    fn generated_hashes_differ() {
        let a = generate_account_hash().unwrap();
        let b = generate_account_hash().unwrap();
        assert_ne!(a, b);
    }

    #[rstest]
    #[case("1234567890123456", true)]
    #[case("9999999999999999", true)]
    #[case("0234567890123456", false)]
    #[case("123456789012345", false)]
    #[case("12345678901234567", false)]
    #[case("12345678901234a6", false)]
    #[case(" 234567890123456", false)]
    #[case("", false)]
    #[case("１２３４５６７８９０１２３４５６", false)]
    fn validation(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(validate_account_hash(candidate).is_ok(), ok);
    }

    #[test]
    fn mask_keeps_four_digits() {
        assert_eq!(mask_account_hash("4829103746582910"), "4829…");
        assert_eq!(mask_account_hash("12"), "12…");
    }
}
