//! Share codes that carry a tier and the full session seed.
//! Code format: `<TIER>-<SEED>-<CHECK>`, e.g., `EZ-0539-23`.
//!
//! `SEED` is the big-endian seed with leading zero bytes dropped, in hex.
//! `CHECK` is the first byte of a SHA-256 over the tier and seed, so a
//! mistyped code or a code moved to another tier is rejected.

use sha2::{Digest, Sha256};

use crate::symbol::Difficulty;

const CHECK_DOMAIN: &[u8] = b"recall-share-code";

fn check_byte(difficulty: Difficulty, seed: u64) -> u8 {
    let digest = Sha256::new()
        .chain_update(CHECK_DOMAIN)
        .chain_update(difficulty.code_prefix().as_bytes())
        .chain_update(seed.to_be_bytes())
        .finalize();
    digest[0]
}

/// Render a seed as a share code for the given tier.
#[must_use]
pub fn encode_share_code(difficulty: Difficulty, seed: u64) -> String {
    let bytes = seed.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    format!(
        "{}-{}-{:02X}",
        difficulty.code_prefix(),
        hex::encode_upper(&bytes[first..]),
        check_byte(difficulty, seed)
    )
}

/// Parse a share code into its tier and seed. Case-insensitive.
#[must_use]
pub fn parse_share_code(code: &str) -> Option<(Difficulty, u64)> {
    let mut parts = code.trim().split('-');
    let difficulty = Difficulty::from_code_prefix(parts.next()?)?;
    let payload = hex::decode(parts.next()?).ok()?;
    let check = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || payload.is_empty() || payload.len() > 8 || check.len() != 1 {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes[8 - payload.len()..].copy_from_slice(&payload);
    let seed = u64::from_be_bytes(bytes);
    (check[0] == check_byte(difficulty, seed)).then_some((difficulty, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_survive_a_share_code_roundtrip() {
        for difficulty in Difficulty::ALL {
            for seed in [0_u64, 7, 1337, 0xDEAD_BEEF, u64::MAX] {
                let code = encode_share_code(difficulty, seed);
                assert_eq!(parse_share_code(&code), Some((difficulty, seed)), "{code}");
            }
        }
    }

    #[test]
    fn codes_are_short_for_small_seeds() {
        assert_eq!(encode_share_code(Difficulty::Easy, 1337), "EZ-0539-23");
        assert_eq!(encode_share_code(Difficulty::Hard, 7), "HD-07-E7");
        assert!(encode_share_code(Difficulty::Hard, 0).starts_with("HD-00-"));
        assert!(encode_share_code(Difficulty::Medium, u64::MAX).starts_with("MD-FFFFFFFFFFFFFFFF-"));
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        let code = encode_share_code(Difficulty::Medium, 0xBEEF);
        let (difficulty, seed) = parse_share_code(&format!("  {}  ", code.to_lowercase())).unwrap();
        assert_eq!((difficulty, seed), (Difficulty::Medium, 0xBEEF));
        assert_eq!(encode_share_code(difficulty, seed), code);
    }

    #[test]
    fn moving_a_code_to_another_tier_fails_the_check() {
        let code = encode_share_code(Difficulty::Easy, 1337);
        let moved = code.replacen("EZ", "HD", 1);
        assert!(parse_share_code(&moved).is_none());
    }

    #[test]
    fn corrupted_seed_digits_fail_the_check() {
        let code = encode_share_code(Difficulty::Hard, 1337);
        let (prefix, check) = code.rsplit_once('-').unwrap();
        let wrong_check = u8::from_str_radix(check, 16).unwrap().wrapping_add(1);
        assert!(parse_share_code(&format!("{prefix}-{wrong_check:02X}")).is_none());
        let typo = code.replacen("0539", "0538", 1);
        assert!(parse_share_code(&typo).is_none());
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert!(parse_share_code("0539-A4").is_none());
        assert!(parse_share_code("XX-0539-A4").is_none());
        assert!(parse_share_code("EZ-0539").is_none());
        assert!(parse_share_code("EZ--A4").is_none());
        assert!(parse_share_code("EZ-ZZ-A4").is_none());
        assert!(parse_share_code("EZ-0539-A4-00").is_none());
        assert!(parse_share_code("EZ-000000000000000539-A4").is_none());
        assert!(parse_share_code("EZ-05é9-A4").is_none());
        assert!(parse_share_code("").is_none());
    }
}
