use sha3::{Digest, Sha3_256};

pub fn sha3_256_hex(data: &[u8]) -> String {
    let mut hasher = new_sha3_256();
    hasher.update(data);
    finalize_hex(hasher)
}

pub fn new_sha3_256() -> Sha3_256 {
    Sha3_256::new()
}

pub fn finalize_hex(hasher: Sha3_256) -> String {
    hex::encode(hasher.finalize())
}

/// Compares a computed digest against an expected one, ignoring case and an optional `0x` prefix.
pub fn digest_matches(computed: &str, expected: &str) -> bool {
    let expected = expected.trim();
    let expected = expected.strip_prefix("0x").unwrap_or(expected);
    computed.eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod hash_tests {
    use crate::utils::hash::{digest_matches, finalize_hex, new_sha3_256, sha3_256_hex};
    use sha3::Digest;

    #[test]
    pub fn test_sha3_of_empty_input() {
        assert_eq!(
            sha3_256_hex(b""),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    pub fn test_incremental_digest_matches_one_shot() {
        let mut hasher = new_sha3_256();
        hasher.update(b"hand_");
        hasher.update(b"landmark");
        assert_eq!(finalize_hex(hasher), sha3_256_hex(b"hand_landmark"));
    }

    #[test]
    pub fn test_digest_comparison() {
        let digest = sha3_256_hex(b"");
        assert!(digest_matches(&digest, &digest.to_uppercase()));
        assert!(digest_matches(&digest, &format!("0x{}", digest)));
        assert!(!digest_matches(&digest, &sha3_256_hex(b"model")));
    }
}
