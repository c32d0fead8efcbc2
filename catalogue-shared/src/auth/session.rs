/// Session token utilities
///
/// A session token is 43 URL-safe characters: the prefix `cat_` followed by
/// 39 random alphanumeric characters. The browser keeps the token in an
/// HttpOnly cookie; the database only stores its SHA-256 hex digest, so a
/// leaked `technician_sessions` table cannot be replayed.

use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "cat_";
const TOKEN_RANDOM_LENGTH: usize = 39;

/// Total token length
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// A freshly generated token and the hash to persist
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Value sent to the browser
    pub value: String,

    /// SHA-256 hex digest stored server-side
    pub hash: String,
}

/// Generates a new random session token.
pub fn generate_session_token() -> SessionToken {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let value = format!("{}{}", TOKEN_PREFIX, random);
    let hash = hash_session_token(&value);

    SessionToken { value, hash }
}

/// SHA-256 hex digest of a token.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cheap shape check run before any database lookup.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_session_token();
        assert!(token.value.starts_with("cat_"));
        assert_eq!(token.value.len(), SESSION_TOKEN_LENGTH);
        assert_eq!(token.hash.len(), 64);
        assert!(is_well_formed(&token.value));
    }

    #[test]
    fn test_hash_matches_value() {
        let token = generate_session_token();
        assert_eq!(hash_session_token(&token.value), token.hash);
        assert_ne!(token.value, token.hash);
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..200).map(|_| generate_session_token().value).collect();
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn test_is_well_formed_rejects_garbage() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("cat_short"));
        assert!(!is_well_formed(&format!("xyz_{}", "a".repeat(39))));
        assert!(!is_well_formed(&format!("cat_{}", "!".repeat(39))));
        assert!(is_well_formed(&format!("cat_{}", "a".repeat(39))));
    }
}
