use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Keyed hash of a refresh token, hex-encoded. Only this value is
/// stored; the raw token never touches the database.
pub fn hmac_sha256_token(key: &str, token: &str) -> String {
    // Hmac::new_from_slice accepts keys of any length
    let mut mac = <Hmac<Sha256>>::new_from_slice(key.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    format!("{:x}", mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_is_deterministic() {
        let a = hmac_sha256_token("key", "token");
        let b = hmac_sha256_token("key", "token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hmac_differs_by_key_and_token() {
        assert_ne!(hmac_sha256_token("key1", "token"), hmac_sha256_token("key2", "token"));
        assert_ne!(hmac_sha256_token("key", "token1"), hmac_sha256_token("key", "token2"));
    }
}
