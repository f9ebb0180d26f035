use crate::core::types::{AuthCode, ClientSecret, SessionToken, TokenId};

/// Bytes of CSPRNG output behind every generated code or token.
const RANDOM_BYTES: usize = 32;

pub trait FromRandom {
    fn from_random() -> Self;
}

impl FromRandom for AuthCode {
    fn from_random() -> Self {
        AuthCode(random_string(RANDOM_BYTES))
    }
}

impl FromRandom for SessionToken {
    fn from_random() -> Self {
        SessionToken(random_string(RANDOM_BYTES))
    }
}

impl FromRandom for TokenId {
    fn from_random() -> Self {
        TokenId(random_string(16))
    }
}

impl FromRandom for ClientSecret {
    fn from_random() -> Self {
        ClientSecret(random_string(RANDOM_BYTES))
    }
}

/// URL-safe encoding of `size` bytes drawn from the thread-local CSPRNG.
pub(crate) fn random_string(size: usize) -> String {
    use rand::RngCore;

    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_carry_256_bits() {
        let code = AuthCode::from_random();
        // 32 bytes → 43 unpadded base64 characters
        assert_eq!(code.0.len(), 43);
        assert!(code.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn codes_do_not_repeat() {
        let codes: HashSet<String> = (0..1000).map(|_| AuthCode::from_random().0).collect();
        assert_eq!(codes.len(), 1000);
    }
}
