use crate::core::types::{AuthCode, ClientSecret, HashedAuthCode, HashedClientSecret};
use crate::provider::error::Error;

use super::random::random_string;

pub struct HashingService {
    secret_key: String,
    /// Stand-in hash verified against when no client matches, so unknown
    /// ids cost as much as known ones.
    decoy: Option<HashedClientSecret>,
}

impl std::fmt::Debug for HashingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashingService {{ ... }}")
    }
}

pub trait HashTo: AsRef<str> {
    type HashedType;
}

impl HashTo for ClientSecret {
    type HashedType = HashedClientSecret;
}

impl HashTo for AuthCode {
    type HashedType = HashedAuthCode;
}

impl HashingService {
    pub fn with_secret_key(secret_key: String) -> Self {
        let mut service = Self {
            secret_key,
            decoy: None,
        };
        service.decoy = service.hash(&ClientSecret(random_string(32))).ok();
        service
    }

    fn get_config(&self) -> argon2::Config<'_> {
        let mut config = argon2::Config::default();
        config.secret = self.secret_key.as_bytes();
        config
    }

    pub fn hash<T, H>(&self, to_hash: &T) -> Result<H, Error>
    where
        T: HashTo<HashedType = H>,
        H: From<String>,
    {
        let salt = random_string(16);
        let hash = argon2::hash_encoded(
            to_hash.as_ref().as_bytes(),
            salt.as_bytes(),
            &self.get_config(),
        )?;

        Ok(hash.into())
    }

    /// Recomputes the argon2 hash and compares in constant time.
    pub fn verify<T, H>(&self, secret: &T, hashed: &H) -> Result<bool, Error>
    where
        T: HashTo<HashedType = H>,
        H: AsRef<str>,
    {
        let verified = argon2::verify_encoded_ext(
            hashed.as_ref(),
            secret.as_ref().as_bytes(),
            self.secret_key.as_bytes(),
            &[],
        )?;
        Ok(verified)
    }

    /// Burns one argon2 verification for a client that does not exist.
    /// Never succeeds.
    pub fn verify_absent(&self, secret: &ClientSecret) -> bool {
        if let Some(decoy) = &self.decoy {
            let _ = self.verify(secret, decoy);
        }
        false
    }

    /// Unsalted digest, for values that are already high-entropy and must be
    /// looked up by equality.
    pub fn hash_without_salt<T, H>(to_hash: &T) -> H
    where
        T: HashTo<HashedType = H>,
        H: From<String>,
    {
        use sha2::Digest;

        let digest = sha2::Sha512::digest(to_hash.as_ref().as_bytes());
        base64::encode_config(digest, base64::URL_SAFE).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_registered_secret() {
        let hasher = HashingService::with_secret_key("pepper".to_string());
        let hashed: HashedClientSecret = hasher.hash(&ClientSecret("s3cret".to_string())).unwrap();

        assert!(hasher.verify(&ClientSecret("s3cret".to_string()), &hashed).unwrap());
        assert!(!hasher.verify(&ClientSecret("s3cret!".to_string()), &hashed).unwrap());
    }

    #[test]
    fn pepper_is_part_of_the_hash() {
        let hasher = HashingService::with_secret_key("pepper".to_string());
        let other = HashingService::with_secret_key("salt-and-pepper".to_string());
        let hashed: HashedClientSecret = hasher.hash(&ClientSecret("s3cret".to_string())).unwrap();

        assert!(!other.verify(&ClientSecret("s3cret".to_string()), &hashed).unwrap_or(false));
    }

    #[test]
    fn absent_clients_never_verify() {
        let hasher = HashingService::with_secret_key("pepper".to_string());
        assert!(hasher.decoy.is_some());
        assert!(!hasher.verify_absent(&ClientSecret("s3cret".to_string())));
    }

    #[test]
    fn code_digest_is_stable() {
        let code = AuthCode("abc".to_string());
        let a: HashedAuthCode = HashingService::hash_without_salt(&code);
        let b: HashedAuthCode = HashingService::hash_without_salt(&code);
        assert_eq!(a, b);
        assert_ne!(a.0, "abc");
    }
}
