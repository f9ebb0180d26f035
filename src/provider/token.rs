use std::path::Path;
use std::time::Duration;

use crate::auth::TokenType;
use crate::core::types::{ClientId, Scope, Timestamp, TokenId};
use crate::provider::{claims::AccessClaims, Error, ProviderConfig};
use crate::util::random::FromRandom;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use tracing::{event, Level};

/// Service-wide key material for access tokens.
pub enum SigningKey {
    /// HS256 shared secret.
    Hmac(Vec<u8>),
    /// ES256 key pair, PEM encoded.
    EcPem { private: Vec<u8>, public: Vec<u8> },
}

impl SigningKey {
    pub fn from_ec_pem_files(private: impl AsRef<Path>, public: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self::EcPem {
            private: std::fs::read(private)?,
            public: std::fs::read(public)?,
        })
    }
}

pub struct TokenService {
    algorithm: Algorithm,
    secret: EncodingKey,
    public: DecodingKey<'static>,
    issuer: String,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenService {{ ... }}")
    }
}

impl TokenService {
    pub fn new(key: SigningKey, config: &ProviderConfig) -> Result<Self, Error> {
        let (algorithm, secret, public) = match key {
            SigningKey::Hmac(secret) => {
                if secret.is_empty() {
                    return Err(Error::Config("empty token signing secret".to_string()));
                }
                (
                    Algorithm::HS256,
                    EncodingKey::from_secret(&secret),
                    DecodingKey::from_secret(&secret).into_static(),
                )
            }
            SigningKey::EcPem { private, public } => (
                Algorithm::ES256,
                EncodingKey::from_ec_pem(&private)?,
                DecodingKey::from_ec_pem(&public)?.into_static(),
            ),
        };

        Ok(Self {
            algorithm,
            secret,
            public,
            issuer: config.issuer.clone(),
            lifetime: config.token_lifetime,
        })
    }

    pub fn token_type() -> TokenType {
        TokenType::Bearer
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, Error> {
        let mut validation = jsonwebtoken::Validation::new(self.algorithm);
        validation.iss = Some(self.issuer.clone());
        validation.leeway = 0;
        jsonwebtoken::decode::<AccessClaims>(token, &self.public, &validation)
            .map(|td| td.claims)
            .map_err(Error::from)
    }

    #[tracing::instrument(skip(self, scope), fields(scope = %scope.as_joined()))]
    pub fn new_token(&self, client_id: &ClientId, scope: &Scope) -> Result<String, Error> {
        let time_now = Timestamp::now();
        let expiry = time_now.after(self.lifetime);

        let claims = AccessClaims {
            iss: self.issuer.clone(),
            exp: expiry.as_secs(),
            aud: client_id.0.clone(),
            sub: client_id.0.clone(),
            client_id: client_id.0.clone(),
            iat: time_now.as_secs(),
            nbf: time_now.as_secs(),
            jti: TokenId::from_random(),
            scope: Some(scope.clone()),
        };

        event!(Level::DEBUG, "Issuing access_token");
        self.make_token(&claims)
    }

    pub fn make_token(&self, claims: &impl serde::Serialize) -> Result<String, Error> {
        let header = jsonwebtoken::Header::new(self.algorithm);
        Ok(jsonwebtoken::encode(&header, claims, &self.secret)?)
    }
}
