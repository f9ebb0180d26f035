use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::core::models::Client;
use crate::core::types::{ClientId, ClientSecret, RedirectUri};
use crate::provider::token::SigningKey;
use crate::provider::validation::is_acceptable_redirect_uri;
use crate::provider::{Error, ProviderConfig};
use crate::util::hash::HashingService;
use crate::util::random::FromRandom;

#[derive(Parser)]
#[clap(
    name = "authd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Authorization-code grant server"
)]
pub struct Options {
    /// Postgres connection string. Without it clients and codes live in memory.
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Pepper mixed into every client secret hash.
    #[clap(long, env = "HASH_SECRET", hide_env_values = true)]
    pub hash_secret: String,
    /// HS256 key for access tokens.
    #[clap(long, env = "TOKEN_SIGNING_SECRET", hide_env_values = true)]
    pub token_signing_secret: Option<String>,
    /// ES256 private key (PEM). Takes precedence over TOKEN_SIGNING_SECRET.
    #[clap(long, env = "JWT_PRIVATE_KEY_FILE")]
    pub jwt_private_key_file: Option<PathBuf>,
    #[clap(long, env = "JWT_PUBLIC_KEY_FILE")]
    pub jwt_public_key_file: Option<PathBuf>,
    #[clap(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,
    #[clap(long, env = "ISSUER", default_value = "authorization-service")]
    pub issuer: String,
    #[clap(long, env = "PENDING_LIFETIME_SECS", default_value = "3600")]
    pub pending_lifetime_secs: u64,
    #[clap(long, env = "CODE_LIFETIME_SECS", default_value = "600")]
    pub code_lifetime_secs: u64,
    #[clap(long, env = "TOKEN_LIFETIME_SECS", default_value = "3600")]
    pub token_lifetime_secs: u64,
    /// Accept http://localhost style redirect URIs.
    #[clap(
        long,
        env = "ALLOW_INSECURE_LOOPBACK",
        default_value = "false",
        parse(try_from_str)
    )]
    pub allow_insecure_loopback: bool,

    #[clap(long)]
    pub seed_client_id: Option<String>,
    #[clap(long, default_value = "Demo client")]
    pub seed_client_name: String,
    #[clap(long, default_value = "")]
    pub seed_client_website: String,
    #[clap(long, default_value = "")]
    pub seed_client_logo: String,
    #[clap(long)]
    pub seed_client_redirect_uri: Option<String>,
    #[clap(long, env = "SEED_CLIENT_SECRET", hide_env_values = true)]
    pub seed_client_secret: Option<String>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("listen_addr", &self.listen_addr)
            .field("issuer", &self.issuer)
            .field("seed_client_id", &self.seed_client_id)
            .finish_non_exhaustive()
    }
}

/// A client to upsert at startup, and the generated secret if none was given.
#[derive(Debug)]
pub struct SeedClient {
    pub client: Client,
    pub generated_secret: Option<ClientSecret>,
}

impl Options {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            issuer: self.issuer.clone(),
            pending_lifetime: Duration::from_secs(self.pending_lifetime_secs),
            code_lifetime: Duration::from_secs(self.code_lifetime_secs),
            token_lifetime: Duration::from_secs(self.token_lifetime_secs),
            allow_insecure_loopback: self.allow_insecure_loopback,
        }
    }

    pub fn hashing_service(&self) -> Result<HashingService, Error> {
        if self.hash_secret.is_empty() {
            return Err(Error::Config("HASH_SECRET must not be empty".to_string()));
        }
        Ok(HashingService::with_secret_key(self.hash_secret.clone()))
    }

    pub fn signing_key(&self) -> Result<SigningKey, Error> {
        match (&self.jwt_private_key_file, &self.jwt_public_key_file) {
            (Some(private), Some(public)) => SigningKey::from_ec_pem_files(private, public),
            (Some(_), None) | (None, Some(_)) => Err(Error::Config(
                "JWT_PRIVATE_KEY_FILE and JWT_PUBLIC_KEY_FILE must be given together".to_string(),
            )),
            (None, None) => match &self.token_signing_secret {
                Some(secret) => Ok(SigningKey::Hmac(secret.as_bytes().to_vec())),
                None => Err(Error::Config(
                    "Supply TOKEN_SIGNING_SECRET or a JWT key pair".to_string(),
                )),
            },
        }
    }

    pub fn seed_client(&self, hasher: &HashingService) -> Result<Option<SeedClient>, Error> {
        let id = match &self.seed_client_id {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };

        let redirect_uri = self.seed_client_redirect_uri.clone().ok_or_else(|| {
            Error::Config("--seed-client-redirect-uri is required with --seed-client-id".to_string())
        })?;
        if !is_acceptable_redirect_uri(&redirect_uri, self.allow_insecure_loopback) {
            return Err(Error::Config(format!(
                "Seed client redirect URI {} is not acceptable; it must be https, \
                 or http on a loopback host with ALLOW_INSECURE_LOOPBACK=true",
                redirect_uri
            )));
        }

        let (secret, generated_secret) = match &self.seed_client_secret {
            Some(secret) if !secret.is_empty() => (ClientSecret(secret.clone()), None),
            _ => {
                let secret = ClientSecret::from_random();
                (secret.clone(), Some(secret))
            }
        };

        let client = Client {
            id: ClientId(id.clone()),
            name: self.seed_client_name.clone(),
            website: self.seed_client_website.clone(),
            logo: self.seed_client_logo.clone(),
            redirect_uri: RedirectUri(redirect_uri),
            secret: hasher.hash(&secret)?,
        };

        Ok(Some(SeedClient {
            client,
            generated_secret,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["authd", "--hash-secret", "pepper"];
        argv.extend_from_slice(args);
        Options::try_parse_from(argv).unwrap()
    }

    #[test]
    fn lifetimes_default_to_an_hour_and_ten_minutes() {
        let config = parse(&["--token-signing-secret", "k"]).provider_config();
        assert_eq!(config.pending_lifetime, Duration::from_secs(3600));
        assert_eq!(config.code_lifetime, Duration::from_secs(600));
        assert_eq!(config.token_lifetime, Duration::from_secs(3600));
        assert!(!config.allow_insecure_loopback);
    }

    #[test]
    fn key_pair_halves_must_come_together() {
        let opts = parse(&["--jwt-private-key-file", "/tmp/key.pem"]);
        assert!(matches!(opts.signing_key(), Err(Error::Config(_))));
    }

    #[test]
    fn loopback_seed_client_needs_the_insecure_loopback_switch() {
        let seed = [
            "--seed-client-id",
            "demo",
            "--seed-client-redirect-uri",
            "http://localhost:8080/callback",
            "--seed-client-secret",
            "demo-secret",
        ];

        let strict = parse(&seed);
        let hasher = strict.hashing_service().unwrap();
        match strict.seed_client(&hasher) {
            Err(Error::Config(message)) => assert!(message.contains("ALLOW_INSECURE_LOOPBACK")),
            other => panic!("expected a configuration error, got {:?}", other),
        }

        let mut args = seed.to_vec();
        args.extend_from_slice(&["--allow-insecure-loopback", "true"]);
        let relaxed = parse(&args);
        let seeded = relaxed.seed_client(&hasher).unwrap().unwrap();
        assert_eq!(seeded.client.redirect_uri.0, "http://localhost:8080/callback");
        assert!(seeded.generated_secret.is_none());
    }

    #[test]
    fn seed_client_without_secret_gets_a_generated_one() {
        let opts = parse(&[
            "--seed-client-id",
            "demo",
            "--seed-client-redirect-uri",
            "https://demo.example/cb",
        ]);
        let hasher = opts.hashing_service().unwrap();
        let seed = opts.seed_client(&hasher).unwrap().unwrap();
        let secret = seed.generated_secret.unwrap();
        assert!(hasher.verify(&secret, &seed.client.secret).unwrap());
    }
}
