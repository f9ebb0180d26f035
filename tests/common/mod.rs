#![allow(dead_code)]

use std::time::Duration;

use authorization_service::auth::{RawAuthorizationRequest, RawConsentRequest, RawTokenRequest};
use authorization_service::core::models::Client;
use authorization_service::core::types::{ClientId, ClientSecret, RedirectUri};
use authorization_service::db::MemoryStore;
use authorization_service::provider::token::{SigningKey, TokenService};
use authorization_service::provider::{OAuth2Provider, ProviderConfig};
use authorization_service::util::hash::HashingService;

pub const ACME_SECRET: &str = "acme-secret";
pub const OTHER_SECRET: &str = "other-secret";

pub fn hasher() -> HashingService {
    HashingService::with_secret_key("test-pepper".to_string())
}

pub fn client(id: &str, secret: &str) -> Client {
    Client {
        id: ClientId(id.to_string()),
        name: format!("{} app", id),
        website: format!("https://{}.example", id),
        logo: format!("https://{}.example/logo.png", id),
        redirect_uri: RedirectUri(format!("https://{}.example/cb", id)),
        secret: hasher().hash(&ClientSecret(secret.to_string())).unwrap(),
    }
}

pub fn config() -> ProviderConfig {
    ProviderConfig {
        issuer: "https://auth.example".to_string(),
        ..ProviderConfig::default()
    }
}

pub fn provider_with(config: ProviderConfig) -> OAuth2Provider<MemoryStore> {
    let store = MemoryStore::new();
    store.put_client(client("acme", ACME_SECRET)).unwrap();
    store.put_client(client("other", OTHER_SECRET)).unwrap();

    let token = TokenService::new(SigningKey::Hmac(b"token-key".to_vec()), &config).unwrap();
    OAuth2Provider::new(store, hasher(), token, config)
}

pub fn provider() -> OAuth2Provider<MemoryStore> {
    provider_with(config())
}

pub fn lifetimes(pending: u64, code: u64) -> ProviderConfig {
    ProviderConfig {
        pending_lifetime: Duration::from_secs(pending),
        code_lifetime: Duration::from_secs(code),
        ..config()
    }
}

pub fn authorization(client_id: &str) -> RawAuthorizationRequest {
    RawAuthorizationRequest {
        response_type: Some("code".to_string()),
        client_id: Some(client_id.to_string()),
        redirect_uri: Some(format!("https://{}.example/cb", client_id)),
        scope: Some("read write".to_string()),
        state: Some("xyz".to_string()),
    }
}

pub fn consent(client_id: &str, authorize: bool) -> RawConsentRequest {
    RawConsentRequest {
        authorize: Some(authorize.to_string()),
        client_id: Some(client_id.to_string()),
        state: Some("xyz".to_string()),
    }
}

pub fn token_request(client_id: &str, secret: &str, code: &str) -> RawTokenRequest {
    RawTokenRequest {
        grant_type: Some("authorization_code".to_string()),
        code: Some(code.to_string()),
        redirect_uri: Some(format!("https://{}.example/cb", client_id)),
        client_id: Some(client_id.to_string()),
        client_secret: Some(secret.to_string()),
    }
}
