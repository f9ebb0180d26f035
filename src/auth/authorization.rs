use std::time::Duration;

use crate::core::models::ClientInfo;
use crate::core::types::{ClientId, RedirectUri, Scope, SessionToken};

/// `/auth` query parameters exactly as received.
#[derive(Debug, Clone, Default)]
#[derive(serde::Deserialize)]
pub struct RawAuthorizationRequest {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
}

/// An authorization request that passed every protocol check.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: ClientId,
    pub redirect_uri: RedirectUri,
    pub scope: Scope,
    pub state: String,
}

/// View model for the consent screen.
#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
pub struct ConsentPrompt {
    #[serde(flatten)]
    pub client: ClientInfo,
    pub scopes: Vec<String>,
    pub state: String,
}

/// Result of issuing a pending authorization: the prompt to render and the
/// session token the browser must present when confirming.
#[derive(Debug)]
pub struct AuthorizationChallenge {
    pub session: SessionToken,
    pub max_age: Duration,
    pub prompt: ConsentPrompt,
}
