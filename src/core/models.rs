use std::fmt;

use super::types::*;

/// A registered relying party. Read-only to the protocol core.
#[derive(Clone)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub website: String,
    pub logo: String,
    pub redirect_uri: RedirectUri,
    pub secret: HashedClientSecret,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Public metadata shown to the resource owner on the consent screen.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub name: String,
    pub website: String,
    pub logo: String,
}

impl From<&Client> for ClientInfo {
    fn from(client: &Client) -> Self {
        Self {
            client_id: client.id.clone(),
            name: client.name.clone(),
            website: client.website.clone(),
            logo: client.logo.clone(),
        }
    }
}

/// Session created by a validated authorization request, awaiting consent.
#[derive(Clone)]
pub struct PendingAuthorization {
    pub session: SessionToken,
    pub code: AuthCode,
    pub client_id: ClientId,
    pub redirect_uri: RedirectUri,
    pub scope: Scope,
    pub state: String,
    pub created_at: Timestamp,
    pub invalid_after: Timestamp,
}

impl PendingAuthorization {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.invalid_after.has_passed(now)
    }
}

impl fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .field("invalid_after", &self.invalid_after)
            .finish_non_exhaustive()
    }
}

/// An approved code as held against its client until redemption.
#[derive(Debug, Clone)]
pub struct RedeemableCode {
    pub code: HashedAuthCode,
    pub client_id: ClientId,
    pub redirect_uri: RedirectUri,
    pub scope: Scope,
    pub invalid_after: Timestamp,
}

impl RedeemableCode {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.invalid_after.has_passed(now)
    }
}

/// What a successful redemption hands back to the token exchanger.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemedCode {
    pub client_id: ClientId,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve { code_invalid_after: Timestamp },
    Deny,
}
