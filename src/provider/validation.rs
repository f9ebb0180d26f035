use url::{Host, Url};

use crate::auth::{AuthorizationRequest, ErrorKind, RawAuthorizationRequest, Store};
use crate::core::models::Client;
use crate::core::types::{ClientId, RedirectUri, Scope, RESPONSE_TYPE_CODE};
use crate::provider::error::ResultExt;

use super::OAuth2Provider;

use tracing::{event, Level};

impl<S: Store> OAuth2Provider<S> {
    /// Checks an `/auth` request for protocol conformance and resolves its
    /// client. Fails on the first violation.
    #[tracing::instrument(skip_all, fields(client_id = ?raw.client_id))]
    pub async fn validate_authorization_request(
        &self,
        raw: RawAuthorizationRequest,
    ) -> Result<(AuthorizationRequest, Client), ErrorKind> {
        let req = check_request(raw, self.config.allow_insecure_loopback)?;

        let client = self
            .store
            .get_client(&req.client_id)
            .await
            .or_server_error("Client lookup failed")?
            .ok_or_else(|| {
                event!(Level::DEBUG, "Unknown client");
                ErrorKind::InvalidClient
            })?;

        if client.redirect_uri != req.redirect_uri {
            event!(
                Level::WARN,
                requested = %req.redirect_uri,
                "redirect_uri does not match the registered one"
            );
            return Err(ErrorKind::InvalidRequest);
        }

        Ok((req, client))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The registry-independent checks, in order.
pub fn check_request(
    raw: RawAuthorizationRequest,
    allow_insecure_loopback: bool,
) -> Result<AuthorizationRequest, ErrorKind> {
    if raw.response_type.as_deref() != Some(RESPONSE_TYPE_CODE) {
        event!(Level::DEBUG, response_type = ?raw.response_type, "Unsupported response_type");
        return Err(ErrorKind::InvalidRequest);
    }

    let client_id = non_empty(raw.client_id).ok_or(ErrorKind::InvalidRequest)?;

    let redirect_uri = non_empty(raw.redirect_uri)
        .filter(|uri| is_acceptable_redirect_uri(uri, allow_insecure_loopback))
        .ok_or_else(|| {
            event!(Level::DEBUG, "Malformed or insecure redirect_uri");
            ErrorKind::InvalidRequest
        })?;

    let scope = raw
        .scope
        .map(|s| Scope::from_delimited_parts(&s))
        .filter(|s| !s.is_empty())
        .ok_or(ErrorKind::InvalidRequest)?;

    let state = non_empty(raw.state).ok_or(ErrorKind::InvalidState)?;

    Ok(AuthorizationRequest {
        client_id: ClientId(client_id),
        redirect_uri: RedirectUri(redirect_uri),
        scope,
        state,
    })
}

/// Absolute `https` URI without a fragment. Plain `http` is accepted only
/// for loopback hosts, and only when explicitly allowed.
pub fn is_acceptable_redirect_uri(uri: &str, allow_insecure_loopback: bool) -> bool {
    let url = match Url::parse(uri) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if url.cannot_be_a_base() || url.host().is_none() || url.fragment().is_some() {
        return false;
    }

    match url.scheme() {
        "https" => true,
        "http" => allow_insecure_loopback && is_loopback(&url),
        _ => false,
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
