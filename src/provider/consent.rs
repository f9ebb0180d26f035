use crate::auth::{
    AuthorizationCodeResponse, ConsentRedirect, ConsentRequest, ConsentResponse, ErrorKind,
    ErrorResponse, RawConsentRequest, Redirect, Store,
};
use crate::core::models::Decision;
use crate::core::types::{ClientId, SessionToken, Timestamp};
use crate::provider::error::ResultExt;

use super::OAuth2Provider;

use tracing::{event, Level};

/// Boolean literals as browsers and form builders commonly send them.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// A missing `authorize` is a denial.
pub fn parse_consent_request(raw: RawConsentRequest) -> Result<ConsentRequest, ErrorKind> {
    let authorize = match raw.authorize.as_deref() {
        None => false,
        Some(value) => parse_bool(value).ok_or_else(|| {
            event!(Level::DEBUG, "Unparseable authorize flag");
            ErrorKind::InvalidRequest
        })?,
    };
    let client_id = raw
        .client_id
        .filter(|c| !c.is_empty())
        .ok_or(ErrorKind::InvalidRequest)?;
    let state = raw
        .state
        .filter(|s| !s.is_empty())
        .ok_or(ErrorKind::InvalidRequest)?;

    Ok(ConsentRequest {
        authorize,
        client_id: ClientId(client_id),
        state,
    })
}

impl<S: Store> OAuth2Provider<S> {
    /// `/confirm_auth`: consume the pending authorization bound to `session`
    /// and send the user agent back to the client.
    #[tracing::instrument(skip_all, fields(client_id = ?raw.client_id, authorize = ?raw.authorize))]
    pub async fn confirm_authorization(
        &self,
        session: Option<SessionToken>,
        raw: RawConsentRequest,
    ) -> Result<ConsentRedirect, ErrorKind> {
        let session = session.filter(|s| !s.0.is_empty()).ok_or_else(|| {
            event!(Level::DEBUG, "Missing session token");
            ErrorKind::InvalidRequest
        })?;
        let req = parse_consent_request(raw)?;
        let now = Timestamp::now();

        let pending = self
            .store
            .resolve_pending(&session, now)
            .await
            .or_server_error("Failed to resolve pending authorization")?
            .ok_or_else(|| {
                event!(Level::DEBUG, "No live pending authorization for session");
                ErrorKind::InvalidRequest
            })?;

        if pending.client_id != req.client_id || pending.state != req.state {
            event!(
                Level::WARN,
                pending_client_id = %pending.client_id,
                "Confirmation does not match the pending authorization"
            );
            return Err(ErrorKind::InvalidRequest);
        }

        let client = self
            .store
            .get_client(&pending.client_id)
            .await
            .or_server_error("Client lookup failed")?
            .ok_or(ErrorKind::InvalidClient)?;

        let decision = if req.authorize {
            Decision::Approve {
                code_invalid_after: now.after(self.config.code_lifetime),
            }
        } else {
            Decision::Deny
        };

        // A concurrent confirmation may have consumed it since the lookup.
        let finalized = self
            .store
            .finalize(&session, decision, now)
            .await
            .or_server_error("Failed to finalize pending authorization")?
            .ok_or(ErrorKind::InvalidRequest)?;

        let params = match decision {
            Decision::Approve { .. } => {
                event!(Level::DEBUG, "Authorization approved");
                ConsentResponse::Code(AuthorizationCodeResponse {
                    code: finalized.code,
                    state: finalized.state,
                })
            }
            Decision::Deny => {
                event!(Level::DEBUG, "Authorization denied");
                ConsentResponse::Error(
                    (ErrorResponse::from(ErrorKind::AccessDenied), finalized.state).into(),
                )
            }
        };

        Ok(Redirect::new(client.redirect_uri, params))
    }
}
