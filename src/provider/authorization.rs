use crate::auth::{
    AuthorizationChallenge, AuthorizationRequest, ConsentPrompt, ErrorKind,
    RawAuthorizationRequest, Store,
};
use crate::core::models::{Client, ClientInfo, PendingAuthorization};
use crate::core::types::{AuthCode, SessionToken, Timestamp};
use crate::provider::error::ResultExt;
use crate::util::random::FromRandom;

use super::OAuth2Provider;

use tracing::{event, Level};

impl<S: Store> OAuth2Provider<S> {
    /// `/auth`: validate, then park a pending authorization until the
    /// resource owner decides.
    #[tracing::instrument(skip_all)]
    pub async fn authorization_request(
        &self,
        raw: RawAuthorizationRequest,
    ) -> Result<AuthorizationChallenge, ErrorKind> {
        let (req, client) = self.validate_authorization_request(raw).await?;
        self.issue_pending(req, &client).await
    }

    #[tracing::instrument(skip_all, fields(client_id = %req.client_id))]
    pub async fn issue_pending(
        &self,
        req: AuthorizationRequest,
        client: &Client,
    ) -> Result<AuthorizationChallenge, ErrorKind> {
        let now = Timestamp::now();
        let scopes = req.scope.as_parts();
        let state = req.state.clone();

        let pending = PendingAuthorization {
            session: SessionToken::from_random(),
            code: AuthCode::from_random(),
            client_id: req.client_id,
            redirect_uri: req.redirect_uri,
            scope: req.scope,
            state: req.state,
            created_at: now,
            invalid_after: now.after(self.config.pending_lifetime),
        };

        let session = self
            .store
            .create_pending(pending)
            .await
            .or_server_error("Failed to store pending authorization")?;

        event!(Level::DEBUG, scope = ?scopes, "Awaiting consent");

        Ok(AuthorizationChallenge {
            session,
            max_age: self.config.pending_lifetime,
            prompt: ConsentPrompt {
                client: ClientInfo::from(client),
                scopes,
                state,
            },
        })
    }
}
